// ─────────────────────────────────────────────────────────────────────
// Primordial Spectrum Core — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use ndarray::{Array1, Array2};

use crate::constants::K_PER_DECADE_PRIMORDIAL_MIN;
use crate::error::{PrimordialError, PrimordialResult};
use crate::layout::packed_size;

/// Input/output convention of a spectrum query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convention {
    /// Takes k, returns P(k).
    Linear,
    /// Takes ln k, returns ln P(k) on the diagonal and
    /// P_12/sqrt(P_11 P_22) off the diagonal.
    Logarithmic,
}

/// Log-uniform wavenumber sampling.
#[derive(Debug, Clone)]
pub struct WavenumberGrid {
    pub ln_k: Array1<f64>, // ln k samples, strictly increasing
    pub dln_k: f64,        // ln(10) / k_per_decade
}

impl WavenumberGrid {
    /// Samples `ln(k_min) + i ln(10)/k_per_decade` for
    /// `i < floor(log10(k_max/k_min) k_per_decade) + 2`, so the last
    /// sample lies at or beyond `k_max`.
    pub fn new(k_min: f64, k_max: f64, k_per_decade: f64) -> PrimordialResult<Self> {
        if !(k_min > 0.0) || !(k_max > k_min) || !k_max.is_finite() {
            return Err(PrimordialError::InvalidRange { k_min, k_max });
        }
        if !(k_per_decade > K_PER_DECADE_PRIMORDIAL_MIN) || !k_per_decade.is_finite() {
            return Err(PrimordialError::InvalidDensity {
                density: k_per_decade,
                minimum: K_PER_DECADE_PRIMORDIAL_MIN,
            });
        }

        let size = ((k_max / k_min).log10() * k_per_decade).floor() as usize + 2;
        let dln_k = std::f64::consts::LN_10 / k_per_decade;
        let ln_k_min = k_min.ln();
        let ln_k = Array1::from_shape_fn(size, |i| ln_k_min + i as f64 * dln_k);

        Ok(WavenumberGrid { ln_k, dln_k })
    }

    /// Grid of a skipped module (no perturbations requested).
    pub fn empty() -> Self {
        WavenumberGrid {
            ln_k: Array1::zeros(0),
            dln_k: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.ln_k.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ln_k.is_empty()
    }

    pub fn ln_k_min(&self) -> f64 {
        self.ln_k[0]
    }

    pub fn ln_k_max(&self) -> f64 {
        self.ln_k[self.ln_k.len() - 1]
    }

    /// True when `ln_k` lies inside `[ln_k_min, ln_k_max]`.
    pub fn contains(&self, ln_k: f64) -> bool {
        !self.is_empty() && ln_k >= self.ln_k_min() && ln_k <= self.ln_k_max()
    }
}

/// Tabulated spectrum of one mode: rows = grid samples, columns = packed IC pairs.
#[derive(Debug, Clone)]
pub struct ModeSpectrumTable {
    pub ic_size: usize,
    pub ln_pk: Array2<f64>,    // ln P on the diagonal, correlation angle off it
    pub dd_ln_pk: Array2<f64>, // spline second derivatives, same shape
    pub is_non_zero: Vec<bool>,
}

impl ModeSpectrumTable {
    pub fn new(n_k: usize, ic_size: usize) -> Self {
        let ic_ic_size = packed_size(ic_size);
        ModeSpectrumTable {
            ic_size,
            ln_pk: Array2::zeros((n_k, ic_ic_size)),
            dd_ln_pk: Array2::zeros((n_k, ic_ic_size)),
            is_non_zero: vec![false; ic_ic_size],
        }
    }

    pub fn ic_ic_size(&self) -> usize {
        self.is_non_zero.len()
    }

    pub fn n_k(&self) -> usize {
        self.ln_pk.nrows()
    }
}
