// ─────────────────────────────────────────────────────────────────────
// Primordial Spectrum Core — Inflaton Potential
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Quartic inflaton potential expanded about the pivot field value.
//!
//! V(φ) = V0 + x V1 + x²/2 V2 + x³/6 V3 + x⁴/24 V4,  x = φ − φ_pivot.
//! The evolution code assumes the field rolls towards larger φ, so a
//! treatable region needs V > 0 and dV/dφ < 0.

use primordial_types::config::PotentialParams;
use primordial_types::error::{PrimordialError, PrimordialResult};
use std::f64::consts::PI;

/// V, dV/dφ and d²V/dφ² at one field value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PotentialValues {
    pub v: f64,
    pub dv: f64,
    pub ddv: f64,
}

/// First-order slow-roll predictions from the Taylor coefficients at the pivot.
#[derive(Debug, Clone, Copy)]
pub struct SlowRollEstimates {
    pub a_s: f64,
    pub r: f64,
    pub n_s: f64,
    pub n_t: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct InflatonPotential {
    params: PotentialParams,
}

impl InflatonPotential {
    pub fn new(params: PotentialParams) -> Self {
        InflatonPotential { params }
    }

    pub fn phi_pivot(&self) -> f64 {
        self.params.phi_pivot
    }

    pub fn evaluate(&self, phi: f64) -> PotentialValues {
        let p = &self.params;
        let x = phi - p.phi_pivot;
        let x2 = x * x;

        PotentialValues {
            v: p.v0 + x * p.v1 + x2 / 2.0 * p.v2 + x2 * x / 6.0 * p.v3 + x2 * x2 / 24.0 * p.v4,
            dv: p.v1 + x * p.v2 + x2 / 2.0 * p.v3 + x2 * x / 6.0 * p.v4,
            ddv: p.v2 + x * p.v3 + x2 / 2.0 * p.v4,
        }
    }

    /// Values at `phi`, or `InvalidPotential` when V <= 0 or dV/dφ >= 0.
    pub fn check(&self, phi: f64) -> PrimordialResult<PotentialValues> {
        let values = self.evaluate(phi);
        if !(values.v > 0.0) || !(values.dv < 0.0) {
            return Err(PrimordialError::InvalidPotential {
                phi,
                v: values.v,
                dv: values.dv,
            });
        }
        Ok(values)
    }

    /// First slow-roll parameter ε = (V'/V)² / 16π.
    pub fn epsilon(&self, phi: f64) -> f64 {
        let values = self.evaluate(phi);
        (values.dv / values.v).powi(2) / (16.0 * PI)
    }

    pub fn slow_roll_estimates(&self) -> SlowRollEstimates {
        let p = &self.params;
        let ratio2 = (p.v1 / p.v0).powi(2);
        SlowRollEstimates {
            a_s: 128.0 * PI / 3.0 * p.v0.powi(3) / (p.v1 * p.v1),
            r: ratio2 / PI,
            n_s: 1.0 - 3.0 / (8.0 * PI) * ratio2 + p.v2 / p.v0 / (4.0 * PI),
            n_t: -ratio2 / (8.0 * PI),
        }
    }
}
