// ─────────────────────────────────────────────────────────────────────
// Primordial Spectrum Core — Inflaton Solver
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Single-field inflation: background, attractor search and mode functions.
//!
//! Units G = 1, conformal time τ. `dphi` is dφ/dτ throughout; cosmic-time
//! velocities are named `dphidt`.
//!
//! Pipeline:
//! 1. Attractor at the pivot gives H_pivot and a_pivot = k_pivot / H_pivot
//! 2. Check the potential survives until aH = k_max / ratio_max
//! 3. Walk φ back until aH < k_min / ratio_min at the start
//! 4. Per k (parallel): evolve to aH = k / ratio_min, integrate the modes
//!    until frozen outside the horizon, read P_R and P_t

pub mod background;
pub mod modes;

use primordial_math::ode::AdaptiveIntegrator;
use primordial_types::config::{PotentialParams, PrecisionParams};
use primordial_types::error::PrimordialResult;
use primordial_types::state::WavenumberGrid;
use tracing::{debug, info};

use crate::potential::InflatonPotential;

pub use background::{Attractor, BackgroundEquations, BackgroundState};
pub use modes::{ModeEquations, ModeSpectrum, ModeState};

/// Cap on outer steps of one background or mode evolution.
const MAX_EVOLUTION_STEPS: usize = 1_000_000;

/// Owns the potential and integration knobs of one inflation run.
#[derive(Debug, Clone)]
pub struct InflatonSolver {
    potential: InflatonPotential,
    precision: PrecisionParams,
    k_pivot: f64,
}

impl InflatonSolver {
    pub fn new(params: PotentialParams, precision: PrecisionParams, k_pivot: f64) -> Self {
        InflatonSolver {
            potential: InflatonPotential::new(params),
            precision,
            k_pivot,
        }
    }

    pub fn potential(&self) -> &InflatonPotential {
        &self.potential
    }

    pub fn precision(&self) -> &PrecisionParams {
        &self.precision
    }

    /// Fresh stepper; one per evolution call.
    fn integrator(&self) -> AdaptiveIntegrator {
        AdaptiveIntegrator::new(
            self.precision.tol_integration,
            self.precision.smallest_allowed_variation,
        )
    }

    /// Curvature and tensor spectra at every grid sample.
    pub fn solve(&self, grid: &WavenumberGrid) -> PrimordialResult<Vec<ModeSpectrum>> {
        let estimates = self.potential.slow_roll_estimates();
        debug!(
            a_s = estimates.a_s,
            r = estimates.r,
            n_s = estimates.n_s,
            n_t = estimates.n_t,
            "slow-roll expectation"
        );

        let k_min = grid.ln_k_min().exp();
        let k_max = grid.ln_k_max().exp();
        let initial = self.initial_background(k_min, k_max)?;
        debug!(
            a = initial.a,
            phi = initial.phi,
            dphi = initial.dphi,
            "initial background found"
        );

        let spectra = self.spectra(&initial, grid)?;
        info!(n_k = spectra.len(), "inflaton spectra computed");
        Ok(spectra)
    }
}
