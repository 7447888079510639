// ─────────────────────────────────────────────────────────────────────
// Primordial Spectrum Core — Inflaton Mode Functions
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Scalar (ξ) and tensor (a_h) mode functions on top of the background.
//!
//!   ξ''  = −(k² − z''/z) ξ
//!   a_h'' = −(k² − a''/a) a_h
//!
//! with Bunch–Davies initial data ξ = a_h = 1/√(2k), ξ' = a_h' = −ik/√(2k).

use num_complex::Complex64;
use primordial_math::ode::{scaled_error, OdeSystem, OdeVector};
use primordial_types::error::{PrimordialError, PrimordialResult};
use primordial_types::state::WavenumberGrid;
use rayon::prelude::*;
use std::f64::consts::PI;
use tracing::trace;

use super::background::{BackgroundEquations, BackgroundState};
use super::{InflatonSolver, MAX_EVOLUTION_STEPS};
use crate::potential::InflatonPotential;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeState {
    pub background: BackgroundState,
    pub ksi: Complex64,
    pub dksi: Complex64,
    pub ah: Complex64,
    pub dah: Complex64,
}

impl ModeState {
    /// Bunch–Davies vacuum for wavenumber `k` on `background`.
    pub fn bunch_davies(background: BackgroundState, k: f64) -> Self {
        let amplitude = 1.0 / (2.0 * k).sqrt();
        let value = Complex64::new(amplitude, 0.0);
        let rate = Complex64::new(0.0, -k * amplitude);
        ModeState {
            background,
            ksi: value,
            dksi: rate,
            ah: value,
            dah: rate,
        }
    }
}

fn complex_error(err: Complex64, y: Complex64, dydx: Complex64, h: f64) -> f64 {
    scaled_error(err.re, y.re, dydx.re, h).max(scaled_error(err.im, y.im, dydx.im, h))
}

impl OdeVector for ModeState {
    fn zero() -> Self {
        let zero = Complex64::new(0.0, 0.0);
        ModeState {
            background: BackgroundState::zero(),
            ksi: zero,
            dksi: zero,
            ah: zero,
            dah: zero,
        }
    }

    fn add_scaled(&self, h: f64, rate: &Self) -> Self {
        ModeState {
            background: self.background.add_scaled(h, &rate.background),
            ksi: self.ksi + rate.ksi * h,
            dksi: self.dksi + rate.dksi * h,
            ah: self.ah + rate.ah * h,
            dah: self.dah + rate.dah * h,
        }
    }

    fn error_ratio(err: &Self, y: &Self, dydx: &Self, h: f64) -> f64 {
        BackgroundState::error_ratio(&err.background, &y.background, &dydx.background, h)
            .max(complex_error(err.ksi, y.ksi, dydx.ksi, h))
            .max(complex_error(err.dksi, y.dksi, dydx.dksi, h))
            .max(complex_error(err.ah, y.ah, dydx.ah, h))
            .max(complex_error(err.dah, y.dah, dydx.dah, h))
    }

    fn is_finite(&self) -> bool {
        self.background.is_finite()
            && self.ksi.is_finite()
            && self.dksi.is_finite()
            && self.ah.is_finite()
            && self.dah.is_finite()
    }
}

/// Effective masses of the two mode equations at one instant.
#[derive(Debug, Clone, Copy)]
pub struct ModeMasses {
    pub conformal_hubble: f64,
    /// z''/z for the curvature perturbation.
    pub zpp_over_z: f64,
    /// a''/a for gravitational waves.
    pub app_over_a: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct ModeEquations {
    background: BackgroundEquations,
    k: f64,
}

impl ModeEquations {
    pub fn new(potential: InflatonPotential, k: f64) -> Self {
        ModeEquations {
            background: BackgroundEquations::new(potential),
            k,
        }
    }

    fn evaluate(&self, y: &ModeState) -> (BackgroundState, ModeMasses) {
        let bg = &y.background;
        let rates = self.background.rates(bg);
        let ah = rates.conformal_hubble;
        let a2 = bg.a * bg.a;
        let dphi2 = bg.dphi * bg.dphi;

        let zpp_over_z = 2.0 * ah * ah
            - a2 * rates.potential.ddv
            - 4.0 * PI * (7.0 * dphi2 + 4.0 * bg.dphi / ah * a2 * rates.potential.dv)
            + 32.0 * PI * PI * dphi2 * dphi2 / (ah * ah);
        let app_over_a = 2.0 * ah * ah - 4.0 * PI * dphi2;

        (
            rates.rate,
            ModeMasses {
                conformal_hubble: ah,
                zpp_over_z,
                app_over_a,
            },
        )
    }

    pub fn masses(&self, y: &ModeState) -> ModeMasses {
        self.evaluate(y).1
    }
}

impl OdeSystem for ModeEquations {
    type State = ModeState;

    fn derivatives(&self, _tau: f64, y: &ModeState) -> PrimordialResult<ModeState> {
        let (background, masses) = self.evaluate(y);
        let k2 = self.k * self.k;
        Ok(ModeState {
            background,
            ksi: y.dksi,
            dksi: -(k2 - masses.zpp_over_z) * y.ksi,
            ah: y.dah,
            dah: -(k2 - masses.app_over_a) * y.ah,
        })
    }
}

/// Curvature and tensor power at one wavenumber.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeSpectrum {
    pub curvature: f64,
    pub tensor: f64,
}

impl ModeSpectrum {
    /// `NegativeSpectrum` unless both powers are strictly positive, since
    /// the tables store their logarithms.
    pub fn positive(self, k: f64) -> PrimordialResult<Self> {
        if !(self.curvature > 0.0) || !(self.tensor > 0.0) {
            return Err(PrimordialError::NegativeSpectrum {
                k,
                curvature: self.curvature,
                tensor: self.tensor,
            });
        }
        Ok(self)
    }
}

impl InflatonSolver {
    /// pt_stepsize of one oscillation period, or of one Hubble time once
    /// the mode is frozen.
    fn mode_step(&self, k: f64, masses: &ModeMasses) -> f64 {
        let frequency = (k * k - masses.zpp_over_z).abs().sqrt().max(k);
        self.precision.pt_stepsize * 2.0 * PI / frequency
    }

    /// Integrate one k from `background` (aH = k / ratio_min) until the
    /// mode is outside the horizon and P_R has stopped evolving.
    pub fn one_k(&self, k: f64, background: BackgroundState) -> PrimordialResult<ModeSpectrum> {
        let p = &self.precision;
        let equations = ModeEquations::new(self.potential, k);
        let mut integrator = self.integrator();
        let mut y = ModeState::bunch_davies(background, k);

        let mut tau = 0.0;
        let mut dtau = self.mode_step(k, &equations.masses(&y));
        let mut curvature = f64::INFINITY;

        for _ in 0..MAX_EVOLUTION_STEPS {
            integrator.integrate(&equations, tau, tau + dtau, &mut y)?;
            tau += dtau;
            let step_taken = dtau;

            let masses = equations.masses(&y);
            dtau = self.mode_step(k, &masses);
            let ah = masses.conformal_hubble;

            let curvature_old = curvature;
            let z = y.background.a * y.background.dphi / ah;
            curvature = k.powi(3) / (2.0 * PI * PI) * y.ksi.norm_sqr() / (z * z);
            let dlnp_dn = (curvature - curvature_old) / step_taken / ah / curvature;

            if k / ah < p.ratio_max && dlnp_dn.abs() <= p.tol_curvature {
                let a = y.background.a;
                let tensor = 32.0 * k.powi(3) / PI * y.ah.norm_sqr() / (a * a);
                trace!(
                    k,
                    curvature,
                    tensor,
                    dlnp_dn,
                    accepted = integrator.accepted_steps,
                    rejected = integrator.rejected_steps,
                    "mode frozen"
                );
                return Ok(ModeSpectrum { curvature, tensor });
            }
        }

        Err(PrimordialError::Integration {
            tau,
            message: format!("mode k={k:e} did not freeze within {MAX_EVOLUTION_STEPS} steps"),
        })
    }

    /// Spectra at every grid sample, one independent evolution per k.
    pub fn spectra(
        &self,
        initial: &BackgroundState,
        grid: &WavenumberGrid,
    ) -> PrimordialResult<Vec<ModeSpectrum>> {
        let p = &self.precision;
        let values = self.potential.check(initial.phi)?;
        let ah = initial.conformal_hubble(values.v);
        let k_min = grid.ln_k_min().exp();
        if ah >= k_min / p.ratio_min {
            return Err(PrimordialError::ConfigError(format!(
                "at initial time, a_k_min > a*H*ratio_min (aH={ah:e}, k_min={k_min:e})"
            )));
        }

        let results: Vec<PrimordialResult<ModeSpectrum>> = grid
            .ln_k
            .to_vec()
            .into_par_iter()
            .map(|ln_k| {
                let k = ln_k.exp();
                let mut y = *initial;
                self.reach_ah(&mut y, k / p.ratio_min)?;
                self.one_k(k, y)?.positive(k)
            })
            .collect();

        // First failure in k order
        results.into_iter().collect()
    }
}
