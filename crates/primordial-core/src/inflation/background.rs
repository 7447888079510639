// ─────────────────────────────────────────────────────────────────────
// Primordial Spectrum Core — Inflaton Background
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Homogeneous background: a(τ), φ(τ), φ'(τ).
//!
//!   aH    = √(8π/3 (φ'²/2 + a² V))
//!   a'    = a · aH
//!   φ''   = −2 aH φ' − a² dV/dφ

use primordial_math::ode::{scaled_error, OdeSystem, OdeVector};
use primordial_types::constants::FRIEDMANN_FACTOR;
use primordial_types::error::{PrimordialError, PrimordialResult};
use std::f64::consts::PI;
use tracing::{debug, trace};

use super::{InflatonSolver, MAX_EVOLUTION_STEPS};
use crate::potential::{InflatonPotential, PotentialValues};

/// Scale factor, field and conformal field velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundState {
    pub a: f64,
    pub phi: f64,
    pub dphi: f64,
}

impl BackgroundState {
    pub fn new(a: f64, phi: f64, dphi: f64) -> Self {
        BackgroundState { a, phi, dphi }
    }

    /// Conformal Hubble rate for a potential value `v` at this field.
    pub fn conformal_hubble(&self, v: f64) -> f64 {
        (FRIEDMANN_FACTOR * (0.5 * self.dphi * self.dphi + self.a * self.a * v)).sqrt()
    }
}

impl OdeVector for BackgroundState {
    fn zero() -> Self {
        BackgroundState::new(0.0, 0.0, 0.0)
    }

    fn add_scaled(&self, h: f64, rate: &Self) -> Self {
        BackgroundState {
            a: self.a + h * rate.a,
            phi: self.phi + h * rate.phi,
            dphi: self.dphi + h * rate.dphi,
        }
    }

    fn error_ratio(err: &Self, y: &Self, dydx: &Self, h: f64) -> f64 {
        scaled_error(err.a, y.a, dydx.a, h)
            .max(scaled_error(err.phi, y.phi, dydx.phi, h))
            .max(scaled_error(err.dphi, y.dphi, dydx.dphi, h))
    }

    fn is_finite(&self) -> bool {
        self.a.is_finite() && self.phi.is_finite() && self.dphi.is_finite()
    }
}

/// Right-hand side plus the intermediate quantities the mode equations reuse.
#[derive(Debug, Clone, Copy)]
pub struct BackgroundRates {
    pub rate: BackgroundState,
    pub conformal_hubble: f64,
    pub potential: PotentialValues,
}

#[derive(Debug, Clone, Copy)]
pub struct BackgroundEquations {
    potential: InflatonPotential,
}

impl BackgroundEquations {
    pub fn new(potential: InflatonPotential) -> Self {
        BackgroundEquations { potential }
    }

    pub fn rates(&self, y: &BackgroundState) -> BackgroundRates {
        let potential = self.potential.evaluate(y.phi);
        let a2 = y.a * y.a;
        let ah = y.conformal_hubble(potential.v);
        BackgroundRates {
            rate: BackgroundState {
                a: y.a * ah,
                phi: y.dphi,
                dphi: -2.0 * ah * y.dphi - a2 * potential.dv,
            },
            conformal_hubble: ah,
            potential,
        }
    }
}

impl OdeSystem for BackgroundEquations {
    type State = BackgroundState;

    fn derivatives(&self, _tau: f64, y: &BackgroundState) -> PrimordialResult<BackgroundState> {
        Ok(self.rates(y).rate)
    }
}

/// Slow-roll attractor at one field value.
#[derive(Debug, Clone, Copy)]
pub struct Attractor {
    /// Hubble rate H.
    pub hubble: f64,
    /// Cosmic-time velocity dφ/dt.
    pub dphidt: f64,
}

/// Slow-roll velocity dφ/dt = −V' / (3 H_sr).
fn slow_roll_velocity(values: &PotentialValues) -> f64 {
    -values.dv / 3.0 / (FRIEDMANN_FACTOR * values.v).sqrt()
}

fn too_many_steps(tau: f64, what: &str) -> PrimordialError {
    PrimordialError::Integration {
        tau,
        message: format!("{what} exceeded {MAX_EVOLUTION_STEPS} steps"),
    }
}

impl InflatonSolver {
    /// Background step bg_stepsize · min(1/aH, |φ'/φ''|).
    fn background_step(&self, rates: &BackgroundRates, y: &BackgroundState) -> f64 {
        let field_scale = (y.dphi / rates.rate.dphi).abs();
        self.precision.bg_stepsize * (1.0 / rates.conformal_hubble).min(field_scale)
    }

    /// Attractor velocity and Hubble rate at `phi0`.
    ///
    /// Starts slightly further up the potential on the slow-roll velocity,
    /// evolves down to `phi0` and repeats from ever earlier field values
    /// until the arrival velocity stops changing by more than `tolerance`.
    pub fn find_attractor(&self, phi0: f64, tolerance: f64) -> PrimordialResult<Attractor> {
        let at_phi0 = self.potential.evaluate(phi0);
        let backstep = at_phi0.dv / at_phi0.v / (16.0 * PI);

        let mut dphidt_new = slow_roll_velocity(&at_phi0);
        let mut dphidt_old = dphidt_new / (tolerance + 2.0);
        let mut phi = phi0;
        let mut counter = 0;

        while !((dphidt_new / dphidt_old - 1.0).abs() < tolerance) {
            counter += 1;
            if counter >= self.precision.attractor_maxit {
                return Err(PrimordialError::AttractorNotFound {
                    phi: phi0,
                    iterations: counter,
                    tolerance,
                });
            }
            dphidt_old = dphidt_new;
            phi += backstep;

            let values = self.potential.check(phi)?;
            let mut y = BackgroundState::new(1.0, phi, slow_roll_velocity(&values));
            self.evolve_background(&mut y, phi0)?;
            dphidt_new = y.dphi / y.a;
            trace!(phi0, phi, dphidt_new, iteration = counter, "attractor iteration");
        }

        let hubble =
            (FRIEDMANN_FACTOR * (0.5 * dphidt_new * dphidt_new + at_phi0.v)).sqrt();
        Ok(Attractor {
            hubble,
            dphidt: dphidt_new,
        })
    }

    /// Evolve until the field reaches `phi_stop`, landing on it with a final
    /// linear step.
    pub fn evolve_background(&self, y: &mut BackgroundState, phi_stop: f64) -> PrimordialResult<()> {
        let equations = BackgroundEquations::new(self.potential);
        let mut integrator = self.integrator();
        let mut epsilon = self.potential.epsilon(y.phi);
        let mut tau = 0.0;
        let mut dtau = self.background_step(&equations.rates(y), y);
        let mut steps = 0;

        while y.phi <= phi_stop - y.dphi * dtau {
            steps += 1;
            if steps > MAX_EVOLUTION_STEPS {
                return Err(too_many_steps(tau, "background evolution"));
            }
            self.potential.check(y.phi)?;
            dtau = self.background_step(&equations.rates(y), y);
            integrator.integrate(&equations, tau, tau + dtau, y)?;
            tau += dtau;

            let epsilon_old = epsilon;
            epsilon = self.potential.epsilon(y.phi);
            if epsilon > 1.0 && epsilon_old <= 1.0 {
                return Err(PrimordialError::InflationDisrupted { phi: y.phi });
            }
        }

        let rates = equations.rates(y);
        let dtau_final = (phi_stop - y.phi) / rates.rate.phi;
        *y = y.add_scaled(dtau_final, &rates.rate);
        Ok(())
    }

    /// Evolve until aH >= `ah_target`.
    pub fn reach_ah(&self, y: &mut BackgroundState, ah_target: f64) -> PrimordialResult<()> {
        let equations = BackgroundEquations::new(self.potential);
        let mut integrator = self.integrator();
        let mut tau = 0.0;

        for _ in 0..MAX_EVOLUTION_STEPS {
            let rates = equations.rates(y);
            if rates.conformal_hubble >= ah_target {
                return Ok(());
            }
            self.potential.check(y.phi)?;
            let dtau = self.background_step(&rates, y);
            integrator.integrate(&equations, tau, tau + dtau, y)?;
            tau += dtau;
        }
        Err(too_many_steps(tau, "evolution to target aH"))
    }

    /// Background state early enough that every k in `[k_min, k_max]` starts
    /// deep inside the horizon, normalised so that the pivot crosses at
    /// k_pivot = aH.
    pub fn initial_background(&self, k_min: f64, k_max: f64) -> PrimordialResult<BackgroundState> {
        let p = &self.precision;
        let phi_pivot = self.potential.phi_pivot();

        self.potential.check(phi_pivot)?;
        let pivot = self.find_attractor(phi_pivot, p.attractor_precision_pivot)?;
        let a_pivot = self.k_pivot / pivot.hubble;
        debug!(hubble = pivot.hubble, dphidt = pivot.dphidt, a_pivot, "pivot attractor");

        // The potential must stay treatable until the smallest scale has frozen out.
        let mut late = BackgroundState::new(a_pivot, phi_pivot, a_pivot * pivot.dphidt);
        self.reach_ah(&mut late, k_max / p.ratio_max)?;

        let ah_ini = k_min / p.ratio_min;
        let mut a_try = a_pivot;
        let mut h_try = pivot.hubble;
        let mut phi_try = phi_pivot;
        let mut dphidt_try = pivot.dphidt;
        let mut counter = 0;

        while a_try * h_try >= ah_ini {
            counter += 1;
            if counter >= p.phi_ini_maxit {
                return Err(PrimordialError::NoConvergence {
                    iterations: counter,
                });
            }

            let values = self.potential.evaluate(phi_try);
            phi_try += p.jump_initial * (a_try * h_try / ah_ini).ln() * values.dv / values.v
                / (8.0 * PI);

            let attractor = self.find_attractor(phi_try, p.attractor_precision_initial)?;
            h_try = attractor.hubble;
            dphidt_try = attractor.dphidt;

            let mut y = BackgroundState::new(1.0, phi_try, dphidt_try);
            self.evolve_background(&mut y, phi_pivot)?;
            a_try = a_pivot / y.a;
            trace!(phi_try, a_try, ah = a_try * h_try, ah_ini, "initial field search");
        }

        Ok(BackgroundState::new(a_try, phi_try, a_try * dphidt_try))
    }
}
