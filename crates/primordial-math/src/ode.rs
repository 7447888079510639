// ─────────────────────────────────────────────────────────────────────
// Primordial Spectrum Core — Adaptive ODE Stepper
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Embedded Cash–Karp Runge–Kutta 4(5) integration with step-size control.
//!
//! States are small `Copy` records (see [`OdeVector`]) rather than flat
//! arrays, so systems keep named fields all the way through the stepper.

use primordial_types::constants::{MAX_ODE_STEPS, ODE_TINY};
use primordial_types::error::{PrimordialError, PrimordialResult};

const SAFETY: f64 = 0.9;
const P_GROW: f64 = -0.2;
const P_SHRINK: f64 = -0.25;
/// (5 / SAFETY)^(1 / P_GROW): below this error the step grows five-fold.
const ERR_CON: f64 = 1.89e-4;

// Cash–Karp tableau
const A2: f64 = 0.2;
const A3: f64 = 0.3;
const A4: f64 = 0.6;
const A5: f64 = 1.0;
const A6: f64 = 0.875;
const B21: f64 = 0.2;
const B31: f64 = 3.0 / 40.0;
const B32: f64 = 9.0 / 40.0;
const B41: f64 = 0.3;
const B42: f64 = -0.9;
const B43: f64 = 1.2;
const B51: f64 = -11.0 / 54.0;
const B52: f64 = 2.5;
const B53: f64 = -70.0 / 27.0;
const B54: f64 = 35.0 / 27.0;
const B61: f64 = 1631.0 / 55296.0;
const B62: f64 = 175.0 / 512.0;
const B63: f64 = 575.0 / 13824.0;
const B64: f64 = 44275.0 / 110592.0;
const B65: f64 = 253.0 / 4096.0;
const C1: f64 = 37.0 / 378.0;
const C3: f64 = 250.0 / 621.0;
const C4: f64 = 125.0 / 594.0;
const C6: f64 = 512.0 / 1771.0;
const DC1: f64 = C1 - 2825.0 / 27648.0;
const DC3: f64 = C3 - 18575.0 / 48384.0;
const DC4: f64 = C4 - 13525.0 / 55296.0;
const DC5: f64 = -277.0 / 14336.0;
const DC6: f64 = C6 - 0.25;

/// State vector of an ODE system.
pub trait OdeVector: Copy {
    fn zero() -> Self;

    /// `self + h * rate`
    fn add_scaled(&self, h: f64, rate: &Self) -> Self;

    /// Largest component of `|err| / (|y| + |h dydx| + tiny)`.
    fn error_ratio(err: &Self, y: &Self, dydx: &Self, h: f64) -> f64;

    fn is_finite(&self) -> bool;

    /// `self + h * Σ w_i r_i`
    fn combine(&self, h: f64, terms: &[(f64, &Self)]) -> Self {
        terms
            .iter()
            .fold(*self, |acc, (w, rate)| acc.add_scaled(h * w, rate))
    }
}

/// Scaled error of a single component.
pub fn scaled_error(err: f64, y: f64, dydx: f64, h: f64) -> f64 {
    err.abs() / (y.abs() + (h * dydx).abs() + ODE_TINY)
}

/// Right-hand side `dy/dtau = f(tau, y)`.
pub trait OdeSystem {
    type State: OdeVector;

    fn derivatives(&self, tau: f64, y: &Self::State) -> PrimordialResult<Self::State>;
}

impl<const N: usize> OdeVector for [f64; N] {
    fn zero() -> Self {
        [0.0; N]
    }

    fn add_scaled(&self, h: f64, rate: &Self) -> Self {
        let mut out = *self;
        for (o, r) in out.iter_mut().zip(rate.iter()) {
            *o += h * r;
        }
        out
    }

    fn error_ratio(err: &Self, y: &Self, dydx: &Self, h: f64) -> f64 {
        (0..N)
            .map(|i| scaled_error(err[i], y[i], dydx[i], h))
            .fold(0.0, f64::max)
    }

    fn is_finite(&self) -> bool {
        self.iter().all(|v| v.is_finite())
    }
}

/// Adaptive integrator. One instance per solve; holds tolerances and step statistics.
#[derive(Debug, Clone)]
pub struct AdaptiveIntegrator {
    /// Relative tolerance per step.
    pub tolerance: f64,
    /// Smallest step as a fraction of the requested interval.
    pub min_step_fraction: f64,
    pub accepted_steps: usize,
    pub rejected_steps: usize,
}

impl AdaptiveIntegrator {
    pub fn new(tolerance: f64, min_step_fraction: f64) -> Self {
        AdaptiveIntegrator {
            tolerance,
            min_step_fraction,
            accepted_steps: 0,
            rejected_steps: 0,
        }
    }

    /// Advance `y` from `tau_start` to `tau_end`. The first trial step is the
    /// whole interval.
    pub fn integrate<S: OdeSystem>(
        &mut self,
        system: &S,
        tau_start: f64,
        tau_end: f64,
        y: &mut S::State,
    ) -> PrimordialResult<()> {
        let span = tau_end - tau_start;
        if span == 0.0 {
            return Ok(());
        }
        let h_min = self.min_step_fraction * span.abs();
        let mut tau = tau_start;
        let mut h = span;

        for _ in 0..MAX_ODE_STEPS {
            let dydx = system.derivatives(tau, y)?;
            if (tau + h - tau_end) * (tau + h - tau_start) > 0.0 {
                h = tau_end - tau;
            }

            let (h_did, h_next) = self.quality_step(system, &mut tau, y, &dydx, h)?;
            if !y.is_finite() {
                return Err(PrimordialError::Integration {
                    tau,
                    message: "state became non-finite".to_string(),
                });
            }
            if (tau - tau_end) * span >= 0.0 {
                return Ok(());
            }
            if h_next.abs() <= h_min {
                return Err(PrimordialError::Integration {
                    tau,
                    message: format!(
                        "step size {h_next:e} below minimum {h_min:e} (last step {h_did:e})"
                    ),
                });
            }
            h = h_next;
        }

        Err(PrimordialError::Integration {
            tau,
            message: format!("more than {MAX_ODE_STEPS} steps between {tau_start:e} and {tau_end:e}"),
        })
    }

    /// One error-controlled step. Returns (step taken, suggested next step).
    fn quality_step<S: OdeSystem>(
        &mut self,
        system: &S,
        tau: &mut f64,
        y: &mut S::State,
        dydx: &S::State,
        h_try: f64,
    ) -> PrimordialResult<(f64, f64)> {
        let mut h = h_try;
        loop {
            let (y_trial, y_err) = cash_karp(system, *tau, y, dydx, h)?;
            let err_max = S::State::error_ratio(&y_err, y, dydx, h) / self.tolerance;
            if err_max <= 1.0 {
                let h_next = if err_max > ERR_CON {
                    SAFETY * h * err_max.powf(P_GROW)
                } else {
                    5.0 * h
                };
                *tau += h;
                *y = y_trial;
                self.accepted_steps += 1;
                return Ok((h, h_next));
            }

            self.rejected_steps += 1;
            let h_shrunk = if err_max.is_finite() {
                SAFETY * h * err_max.powf(P_SHRINK)
            } else {
                0.1 * h
            };
            h = if h >= 0.0 {
                h_shrunk.max(0.1 * h)
            } else {
                h_shrunk.min(0.1 * h)
            };
            if *tau + h == *tau {
                return Err(PrimordialError::Integration {
                    tau: *tau,
                    message: "step size underflow".to_string(),
                });
            }
        }
    }
}

/// Fifth-order Cash–Karp step and its embedded error estimate.
fn cash_karp<S: OdeSystem>(
    system: &S,
    tau: f64,
    y: &S::State,
    k1: &S::State,
    h: f64,
) -> PrimordialResult<(S::State, S::State)> {
    let k2 = system.derivatives(tau + A2 * h, &y.combine(h, &[(B21, k1)]))?;
    let k3 = system.derivatives(tau + A3 * h, &y.combine(h, &[(B31, k1), (B32, &k2)]))?;
    let k4 = system.derivatives(
        tau + A4 * h,
        &y.combine(h, &[(B41, k1), (B42, &k2), (B43, &k3)]),
    )?;
    let k5 = system.derivatives(
        tau + A5 * h,
        &y.combine(h, &[(B51, k1), (B52, &k2), (B53, &k3), (B54, &k4)]),
    )?;
    let k6 = system.derivatives(
        tau + A6 * h,
        &y.combine(h, &[(B61, k1), (B62, &k2), (B63, &k3), (B64, &k4), (B65, &k5)]),
    )?;

    let y_out = y.combine(h, &[(C1, k1), (C3, &k3), (C4, &k4), (C6, &k6)]);
    let y_err = S::State::zero().combine(
        h,
        &[(DC1, k1), (DC3, &k3), (DC4, &k4), (DC5, &k5), (DC6, &k6)],
    );
    Ok((y_out, y_err))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Exponential {
        rate: f64,
    }

    impl OdeSystem for Exponential {
        type State = [f64; 1];

        fn derivatives(&self, _tau: f64, y: &[f64; 1]) -> PrimordialResult<[f64; 1]> {
            Ok([self.rate * y[0]])
        }
    }

    struct Oscillator {
        omega: f64,
    }

    impl OdeSystem for Oscillator {
        type State = [f64; 2];

        fn derivatives(&self, _tau: f64, y: &[f64; 2]) -> PrimordialResult<[f64; 2]> {
            Ok([y[1], -self.omega * self.omega * y[0]])
        }
    }

    struct Failing;

    impl OdeSystem for Failing {
        type State = [f64; 1];

        fn derivatives(&self, tau: f64, _y: &[f64; 1]) -> PrimordialResult<[f64; 1]> {
            Err(PrimordialError::Integration {
                tau,
                message: "rhs refused".to_string(),
            })
        }
    }

    #[test]
    fn test_exponential_growth() {
        let mut integrator = AdaptiveIntegrator::new(1e-8, 1e-14);
        let mut y = [1.0];
        integrator
            .integrate(&Exponential { rate: 1.0 }, 0.0, 2.0, &mut y)
            .unwrap();
        let exact = 2.0f64.exp();
        assert!((y[0] / exact - 1.0).abs() < 1e-6, "y = {}, exact = {exact}", y[0]);
        assert!(integrator.accepted_steps > 1);
    }

    #[test]
    fn test_backward_integration() {
        let mut integrator = AdaptiveIntegrator::new(1e-8, 1e-14);
        let mut y = [1.0];
        integrator
            .integrate(&Exponential { rate: 1.0 }, 1.0, 0.0, &mut y)
            .unwrap();
        assert!((y[0] - (-1.0f64).exp()).abs() < 1e-6);
    }

    #[test]
    fn test_oscillator_period() {
        let omega = 3.0;
        let mut integrator = AdaptiveIntegrator::new(1e-9, 1e-14);
        let mut y = [1.0, 0.0];
        let period = 2.0 * std::f64::consts::PI / omega;
        integrator
            .integrate(&Oscillator { omega }, 0.0, 5.0 * period, &mut y)
            .unwrap();
        assert!((y[0] - 1.0).abs() < 1e-5, "q after 5 periods = {}", y[0]);
        assert!(y[1].abs() < 1e-4, "p after 5 periods = {}", y[1]);
    }

    #[test]
    fn test_zero_interval_is_noop() {
        let mut integrator = AdaptiveIntegrator::new(1e-6, 1e-12);
        let mut y = [4.0];
        integrator
            .integrate(&Exponential { rate: 10.0 }, 1.0, 1.0, &mut y)
            .unwrap();
        assert_eq!(y[0], 4.0);
        assert_eq!(integrator.accepted_steps, 0);
    }

    #[test]
    fn test_rhs_error_propagates() {
        let mut integrator = AdaptiveIntegrator::new(1e-6, 1e-12);
        let mut y = [1.0];
        let result = integrator.integrate(&Failing, 0.0, 1.0, &mut y);
        assert!(matches!(result, Err(PrimordialError::Integration { .. })));
    }

    #[test]
    fn test_combine_matches_manual_sum() {
        let y = [1.0, 2.0];
        let r1 = [1.0, 0.0];
        let r2 = [0.0, 1.0];
        let out = y.combine(0.5, &[(2.0, &r1), (4.0, &r2)]);
        assert_eq!(out, [2.0, 4.0]);
    }
}
