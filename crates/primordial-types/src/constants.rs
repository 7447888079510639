// ─────────────────────────────────────────────────────────────────────
// Primordial Spectrum Core — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use std::f64::consts::PI;

/// Sampling at or below this many points per decade is rejected as a misconfiguration.
pub const K_PER_DECADE_PRIMORDIAL_MIN: f64 = 1.0;

/// 8πG/3 in units G = 1 (Friedmann prefactor).
pub const FRIEDMANN_FACTOR: f64 = 8.0 * PI / 3.0;

/// Default pivot scale [1/Mpc].
pub const DEFAULT_K_PIVOT: f64 = 0.05;

/// Hard cap on accepted + rejected steps inside one integrator call.
pub const MAX_ODE_STEPS: usize = 100_000;

/// Floor added to the error scale of the ODE stepper.
pub const ODE_TINY: f64 = 1e-30;
