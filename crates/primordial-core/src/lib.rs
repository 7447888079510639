//! Primordial power spectrum of cosmological perturbations.
//!
//! Analytic power laws with correlated initial conditions, or spectra
//! derived numerically from a single-field inflaton potential.

pub mod analytic;
pub mod inflation;
pub mod potential;
pub mod spectrum;

pub use spectrum::{PrimordialSpectrum, ScalarDiagnostics, TensorDiagnostics};
