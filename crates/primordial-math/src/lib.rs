//! Numerical primitives for the primordial spectrum core.

pub mod ode;
pub mod spline;
pub mod symmetric;
pub mod tridiag;
