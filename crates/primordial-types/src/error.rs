use thiserror::Error;

use crate::layout::{IcType, ModeType};

#[derive(Error, Debug)]
pub enum PrimordialError {
    #[error("Inconsistent wavenumber range: k_min={k_min:e}, k_max={k_max:e}")]
    InvalidRange { k_min: f64, k_max: f64 },

    #[error(
        "k_per_decade_primordial = {density}: sampling sparser than {minimum} per decade is probably a mistake"
    )]
    InvalidDensity { density: f64, minimum: f64 },

    #[error("Inconsistent primordial amplitude {amplitude} for mode {mode:?}, initial condition {ic:?}")]
    InvalidAmplitude {
        amplitude: f64,
        mode: ModeType,
        ic: IcType,
    },

    #[error("Cross-correlation {correlation} between {ic1:?} and {ic2:?} outside [-1, 1]")]
    InvalidCorrelation {
        correlation: f64,
        ic1: IcType,
        ic2: IcType,
    },

    #[error("k={k:e} out of range [{k_min:e} : {k_max:e}] and no analytic fallback")]
    OutOfRange { k: f64, k_min: f64, k_max: f64 },

    #[error("Wavenumber query {0:e} rejected: k must be finite and > 0, ln k finite")]
    InvalidWavenumber(f64),

    #[error("Potential cannot be treated at phi={phi}: V={v:e}, dV/dphi={dv:e} (need V>0 and dV/dphi<0)")]
    InvalidPotential { phi: f64, v: f64, dv: f64 },

    #[error("Inflaton evolution crosses epsilon=1 at phi={phi}: inflation disrupted during the observable e-folds")]
    InflationDisrupted { phi: f64 },

    #[error(
        "No attractor solution near phi={phi} after {iterations} iterations (tolerance {tolerance}): potential too steep or tolerance too tight"
    )]
    AttractorNotFound {
        phi: f64,
        iterations: usize,
        tolerance: f64,
    },

    #[error(
        "No initial field value with enough e-folds before the pivot after {iterations} iterations"
    )]
    NoConvergence { iterations: usize },

    #[error("Non-positive spectrum at k={k:e}: curvature={curvature:e}, tensor={tensor:e}")]
    NegativeSpectrum {
        k: f64,
        curvature: f64,
        tensor: f64,
    },

    #[error("Mode {0:?} is not part of the primordial tables")]
    UnknownMode(ModeType),

    #[error("ODE integration failed at tau={tau:e}: {message}")]
    Integration { tau: f64, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type PrimordialResult<T> = Result<T, PrimordialError>;
