// ─────────────────────────────────────────────────────────────────────
// Primordial Spectrum Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_K_PIVOT;
use crate::error::{PrimordialError, PrimordialResult};
use crate::layout::IcType;

/// Top-level primordial module configuration.
/// Maps 1:1 to the JSON files under `configs/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimordialConfig {
    /// Pivot scale [1/Mpc].
    #[serde(default = "default_k_pivot")]
    pub k_pivot: f64,
    pub spectrum: SpectrumConfig,
    #[serde(default)]
    pub precision: PrecisionParams,
}

/// Which way the primordial spectrum is obtained.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpectrumConfig {
    /// Amplitudes, tilts and runnings.
    Analytic(AnalyticParams),
    /// Single-field inflation with a polynomial potential V(phi).
    InflationV(PotentialParams),
}

/// Parameters of the analytic spectrum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticParams {
    #[serde(rename = "A_s", default = "default_a_s")]
    pub a_s: f64,
    #[serde(default = "default_one")]
    pub n_s: f64,
    #[serde(default)]
    pub alpha_s: f64,
    /// Tensor-to-scalar ratio.
    #[serde(default = "default_one")]
    pub r: f64,
    /// Tensor tilt, zero for scale invariance.
    #[serde(default)]
    pub n_t: f64,
    #[serde(default)]
    pub alpha_t: f64,
    #[serde(default)]
    pub bi: IsocurvatureParams,
    #[serde(default)]
    pub cdi: IsocurvatureParams,
    #[serde(default)]
    pub nid: IsocurvatureParams,
    #[serde(default)]
    pub niv: IsocurvatureParams,
    /// Cross-correlations; unlisted pairs are uncorrelated.
    #[serde(default)]
    pub correlations: Vec<CorrelationParams>,
}

/// Isocurvature amplitude ratio `f` (P_iso = A_s f²), tilt and running.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IsocurvatureParams {
    #[serde(default = "default_one")]
    pub f: f64,
    #[serde(default = "default_one")]
    pub n: f64,
    #[serde(default)]
    pub alpha: f64,
}

/// Correlation coefficient, extra tilt and extra running of one IC pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CorrelationParams {
    pub ic1: IcType,
    pub ic2: IcType,
    pub c: f64,
    #[serde(default)]
    pub n: f64,
    #[serde(default)]
    pub alpha: f64,
}

/// Quartic potential coefficients about `phi_pivot`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PotentialParams {
    #[serde(rename = "V0")]
    pub v0: f64,
    #[serde(rename = "V1")]
    pub v1: f64,
    #[serde(rename = "V2", default)]
    pub v2: f64,
    #[serde(rename = "V3", default)]
    pub v3: f64,
    #[serde(rename = "V4", default)]
    pub v4: f64,
    #[serde(default)]
    pub phi_pivot: f64,
}

/// Sampling density and inflaton integration knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrecisionParams {
    #[serde(default = "default_k_per_decade")]
    pub k_per_decade_primordial: f64,
    /// Relative tolerance of the adaptive stepper.
    #[serde(default = "default_tol_integration")]
    pub tol_integration: f64,
    /// Smallest step, as a fraction of the requested interval.
    #[serde(default = "default_smallest_allowed_variation")]
    pub smallest_allowed_variation: f64,
    /// Background step in units of min(1/aH, |dphi/dphi'|).
    #[serde(default = "default_bg_stepsize")]
    pub bg_stepsize: f64,
    /// Perturbation step in units of one oscillation period.
    #[serde(default = "default_pt_stepsize")]
    pub pt_stepsize: f64,
    /// Modes start at k/aH = ratio_min.
    #[serde(default = "default_ratio_min")]
    pub ratio_min: f64,
    /// Modes are followed at least until k/aH < ratio_max.
    #[serde(default = "default_ratio_max")]
    pub ratio_max: f64,
    #[serde(default = "default_tol_curvature")]
    pub tol_curvature: f64,
    #[serde(default = "default_attractor_precision_pivot")]
    pub attractor_precision_pivot: f64,
    #[serde(default = "default_attractor_precision_initial")]
    pub attractor_precision_initial: f64,
    #[serde(default = "default_attractor_maxit")]
    pub attractor_maxit: usize,
    #[serde(default = "default_jump_initial")]
    pub jump_initial: f64,
    #[serde(default = "default_phi_ini_maxit")]
    pub phi_ini_maxit: usize,
}

fn default_k_pivot() -> f64 {
    DEFAULT_K_PIVOT
}
fn default_a_s() -> f64 {
    2.3e-9
}
fn default_one() -> f64 {
    1.0
}
fn default_k_per_decade() -> f64 {
    10.0
}
fn default_tol_integration() -> f64 {
    1e-3
}
fn default_smallest_allowed_variation() -> f64 {
    1e-12
}
fn default_bg_stepsize() -> f64 {
    0.005
}
fn default_pt_stepsize() -> f64 {
    0.01
}
fn default_ratio_min() -> f64 {
    100.0
}
fn default_ratio_max() -> f64 {
    1.0 / 50.0
}
fn default_tol_curvature() -> f64 {
    1e-3
}
fn default_attractor_precision_pivot() -> f64 {
    1e-3
}
fn default_attractor_precision_initial() -> f64 {
    0.1
}
fn default_attractor_maxit() -> usize {
    10
}
fn default_jump_initial() -> f64 {
    1.2
}
fn default_phi_ini_maxit() -> usize {
    10_000
}

impl Default for IsocurvatureParams {
    fn default() -> Self {
        IsocurvatureParams {
            f: default_one(),
            n: default_one(),
            alpha: 0.0,
        }
    }
}

impl Default for AnalyticParams {
    fn default() -> Self {
        AnalyticParams {
            a_s: default_a_s(),
            n_s: default_one(),
            alpha_s: 0.0,
            r: default_one(),
            n_t: 0.0,
            alpha_t: 0.0,
            bi: IsocurvatureParams::default(),
            cdi: IsocurvatureParams::default(),
            nid: IsocurvatureParams::default(),
            niv: IsocurvatureParams::default(),
            correlations: Vec::new(),
        }
    }
}

impl Default for PrecisionParams {
    fn default() -> Self {
        PrecisionParams {
            k_per_decade_primordial: default_k_per_decade(),
            tol_integration: default_tol_integration(),
            smallest_allowed_variation: default_smallest_allowed_variation(),
            bg_stepsize: default_bg_stepsize(),
            pt_stepsize: default_pt_stepsize(),
            ratio_min: default_ratio_min(),
            ratio_max: default_ratio_max(),
            tol_curvature: default_tol_curvature(),
            attractor_precision_pivot: default_attractor_precision_pivot(),
            attractor_precision_initial: default_attractor_precision_initial(),
            attractor_maxit: default_attractor_maxit(),
            jump_initial: default_jump_initial(),
            phi_ini_maxit: default_phi_ini_maxit(),
        }
    }
}

impl PrimordialConfig {
    pub fn analytic(k_pivot: f64, params: AnalyticParams) -> Self {
        PrimordialConfig {
            k_pivot,
            spectrum: SpectrumConfig::Analytic(params),
            precision: PrecisionParams::default(),
        }
    }

    pub fn inflation(k_pivot: f64, potential: PotentialParams) -> Self {
        PrimordialConfig {
            k_pivot,
            spectrum: SpectrumConfig::InflationV(potential),
            precision: PrecisionParams::default(),
        }
    }

    /// Load from a JSON file.
    pub fn from_file(path: &str) -> PrimordialResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> PrimordialResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    pub fn is_analytic(&self) -> bool {
        matches!(self.spectrum, SpectrumConfig::Analytic(_))
    }

    /// Reject values that would make the computation meaningless.
    /// Grid density is checked by the grid builder itself.
    pub fn validate(&self) -> PrimordialResult<()> {
        if !self.k_pivot.is_finite() || self.k_pivot <= 0.0 {
            return Err(PrimordialError::ConfigError(format!(
                "k_pivot must be finite and > 0, got {}",
                self.k_pivot
            )));
        }
        if let SpectrumConfig::InflationV(potential) = &self.spectrum {
            let coefficients = [
                potential.v0,
                potential.v1,
                potential.v2,
                potential.v3,
                potential.v4,
                potential.phi_pivot,
            ];
            if coefficients.iter().any(|c| !c.is_finite()) {
                return Err(PrimordialError::ConfigError(
                    "potential coefficients must be finite".to_string(),
                ));
            }
            self.precision.validate()?;
        }
        Ok(())
    }
}

impl PrecisionParams {
    fn validate(&self) -> PrimordialResult<()> {
        let positive = [
            ("tol_integration", self.tol_integration),
            ("smallest_allowed_variation", self.smallest_allowed_variation),
            ("bg_stepsize", self.bg_stepsize),
            ("pt_stepsize", self.pt_stepsize),
            ("ratio_min", self.ratio_min),
            ("ratio_max", self.ratio_max),
            ("tol_curvature", self.tol_curvature),
            ("attractor_precision_pivot", self.attractor_precision_pivot),
            ("attractor_precision_initial", self.attractor_precision_initial),
            ("jump_initial", self.jump_initial),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(PrimordialError::ConfigError(format!(
                    "{name} must be finite and > 0, got {value}"
                )));
            }
        }
        if self.ratio_max >= self.ratio_min {
            return Err(PrimordialError::ConfigError(format!(
                "ratio_max ({}) must be smaller than ratio_min ({})",
                self.ratio_max, self.ratio_min
            )));
        }
        if self.attractor_maxit == 0 || self.phi_ini_maxit == 0 {
            return Err(PrimordialError::ConfigError(
                "iteration caps must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}
