// ─────────────────────────────────────────────────────────────────────
// Primordial Spectrum Core — Analytic Spectrum
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Power law with running for every mode and pair of initial conditions.
//!
//! P(k) = A exp((n − 1) ln(k/k_pivot) + ½ α ln²(k/k_pivot))
//!
//! Diagonal coefficients come from the per-IC parameters; cross terms
//! come from a correlation table keyed by the unordered IC pair.

use std::collections::BTreeMap;

use primordial_math::symmetric::index_symmetric;
use primordial_types::config::{AnalyticParams, CorrelationParams, IsocurvatureParams};
use primordial_types::error::{PrimordialError, PrimordialResult};
use primordial_types::layout::{IcType, ModeLayout, ModeType, PerturbationLayout};

/// Amplitude, tilt and running of one IC pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PairCoefficients {
    pub amplitude: f64,
    pub tilt: f64,
    pub running: f64,
    pub is_non_zero: bool,
}

impl PairCoefficients {
    fn diagonal(amplitude: f64, tilt: f64, running: f64) -> Self {
        PairCoefficients {
            amplitude,
            tilt,
            running,
            is_non_zero: true,
        }
    }

    /// Power law at `k`; zero for a non-contributing pair.
    pub fn evaluate(&self, k: f64, k_pivot: f64) -> f64 {
        if !self.is_non_zero {
            return 0.0;
        }
        let x = (k / k_pivot).ln();
        self.amplitude * ((self.tilt - 1.0) * x + 0.5 * self.running * x * x).exp()
    }
}

/// Unordered IC pair, smaller variant first.
fn pair_key(ic1: IcType, ic2: IcType) -> (IcType, IcType) {
    if ic1 <= ic2 {
        (ic1, ic2)
    } else {
        (ic2, ic1)
    }
}

/// Configured correlation coefficients; pairs not listed are uncorrelated.
#[derive(Debug, Clone, Default)]
pub struct CorrelationTable {
    entries: BTreeMap<(IcType, IcType), CorrelationParams>,
}

impl CorrelationTable {
    /// Later entries for the same pair replace earlier ones.
    pub fn from_params(correlations: &[CorrelationParams]) -> PrimordialResult<Self> {
        let mut entries = BTreeMap::new();
        for corr in correlations {
            if !(corr.c.abs() <= 1.0) {
                return Err(PrimordialError::InvalidCorrelation {
                    correlation: corr.c,
                    ic1: corr.ic1,
                    ic2: corr.ic2,
                });
            }
            entries.insert(pair_key(corr.ic1, corr.ic2), *corr);
        }
        Ok(CorrelationTable { entries })
    }

    pub fn get(&self, ic1: IcType, ic2: IcType) -> Option<&CorrelationParams> {
        self.entries.get(&pair_key(ic1, ic2))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolved coefficients for every mode of a layout.
#[derive(Debug, Clone)]
pub struct AnalyticSpectrum {
    k_pivot: f64,
    /// Indexed like `layout.modes`, then by packed IC pair.
    coefficients: Vec<Vec<PairCoefficients>>,
}

impl AnalyticSpectrum {
    pub fn new(
        params: &AnalyticParams,
        k_pivot: f64,
        layout: &PerturbationLayout,
    ) -> PrimordialResult<Self> {
        let correlations = CorrelationTable::from_params(&params.correlations)?;
        let coefficients = layout
            .modes
            .iter()
            .map(|mode| mode_coefficients(params, &correlations, mode))
            .collect::<PrimordialResult<Vec<_>>>()?;

        Ok(AnalyticSpectrum {
            k_pivot,
            coefficients,
        })
    }

    pub fn k_pivot(&self) -> f64 {
        self.k_pivot
    }

    /// Coefficients of the mode at `mode_index` in the layout.
    pub fn mode(&self, mode_index: usize) -> &[PairCoefficients] {
        &self.coefficients[mode_index]
    }

    pub fn evaluate(&self, mode_index: usize, pair_index: usize, k: f64) -> f64 {
        self.coefficients[mode_index][pair_index].evaluate(k, self.k_pivot)
    }
}

fn diagonal_for(
    params: &AnalyticParams,
    mode: ModeType,
    ic: IcType,
) -> PrimordialResult<PairCoefficients> {
    let iso = |p: &IsocurvatureParams| (params.a_s * p.f * p.f, p.n, p.alpha);

    let (amplitude, tilt, running) = match (mode, ic) {
        (ModeType::Scalar, IcType::Adiabatic) => (params.a_s, params.n_s, params.alpha_s),
        (ModeType::Scalar, IcType::BaryonIsocurvature) => iso(&params.bi),
        (ModeType::Scalar, IcType::CdmIsocurvature) => iso(&params.cdi),
        (ModeType::Scalar, IcType::NeutrinoDensityIsocurvature) => iso(&params.nid),
        (ModeType::Scalar, IcType::NeutrinoVelocityIsocurvature) => iso(&params.niv),
        (ModeType::Tensor, IcType::Tensor) => (params.a_s * params.r, params.n_t + 1.0, params.alpha_t),
        _ => (0.0, 0.0, 0.0),
    };

    if !(amplitude > 0.0) {
        return Err(PrimordialError::InvalidAmplitude {
            amplitude,
            mode,
            ic,
        });
    }
    Ok(PairCoefficients::diagonal(amplitude, tilt, running))
}

fn mode_coefficients(
    params: &AnalyticParams,
    correlations: &CorrelationTable,
    mode: &ModeLayout,
) -> PrimordialResult<Vec<PairCoefficients>> {
    let n = mode.ic_size();
    let mut out = vec![PairCoefficients::default(); mode.ic_ic_size()];

    for (i, &ic) in mode.initial_conditions.iter().enumerate() {
        out[index_symmetric(i, i, n)] = diagonal_for(params, mode.mode, ic)?;
    }

    for i in 0..n {
        for j in (i + 1)..n {
            let Some(corr) = correlations.get(mode.initial_conditions[i], mode.initial_conditions[j])
            else {
                continue;
            };
            if corr.c == 0.0 {
                continue;
            }
            let d1 = out[index_symmetric(i, i, n)];
            let d2 = out[index_symmetric(j, j, n)];
            out[index_symmetric(i, j, n)] = PairCoefficients {
                amplitude: corr.c * (d1.amplitude * d2.amplitude).sqrt(),
                tilt: 0.5 * (d1.tilt + d2.tilt) + corr.n,
                running: 0.5 * (d1.running + d2.running) + corr.alpha,
                is_non_zero: true,
            };
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar_layout(ics: Vec<IcType>) -> PerturbationLayout {
        PerturbationLayout::new(vec![ModeLayout::new(ModeType::Scalar, 1e-4, 1.0, ics)])
    }

    fn correlation(ic1: IcType, ic2: IcType, c: f64) -> CorrelationParams {
        CorrelationParams {
            ic1,
            ic2,
            c,
            n: 0.0,
            alpha: 0.0,
        }
    }

    #[test]
    fn test_pivot_returns_amplitude() {
        let params = AnalyticParams {
            a_s: 2.1e-9,
            n_s: 0.965,
            alpha_s: 0.01,
            ..AnalyticParams::default()
        };
        let spectrum = AnalyticSpectrum::new(&params, 0.05, &scalar_layout(vec![IcType::Adiabatic])).unwrap();
        assert_eq!(spectrum.evaluate(0, 0, 0.05), 2.1e-9);
    }

    #[test]
    fn test_power_law_decade() {
        let params = AnalyticParams {
            a_s: 2.1e-9,
            n_s: 0.965,
            ..AnalyticParams::default()
        };
        let spectrum = AnalyticSpectrum::new(&params, 0.05, &scalar_layout(vec![IcType::Adiabatic])).unwrap();
        let expected = 2.1e-9 * 10f64.powf(0.965 - 1.0);
        assert!((spectrum.evaluate(0, 0, 0.5) / expected - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_uncorrelated_pair_is_zero() {
        let params = AnalyticParams::default();
        let layout = scalar_layout(vec![IcType::Adiabatic, IcType::CdmIsocurvature]);
        let spectrum = AnalyticSpectrum::new(&params, 0.05, &layout).unwrap();
        let cross = spectrum.mode(0)[1];
        assert!(!cross.is_non_zero);
        for &k in &[1e-5, 0.05, 3.0] {
            assert_eq!(spectrum.evaluate(0, 1, k), 0.0);
        }
    }

    #[test]
    fn test_correlated_pair_amplitude() {
        let params = AnalyticParams {
            a_s: 2e-9,
            n_s: 0.96,
            bi: IsocurvatureParams {
                f: 0.3,
                n: 1.1,
                alpha: 0.02,
            },
            correlations: vec![correlation(IcType::BaryonIsocurvature, IcType::Adiabatic, 0.5)],
            ..AnalyticParams::default()
        };
        let layout = scalar_layout(vec![IcType::Adiabatic, IcType::BaryonIsocurvature]);
        let spectrum = AnalyticSpectrum::new(&params, 0.05, &layout).unwrap();
        let coeffs = spectrum.mode(0);

        let a1: f64 = 2e-9;
        let a2: f64 = 2e-9 * 0.09;
        assert!((coeffs[1].amplitude / (0.5 * (a1 * a2).sqrt()) - 1.0).abs() < 1e-12);
        assert!((coeffs[1].tilt - 1.03).abs() < 1e-12);
        assert!((coeffs[1].running - 0.01).abs() < 1e-12);
        assert!(coeffs[1].is_non_zero);
        assert!((coeffs[2].amplitude - a2).abs() < 1e-24);
    }

    #[test]
    fn test_explicit_zero_correlation_not_contributing() {
        let params = AnalyticParams {
            correlations: vec![correlation(IcType::Adiabatic, IcType::CdmIsocurvature, 0.0)],
            ..AnalyticParams::default()
        };
        let layout = scalar_layout(vec![IcType::Adiabatic, IcType::CdmIsocurvature]);
        let spectrum = AnalyticSpectrum::new(&params, 0.05, &layout).unwrap();
        assert_eq!(spectrum.mode(0)[1], PairCoefficients::default());
    }

    #[test]
    fn test_invalid_correlation() {
        let params = AnalyticParams {
            correlations: vec![correlation(IcType::Adiabatic, IcType::BaryonIsocurvature, 1.5)],
            ..AnalyticParams::default()
        };
        let layout = scalar_layout(vec![IcType::Adiabatic, IcType::BaryonIsocurvature]);
        assert!(matches!(
            AnalyticSpectrum::new(&params, 0.05, &layout),
            Err(PrimordialError::InvalidCorrelation { .. })
        ));
    }

    #[test]
    fn test_invalid_amplitude() {
        let params = AnalyticParams {
            a_s: -1.0,
            ..AnalyticParams::default()
        };
        assert!(matches!(
            AnalyticSpectrum::new(&params, 0.05, &scalar_layout(vec![IcType::Adiabatic])),
            Err(PrimordialError::InvalidAmplitude { .. })
        ));

        let iso = AnalyticParams {
            nid: IsocurvatureParams {
                f: 0.0,
                n: 1.0,
                alpha: 0.0,
            },
            ..AnalyticParams::default()
        };
        let layout = scalar_layout(vec![IcType::Adiabatic, IcType::NeutrinoDensityIsocurvature]);
        assert!(matches!(
            AnalyticSpectrum::new(&iso, 0.05, &layout),
            Err(PrimordialError::InvalidAmplitude { .. })
        ));
    }

    #[test]
    fn test_vector_mode_has_no_amplitude() {
        let layout = PerturbationLayout::new(vec![ModeLayout::new(
            ModeType::Vector,
            1e-4,
            1.0,
            vec![IcType::Adiabatic],
        )]);
        assert!(matches!(
            AnalyticSpectrum::new(&AnalyticParams::default(), 0.05, &layout),
            Err(PrimordialError::InvalidAmplitude {
                mode: ModeType::Vector,
                ..
            })
        ));
    }

    #[test]
    fn test_tensor_coefficients() {
        let params = AnalyticParams {
            a_s: 2e-9,
            r: 0.1,
            n_t: -0.0125,
            alpha_t: 0.001,
            ..AnalyticParams::default()
        };
        let layout = PerturbationLayout::new(vec![ModeLayout::new(
            ModeType::Tensor,
            1e-4,
            1.0,
            vec![IcType::Tensor],
        )]);
        let spectrum = AnalyticSpectrum::new(&params, 0.05, &layout).unwrap();
        let t = spectrum.mode(0)[0];
        assert!((t.amplitude - 2e-10).abs() < 1e-24);
        assert!((t.tilt - 0.9875).abs() < 1e-15);
        assert_eq!(t.running, 0.001);
    }

    #[test]
    fn test_correlation_table_is_unordered() {
        let table = CorrelationTable::from_params(&[correlation(
            IcType::CdmIsocurvature,
            IcType::Adiabatic,
            -0.3,
        )])
        .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(IcType::Adiabatic, IcType::CdmIsocurvature).map(|c| c.c), Some(-0.3));
        assert_eq!(table.get(IcType::CdmIsocurvature, IcType::Adiabatic).map(|c| c.c), Some(-0.3));
        assert!(table.get(IcType::Adiabatic, IcType::BaryonIsocurvature).is_none());
    }
}
