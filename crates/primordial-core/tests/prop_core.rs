// ─────────────────────────────────────────────────────────────────────
// Primordial Spectrum Core — Property-Based Tests (proptest) for primordial-core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for primordial-core using proptest.
//!
//! Covers: analytic model at the pivot, linear/logarithmic query agreement
//! inside and outside the table, correlation bounds, potential guard.

use primordial_core::analytic::AnalyticSpectrum;
use primordial_core::potential::InflatonPotential;
use primordial_core::PrimordialSpectrum;
use primordial_types::config::{
    AnalyticParams, CorrelationParams, IsocurvatureParams, PotentialParams, PrimordialConfig,
};
use primordial_types::error::PrimordialError;
use primordial_types::layout::{IcType, ModeLayout, ModeType, PerturbationLayout};
use primordial_types::state::Convention;
use proptest::prelude::*;

fn three_ic_layout() -> PerturbationLayout {
    PerturbationLayout::new(vec![
        ModeLayout::new(
            ModeType::Scalar,
            1e-4,
            0.5,
            vec![
                IcType::Adiabatic,
                IcType::CdmIsocurvature,
                IcType::NeutrinoVelocityIsocurvature,
            ],
        ),
        ModeLayout::new(ModeType::Tensor, 1e-4, 0.5, vec![IcType::Tensor]),
    ])
}

fn correlated_params(c_cdi: f64, c_niv: f64, n_s: f64, alpha_s: f64) -> AnalyticParams {
    AnalyticParams {
        a_s: 2.2e-9,
        n_s,
        alpha_s,
        r: 0.1,
        cdi: IsocurvatureParams {
            f: 0.2,
            n: 0.9,
            alpha: 0.01,
        },
        niv: IsocurvatureParams {
            f: 0.5,
            n: 1.2,
            alpha: -0.02,
        },
        correlations: vec![
            CorrelationParams {
                ic1: IcType::Adiabatic,
                ic2: IcType::CdmIsocurvature,
                c: c_cdi,
                n: 0.0,
                alpha: 0.0,
            },
            CorrelationParams {
                ic1: IcType::NeutrinoVelocityIsocurvature,
                ic2: IcType::Adiabatic,
                c: c_niv,
                n: 0.0,
                alpha: 0.0,
            },
        ],
        ..AnalyticParams::default()
    }
}

// ── Analytic Model ───────────────────────────────────────────────────

proptest! {
    /// At k = k_pivot every diagonal entry equals its configured amplitude.
    #[test]
    fn pivot_returns_amplitude(
        a_s in 1e-10f64..1e-8,
        n_s in 0.8f64..1.2,
        alpha_s in -0.1f64..0.1,
        k_pivot in 1e-3f64..1.0,
    ) {
        let params = AnalyticParams { a_s, n_s, alpha_s, ..AnalyticParams::default() };
        let layout = PerturbationLayout::new(vec![
            ModeLayout::new(ModeType::Scalar, 1e-4, 1.0, vec![IcType::Adiabatic]),
        ]);
        let spectrum = AnalyticSpectrum::new(&params, k_pivot, &layout).unwrap();
        prop_assert_eq!(spectrum.evaluate(0, 0, k_pivot), a_s);
    }

    /// Correlation coefficients outside [-1, 1] are refused.
    #[test]
    fn correlation_bound(c in 1.0001f64..10.0, negative in any::<bool>()) {
        let c = if negative { -c } else { c };
        let params = correlated_params(c, 0.0, 1.0, 0.0);
        let result = AnalyticSpectrum::new(&params, 0.05, &three_ic_layout());
        let is_invalid = matches!(result, Err(PrimordialError::InvalidCorrelation { .. }));
        prop_assert!(is_invalid);
    }
}

// ── Query Conventions ────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Linear output converted to the logarithmic convention matches the
    /// logarithmic query, on and off the grid.
    #[test]
    fn linear_log_roundtrip(
        c_cdi in -1.0f64..1.0,
        c_niv in -1.0f64..1.0,
        n_s in 0.9f64..1.05,
        alpha_s in -0.02f64..0.02,
        log10_k in -6.0f64..1.5,
    ) {
        let config = PrimordialConfig::analytic(0.05, correlated_params(c_cdi, c_niv, n_s, alpha_s));
        let spectrum = PrimordialSpectrum::initialize(config, three_ic_layout()).unwrap();
        let k = 10f64.powf(log10_k);

        let linear = spectrum.spectrum_at(ModeType::Scalar, Convention::Linear, k).unwrap();
        let log = spectrum.spectrum_at(ModeType::Scalar, Convention::Logarithmic, k.ln()).unwrap();
        prop_assert_eq!(linear.len(), 6);

        // Packed order: (0,0) (0,1) (0,2) (1,1) (1,2) (2,2)
        let diag = [0usize, 3, 5];
        for &d in &diag {
            prop_assert!(linear[d] > 0.0);
            prop_assert!((linear[d].ln() - log[d]).abs() < 1e-9,
                "diagonal {}: {} vs {}", d, linear[d].ln(), log[d]);
        }
        for &(pair, i, j) in &[(1usize, 0usize, 3usize), (2, 0, 5), (4, 3, 5)] {
            let angle = if linear[pair] == 0.0 {
                0.0
            } else {
                linear[pair] / (linear[i] * linear[j]).sqrt()
            };
            prop_assert!((angle - log[pair]).abs() < 1e-9,
                "pair {}: {} vs {}", pair, angle, log[pair]);
            prop_assert!(log[pair].abs() <= 1.0 + 1e-9);
        }
        // CDI and NIV were never correlated with each other
        prop_assert_eq!(linear[4], 0.0);
    }
}

// ── Potential Guard ──────────────────────────────────────────────────

proptest! {
    /// A flat potential is rejected at every field value.
    #[test]
    fn flat_potential_rejected(v0 in 1e-14f64..1e-8, phi in -10.0f64..10.0) {
        let potential = InflatonPotential::new(PotentialParams {
            v0,
            v1: 0.0,
            v2: 0.0,
            v3: 0.0,
            v4: 0.0,
            phi_pivot: 0.0,
        });
        let values = potential.evaluate(phi);
        prop_assert_eq!(values.v, v0);
        prop_assert_eq!(values.dv, 0.0);
        prop_assert_eq!(values.ddv, 0.0);
        let rejected = matches!(potential.check(phi), Err(PrimordialError::InvalidPotential { .. }));
        prop_assert!(rejected);
    }
}
