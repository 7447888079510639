// ─────────────────────────────────────────────────────────────────────
// Primordial Spectrum Core — Spectrum Tables
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! PrimordialSpectrum: tabulated P(k) for every mode and IC pair.
//!
//! Algorithm:
//! 1. Log-uniform grid over the widest k range of the layout
//! 2. Fill tables: diagonal columns hold ln P, off-diagonal columns the
//!    correlation P_12/√(P_11 P_22)
//! 3. Spline every column in ln k
//! 4. Read A_s, n_s, α_s (and r, n_t, α_t) off the tables at the pivot
//!
//! Queries inside the grid interpolate; outside it only the analytic
//! spectrum can answer.

use primordial_math::spline::{interpolate_columns, spline_table_columns, SplineBoundary};
use primordial_math::symmetric::index_symmetric;
use primordial_types::config::{PrimordialConfig, SpectrumConfig};
use primordial_types::error::{PrimordialError, PrimordialResult};
use primordial_types::layout::{IcType, ModeType, PerturbationLayout};
use primordial_types::state::{Convention, ModeSpectrumTable, WavenumberGrid};
use tracing::{info, trace};

use crate::analytic::AnalyticSpectrum;
use crate::inflation::InflatonSolver;

/// Scalar amplitude, tilt and running measured at the pivot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarDiagnostics {
    pub a_s: f64,
    pub n_s: f64,
    pub alpha_s: f64,
}

/// Tensor-to-scalar ratio, tilt and running measured at the pivot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TensorDiagnostics {
    pub r: f64,
    pub n_t: f64,
    pub alpha_t: f64,
}

/// ln P at the pivot and one grid spacing either side.
struct PivotStencil {
    centre: f64,
    plus: f64,
    minus: f64,
}

impl PivotStencil {
    fn slope(&self, dln_k: f64) -> f64 {
        (self.plus - self.minus) / (2.0 * dln_k)
    }

    fn curvature(&self, dln_k: f64) -> f64 {
        (self.plus - 2.0 * self.centre + self.minus) / (dln_k * dln_k)
    }
}

/// Primordial module state after initialisation. Immutable afterwards.
#[derive(Debug, Clone)]
pub struct PrimordialSpectrum {
    config: PrimordialConfig,
    layout: PerturbationLayout,
    grid: WavenumberGrid,
    /// One per layout mode, same order.
    tables: Vec<ModeSpectrumTable>,
    /// Present for the analytic spectrum type; answers out-of-grid queries.
    analytic: Option<AnalyticSpectrum>,
    scalar: Option<ScalarDiagnostics>,
    tensor: Option<TensorDiagnostics>,
}

impl PrimordialSpectrum {
    /// Build the grid and tables for `layout`.
    pub fn initialize(config: PrimordialConfig, layout: PerturbationLayout) -> PrimordialResult<Self> {
        config.validate()?;

        let Some((k_min, k_max)) = layout.k_range() else {
            info!("No perturbations requested. Primordial module skipped.");
            return Ok(PrimordialSpectrum {
                config,
                layout,
                grid: WavenumberGrid::empty(),
                tables: Vec::new(),
                analytic: None,
                scalar: None,
                tensor: None,
            });
        };

        let grid = WavenumberGrid::new(k_min, k_max, config.precision.k_per_decade_primordial)?;
        let mut tables: Vec<ModeSpectrumTable> = layout
            .modes
            .iter()
            .map(|mode| ModeSpectrumTable::new(grid.len(), mode.ic_size()))
            .collect();

        let analytic = match &config.spectrum {
            SpectrumConfig::Analytic(params) => {
                info!(n_k = grid.len(), k_min, k_max, "computing primordial spectra (analytic spectrum)");
                let analytic = AnalyticSpectrum::new(params, config.k_pivot, &layout)?;
                tabulate_analytic(&analytic, &layout, &grid, &mut tables);
                Some(analytic)
            }
            SpectrumConfig::InflationV(potential) => {
                info!(n_k = grid.len(), k_min, k_max, "computing primordial spectra (simulating inflation)");
                let (scalar_index, tensor_index) = inflation_modes(&layout)?;
                let solver = InflatonSolver::new(*potential, config.precision.clone(), config.k_pivot);
                let spectra = solver.solve(&grid)?;

                for (row, spectrum) in spectra.iter().enumerate() {
                    tables[scalar_index].ln_pk[[row, 0]] = spectrum.curvature.ln();
                    tables[tensor_index].ln_pk[[row, 0]] = spectrum.tensor.ln();
                }
                tables[scalar_index].is_non_zero[0] = true;
                tables[tensor_index].is_non_zero[0] = true;
                None
            }
        };

        for table in tables.iter_mut() {
            table.dd_ln_pk =
                spline_table_columns(&grid.ln_k, &table.ln_pk, SplineBoundary::EstimatedDerivative)?;
        }

        let mut spectrum = PrimordialSpectrum {
            config,
            layout,
            grid,
            tables,
            analytic,
            scalar: None,
            tensor: None,
        };
        spectrum.measure_pivot()?;
        Ok(spectrum)
    }

    /// Load the configuration from a JSON file, then initialise.
    pub fn from_file(path: &str, layout: PerturbationLayout) -> PrimordialResult<Self> {
        let config = PrimordialConfig::from_file(path)?;
        Self::initialize(config, layout)
    }

    pub fn config(&self) -> &PrimordialConfig {
        &self.config
    }

    pub fn layout(&self) -> &PerturbationLayout {
        &self.layout
    }

    pub fn grid(&self) -> &WavenumberGrid {
        &self.grid
    }

    /// True when the layout had no modes and nothing was tabulated.
    pub fn is_skipped(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn table(&self, mode: ModeType) -> PrimordialResult<&ModeSpectrumTable> {
        Ok(&self.tables[self.table_index(mode)?])
    }

    pub fn scalar_diagnostics(&self) -> Option<ScalarDiagnostics> {
        self.scalar
    }

    pub fn tensor_diagnostics(&self) -> Option<TensorDiagnostics> {
        self.tensor
    }

    fn table_index(&self, mode: ModeType) -> PrimordialResult<usize> {
        self.layout
            .mode_index(mode)
            .filter(|&index| index < self.tables.len())
            .ok_or(PrimordialError::UnknownMode(mode))
    }

    /// P for every packed IC pair of `mode`.
    ///
    /// `Linear`: `input` is k and the result is P (cross terms as P_12).
    /// `Logarithmic`: `input` is ln k and the result is ln P on the
    /// diagonal and P_12/√(P_11 P_22) off it.
    pub fn spectrum_at(
        &self,
        mode: ModeType,
        convention: Convention,
        input: f64,
    ) -> PrimordialResult<Vec<f64>> {
        let mode_index = self.table_index(mode)?;
        let ln_k = match convention {
            Convention::Linear => {
                if !(input > 0.0) || !input.is_finite() {
                    return Err(PrimordialError::InvalidWavenumber(input));
                }
                input.ln()
            }
            Convention::Logarithmic => {
                if !input.is_finite() {
                    return Err(PrimordialError::InvalidWavenumber(input));
                }
                input
            }
        };

        let table = &self.tables[mode_index];
        let n = table.ic_size;

        if !self.grid.contains(ln_k) {
            let Some(analytic) = &self.analytic else {
                return Err(PrimordialError::OutOfRange {
                    k: ln_k.exp(),
                    k_min: self.grid.ln_k_min().exp(),
                    k_max: self.grid.ln_k_max().exp(),
                });
            };
            let k = ln_k.exp();
            let mut output: Vec<f64> = (0..table.ic_ic_size())
                .map(|pair| analytic.evaluate(mode_index, pair, k))
                .collect();
            if convention == Convention::Logarithmic {
                to_logarithmic(&mut output, &table.is_non_zero, n);
            }
            trace!(?mode, k, ?output, "analytic spectrum outside the table");
            return Ok(output);
        }

        let mut output = interpolate_columns(&self.grid.ln_k, &table.ln_pk, &table.dd_ln_pk, ln_k);
        if convention == Convention::Linear {
            to_linear(&mut output, &table.is_non_zero, n);
        }
        Ok(output)
    }

    fn pivot_stencil(&self, mode: ModeType, ic: IcType) -> PrimordialResult<Option<PivotStencil>> {
        let Some(layout) = self.layout.mode(mode) else {
            return Ok(None);
        };
        let Some(i) = layout.ic_index(ic) else {
            return Ok(None);
        };
        let column = index_symmetric(i, i, layout.ic_size());
        let dln_k = self.grid.dln_k;
        let ln_pivot = self.config.k_pivot.ln();

        let at = |ln_k: f64| -> PrimordialResult<f64> {
            Ok(self.spectrum_at(mode, Convention::Logarithmic, ln_k)?[column])
        };
        Ok(Some(PivotStencil {
            centre: at(ln_pivot)?,
            plus: at(ln_pivot + dln_k)?,
            minus: at(ln_pivot - dln_k)?,
        }))
    }

    /// Finite differences of ln P one grid step around the pivot.
    fn measure_pivot(&mut self) -> PrimordialResult<()> {
        let dln_k = self.grid.dln_k;

        self.scalar = self
            .pivot_stencil(ModeType::Scalar, IcType::Adiabatic)?
            .map(|s| ScalarDiagnostics {
                a_s: s.centre.exp(),
                n_s: s.slope(dln_k) + 1.0,
                alpha_s: s.curvature(dln_k),
            });
        if let Some(d) = &self.scalar {
            info!(a_s = d.a_s, n_s = d.n_s, alpha_s = d.alpha_s, "scalar spectrum at pivot");
        }

        if let Some(scalar) = self.scalar {
            self.tensor = self
                .pivot_stencil(ModeType::Tensor, IcType::Tensor)?
                .map(|s| TensorDiagnostics {
                    r: s.centre.exp() / scalar.a_s,
                    n_t: s.slope(dln_k),
                    alpha_t: s.curvature(dln_k),
                });
        }
        if let Some(d) = &self.tensor {
            info!(r = d.r, n_t = d.n_t, alpha_t = d.alpha_t, "tensor spectrum at pivot");
        }
        Ok(())
    }
}

/// Fill every table from the analytic coefficients.
fn tabulate_analytic(
    analytic: &AnalyticSpectrum,
    layout: &PerturbationLayout,
    grid: &WavenumberGrid,
    tables: &mut [ModeSpectrumTable],
) {
    for (mode_index, (mode, table)) in layout.modes.iter().zip(tables.iter_mut()).enumerate() {
        let coefficients = analytic.mode(mode_index);
        let n = mode.ic_size();
        table.is_non_zero = coefficients.iter().map(|c| c.is_non_zero).collect();

        for (row, &ln_k) in grid.ln_k.iter().enumerate() {
            let k = ln_k.exp();
            let pk = |pair: usize| coefficients[pair].evaluate(k, analytic.k_pivot());
            for i in 0..n {
                for j in i..n {
                    let pair = index_symmetric(i, j, n);
                    table.ln_pk[[row, pair]] = if !coefficients[pair].is_non_zero {
                        0.0
                    } else if i == j {
                        pk(pair).ln()
                    } else {
                        // Stored as is, not as a logarithm
                        pk(pair) / (pk(index_symmetric(i, i, n)) * pk(index_symmetric(j, j, n))).sqrt()
                    };
                }
            }
        }
    }
}

/// Scalar mode with only the adiabatic IC, tensor mode with only the tensor
/// IC, and no vector mode. Returns their layout indices.
fn inflation_modes(layout: &PerturbationLayout) -> PrimordialResult<(usize, usize)> {
    if layout.has_mode(ModeType::Vector) {
        return Err(PrimordialError::ConfigError(
            "inflationary module cannot work if you ask for vector modes".to_string(),
        ));
    }
    let index_with = |mode: ModeType, ic: IcType| -> PrimordialResult<usize> {
        let index = layout.mode_index(mode).ok_or_else(|| {
            PrimordialError::ConfigError(format!(
                "inflationary module cannot work if you do not ask for {mode:?} modes"
            ))
        })?;
        if layout.modes[index].initial_conditions != [ic] {
            return Err(PrimordialError::ConfigError(format!(
                "inflationary module needs exactly the {ic:?} initial condition for {mode:?} modes, got {:?}",
                layout.modes[index].initial_conditions
            )));
        }
        Ok(index)
    };
    Ok((
        index_with(ModeType::Scalar, IcType::Adiabatic)?,
        index_with(ModeType::Tensor, IcType::Tensor)?,
    ))
}

/// Linear-convention output to logarithmic, in place.
fn to_logarithmic(output: &mut [f64], is_non_zero: &[bool], n: usize) {
    let diagonal: Vec<f64> = (0..n).map(|i| output[index_symmetric(i, i, n)]).collect();
    for i in 0..n {
        for j in (i + 1)..n {
            let pair = index_symmetric(i, j, n);
            if is_non_zero[pair] {
                output[pair] /= (diagonal[i] * diagonal[j]).sqrt();
            }
        }
    }
    for i in 0..n {
        let pair = index_symmetric(i, i, n);
        output[pair] = output[pair].ln();
    }
}

/// Logarithmic-convention output to linear, in place.
fn to_linear(output: &mut [f64], is_non_zero: &[bool], n: usize) {
    for i in 0..n {
        let pair = index_symmetric(i, i, n);
        output[pair] = output[pair].exp();
    }
    for i in 0..n {
        for j in (i + 1)..n {
            let pair = index_symmetric(i, j, n);
            output[pair] = if is_non_zero[pair] {
                output[pair] * (output[index_symmetric(i, i, n)] * output[index_symmetric(j, j, n)]).sqrt()
            } else {
                0.0
            };
        }
    }
}
