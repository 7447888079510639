// ─────────────────────────────────────────────────────────────────────
// Primordial Spectrum Core — Spline Tables
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Cubic splines over tables with many columns sharing one abscissa.
//!
//! Second derivatives are computed once per column and stored in a table
//! of the same shape; evaluation then interpolates every column at once.

use ndarray::{Array1, Array2, ArrayView1};
use primordial_types::error::PrimordialResult;

use crate::tridiag::solve_tridiagonal;

/// End conditions of the spline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplineBoundary {
    /// Zero second derivative at both ends.
    Natural,
    /// First derivative at each end taken from a quadratic through the
    /// three outermost points. Falls back to `Natural` with two points.
    EstimatedDerivative,
}

/// Second derivatives of the cubic spline through `(x, y)`.
pub fn spline_second_derivatives(
    x: ArrayView1<f64>,
    y: ArrayView1<f64>,
    boundary: SplineBoundary,
) -> PrimordialResult<Array1<f64>> {
    let n = x.len();
    assert_eq!(y.len(), n, "x and y must have equal length");
    assert!(n >= 2, "Need at least 2 knots");

    let mut sub = vec![0.0; n];
    let mut diag = vec![0.0; n];
    let mut sup = vec![0.0; n];
    let mut rhs = vec![0.0; n];

    for i in 1..n - 1 {
        let h_lo = x[i] - x[i - 1];
        let h_hi = x[i + 1] - x[i];
        sub[i] = h_lo / 6.0;
        diag[i] = (h_lo + h_hi) / 3.0;
        sup[i] = h_hi / 6.0;
        rhs[i] = (y[i + 1] - y[i]) / h_hi - (y[i] - y[i - 1]) / h_lo;
    }

    if boundary == SplineBoundary::EstimatedDerivative && n >= 3 {
        let (dy_first, dy_last) = estimated_end_derivatives(x, y);

        let h0 = x[1] - x[0];
        diag[0] = h0 / 3.0;
        sup[0] = h0 / 6.0;
        rhs[0] = (y[1] - y[0]) / h0 - dy_first;

        let hn = x[n - 1] - x[n - 2];
        sub[n - 1] = hn / 6.0;
        diag[n - 1] = hn / 3.0;
        rhs[n - 1] = dy_last - (y[n - 1] - y[n - 2]) / hn;
    } else {
        diag[0] = 1.0;
        diag[n - 1] = 1.0;
    }

    Ok(Array1::from(solve_tridiagonal(&sub, &diag, &sup, &rhs)?))
}

/// Derivatives at both ends from the quadratic through the three outermost knots.
fn estimated_end_derivatives(x: ArrayView1<f64>, y: ArrayView1<f64>) -> (f64, f64) {
    let n = x.len();

    let (d1, d2) = (x[1] - x[0], x[2] - x[0]);
    let dy_first = (d2 * d2 * (y[1] - y[0]) - d1 * d1 * (y[2] - y[0])) / (d2 * d1 * (x[2] - x[1]));

    let (e1, e2) = (x[n - 2] - x[n - 1], x[n - 3] - x[n - 1]);
    let dy_last = (e2 * e2 * (y[n - 2] - y[n - 1]) - e1 * e1 * (y[n - 3] - y[n - 1]))
        / (e2 * e1 * (x[n - 3] - x[n - 2]));

    (dy_first, dy_last)
}

/// Second-derivative table for every column of `table` (rows follow `x`).
pub fn spline_table_columns(
    x: &Array1<f64>,
    table: &Array2<f64>,
    boundary: SplineBoundary,
) -> PrimordialResult<Array2<f64>> {
    assert_eq!(table.nrows(), x.len(), "table rows must match abscissa length");
    let mut dd = Array2::zeros(table.dim());
    for (col, mut dd_col) in table.columns().into_iter().zip(dd.columns_mut()) {
        let y2 = spline_second_derivatives(x.view(), col, boundary)?;
        dd_col.assign(&y2);
    }
    Ok(dd)
}

/// Index `lo` of the interval `[x[lo], x[lo+1]]` bracketing `x_eval`,
/// clamped to the first/last interval outside the table.
fn bracket(x: &Array1<f64>, x_eval: f64) -> usize {
    let mut lo = 0;
    let mut hi = x.len() - 1;
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if x[mid] > x_eval {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    lo
}

/// Interpolate every column of `table` at `x_eval`.
///
/// Outside the knots the boundary cubic is extrapolated; callers that
/// must not extrapolate check the range first.
pub fn interpolate_columns(
    x: &Array1<f64>,
    table: &Array2<f64>,
    dd_table: &Array2<f64>,
    x_eval: f64,
) -> Vec<f64> {
    assert!(x.len() >= 2, "Need at least 2 knots");
    assert_eq!(table.dim(), dd_table.dim());

    let lo = bracket(x, x_eval);
    let hi = lo + 1;
    let h = x[hi] - x[lo];
    let a = (x[hi] - x_eval) / h;
    let b = (x_eval - x[lo]) / h;
    let curvature = h * h / 6.0;

    let (row_lo, row_hi) = (table.row(lo), table.row(hi));
    let (dd_lo, dd_hi) = (dd_table.row(lo), dd_table.row(hi));

    (0..table.ncols())
        .map(|c| {
            a * row_lo[c]
                + b * row_hi[c]
                + ((a * a * a - a) * dd_lo[c] + (b * b * b - b) * dd_hi[c]) * curvature
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knots(n: usize) -> Array1<f64> {
        // Non-uniform but increasing
        Array1::from_shape_fn(n, |i| i as f64 + 0.1 * (i as f64).sin())
    }

    #[test]
    fn test_linear_data_has_zero_curvature() {
        let x = knots(8);
        let y = x.mapv(|v| 3.0 * v - 1.0);
        for boundary in [SplineBoundary::Natural, SplineBoundary::EstimatedDerivative] {
            let y2 = spline_second_derivatives(x.view(), y.view(), boundary).unwrap();
            for v in y2.iter() {
                assert!(v.abs() < 1e-10, "second derivative {v} for linear data");
            }
        }
    }

    #[test]
    fn test_quadratic_reproduced_with_estimated_derivative() {
        let x = knots(10);
        let table = Array2::from_shape_fn((10, 2), |(i, c)| {
            let xi = x[i];
            if c == 0 {
                xi * xi
            } else {
                -0.5 * xi * xi + xi
            }
        });
        let dd = spline_table_columns(&x, &table, SplineBoundary::EstimatedDerivative).unwrap();
        for i in 0..10 {
            assert!((dd[[i, 0]] - 2.0).abs() < 1e-9, "dd[{i},0] = {}", dd[[i, 0]]);
            assert!((dd[[i, 1]] + 1.0).abs() < 1e-9, "dd[{i},1] = {}", dd[[i, 1]]);
        }

        for &xe in &[0.3, 2.7, 5.55, 8.9] {
            let values = interpolate_columns(&x, &table, &dd, xe);
            assert!((values[0] - xe * xe).abs() < 1e-9, "x={xe}: {}", values[0]);
            assert!((values[1] - (-0.5 * xe * xe + xe)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_interpolation_hits_knots() {
        let x = knots(6);
        let table = Array2::from_shape_fn((6, 1), |(i, _)| (x[i]).cos());
        let dd = spline_table_columns(&x, &table, SplineBoundary::EstimatedDerivative).unwrap();
        for i in 0..6 {
            let v = interpolate_columns(&x, &table, &dd, x[i]);
            assert!((v[0] - table[[i, 0]]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_two_knots_is_linear() {
        let x = Array1::from(vec![0.0, 2.0]);
        let table = Array2::from_shape_vec((2, 1), vec![1.0, 5.0]).unwrap();
        let dd = spline_table_columns(&x, &table, SplineBoundary::EstimatedDerivative).unwrap();
        let v = interpolate_columns(&x, &table, &dd, 0.5);
        assert!((v[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_smooth_function_accuracy() {
        let x = Array1::<f64>::linspace(0.0, 3.0, 31);
        let table = Array2::from_shape_fn((31, 1), |(i, _)| x[i].sin());
        let dd = spline_table_columns(&x, &table, SplineBoundary::EstimatedDerivative).unwrap();
        for &xe in &[0.05, 1.234, 2.95] {
            let v = interpolate_columns(&x, &table, &dd, xe);
            assert!((v[0] - xe.sin()).abs() < 1e-3, "sin({xe}) ~ {}", v[0]);
        }
    }
}
