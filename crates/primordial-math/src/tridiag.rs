// ─────────────────────────────────────────────────────────────────────
// Primordial Spectrum Core — Tridiag
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Thomas algorithm for tridiagonal systems.
//!
//! Used by the spline tables to solve for second derivatives.

use primordial_types::error::{PrimordialError, PrimordialResult};

/// Solve `A x = d` for tridiagonal `A`.
///
/// - `sub`: sub-diagonal \[n\] (`sub[0]` unused)
/// - `diag`: main diagonal \[n\]
/// - `sup`: super-diagonal \[n\] (`sup[n-1]` unused)
/// - `rhs`: right-hand side \[n\]
///
/// Fails when a pivot vanishes (singular or ill-posed system).
pub fn solve_tridiagonal(
    sub: &[f64],
    diag: &[f64],
    sup: &[f64],
    rhs: &[f64],
) -> PrimordialResult<Vec<f64>> {
    let n = rhs.len();
    assert!(n > 0, "System size must be > 0");
    assert_eq!(sub.len(), n);
    assert_eq!(diag.len(), n);
    assert_eq!(sup.len(), n);

    let mut gamma = vec![0.0; n];
    let mut x = vec![0.0; n];

    let mut pivot = diag[0];
    if pivot == 0.0 {
        return Err(singular(0));
    }
    x[0] = rhs[0] / pivot;

    for i in 1..n {
        gamma[i] = sup[i - 1] / pivot;
        pivot = diag[i] - sub[i] * gamma[i];
        if pivot == 0.0 || !pivot.is_finite() {
            return Err(singular(i));
        }
        x[i] = (rhs[i] - sub[i] * x[i - 1]) / pivot;
    }

    for i in (0..n - 1).rev() {
        x[i] -= gamma[i + 1] * x[i + 1];
    }

    Ok(x)
}

fn singular(row: usize) -> PrimordialError {
    PrimordialError::ConfigError(format!("tridiagonal system has a zero pivot at row {row}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_system() {
        let n = 5;
        let x = solve_tridiagonal(
            &vec![0.0; n],
            &vec![1.0; n],
            &vec![0.0; n],
            &[1.0, 2.0, 3.0, 4.0, 5.0],
        )
        .unwrap();
        for (i, xi) in x.iter().enumerate() {
            assert!((xi - (i + 1) as f64).abs() < 1e-12, "x[{i}] = {xi}");
        }
    }

    #[test]
    fn test_spline_like_system() {
        // Interior rows of a uniform-knot spline: [1/6, 2/3, 1/6]
        let a = vec![0.0, 1.0 / 6.0, 1.0 / 6.0, 1.0 / 6.0];
        let b = vec![2.0 / 3.0; 4];
        let c = vec![1.0 / 6.0, 1.0 / 6.0, 1.0 / 6.0, 0.0];
        let d = vec![1.0, -0.5, 0.25, 2.0];
        let x = solve_tridiagonal(&a, &b, &c, &d).unwrap();

        let ax = [
            b[0] * x[0] + c[0] * x[1],
            a[1] * x[0] + b[1] * x[1] + c[1] * x[2],
            a[2] * x[1] + b[2] * x[2] + c[2] * x[3],
            a[3] * x[2] + b[3] * x[3],
        ];
        for i in 0..4 {
            assert!((ax[i] - d[i]).abs() < 1e-12, "Ax[{i}] = {}, expected {}", ax[i], d[i]);
        }
    }

    #[test]
    fn test_zero_pivot_is_error() {
        let result = solve_tridiagonal(&[0.0, 1.0], &[0.0, 1.0], &[1.0, 0.0], &[1.0, 1.0]);
        assert!(result.is_err());
    }
}
