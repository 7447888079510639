//! Packed storage for symmetric matrices indexed by pairs of initial conditions.
//!
//! Row-major upper triangle: for `i <= j`, offset `i*n - i(i+1)/2 + j`.
//! Row `i` occupies `n - i` consecutive slots starting at the diagonal.

pub use primordial_types::layout::packed_size;

/// Offset of the unordered pair `(i, j)` in a packed `n x n` symmetric matrix.
pub fn index_symmetric(i: usize, j: usize, n: usize) -> usize {
    debug_assert!(i < n && j < n, "pair ({i},{j}) outside {n}x{n} matrix");
    let (lo, hi) = if i <= j { (i, j) } else { (j, i) };
    lo * n + hi - lo * (lo + 1) / 2
}
