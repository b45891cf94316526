//! Free-function constructors and comparisons.

use crate::error::{LinalgError, Result};
use crate::params::EPSILON;
use crate::traits::{is_close, Element, Scalar};

use super::Matrix;

/// `n x n` identity; same as [`Matrix::identity`].
pub fn identity_matrix<T: Scalar>(n: usize) -> Result<Matrix<T>> {
    Matrix::identity(n)
}

/// `rows x cols` matrix of ones.
pub fn ones<T: Scalar>(rows: usize, cols: usize) -> Result<Matrix<T>> {
    Matrix::filled(rows, cols, T::one())
}

/// Expand a row permutation into a permutation matrix.
///
/// `perm[i] = j` places a one at `(i, j)`, so for the permutation returned
/// by [`plu`](crate::plu) the result `P` satisfies `P·A = L·U`.
///
/// ```
/// use rowfact::{permutation_matrix, Matrix};
///
/// let p: Matrix<f64> = permutation_matrix(&[2, 0, 1]).unwrap();
/// assert_eq!(p.row(0), &[0.0, 0.0, 1.0]);
/// assert_eq!(p.row(1), &[1.0, 0.0, 0.0]);
/// assert!(permutation_matrix::<f64>(&[0, 3]).is_err());
/// ```
pub fn permutation_matrix<T: Scalar>(perm: &[u32]) -> Result<Matrix<T>> {
    let n = perm.len();
    let mut out = Matrix::new(n, n)?;
    for (i, &j) in perm.iter().enumerate() {
        let j = j as usize;
        if j >= n {
            return Err(LinalgError::OutOfRange {
                row: i,
                col: j,
                rows: n,
                cols: n,
            });
        }
        out.data[i * n + j] = T::one();
    }
    Ok(out)
}

/// Shape-equal and element-wise within [`EPSILON`] (absolute).
pub fn loosely_equal<T: Element, U: Element>(a: &Matrix<T>, b: &Matrix<U>) -> bool {
    loosely_equal_eps(a, b, EPSILON)
}

/// Shape-equal and element-wise within `eps` (absolute).
///
/// Mismatched shapes compare unequal rather than failing.
///
/// ```
/// use rowfact::{loosely_equal_eps, Matrix};
///
/// let a = Matrix::from_rows(&[[1.0_f64, 2.0]]).unwrap();
/// let b = Matrix::from_rows(&[[1_i32, 2]]).unwrap();
/// assert!(loosely_equal_eps(&a, &b, 1e-12));
/// assert!(!loosely_equal_eps(&a, &b.transposed(), 1.0));
/// ```
pub fn loosely_equal_eps<T: Element, U: Element>(a: &Matrix<T>, b: &Matrix<U>, eps: f64) -> bool {
    a.shape() == b.shape()
        && a
            .data
            .iter()
            .zip(b.data.iter())
            .all(|(&x, &y)| is_close(x, y, eps))
}
