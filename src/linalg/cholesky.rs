use num_traits::AsPrimitive;

use crate::error::{LinalgError, Result};
use crate::matrix::Matrix;
use crate::par::{for_each_row_mut, Parallelism};
use crate::params::{BLOCK_SIZE, CHOLESKY_PAR_ORDER};
use crate::simd;
use crate::traits::{Element, FloatScalar, Scalar};

// ---------------------------------------------------------------------------
// Public functions
// ---------------------------------------------------------------------------

/// Cholesky factor `L` of a symmetric positive-definite matrix: `A = L·Lᵗ`.
///
/// The result is lower triangular with a positive diagonal and zeros above
/// it. Integer input is promoted to `f64`; float input keeps its width.
///
/// Fails with [`LinalgError::InvalidInput`] if `a` is not square or not
/// symmetric (absolute tolerance `1e-6`) and with
/// [`LinalgError::NotPositiveDefinite`] at the first non-positive pivot.
///
/// # Example
///
/// ```
/// use rowfact::{cholesky, Matrix};
///
/// let a = Matrix::from_rows(&[[4_i32, 2], [2, 3]]).unwrap();
/// let l = cholesky(&a).unwrap();
/// assert_eq!(l[(0, 0)], 2.0);
/// assert_eq!(l[(0, 1)], 0.0);
/// assert!((l[(1, 1)] - 2.0_f64.sqrt()).abs() < 1e-12);
///
/// let llt = l.matmul(&l.transposed()).unwrap();
/// assert!(rowfact::loosely_equal(&llt, &a));
/// ```
pub fn cholesky<T: Element>(a: &Matrix<T>) -> Result<Matrix<T::Float>> {
    factor(&a.map(|x| x.to_float()))
}

/// [`cholesky`] computed in an explicitly chosen float type.
///
/// ```
/// use rowfact::{cholesky_as, Matrix};
///
/// let a = Matrix::from_rows(&[[9.0_f64, 3.0], [3.0, 5.0]]).unwrap();
/// let l = cholesky_as::<f32, _>(&a).unwrap();
/// assert_eq!(l.as_slice(), &[3.0_f32, 0.0, 1.0, 2.0]);
/// ```
pub fn cholesky_as<R, T>(a: &Matrix<T>) -> Result<Matrix<R>>
where
    R: FloatScalar,
    T: Scalar + AsPrimitive<R>,
{
    factor(&a.cast::<R>())
}

/// Convenience methods on square matrices.
impl<T: Element> Matrix<T> {
    /// See [`cholesky`].
    #[inline]
    pub fn cholesky(&self) -> Result<Matrix<T::Float>> {
        cholesky(self)
    }
}

// ---------------------------------------------------------------------------
// Blocked left-looking Crout
// ---------------------------------------------------------------------------

/// Column panels of `BLOCK_SIZE`. Inside a panel each column is finished
/// before the next starts; rows below the panel are then filled for the
/// whole panel at once, one independent row per task.
fn factor<R: FloatScalar>(a: &Matrix<R>) -> Result<Matrix<R>> {
    if a.is_empty() {
        return Ok(Matrix::default());
    }
    if !a.is_square() {
        return Err(LinalgError::InvalidInput("cholesky requires a square matrix"));
    }
    if !a.is_symmetric() {
        return Err(LinalgError::InvalidInput("cholesky requires a symmetric matrix"));
    }

    let n = a.rows();
    let src = a.as_slice();
    let mut l = vec![R::zero(); n * n];
    let par = Parallelism::when(n > CHOLESKY_PAR_ORDER);
    log::trace!(target: "rowfact_perf", "cholesky n={} parallel={}", n, par.is_parallel());

    for jj in (0..n).step_by(BLOCK_SIZE) {
        let j_end = (jj + BLOCK_SIZE).min(n);

        for j in jj..j_end {
            let (lj, below) = l[j * n..].split_at_mut(n);
            let diag = src[j * n + j] - simd::sum_sq(&lj[..j]);
            if diag <= R::zero() {
                return Err(LinalgError::NotPositiveDefinite);
            }
            let ljj = diag.sqrt();
            lj[j] = ljj;

            for (off, li) in below.chunks_mut(n).take(j_end - j - 1).enumerate() {
                let i = j + 1 + off;
                li[j] = (src[i * n + j] - simd::dot(&li[..j], &lj[..j])) / ljj;
            }
        }

        if j_end < n {
            let (panel, trailing) = l.split_at_mut(j_end * n);
            let panel = &*panel;
            for_each_row_mut(
                trailing,
                n,
                n - j_end,
                n,
                |off, li| {
                    let i = j_end + off;
                    for j in jj..j_end {
                        let lj = &panel[j * n..(j + 1) * n];
                        li[j] = (src[i * n + j] - simd::dot(&li[..j], &lj[..j])) / lj[j];
                    }
                },
                par,
            );
        }
    }

    Matrix::from_vec(n, n, l)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn spd(n: usize) -> Matrix<f64> {
        // B·Bᵗ + n·I with B[i][j] = sin(i + 2j)
        let b = Matrix::from_fn(n, n, |i, j| ((i + 2 * j) as f64).sin()).unwrap();
        let mut a = b.matmul(&b.transposed()).unwrap();
        for i in 0..n {
            a[(i, i)] += n as f64;
        }
        a
    }

    fn assert_reconstructs(a: &Matrix<f64>, l: &Matrix<f64>) {
        assert!(l.is_lower_triangular());
        for i in 0..l.rows() {
            assert!(l[(i, i)] > 0.0);
        }
        let llt = l.matmul(&l.transposed()).unwrap();
        for (x, y) in llt.as_slice().iter().zip(a.as_slice()) {
            assert_relative_eq!(x, y, epsilon = 1e-9, max_relative = 1e-10);
        }
    }

    #[test]
    fn cholesky_2x2() {
        let a = Matrix::from_rows(&[[4.0, 2.0], [2.0, 3.0]]).unwrap();
        let l = cholesky(&a).unwrap();
        assert_reconstructs(&a, &l);
        assert_relative_eq!(l[(1, 0)], 1.0);
    }

    #[test]
    fn cholesky_3x3() {
        let a = Matrix::from_rows(&[[4.0, 12.0, -16.0], [12.0, 37.0, -43.0], [-16.0, -43.0, 98.0]]).unwrap();
        let l = cholesky(&a).unwrap();
        let expected = [2.0, 0.0, 0.0, 6.0, 1.0, 0.0, -8.0, 5.0, 3.0];
        for (x, y) in l.as_slice().iter().zip(expected.iter()) {
            assert_relative_eq!(x, y, epsilon = 1e-12);
        }
    }

    #[test]
    fn spans_several_panels() {
        // 150 = two full panels plus a partial one
        let a = spd(150);
        let l = cholesky(&a).unwrap();
        assert_reconstructs(&a, &l);
    }

    #[test]
    fn integer_input_promotes() {
        let a = Matrix::from_rows(&[[25_i64, 15, -5], [15, 18, 0], [-5, 0, 11]]).unwrap();
        let l: Matrix<f64> = cholesky(&a).unwrap();
        assert_eq!(l.as_slice(), &[5.0, 0.0, 0.0, 3.0, 3.0, 0.0, -1.0, 1.0, 3.0]);
    }

    #[test]
    fn explicit_result_type() {
        let a = Matrix::from_rows(&[[4_u32, 2], [2, 3]]).unwrap();
        let l = cholesky_as::<f32, _>(&a).unwrap();
        assert_eq!(l[(0, 0)], 2.0_f32);
        assert_eq!(l[(1, 0)], 1.0_f32);
    }

    #[test]
    fn rejects_bad_input() {
        let rect = Matrix::<f64>::new(2, 3).unwrap();
        assert!(cholesky(&rect).unwrap_err().is_invalid_input());

        let skew = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
        assert_eq!(
            cholesky(&skew).unwrap_err(),
            LinalgError::InvalidInput("cholesky requires a symmetric matrix")
        );

        let indefinite = Matrix::from_rows(&[[1.0, 2.0], [2.0, 1.0]]).unwrap();
        assert_eq!(cholesky(&indefinite).unwrap_err(), LinalgError::NotPositiveDefinite);

        let negative = Matrix::from_rows(&[[-1.0]]).unwrap();
        assert_eq!(cholesky(&negative).unwrap_err(), LinalgError::NotPositiveDefinite);
    }

    #[test]
    fn semidefinite_is_rejected() {
        let a = Matrix::from_rows(&[[1.0, 1.0], [1.0, 1.0]]).unwrap();
        assert_eq!(a.cholesky().unwrap_err(), LinalgError::NotPositiveDefinite);
    }

    #[test]
    fn empty_input_gives_empty_factor() {
        let l = cholesky(&Matrix::<f64>::default()).unwrap();
        assert!(l.is_empty());
    }
}
