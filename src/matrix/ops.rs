use core::ops::Mul;

use num_traits::AsPrimitive;

use crate::error::{LinalgError, Result};
use crate::kernels::{self, Op};
use crate::par::{self, Parallelism};
use crate::params::CUBIC_PAR_THRESHOLD;
use crate::simd;
use crate::traits::{Promote, Promoted, Scalar};
use crate::vector::{Orientation, Vector};

use super::Matrix;

// ── Matrix * Matrix ─────────────────────────────────────────────────

impl<T: Scalar> Matrix<T> {
    /// Dense product `self · rhs`.
    ///
    /// Each output row accumulates `A[i][k] · B[k][..]` with a vectorized
    /// AXPY, and output rows are split across threads once `m·n·p` reaches
    /// [`CUBIC_PAR_THRESHOLD`].
    ///
    /// ```
    /// use rowfact::Matrix;
    /// let a = Matrix::from_rows(&[[1, 2], [3, 4]]).unwrap();
    /// let b = Matrix::from_rows(&[[5, 6], [7, 8]]).unwrap();
    /// assert_eq!(a.matmul(&b).unwrap().as_slice(), &[19, 22, 43, 50]);
    /// assert!(a.matmul(&Matrix::<i32>::new(3, 1).unwrap()).is_err());
    /// ```
    pub fn matmul(&self, rhs: &Matrix<T>) -> Result<Matrix<T>> {
        if self.cols != rhs.rows {
            return Err(LinalgError::DimensionMismatch {
                expected: (self.cols, rhs.cols),
                got: rhs.shape(),
            });
        }
        let (m, n, p) = (self.rows, self.cols, rhs.cols);
        let mut out = Matrix {
            data: vec![T::zero(); m * p],
            rows: m,
            cols: p,
        };
        par::for_each_row_mut(
            &mut out.data,
            p,
            m,
            p,
            |i, row| {
                for (k, &a_ik) in self.row(i).iter().enumerate() {
                    if a_ik != T::zero() {
                        simd::axpy(row, a_ik, &rhs.data[k * p..(k + 1) * p]);
                    }
                }
            },
            Parallelism::above(m * n * p, CUBIC_PAR_THRESHOLD),
        );
        Ok(out)
    }
}

impl<T: Scalar> Mul<&Matrix<T>> for &Matrix<T> {
    type Output = Matrix<T>;

    /// Panics on mismatched inner dimensions; use [`Matrix::matmul`] to
    /// get an error instead.
    fn mul(self, rhs: &Matrix<T>) -> Matrix<T> {
        assert_eq!(
            self.cols, rhs.rows,
            "dimension mismatch: {}x{} * {}x{}",
            self.rows, self.cols, rhs.rows, rhs.cols,
        );
        self.matmul(rhs).unwrap_or_else(|e| panic!("{}", e))
    }
}

impl<T: Scalar> Mul for Matrix<T> {
    type Output = Matrix<T>;

    fn mul(self, rhs: Matrix<T>) -> Matrix<T> {
        &self * &rhs
    }
}

// ── Matrix * Vector ─────────────────────────────────────────────────

impl<T: Scalar> Matrix<T> {
    /// `A · v` for a column vector `v`, via [`gemv`](crate::gemv).
    ///
    /// The result is a column vector of the common element type.
    ///
    /// ```
    /// use rowfact::{Matrix, Orientation, Vector};
    ///
    /// let a = Matrix::from_rows(&[[1, 2], [3, 4], [5, 6]]).unwrap();
    /// let v = Vector::from_slice(&[0.5_f64, 1.0], Orientation::Column).unwrap();
    /// let y = a.mul_vector(&v).unwrap();
    /// assert_eq!(y.as_slice(), &[2.5, 5.5, 8.5]);
    /// assert_eq!(y.orientation(), Orientation::Column);
    ///
    /// let row = Vector::from_slice(&[1.0_f64, 1.0], Orientation::Row).unwrap();
    /// assert!(a.mul_vector(&row).is_err());
    /// ```
    pub fn mul_vector<U>(&self, v: &Vector<U>) -> Result<Vector<Promoted<T, U>>>
    where
        T: Promote<U> + AsPrimitive<Promoted<T, U>>,
        U: Scalar + AsPrimitive<Promoted<T, U>>,
    {
        if v.orientation() != Orientation::Column {
            return Err(LinalgError::InvalidInput("matrix-vector product requires a column vector"));
        }
        kernels::gemv(Op::NoTrans, self.as_view(), v.as_view())
    }
}
