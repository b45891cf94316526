//! Structural predicates.
//!
//! Every predicate except [`Matrix::is_square`] answers `false` for
//! non-square input (and `is_singular` answers `true`). Entries are
//! compared to zero, and to each other, with the absolute tolerance
//! [`EPSILON`].

use num_traits::AsPrimitive;

use crate::error::LinalgError;
use crate::linalg::{cholesky, plu};
use crate::params::EPSILON;
use crate::traits::{is_close, Element, Scalar};

use super::Matrix;

impl<T> Matrix<T> {
    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }
}

impl<T: Scalar + AsPrimitive<f64>> Matrix<T> {
    /// `A[i][j] ≈ A[j][i]` for every pair above the diagonal.
    ///
    /// ```
    /// use rowfact::Matrix;
    /// let s = Matrix::from_rows(&[[2.0, 1.0], [1.0 + 1e-9, 3.0]]).unwrap();
    /// assert!(s.is_symmetric());
    /// let r = Matrix::from_rows(&[[1.0, 2.0, 3.0]]).unwrap();
    /// assert!(!r.is_symmetric());
    /// ```
    pub fn is_symmetric(&self) -> bool {
        if !self.is_square() {
            return false;
        }
        let n = self.rows;
        (0..n).all(|i| (i + 1..n).all(|j| is_close(self.data[i * n + j], self.data[j * n + i], EPSILON)))
    }

    /// Everything strictly below the diagonal is zero.
    pub fn is_upper_triangular(&self) -> bool {
        if !self.is_square() {
            return false;
        }
        let n = self.rows;
        (1..n).all(|i| self.row(i)[..i].iter().all(|&x| is_close(x, 0.0, EPSILON)))
    }

    /// Everything strictly above the diagonal is zero.
    pub fn is_lower_triangular(&self) -> bool {
        if !self.is_square() {
            return false;
        }
        let n = self.rows;
        (0..n).all(|i| self.row(i)[i + 1..].iter().all(|&x| is_close(x, 0.0, EPSILON)))
    }

    pub fn is_diagonal(&self) -> bool {
        self.is_upper_triangular() && self.is_lower_triangular()
    }
}

impl<T: Element> Matrix<T> {
    /// True when the matrix is non-square or PLU finds a pivot within
    /// tolerance of zero.
    ///
    /// ```
    /// use rowfact::Matrix;
    /// let a = Matrix::from_rows(&[[1, 2, 3], [2, 4, 6], [1, 2, 3]]).unwrap();
    /// assert!(a.is_singular());
    /// assert!(!Matrix::<f64>::identity(3).unwrap().is_singular());
    /// ```
    pub fn is_singular(&self) -> bool {
        if !self.is_square() {
            return true;
        }
        matches!(plu(self), Err(LinalgError::Singular))
    }

    /// True when Cholesky succeeds.
    pub fn is_positive_definite(&self) -> bool {
        cholesky(self).is_ok()
    }
}
