//! Error types for rowfact.

use thiserror::Error;

/// Result type alias using [`LinalgError`].
pub type Result<T> = core::result::Result<T, LinalgError>;

/// Errors from construction, kernels and decompositions.
///
/// Variants fall into two families: precondition violations, raised before
/// any work starts, and numerical infeasibility, raised at the exact step
/// where the condition becomes observable.
///
/// ```
/// use rowfact::{cholesky, plu, LinalgError, Matrix};
///
/// let singular = Matrix::from_rows(&[[1.0_f64, 2.0], [2.0, 4.0]]).unwrap();
/// assert_eq!(plu(&singular).unwrap_err(), LinalgError::Singular);
/// assert_eq!(cholesky(&singular).unwrap_err(), LinalgError::NotPositiveDefinite);
///
/// let skew = Matrix::from_rows(&[[1.0_f64, 2.0], [3.0, 4.0]]).unwrap();
/// assert!(cholesky(&skew).unwrap_err().is_invalid_input());
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinalgError {
    /// Input violates a precondition of the operation.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    /// Operand shapes are incompatible.
    #[error("dimension mismatch: expected {expected:?}, got {got:?}")]
    DimensionMismatch {
        /// Expected `(rows, cols)`.
        expected: (usize, usize),
        /// Actual `(rows, cols)`.
        got: (usize, usize),
    },

    /// Source buffer length differs from the requested element count.
    #[error("length mismatch: expected {expected} elements, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    /// A matrix, vector or view was requested with a zero extent.
    #[error("zero dimension: {rows}x{cols}")]
    ZeroDimension {
        /// Requested rows (or length for vectors).
        rows: usize,
        /// Requested columns (1 for vectors).
        cols: usize,
    },

    /// Index or window lies outside the parent extents.
    #[error("index ({row}, {col}) out of range for {rows}x{cols}")]
    OutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Matrix is not positive definite (non-positive Cholesky diagonal).
    #[error("matrix is not positive definite")]
    NotPositiveDefinite,

    /// Matrix is singular or nearly singular (pivot within tolerance).
    #[error("matrix is singular")]
    Singular,
}

impl LinalgError {
    /// True for precondition failures (shape, size, range).
    pub fn is_invalid_input(&self) -> bool {
        !self.is_numerical()
    }

    /// True for failures detected mid-factorization.
    pub fn is_numerical(&self) -> bool {
        matches!(self, LinalgError::NotPositiveDefinite | LinalgError::Singular)
    }
}
