mod checks;
mod factories;
mod methods;
mod ops;
mod view;

pub use factories::{identity_matrix, loosely_equal, loosely_equal_eps, ones, permutation_matrix};
pub use view::{MatrixView, MatrixViewMut};

use core::ops::{Index, IndexMut};

use crate::error::{LinalgError, Result};
use crate::traits::Scalar;

/// Dense matrix with runtime dimensions.
///
/// Row-major `Vec<T>` storage: element `(i, j)` lives at `i * cols + j`.
/// Both dimensions are non-zero for every constructed matrix; the only
/// empty matrix is [`Matrix::default()`], which decompositions reject.
///
/// # Examples
///
/// ```
/// use rowfact::Matrix;
///
/// let a = Matrix::from_rows(&[[1.0_f64, 2.0], [3.0, 4.0]]).unwrap();
/// assert_eq!(a[(0, 1)], 2.0);
/// assert_eq!(a.rows(), 2);
/// assert_eq!(a.row(1), &[3.0, 4.0]);
///
/// let z = Matrix::<f64>::new(2, 3).unwrap();
/// assert!(z.as_slice().iter().all(|&x| x == 0.0));
/// assert!(Matrix::<f64>::new(0, 3).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    pub(crate) data: Vec<T>,
    pub(crate) rows: usize,
    pub(crate) cols: usize,
}

impl<T> Default for Matrix<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            rows: 0,
            cols: 0,
        }
    }
}

#[inline]
pub(crate) fn check_dims(rows: usize, cols: usize) -> Result<()> {
    if rows == 0 || cols == 0 {
        return Err(LinalgError::ZeroDimension { rows, cols });
    }
    Ok(())
}

// ── Constructors ────────────────────────────────────────────────────

impl<T: Scalar> Matrix<T> {
    /// Create a `rows x cols` zero matrix.
    ///
    /// Fails with [`LinalgError::ZeroDimension`] if either dimension is zero.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        Self::filled(rows, cols, T::zero())
    }

    /// Create a matrix with every element set to `value`.
    pub fn filled(rows: usize, cols: usize, value: T) -> Result<Self> {
        check_dims(rows, cols)?;
        Ok(Self {
            data: vec![value; rows * cols],
            rows,
            cols,
        })
    }

    /// Take ownership of a row-major buffer.
    ///
    /// ```
    /// use rowfact::Matrix;
    /// let m = Matrix::from_vec(2, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
    /// assert_eq!(m[(1, 0)], 4);
    /// assert!(Matrix::from_vec(2, 2, vec![1, 2, 3]).is_err());
    /// ```
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        check_dims(rows, cols)?;
        if data.len() != rows * cols {
            return Err(LinalgError::LengthMismatch {
                expected: rows * cols,
                got: data.len(),
            });
        }
        Ok(Self { data, rows, cols })
    }

    /// Copy a row-major slice.
    pub fn from_slice(rows: usize, cols: usize, data: &[T]) -> Result<Self> {
        Self::from_vec(rows, cols, data.to_vec())
    }

    /// Build from nested rows. All rows must have the same non-zero length.
    ///
    /// Accepts arrays of arrays as well as `&[Vec<T>]`.
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Result<Self> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, |r| r.as_ref().len());
        check_dims(nrows, ncols)?;
        let mut data = Vec::with_capacity(nrows * ncols);
        for r in rows {
            let r = r.as_ref();
            if r.len() != ncols {
                return Err(LinalgError::DimensionMismatch {
                    expected: (nrows, ncols),
                    got: (nrows, r.len()),
                });
            }
            data.extend_from_slice(r);
        }
        Ok(Self {
            data,
            rows: nrows,
            cols: ncols,
        })
    }

    /// Create a matrix by evaluating `f(i, j)` at each position.
    ///
    /// ```
    /// use rowfact::Matrix;
    /// let m = Matrix::from_fn(2, 2, |i, j| (i * 2 + j) as f64).unwrap();
    /// assert_eq!(m.as_slice(), &[0.0, 1.0, 2.0, 3.0]);
    /// ```
    pub fn from_fn(rows: usize, cols: usize, f: impl Fn(usize, usize) -> T) -> Result<Self> {
        check_dims(rows, cols)?;
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                data.push(f(i, j));
            }
        }
        Ok(Self { data, rows, cols })
    }

    /// `n x n` identity.
    pub fn identity(n: usize) -> Result<Self> {
        let mut m = Self::new(n, n)?;
        for i in 0..n {
            m.data[i * n + i] = T::one();
        }
        Ok(m)
    }
}

// ── Accessors ───────────────────────────────────────────────────────

impl<T> Matrix<T> {
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// True only for the default 0x0 matrix.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The whole buffer in row-major order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Row `i` as a slice of exactly `cols` elements.
    ///
    /// Panics if `i >= rows`.
    #[inline]
    pub fn row(&self, i: usize) -> &[T] {
        let start = i * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Row `i` as a mutable slice.
    #[inline]
    pub fn row_mut(&mut self, i: usize) -> &mut [T] {
        let start = i * self.cols;
        let end = start + self.cols;
        &mut self.data[start..end]
    }

    /// Bounds-checked element access.
    ///
    /// ```
    /// use rowfact::{LinalgError, Matrix};
    /// let m = Matrix::<i32>::new(2, 2).unwrap();
    /// assert_eq!(m.at(1, 1), Ok(&0));
    /// assert!(matches!(m.at(2, 0), Err(LinalgError::OutOfRange { .. })));
    /// ```
    pub fn at(&self, row: usize, col: usize) -> Result<&T> {
        self.check_index(row, col)?;
        Ok(&self.data[row * self.cols + col])
    }

    /// Bounds-checked mutable element access.
    pub fn at_mut(&mut self, row: usize, col: usize) -> Result<&mut T> {
        self.check_index(row, col)?;
        Ok(&mut self.data[row * self.cols + col])
    }

    #[inline]
    fn check_index(&self, row: usize, col: usize) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(LinalgError::OutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    /// Borrow the whole matrix as a view.
    #[inline]
    pub fn as_view(&self) -> MatrixView<'_, T> {
        MatrixView::from_parts(&self.data, self.rows, self.cols, self.cols)
    }

    /// Borrow the whole matrix as a mutable view.
    #[inline]
    pub fn as_view_mut(&mut self) -> MatrixViewMut<'_, T> {
        let (rows, cols) = (self.rows, self.cols);
        MatrixViewMut::from_parts(&mut self.data, rows, cols, cols)
    }

    /// Window of `height x width` elements starting at `(row, col)`.
    ///
    /// Fails with [`LinalgError::ZeroDimension`] if either extent is zero and
    /// with [`LinalgError::OutOfRange`] if the window leaves the matrix.
    ///
    /// ```
    /// use rowfact::Matrix;
    /// let m = Matrix::from_fn(3, 3, |i, j| i * 3 + j).unwrap();
    /// let v = m.view(1, 1, 2, 2).unwrap();
    /// assert_eq!(v[(0, 0)], 4);
    /// assert_eq!(v.row(1), &[7, 8]);
    /// assert!(m.view(2, 2, 2, 1).is_err());
    /// ```
    pub fn view(&self, row: usize, col: usize, height: usize, width: usize) -> Result<MatrixView<'_, T>> {
        self.as_view().view(row, col, height, width)
    }

    /// Mutable window; writes go straight to this matrix.
    pub fn view_mut(
        &mut self,
        row: usize,
        col: usize,
        height: usize,
        width: usize,
    ) -> Result<MatrixViewMut<'_, T>> {
        self.as_view_mut().into_view_mut(row, col, height, width)
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &T {
        debug_assert!(j < self.cols, "column {} out of range for {} columns", j, self.cols);
        &self.data[i * self.cols + j]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        debug_assert!(j < self.cols, "column {} out of range for {} columns", j, self.cols);
        &mut self.data[i * self.cols + j]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimensions_rejected() {
        assert_eq!(
            Matrix::<f64>::new(0, 0).unwrap_err(),
            LinalgError::ZeroDimension { rows: 0, cols: 0 }
        );
        assert!(Matrix::<f64>::new(3, 0).is_err());
        assert!(Matrix::<i32>::filled(0, 2, 7).is_err());
    }

    #[test]
    fn default_is_empty() {
        let m = Matrix::<f32>::default();
        assert!(m.is_empty());
        assert_eq!(m.shape(), (0, 0));
    }

    #[test]
    fn size_mismatch_rejected() {
        assert!(Matrix::from_slice(2, 3, &[1.0, 2.0]).is_err());
        let ragged: Vec<Vec<i32>> = vec![vec![1, 2], vec![3]];
        assert!(Matrix::from_rows(&ragged).is_err());
        let empty: [[i32; 0]; 0] = [];
        assert!(Matrix::from_rows(&empty).is_err());
    }

    #[test]
    fn nested_rows_are_row_major() {
        let m = Matrix::from_rows(&[[1, 2, 3], [4, 5, 6]]).unwrap();
        assert_eq!(m.as_slice(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(m.row(0), &[1, 2, 3]);
    }

    #[test]
    fn checked_access() {
        let mut m = Matrix::<i64>::new(2, 3).unwrap();
        *m.at_mut(1, 2).unwrap() = 9;
        assert_eq!(m[(1, 2)], 9);
        assert_eq!(
            m.at(1, 3).unwrap_err(),
            LinalgError::OutOfRange { row: 1, col: 3, rows: 2, cols: 3 }
        );
        assert!(m.at_mut(2, 0).is_err());
    }

    #[test]
    fn identity_has_unit_diagonal() {
        let id = Matrix::<f64>::identity(3).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(id[(i, j)], if i == j { 1.0 } else { 0.0 });
            }
        }
    }

    #[test]
    fn row_mut_writes_through() {
        let mut m = Matrix::<u32>::new(2, 2).unwrap();
        m.row_mut(1).copy_from_slice(&[5, 6]);
        assert_eq!(m.as_slice(), &[0, 0, 5, 6]);
    }
}
