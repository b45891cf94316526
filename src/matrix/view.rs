//! Borrowed, strided windows into row-major storage.
//!
//! A view is a slice that starts at the window's `(0, 0)` element plus
//! `rows`, `cols` and the row `stride` of the owning buffer. Row `i` of the
//! window is `data[i * stride..i * stride + cols]`. The borrow ties the view
//! to its owner, so a view can never outlive the buffer it reads or writes.

use core::ops::{Index, IndexMut};

use crate::error::{LinalgError, Result};
use crate::simd;
use crate::traits::Scalar;

use super::Matrix;

/// Elements a `rows x cols` window with row stride `stride` spans.
#[inline]
fn span(rows: usize, cols: usize, stride: usize) -> usize {
    if rows == 0 || cols == 0 {
        0
    } else {
        (rows - 1) * stride + cols
    }
}

/// Validate a sub-window request and return the offset of its first element.
fn window_offset(
    (rows, cols, stride): (usize, usize, usize),
    row: usize,
    col: usize,
    height: usize,
    width: usize,
) -> Result<usize> {
    if height == 0 || width == 0 {
        return Err(LinalgError::ZeroDimension {
            rows: height,
            cols: width,
        });
    }
    let fits = row.checked_add(height).map_or(false, |end| end <= rows)
        && col.checked_add(width).map_or(false, |end| end <= cols);
    if !fits {
        return Err(LinalgError::OutOfRange {
            row: row.saturating_add(height - 1),
            col: col.saturating_add(width - 1),
            rows,
            cols,
        });
    }
    Ok(row * stride + col)
}

/// Validate raw parts handed to a public view constructor.
fn check_parts(len: usize, rows: usize, cols: usize, stride: usize) -> Result<()> {
    super::check_dims(rows, cols)?;
    if stride < cols {
        return Err(LinalgError::InvalidInput("row stride is smaller than the column count"));
    }
    let needed = span(rows, cols, stride);
    if len < needed {
        return Err(LinalgError::LengthMismatch {
            expected: needed,
            got: len,
        });
    }
    Ok(())
}

// ── MatrixView ──────────────────────────────────────────────────────

/// Read-only strided window into a row-major buffer.
///
/// ```
/// use rowfact::{Matrix, MatrixView};
///
/// let m = Matrix::from_fn(3, 4, |i, j| (10 * i + j) as i32).unwrap();
/// let v = m.view(1, 1, 2, 3).unwrap();
/// assert_eq!(v.stride(), 4);
/// assert_eq!(v.row(0), &[11, 12, 13]);
/// assert_eq!(v[(1, 2)], 23);
///
/// let raw = [1.0_f64, 2.0, 9.0, 3.0, 4.0];
/// let w = MatrixView::new(&raw, 2, 2, 3).unwrap();
/// assert_eq!(w.to_matrix().as_slice(), &[1.0, 2.0, 3.0, 4.0]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MatrixView<'a, T> {
    data: &'a [T],
    rows: usize,
    cols: usize,
    stride: usize,
}

impl<'a, T> MatrixView<'a, T> {
    #[inline]
    pub(crate) fn from_parts(data: &'a [T], rows: usize, cols: usize, stride: usize) -> Self {
        let data = &data[..span(rows, cols, stride)];
        Self {
            data,
            rows,
            cols,
            stride,
        }
    }

    /// View `rows x cols` elements of `data` with row stride `stride`.
    pub fn new(data: &'a [T], rows: usize, cols: usize, stride: usize) -> Result<Self> {
        check_parts(data.len(), rows, cols, stride)?;
        Ok(Self::from_parts(data, rows, cols, stride))
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Distance in elements between the starts of consecutive rows.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Backing elements from `(0, 0)` through `(rows-1, cols-1)`, including
    /// the stride gaps between rows.
    #[inline]
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Row `i` of the window. Panics if `i >= rows`.
    #[inline]
    pub fn row(&self, i: usize) -> &'a [T] {
        assert!(i < self.rows, "row {} out of range for {} rows", i, self.rows);
        let start = i * self.stride;
        &self.data[start..start + self.cols]
    }

    /// Bounds-checked element access.
    pub fn at(&self, row: usize, col: usize) -> Result<&'a T> {
        if row >= self.rows || col >= self.cols {
            return Err(LinalgError::OutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(&self.data[row * self.stride + col])
    }

    /// Sub-window relative to this view.
    pub fn view(&self, row: usize, col: usize, height: usize, width: usize) -> Result<MatrixView<'a, T>> {
        let off = window_offset((self.rows, self.cols, self.stride), row, col, height, width)?;
        Ok(Self::from_parts(&self.data[off..], height, width, self.stride))
    }

    /// True when rows follow each other without gaps.
    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.stride == self.cols || self.rows <= 1
    }

    /// Reinterpret the element type when `T` and `F` are the same type.
    #[inline]
    pub(crate) fn cast_as<F: 'static>(&self) -> Option<MatrixView<'a, F>>
    where
        T: 'static,
    {
        simd::slice_as::<T, F>(self.data).map(|data| MatrixView {
            data,
            rows: self.rows,
            cols: self.cols,
            stride: self.stride,
        })
    }
}

impl<T: Scalar> MatrixView<'_, T> {
    /// Copy the window into an owned, compact matrix.
    pub fn to_matrix(&self) -> Matrix<T> {
        let mut data = Vec::with_capacity(self.rows * self.cols);
        for i in 0..self.rows {
            data.extend_from_slice(self.row(i));
        }
        Matrix {
            data,
            rows: self.rows,
            cols: self.cols,
        }
    }
}

impl<T> Index<(usize, usize)> for MatrixView<'_, T> {
    type Output = T;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &T {
        debug_assert!(j < self.cols);
        &self.data[i * self.stride + j]
    }
}

// ── MatrixViewMut ───────────────────────────────────────────────────

/// Mutable strided window; every write lands in the owning buffer.
///
/// ```
/// use rowfact::Matrix;
///
/// let mut m = Matrix::<f64>::new(3, 3).unwrap();
/// {
///     let mut block = m.view_mut(1, 1, 2, 2).unwrap();
///     block.fill(5.0);
///     block[(0, 1)] = 7.0;
/// }
/// assert_eq!(m.row(1), &[0.0, 5.0, 7.0]);
/// assert_eq!(m.row(2), &[0.0, 5.0, 5.0]);
/// ```
#[derive(Debug)]
pub struct MatrixViewMut<'a, T> {
    data: &'a mut [T],
    rows: usize,
    cols: usize,
    stride: usize,
}

impl<'a, T> MatrixViewMut<'a, T> {
    #[inline]
    pub(crate) fn from_parts(data: &'a mut [T], rows: usize, cols: usize, stride: usize) -> Self {
        let data = &mut data[..span(rows, cols, stride)];
        Self {
            data,
            rows,
            cols,
            stride,
        }
    }

    /// Mutably view `rows x cols` elements of `data` with row stride `stride`.
    pub fn new(data: &'a mut [T], rows: usize, cols: usize, stride: usize) -> Result<Self> {
        check_parts(data.len(), rows, cols, stride)?;
        Ok(Self::from_parts(data, rows, cols, stride))
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.data
    }

    /// Row `i` of the window. Panics if `i >= rows`.
    #[inline]
    pub fn row(&self, i: usize) -> &[T] {
        assert!(i < self.rows, "row {} out of range for {} rows", i, self.rows);
        let start = i * self.stride;
        &self.data[start..start + self.cols]
    }

    /// Mutable row `i`. Panics if `i >= rows`.
    #[inline]
    pub fn row_mut(&mut self, i: usize) -> &mut [T] {
        assert!(i < self.rows, "row {} out of range for {} rows", i, self.rows);
        let start = i * self.stride;
        &mut self.data[start..start + self.cols]
    }

    pub fn at(&self, row: usize, col: usize) -> Result<&T> {
        self.as_view().at(row, col)
    }

    pub fn at_mut(&mut self, row: usize, col: usize) -> Result<&mut T> {
        if row >= self.rows || col >= self.cols {
            return Err(LinalgError::OutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(&mut self.data[row * self.stride + col])
    }

    /// Shared view of the same window.
    #[inline]
    pub fn as_view(&self) -> MatrixView<'_, T> {
        MatrixView::from_parts(self.data, self.rows, self.cols, self.stride)
    }

    /// Shorter-lived mutable view of the same window.
    #[inline]
    pub fn reborrow(&mut self) -> MatrixViewMut<'_, T> {
        MatrixViewMut {
            data: self.data,
            rows: self.rows,
            cols: self.cols,
            stride: self.stride,
        }
    }

    /// Mutable sub-window borrowing from this view.
    pub fn view_mut(
        &mut self,
        row: usize,
        col: usize,
        height: usize,
        width: usize,
    ) -> Result<MatrixViewMut<'_, T>> {
        self.reborrow().into_view_mut(row, col, height, width)
    }

    /// Mutable sub-window that keeps this view's lifetime.
    pub fn into_view_mut(
        self,
        row: usize,
        col: usize,
        height: usize,
        width: usize,
    ) -> Result<MatrixViewMut<'a, T>> {
        let off = window_offset((self.rows, self.cols, self.stride), row, col, height, width)?;
        Ok(Self::from_parts(&mut self.data[off..], height, width, self.stride))
    }

    /// Reinterpret the element type when `T` and `F` are the same type.
    #[inline]
    pub(crate) fn cast_as_mut<F: 'static>(&mut self) -> Option<MatrixViewMut<'_, F>>
    where
        T: 'static,
    {
        let (rows, cols, stride) = (self.rows, self.cols, self.stride);
        simd::slice_as_mut::<T, F>(self.data).map(|data| MatrixViewMut {
            data,
            rows,
            cols,
            stride,
        })
    }
}

impl<T: Copy> MatrixViewMut<'_, T> {
    /// Set every element inside the window; gaps between rows are untouched.
    pub fn fill(&mut self, value: T) {
        for i in 0..self.rows {
            self.row_mut(i).fill(value);
        }
    }
}

impl<T> Index<(usize, usize)> for MatrixViewMut<'_, T> {
    type Output = T;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &T {
        debug_assert!(j < self.cols);
        &self.data[i * self.stride + j]
    }
}

impl<T> IndexMut<(usize, usize)> for MatrixViewMut<'_, T> {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        debug_assert!(j < self.cols);
        &mut self.data[i * self.stride + j]
    }
}
