//! Strided one-dimensional views.
//!
//! Element `k` of a view lives at `data[k * inc]`. Matrix columns are
//! vector views with `inc` equal to the matrix row stride.

use core::ops::{Index, IndexMut};

use crate::error::{LinalgError, Result};
use crate::simd;

#[inline]
fn span(len: usize, inc: usize) -> usize {
    if len == 0 {
        0
    } else {
        (len - 1) * inc + 1
    }
}

fn check_parts(available: usize, len: usize, inc: usize) -> Result<()> {
    if len == 0 {
        return Err(LinalgError::ZeroDimension { rows: 0, cols: 1 });
    }
    if inc == 0 {
        return Err(LinalgError::InvalidInput("vector view increment must be non-zero"));
    }
    let needed = span(len, inc);
    if available < needed {
        return Err(LinalgError::LengthMismatch {
            expected: needed,
            got: available,
        });
    }
    Ok(())
}

/// Offset into the parent's backing slice for a sub-view request.
fn sub_offset(parent_len: usize, parent_inc: usize, start: usize, len: usize, inc: usize) -> Result<usize> {
    if len == 0 {
        return Err(LinalgError::ZeroDimension { rows: 0, cols: 1 });
    }
    if inc == 0 {
        return Err(LinalgError::InvalidInput("vector view increment must be non-zero"));
    }
    let last = (len - 1).checked_mul(inc).and_then(|d| d.checked_add(start));
    match last {
        Some(last) if last < parent_len => Ok(start * parent_inc),
        _ => Err(LinalgError::OutOfRange {
            row: last.unwrap_or(usize::MAX),
            col: 0,
            rows: parent_len,
            cols: 1,
        }),
    }
}

#[inline]
fn out_of_range(i: usize, len: usize) -> LinalgError {
    LinalgError::OutOfRange {
        row: i,
        col: 0,
        rows: len,
        cols: 1,
    }
}

// ── VectorView ──────────────────────────────────────────────────────

/// Read-only strided window of `len` elements.
///
/// ```
/// use rowfact::{Orientation, Vector, VectorView};
///
/// let v = Vector::from_slice(&[0, 1, 2, 3, 4, 5, 6], Orientation::Column).unwrap();
/// let evens = v.view(0, 4, 2).unwrap();
/// assert_eq!(evens.to_vec(), vec![0, 2, 4, 6]);
/// assert_eq!(evens.view(1, 2, 2).unwrap().to_vec(), vec![2, 6]);
///
/// let raw = [1.0, 9.0, 2.0];
/// let w = VectorView::new(&raw, 2, 2).unwrap();
/// assert_eq!(w[1], 2.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct VectorView<'a, T> {
    data: &'a [T],
    len: usize,
    inc: usize,
}

impl<'a, T> VectorView<'a, T> {
    #[inline]
    pub(crate) fn from_parts(data: &'a [T], len: usize, inc: usize) -> Self {
        Self {
            data: &data[..span(len, inc)],
            len,
            inc,
        }
    }

    /// View `len` elements of `data`, `inc` apart.
    pub fn new(data: &'a [T], len: usize, inc: usize) -> Result<Self> {
        check_parts(data.len(), len, inc)?;
        Ok(Self::from_parts(data, len, inc))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Distance between consecutive elements in the backing slice.
    #[inline]
    pub fn inc(&self) -> usize {
        self.inc
    }

    /// Backing elements from the first through the last viewed element.
    #[inline]
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// The elements as a plain slice when `inc == 1`.
    #[inline]
    pub fn as_contiguous(&self) -> Option<&'a [T]> {
        (self.inc == 1 || self.len <= 1).then_some(self.data)
    }

    #[inline]
    pub fn get(&self, i: usize) -> Option<&'a T> {
        if i < self.len {
            Some(&self.data[i * self.inc])
        } else {
            None
        }
    }

    pub fn at(&self, i: usize) -> Result<&'a T> {
        self.get(i).ok_or_else(|| out_of_range(i, self.len))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a T> + 'a {
        self.data.iter().step_by(self.inc)
    }

    /// Every `inc`-th element starting at `start`, relative to this view.
    pub fn view(&self, start: usize, len: usize, inc: usize) -> Result<VectorView<'a, T>> {
        let off = sub_offset(self.len, self.inc, start, len, inc)?;
        Ok(Self::from_parts(&self.data[off..], len, self.inc * inc))
    }

    #[inline]
    pub(crate) fn cast_as<F: 'static>(&self) -> Option<VectorView<'a, F>>
    where
        T: 'static,
    {
        simd::slice_as::<T, F>(self.data).map(|data| VectorView {
            data,
            len: self.len,
            inc: self.inc,
        })
    }
}

impl<T: Copy> VectorView<'_, T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().copied().collect()
    }
}

impl<T> Index<usize> for VectorView<'_, T> {
    type Output = T;

    #[inline]
    fn index(&self, i: usize) -> &T {
        &self.data[i * self.inc]
    }
}

// ── VectorViewMut ───────────────────────────────────────────────────

/// Mutable strided window; writes land in the owner.
#[derive(Debug)]
pub struct VectorViewMut<'a, T> {
    data: &'a mut [T],
    len: usize,
    inc: usize,
}

impl<'a, T> VectorViewMut<'a, T> {
    #[inline]
    pub(crate) fn from_parts(data: &'a mut [T], len: usize, inc: usize) -> Self {
        Self {
            data: &mut data[..span(len, inc)],
            len,
            inc,
        }
    }

    pub fn new(data: &'a mut [T], len: usize, inc: usize) -> Result<Self> {
        check_parts(data.len(), len, inc)?;
        Ok(Self::from_parts(data, len, inc))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn inc(&self) -> usize {
        self.inc
    }

    #[inline]
    pub fn as_view(&self) -> VectorView<'_, T> {
        VectorView::from_parts(self.data, self.len, self.inc)
    }

    pub fn at(&self, i: usize) -> Result<&T> {
        if i >= self.len {
            return Err(out_of_range(i, self.len));
        }
        Ok(&self.data[i * self.inc])
    }

    pub fn at_mut(&mut self, i: usize) -> Result<&mut T> {
        if i >= self.len {
            return Err(out_of_range(i, self.len));
        }
        Ok(&mut self.data[i * self.inc])
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.data.iter_mut().step_by(self.inc)
    }

    /// Mutable sub-view that keeps this view's lifetime.
    pub fn into_view_mut(self, start: usize, len: usize, inc: usize) -> Result<VectorViewMut<'a, T>> {
        let off = sub_offset(self.len, self.inc, start, len, inc)?;
        let inc = self.inc * inc;
        Ok(Self::from_parts(&mut self.data[off..], len, inc))
    }

    pub fn view_mut(&mut self, start: usize, len: usize, inc: usize) -> Result<VectorViewMut<'_, T>> {
        VectorViewMut {
            data: &mut *self.data,
            len: self.len,
            inc: self.inc,
        }
        .into_view_mut(start, len, inc)
    }
}

impl<T: Copy> VectorViewMut<'_, T> {
    pub fn fill(&mut self, value: T) {
        for x in self.iter_mut() {
            *x = value;
        }
    }
}

impl<T> Index<usize> for VectorViewMut<'_, T> {
    type Output = T;

    #[inline]
    fn index(&self, i: usize) -> &T {
        &self.data[i * self.inc]
    }
}

impl<T> IndexMut<usize> for VectorViewMut<'_, T> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut T {
        &mut self.data[i * self.inc]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_checks() {
        let buf = [1, 2, 3, 4, 5];
        assert!(VectorView::new(&buf, 3, 2).is_ok());
        assert!(matches!(
            VectorView::new(&buf, 4, 2),
            Err(LinalgError::LengthMismatch { expected: 7, got: 5 })
        ));
        assert!(VectorView::new(&buf, 0, 1).unwrap_err().is_invalid_input());
        assert!(VectorView::new(&buf, 2, 0).is_err());
    }

    #[test]
    fn strided_iteration_stops_at_len() {
        let buf = [1, 2, 3, 4, 5, 6, 7];
        let v = VectorView::new(&buf, 3, 3).unwrap();
        assert_eq!(v.to_vec(), vec![1, 4, 7]);
        assert_eq!(v.get(3), None);
        assert!(v.at(3).is_err());
        assert!(v.as_contiguous().is_none());
        let c = VectorView::new(&buf, 2, 1).unwrap();
        assert_eq!(c.as_contiguous(), Some(&buf[..2]));
    }

    #[test]
    fn sub_views_check_range() {
        let buf: Vec<i32> = (0..10).collect();
        let v = VectorView::new(&buf, 10, 1).unwrap();
        assert!(v.view(8, 2, 1).is_ok());
        assert!(matches!(v.view(8, 2, 2), Err(LinalgError::OutOfRange { .. })));
        assert!(matches!(v.view(0, 0, 1), Err(LinalgError::ZeroDimension { .. })));
        assert!(v.view(usize::MAX, 2, usize::MAX).is_err());
    }

    #[test]
    fn mutable_view_writes_through() {
        let mut buf = vec![0.0_f64; 6];
        {
            let mut v = VectorViewMut::new(&mut buf, 3, 2).unwrap();
            v.fill(1.0);
            *v.at_mut(2).unwrap() = 5.0;
            let mut tail = v.view_mut(1, 2, 1).unwrap();
            tail[0] = 3.0;
            assert!(v.at_mut(3).is_err());
        }
        assert_eq!(buf, vec![1.0, 0.0, 3.0, 0.0, 5.0, 0.0]);
    }
}
