mod view;

pub use view::{VectorView, VectorViewMut};

use core::ops::{Index, IndexMut};

use num_traits::{AsPrimitive, Float};

use crate::error::{LinalgError, Result};
use crate::kernels::{self, Op};
use crate::matrix::Matrix;
use crate::params::EPSILON;
use crate::simd;
use crate::traits::{is_close, Element, FloatScalar, Promote, Promoted, Scalar};

/// Whether a vector is laid out as a `1 x n` row or an `n x 1` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    Row,
    #[default]
    Column,
}

impl Orientation {
    /// The other orientation.
    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            Orientation::Row => Orientation::Column,
            Orientation::Column => Orientation::Row,
        }
    }
}

/// Owned, fixed-size vector with an [`Orientation`].
///
/// Orientation decides which products are legal: a row vector times a
/// column vector is an inner product, a column times a row is an outer
/// product, a row vector may left-multiply a matrix and a matrix may
/// right-multiply a column vector.
///
/// # Examples
///
/// ```
/// use rowfact::{Orientation, Vector};
///
/// let r = Vector::from_slice(&[1.0, 2.0, 2.0], Orientation::Row).unwrap();
/// let c = r.transposed();
/// assert_eq!(r.inner(&c).unwrap(), 9.0);
/// assert_eq!(r.norm(), 3.0);
///
/// let m = c.outer_product(&r).unwrap();
/// assert_eq!(m.shape(), (3, 3));
/// assert_eq!(m[(2, 1)], 4.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Vector<T> {
    data: Vec<T>,
    orientation: Orientation,
}

// ── Constructors ────────────────────────────────────────────────────

impl<T: Scalar> Vector<T> {
    /// Zero vector of `size` elements. Fails on `size == 0`.
    pub fn new(size: usize, orientation: Orientation) -> Result<Self> {
        Self::filled(size, T::zero(), orientation)
    }

    pub fn filled(size: usize, value: T, orientation: Orientation) -> Result<Self> {
        Self::from_vec(vec![value; size], orientation)
    }

    /// Take ownership of `data`. Fails when it is empty.
    pub fn from_vec(data: Vec<T>, orientation: Orientation) -> Result<Self> {
        if data.is_empty() {
            return Err(LinalgError::ZeroDimension { rows: 0, cols: 1 });
        }
        Ok(Self { data, orientation })
    }

    pub fn from_slice(data: &[T], orientation: Orientation) -> Result<Self> {
        Self::from_vec(data.to_vec(), orientation)
    }
}

// ── Accessors ───────────────────────────────────────────────────────

impl<T> Vector<T> {
    /// Number of elements.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

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

    pub fn at(&self, i: usize) -> Result<&T> {
        let len = self.data.len();
        self.data.get(i).ok_or(LinalgError::OutOfRange {
            row: i,
            col: 0,
            rows: len,
            cols: 1,
        })
    }

    pub fn at_mut(&mut self, i: usize) -> Result<&mut T> {
        let len = self.data.len();
        self.data.get_mut(i).ok_or(LinalgError::OutOfRange {
            row: i,
            col: 0,
            rows: len,
            cols: 1,
        })
    }

    /// Flip the orientation in place; the elements do not move.
    #[inline]
    pub fn transpose(&mut self) {
        self.orientation = self.orientation.flipped();
    }

    #[inline]
    pub fn as_view(&self) -> VectorView<'_, T> {
        VectorView::from_parts(&self.data, self.data.len(), 1)
    }

    #[inline]
    pub fn as_view_mut(&mut self) -> VectorViewMut<'_, T> {
        let len = self.data.len();
        VectorViewMut::from_parts(&mut self.data, len, 1)
    }

    /// `len` elements starting at `start`, `inc` apart.
    pub fn view(&self, start: usize, len: usize, inc: usize) -> Result<VectorView<'_, T>> {
        self.as_view().view(start, len, inc)
    }

    pub fn view_mut(&mut self, start: usize, len: usize, inc: usize) -> Result<VectorViewMut<'_, T>> {
        self.as_view_mut().into_view_mut(start, len, inc)
    }
}

impl<T> Index<usize> for Vector<T> {
    type Output = T;

    #[inline]
    fn index(&self, i: usize) -> &T {
        &self.data[i]
    }
}

impl<T> IndexMut<usize> for Vector<T> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut T {
        &mut self.data[i]
    }
}

// ── Element-wise ────────────────────────────────────────────────────

impl<T: Scalar> Vector<T> {
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Copy with the other orientation.
    pub fn transposed(&self) -> Self {
        Self {
            data: self.data.clone(),
            orientation: self.orientation.flipped(),
        }
    }

    pub fn map<U: Scalar>(&self, f: impl Fn(T) -> U) -> Vector<U> {
        Vector {
            data: self.data.iter().map(|&x| f(x)).collect(),
            orientation: self.orientation,
        }
    }

    pub fn cast<U: Scalar>(&self) -> Vector<U>
    where
        T: AsPrimitive<U>,
    {
        self.map(|x| x.as_())
    }

    /// True when every element is exactly zero.
    pub fn is_null(&self) -> bool {
        self.data.iter().all(|x| x.is_zero())
    }
}

impl<T: Element> Vector<T> {
    /// Euclidean length, computed in the default float type.
    pub fn norm(&self) -> T::Float {
        let sq = match simd::slice_as::<T, T::Float>(&self.data) {
            Some(s) => simd::sum_sq(s),
            None => self
                .data
                .iter()
                .fold(<T::Float as num_traits::Zero>::zero(), |acc, &x| {
                    let f = x.to_float();
                    acc + f * f
                }),
        };
        sq.sqrt()
    }

    /// Same size and element-wise within `eps`. Orientation is ignored.
    pub fn loosely_equals<U: Element>(&self, other: &Vector<U>, eps: f64) -> bool {
        self.size() == other.size()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(&a, &b)| is_close(a, b, eps))
    }

    /// [`loosely_equals`](Self::loosely_equals) with the default tolerance.
    pub fn loosely_equal(&self, other: &Vector<T>) -> bool {
        self.loosely_equals(other, EPSILON)
    }
}

impl<T: FloatScalar + Element<Float = T>> Vector<T> {
    /// Scale to unit length. A zero vector cannot be normalized.
    ///
    /// ```
    /// use rowfact::{Orientation, Vector};
    /// let mut v = Vector::from_slice(&[3.0_f32, 4.0], Orientation::Column).unwrap();
    /// v.normalize().unwrap();
    /// assert_eq!(v.as_slice(), &[0.6, 0.8]);
    /// assert!(Vector::<f64>::new(2, Orientation::Row).unwrap().normalize().is_err());
    /// ```
    pub fn normalize(&mut self) -> Result<()> {
        let n = self.norm();
        if n == T::zero() {
            return Err(LinalgError::InvalidInput("cannot normalize a zero vector"));
        }
        for x in self.data.iter_mut() {
            *x = *x / n;
        }
        Ok(())
    }
}

// ── Products ────────────────────────────────────────────────────────

impl<T: Scalar> Vector<T> {
    /// Sum of element-wise products, ignoring orientation.
    ///
    /// ```
    /// use rowfact::{Orientation, Vector};
    /// let a = Vector::from_slice(&[1, 2, 3], Orientation::Column).unwrap();
    /// let b = Vector::from_slice(&[0.5_f64, 0.5, 0.5], Orientation::Column).unwrap();
    /// assert_eq!(a.dot_product(&b).unwrap(), 3.0);
    /// ```
    pub fn dot_product<U>(&self, other: &Vector<U>) -> Result<Promoted<T, U>>
    where
        T: Promote<U> + AsPrimitive<Promoted<T, U>>,
        U: Scalar + AsPrimitive<Promoted<T, U>>,
    {
        kernels::dot(self.as_view(), other.as_view())
    }

    /// Row times column. Any other orientation pairing is rejected; use
    /// [`dot_product`](Self::dot_product) to ignore orientation.
    pub fn inner<U>(&self, other: &Vector<U>) -> Result<Promoted<T, U>>
    where
        T: Promote<U> + AsPrimitive<Promoted<T, U>>,
        U: Scalar + AsPrimitive<Promoted<T, U>>,
    {
        if self.orientation != Orientation::Row || other.orientation != Orientation::Column {
            return Err(LinalgError::InvalidInput(
                "inner product requires a row vector times a column vector",
            ));
        }
        self.dot_product(other)
    }

    /// Matrix product of two vectors.
    ///
    /// Column times row gives the `n x m` outer product and row times column
    /// gives the `1 x 1` inner product. Equal orientations only multiply when
    /// both vectors hold a single element.
    pub fn outer_product<U>(&self, other: &Vector<U>) -> Result<Matrix<Promoted<T, U>>>
    where
        T: Promote<U> + AsPrimitive<Promoted<T, U>>,
        U: Scalar + AsPrimitive<Promoted<T, U>>,
    {
        match (self.orientation, other.orientation) {
            (Orientation::Column, Orientation::Row) => kernels::outer(self.as_view(), other.as_view()),
            (Orientation::Row, Orientation::Column) => {
                let d = self.dot_product(other)?;
                Matrix::from_vec(1, 1, vec![d])
            }
            _ if self.size() == 1 && other.size() == 1 => {
                let a: Promoted<T, U> = self.data[0].as_();
                let b: Promoted<T, U> = other.data[0].as_();
                Matrix::from_vec(1, 1, vec![a * b])
            }
            _ => Err(LinalgError::DimensionMismatch {
                expected: (1, 1),
                got: (self.size(), other.size()),
            }),
        }
    }

    /// Row vector times matrix, via [`gemv`](crate::gemv) with the matrix
    /// transposed. The result is a row vector of length `m.cols()`.
    ///
    /// ```
    /// use rowfact::{Matrix, Orientation, Vector};
    /// let m = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]).unwrap();
    /// let r = Vector::from_slice(&[1.0, 0.0, -1.0], Orientation::Row).unwrap();
    /// let y = r.mul_matrix(&m).unwrap();
    /// assert_eq!(y.as_slice(), &[-4.0, -4.0]);
    /// assert_eq!(y.orientation(), Orientation::Row);
    /// ```
    pub fn mul_matrix<U>(&self, m: &Matrix<U>) -> Result<Vector<Promoted<U, T>>>
    where
        U: Promote<T> + AsPrimitive<Promoted<U, T>>,
        T: AsPrimitive<Promoted<U, T>>,
    {
        if self.orientation != Orientation::Row {
            return Err(LinalgError::InvalidInput(
                "vector-matrix product requires a row vector",
            ));
        }
        if self.size() != m.rows() {
            return Err(LinalgError::LengthMismatch {
                expected: m.rows(),
                got: self.size(),
            });
        }
        kernels::gemv(Op::Trans, m.as_view(), self.as_view())
    }
}
