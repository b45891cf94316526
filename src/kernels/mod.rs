//! Level-1 and level-2 kernels over views.
//!
//! Each kernel tries the native backend first, when one is available and
//! the element types are both `f32` or both `f64`, and otherwise runs the
//! manual path: vectorized inner loops with the outer loop split across
//! threads once the problem reaches [`QUADRATIC_PAR_THRESHOLD`] (or
//! exceeds [`LINEAR_PAR_THRESHOLD`] for `dot`).
//!
//! Mixed element types are allowed everywhere; results use the common
//! type [`Promoted<T, U>`].
//!
//! The plain entry points (`gemv`, `ger`, ...) consult the global backend
//! from [`native_backend`]. The `*_with` variants take the backend
//! explicitly, and `None` forces the manual path.
//!
//! [`QUADRATIC_PAR_THRESHOLD`]: crate::params::QUADRATIC_PAR_THRESHOLD
//! [`LINEAR_PAR_THRESHOLD`]: crate::params::LINEAR_PAR_THRESHOLD

mod fallback;
mod native;

#[cfg(feature = "blas")]
mod blas;

#[cfg(feature = "blas")]
pub use blas::BlasBackend;
pub use native::{
    clear_native_backend, native_backend, set_native_backend, BackendError, BackendResult, NativeBackend,
};

use num_traits::{AsPrimitive, One, Zero};

use crate::error::{LinalgError, Result};
use crate::matrix::{check_dims, Matrix, MatrixView, MatrixViewMut};
use crate::simd;
use crate::traits::{Promote, Promoted, Scalar};
use crate::vector::{Orientation, Vector, VectorView};

pub(crate) use native::accepted;

/// Whether GEMV uses the matrix as stored or transposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `y = A·x`
    NoTrans,
    /// `y = Aᵗ·x`
    Trans,
}

// ── GEMV ────────────────────────────────────────────────────────────

/// General matrix-vector product with the global native backend.
///
/// `NoTrans` needs `x.len() == A.cols()` and returns a column vector of
/// length `A.rows()`; `Trans` needs `x.len() == A.rows()` and returns a
/// row vector of length `A.cols()`.
///
/// ```
/// use rowfact::{gemv, Matrix, Op, Orientation, Vector};
///
/// let a = Matrix::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap();
/// let x = Vector::from_slice(&[1, 0, -1], Orientation::Column).unwrap();
/// let y = gemv(Op::NoTrans, a.as_view(), x.as_view()).unwrap();
/// assert_eq!(y.as_slice(), &[-2.0, -2.0]);
///
/// let z = Vector::from_slice(&[1.0, 1.0], Orientation::Row).unwrap();
/// let w = gemv(Op::Trans, a.as_view(), z.as_view()).unwrap();
/// assert_eq!(w.as_slice(), &[5.0, 7.0, 9.0]);
/// assert_eq!(w.orientation(), Orientation::Row);
///
/// assert!(gemv(Op::Trans, a.as_view(), x.as_view()).is_err());
/// ```
pub fn gemv<T, U>(op: Op, a: MatrixView<'_, T>, x: VectorView<'_, U>) -> Result<Vector<Promoted<T, U>>>
where
    T: Promote<U> + AsPrimitive<Promoted<T, U>>,
    U: Scalar + AsPrimitive<Promoted<T, U>>,
{
    let backend = native_backend();
    gemv_with(backend.as_deref(), op, a, x)
}

/// [`gemv`] with an explicit backend.
pub fn gemv_with<T, U>(
    backend: Option<&dyn NativeBackend>,
    op: Op,
    a: MatrixView<'_, T>,
    x: VectorView<'_, U>,
) -> Result<Vector<Promoted<T, U>>>
where
    T: Promote<U> + AsPrimitive<Promoted<T, U>>,
    U: Scalar + AsPrimitive<Promoted<T, U>>,
{
    let (rows, cols) = a.shape();
    check_dims(rows, cols)?;
    let (expected, out_len, orientation) = match op {
        Op::NoTrans => (cols, rows, Orientation::Column),
        Op::Trans => (rows, cols, Orientation::Row),
    };
    if x.len() != expected {
        return Err(LinalgError::LengthMismatch {
            expected,
            got: x.len(),
        });
    }
    if let Some(backend) = backend {
        let mut y = vec![Promoted::<T, U>::zero(); out_len];
        if native_gemv(backend, op, a, x, &mut y) {
            return Vector::from_vec(y, orientation);
        }
    }
    Vector::from_vec(fallback::gemv(op, a, x), orientation)
}

fn native_gemv<T: 'static, U: 'static, O: 'static>(
    backend: &dyn NativeBackend,
    op: Op,
    a: MatrixView<'_, T>,
    x: VectorView<'_, U>,
    y: &mut [O],
) -> bool {
    if let (Some(a), Some(x), Some(y)) = (a.cast_as::<f64>(), x.cast_as::<f64>(), simd::slice_as_mut::<O, f64>(y)) {
        return accepted(backend, "gemv", backend.gemv_f64(op, a, x, y)).is_some();
    }
    if let (Some(a), Some(x), Some(y)) = (a.cast_as::<f32>(), x.cast_as::<f32>(), simd::slice_as_mut::<O, f32>(y)) {
        return accepted(backend, "gemv", backend.gemv_f32(op, a, x, y)).is_some();
    }
    false
}

// ── GER ─────────────────────────────────────────────────────────────

/// Rank-1 update `A += alpha·x·yᵗ` with the global native backend.
///
/// `x.len()` must equal `A.rows()` and `y.len()` must equal `A.cols()`.
/// `alpha` and the product are in the common type of `T` and `U`; each
/// updated entry is converted back to `T` once.
///
/// ```
/// use rowfact::{ger, Matrix, Orientation, Vector};
///
/// let mut a = Matrix::<f64>::identity(2).unwrap();
/// let x = Vector::from_slice(&[1.0, 2.0], Orientation::Column).unwrap();
/// let y = Vector::from_slice(&[3.0, 4.0], Orientation::Row).unwrap();
/// ger(&mut a.as_view_mut(), x.as_view(), y.as_view(), -1.0).unwrap();
/// assert_eq!(a.as_slice(), &[-2.0, -4.0, -6.0, -7.0]);
///
/// let mut counts = Matrix::<i32>::new(1, 2).unwrap();
/// let half = Vector::from_slice(&[0.5_f64], Orientation::Column).unwrap();
/// let w = Vector::from_slice(&[2.0_f64, 5.0], Orientation::Row).unwrap();
/// ger(&mut counts.as_view_mut(), half.as_view(), w.as_view(), 1.0).unwrap();
/// assert_eq!(counts.as_slice(), &[1, 2]);
/// ```
pub fn ger<T, U>(
    a: &mut MatrixViewMut<'_, T>,
    x: VectorView<'_, U>,
    y: VectorView<'_, U>,
    alpha: Promoted<T, U>,
) -> Result<()>
where
    T: Promote<U> + AsPrimitive<Promoted<T, U>>,
    U: Scalar + AsPrimitive<Promoted<T, U>>,
    Promoted<T, U>: AsPrimitive<T>,
{
    let backend = native_backend();
    ger_with(backend.as_deref(), a, x, y, alpha)
}

/// [`ger`] with an explicit backend.
pub fn ger_with<T, U>(
    backend: Option<&dyn NativeBackend>,
    a: &mut MatrixViewMut<'_, T>,
    x: VectorView<'_, U>,
    y: VectorView<'_, U>,
    alpha: Promoted<T, U>,
) -> Result<()>
where
    T: Promote<U> + AsPrimitive<Promoted<T, U>>,
    U: Scalar + AsPrimitive<Promoted<T, U>>,
    Promoted<T, U>: AsPrimitive<T>,
{
    if x.len() != a.rows() {
        return Err(LinalgError::LengthMismatch {
            expected: a.rows(),
            got: x.len(),
        });
    }
    if y.len() != a.cols() {
        return Err(LinalgError::LengthMismatch {
            expected: a.cols(),
            got: y.len(),
        });
    }
    if let Some(backend) = backend {
        if native_ger(backend, a, alpha, x, y) {
            return Ok(());
        }
    }
    fallback::ger(a, alpha, x, y);
    Ok(())
}

/// Native GER when the matrix, `alpha` and both vectors share one float type.
fn native_ger<T: 'static, P: Copy + 'static, U: 'static>(
    backend: &dyn NativeBackend,
    a: &mut MatrixViewMut<'_, T>,
    alpha: P,
    x: VectorView<'_, U>,
    y: VectorView<'_, U>,
) -> bool {
    if let (Some(alpha), Some(x), Some(y)) = (simd::value_as::<P, f64>(alpha), x.cast_as::<f64>(), y.cast_as::<f64>()) {
        if let Some(mut a) = a.cast_as_mut::<f64>() {
            return accepted(backend, "ger", backend.ger_f64(&mut a, alpha, x, y)).is_some();
        }
    }
    if let (Some(alpha), Some(x), Some(y)) = (simd::value_as::<P, f32>(alpha), x.cast_as::<f32>(), y.cast_as::<f32>()) {
        if let Some(mut a) = a.cast_as_mut::<f32>() {
            return accepted(backend, "ger", backend.ger_f32(&mut a, alpha, x, y)).is_some();
        }
    }
    false
}

// ── DOT / OUTER ─────────────────────────────────────────────────────

/// Inner product of two equal-length views.
///
/// ```
/// use rowfact::{dot, Orientation, Vector};
/// let x = Vector::from_slice(&[1, 2, 3], Orientation::Row).unwrap();
/// let y = Vector::from_slice(&[4_i64, 5, 6], Orientation::Column).unwrap();
/// assert_eq!(dot(x.as_view(), y.as_view()).unwrap(), 32_i64);
/// ```
pub fn dot<T, U>(x: VectorView<'_, T>, y: VectorView<'_, U>) -> Result<Promoted<T, U>>
where
    T: Promote<U> + AsPrimitive<Promoted<T, U>>,
    U: Scalar + AsPrimitive<Promoted<T, U>>,
{
    let backend = native_backend();
    dot_with(backend.as_deref(), x, y)
}

/// [`dot`] with an explicit backend.
pub fn dot_with<T, U>(
    backend: Option<&dyn NativeBackend>,
    x: VectorView<'_, T>,
    y: VectorView<'_, U>,
) -> Result<Promoted<T, U>>
where
    T: Promote<U> + AsPrimitive<Promoted<T, U>>,
    U: Scalar + AsPrimitive<Promoted<T, U>>,
{
    if x.len() != y.len() {
        return Err(LinalgError::LengthMismatch {
            expected: x.len(),
            got: y.len(),
        });
    }
    if let Some(backend) = backend {
        if let Some(v) = native_dot(backend, x, y) {
            return Ok(v);
        }
    }
    Ok(fallback::dot(x, y))
}

fn native_dot<T: 'static, U: 'static, O: Copy + 'static>(
    backend: &dyn NativeBackend,
    x: VectorView<'_, T>,
    y: VectorView<'_, U>,
) -> Option<O> {
    if let (Some(x), Some(y)) = (x.cast_as::<f64>(), y.cast_as::<f64>()) {
        return accepted(backend, "dot", backend.dot_f64(x, y)).and_then(simd::value_as::<f64, O>);
    }
    if let (Some(x), Some(y)) = (x.cast_as::<f32>(), y.cast_as::<f32>()) {
        return accepted(backend, "dot", backend.dot_f32(x, y)).and_then(simd::value_as::<f32, O>);
    }
    None
}

/// Outer product `x·yᵗ` as a `x.len() x y.len()` matrix.
pub fn outer<T, U>(x: VectorView<'_, T>, y: VectorView<'_, U>) -> Result<Matrix<Promoted<T, U>>>
where
    T: Promote<U> + AsPrimitive<Promoted<T, U>>,
    U: Scalar + AsPrimitive<Promoted<T, U>>,
{
    let backend = native_backend();
    outer_with(backend.as_deref(), x, y)
}

/// [`outer`] with an explicit backend; the native path is a GER on zeros.
pub fn outer_with<T, U>(
    backend: Option<&dyn NativeBackend>,
    x: VectorView<'_, T>,
    y: VectorView<'_, U>,
) -> Result<Matrix<Promoted<T, U>>>
where
    T: Promote<U> + AsPrimitive<Promoted<T, U>>,
    U: Scalar + AsPrimitive<Promoted<T, U>>,
{
    let mut out = Matrix::<Promoted<T, U>>::new(x.len(), y.len())?;
    if let (Some(backend), Some(y_same)) = (backend, y.cast_as::<T>()) {
        if native_ger(backend, &mut out.as_view_mut(), Promoted::<T, U>::one(), x, y_same) {
            return Ok(out);
        }
    }
    out.data = fallback::outer(x, y);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls and delegates nothing, so the manual path always runs.
    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    impl NativeBackend for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn gemv_f64(&self, _: Op, _: MatrixView<'_, f64>, _: VectorView<'_, f64>, _: &mut [f64]) -> BackendResult<()> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Err(BackendError::Failed { routine: "dgemv", info: -3 })
        }
    }

    #[test]
    fn integer_inputs_never_reach_the_backend() {
        let b = Counting::default();
        let a = Matrix::from_rows(&[[1, 2], [3, 4]]).unwrap();
        let x = [1, 1];
        let y = gemv_with(Some(&b), Op::NoTrans, a.as_view(), VectorView::new(&x, 2, 1).unwrap()).unwrap();
        assert_eq!(y.as_slice(), &[3, 7]);
        assert_eq!(b.calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn failing_backend_falls_back() {
        let b = Counting::default();
        let a = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
        let x = [1.0, -1.0];
        let y = gemv_with(Some(&b), Op::NoTrans, a.as_view(), VectorView::new(&x, 2, 1).unwrap()).unwrap();
        assert_eq!(y.as_slice(), &[-1.0, -1.0]);
        assert_eq!(b.calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn mixed_float_widths_skip_the_backend() {
        let b = Counting::default();
        let a = Matrix::from_rows(&[[2.0_f64]]).unwrap();
        let x = [0.5_f32];
        let y = gemv_with(Some(&b), Op::Trans, a.as_view(), VectorView::new(&x, 1, 1).unwrap()).unwrap();
        assert_eq!(y.as_slice(), &[1.0_f64]);
        assert_eq!(b.calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn ger_length_checks() {
        let mut a = Matrix::<f32>::new(2, 3).unwrap();
        let two = [1.0_f32; 2];
        let three = [1.0_f32; 3];
        let x2 = VectorView::new(&two, 2, 1).unwrap();
        let x3 = VectorView::new(&three, 3, 1).unwrap();
        assert!(ger_with(None, &mut a.as_view_mut(), x3, x3, 1.0).is_err());
        assert!(ger_with(None, &mut a.as_view_mut(), x2, x2, 1.0).is_err());
        ger_with(None, &mut a.as_view_mut(), x2, x3, 0.5).unwrap();
        assert!(a.as_slice().iter().all(|&v| v == 0.5));
    }

    #[test]
    fn dot_and_outer() {
        let x = [1.0_f32, 2.0];
        let y = [3_i32, 4];
        let xv = VectorView::new(&x, 2, 1).unwrap();
        let yv = VectorView::new(&y, 2, 1).unwrap();
        assert_eq!(dot_with(None, xv, yv).unwrap(), 11.0_f32);
        let m = outer_with(None, xv, yv).unwrap();
        assert_eq!(m.as_slice(), &[3.0, 4.0, 6.0, 8.0]);
        let short = VectorView::new(&y, 1, 1).unwrap();
        assert!(dot_with(None, xv, short).unwrap_err().is_invalid_input());
    }
}
