use num_traits::AsPrimitive;

use crate::error::{LinalgError, Result};
use crate::kernels::{accepted, gemv_with, ger_with, native_backend, NativeBackend, Op};
use crate::matrix::Matrix;
use crate::traits::{Element, FloatScalar, Scalar};
use crate::vector::VectorView;

/// Orthogonal and upper-trapezoidal factors of `A = Q·R`.
///
/// For an `m x n` input with `k = min(m, n)`, `q` is `m x m` (full) or
/// `m x k` (thin) and `r` is `m x n` (full) or `k x n` (thin).
#[derive(Debug, Clone, PartialEq)]
pub struct Qr<R> {
    /// Orthonormal columns.
    pub q: Matrix<R>,
    /// Zero below the diagonal.
    pub r: Matrix<R>,
}

impl<R> Qr<R> {
    /// `(q, r)`.
    pub fn into_parts(self) -> (Matrix<R>, Matrix<R>) {
        (self.q, self.r)
    }
}

// ---------------------------------------------------------------------------
// Public functions
// ---------------------------------------------------------------------------

/// Householder QR of an `m x n` matrix using the global native backend.
///
/// `full_q` selects the square `m x m` Q instead of the first
/// `min(m, n)` columns; `full_r` selects an `m x n` R instead of
/// `min(m, n) x n`. Integer input is promoted to `f64`.
///
/// With a native backend installed, `f32`/`f64` problems go to its
/// `geqrf`-style routine first; column signs of `Q` and `R` may then
/// differ from the manual path, while `Q·R` and `QᵗQ = I` hold for both.
///
/// Fails with [`LinalgError::InvalidInput`] on an empty matrix.
///
/// # Example
///
/// ```
/// use rowfact::{loosely_equal, qr, Matrix};
///
/// let a = Matrix::from_rows(&[[12, -51, 4], [6, 167, -68], [-4, 24, -41]]).unwrap();
/// let f = qr(&a, false, false).unwrap();
/// assert_eq!(f.q.shape(), (3, 3));
/// assert!(f.r.is_upper_triangular());
/// assert!(loosely_equal(&f.q.matmul(&f.r).unwrap(), &a));
///
/// let tall = Matrix::from_rows(&[[1.0_f32, 2.0], [3.0, 4.0], [5.0, 6.0]]).unwrap();
/// let thin = qr(&tall, false, false).unwrap();
/// assert_eq!((thin.q.shape(), thin.r.shape()), ((3, 2), (2, 2)));
/// let full = qr(&tall, true, true).unwrap();
/// assert_eq!((full.q.shape(), full.r.shape()), ((3, 3), (3, 2)));
/// ```
pub fn qr<T: Element>(a: &Matrix<T>, full_q: bool, full_r: bool) -> Result<Qr<T::Float>> {
    let backend = native_backend();
    qr_with(backend.as_deref(), a, full_q, full_r)
}

/// [`qr`] with an explicit backend; `None` forces the manual path.
pub fn qr_with<T: Element>(
    backend: Option<&dyn NativeBackend>,
    a: &Matrix<T>,
    full_q: bool,
    full_r: bool,
) -> Result<Qr<T::Float>> {
    factor(backend, a.map(|x| x.to_float()), full_q, full_r)
}

/// [`qr`] computed in an explicitly chosen float type.
///
/// ```
/// use rowfact::{qr_as, Matrix};
/// let a = Matrix::from_rows(&[[3_i64, 0], [4, 5]]).unwrap();
/// let f = qr_as::<f32, _>(&a, true, true).unwrap();
/// assert!((f.r[(0, 0)].abs() - 5.0).abs() < 1e-6);
/// ```
pub fn qr_as<R, T>(a: &Matrix<T>, full_q: bool, full_r: bool) -> Result<Qr<R>>
where
    R: FloatScalar,
    T: Scalar + AsPrimitive<R>,
{
    let backend = native_backend();
    factor(backend.as_deref(), a.cast::<R>(), full_q, full_r)
}

/// Convenience methods on rectangular matrices.
impl<T: Element> Matrix<T> {
    /// Thin QR; see [`qr`].
    #[inline]
    pub fn qr(&self) -> Result<Qr<T::Float>> {
        qr(self, false, false)
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

fn factor<R: FloatScalar>(
    backend: Option<&dyn NativeBackend>,
    work: Matrix<R>,
    full_q: bool,
    full_r: bool,
) -> Result<Qr<R>> {
    if work.is_empty() {
        return Err(LinalgError::InvalidInput("qr of an empty matrix"));
    }
    let (m, n) = work.shape();
    let k = m.min(n);
    let mut q = Matrix::new(m, if full_q { m } else { k })?;
    let mut r = Matrix::new(if full_r { m } else { k }, n)?;

    if let Some(backend) = backend {
        if native_qr(backend, &work, &mut q, &mut r) {
            return Ok(Qr { q, r });
        }
    }
    householder(backend, work, &mut q, &mut r)?;
    Ok(Qr { q, r })
}

fn native_qr<R: FloatScalar>(backend: &dyn NativeBackend, a: &Matrix<R>, q: &mut Matrix<R>, r: &mut Matrix<R>) -> bool {
    let a = a.as_view();
    let mut q = q.as_view_mut();
    let mut r = r.as_view_mut();
    if let (Some(a), Some(mut q), Some(mut r)) = (a.cast_as::<f64>(), q.cast_as_mut::<f64>(), r.cast_as_mut::<f64>()) {
        return accepted(backend, "qr", backend.qr_f64(a, &mut q, &mut r)).is_some();
    }
    if let (Some(a), Some(mut q), Some(mut r)) = (a.cast_as::<f32>(), q.cast_as_mut::<f32>(), r.cast_as_mut::<f32>()) {
        return accepted(backend, "qr", backend.qr_f32(a, &mut q, &mut r)).is_some();
    }
    false
}

// ---------------------------------------------------------------------------
// Manual Householder
// ---------------------------------------------------------------------------

/// Turn column `j` of `a` below the diagonal into the tail of a reflector.
///
/// On return `a[j][j]` holds `beta` (the new diagonal of R) and
/// `a[j+1..m][j]` holds `v[1..]` with an implicit `v[0] = 1`.
/// Returns `tau` with `H = I - tau·v·vᵗ`; zero when the tail is already
/// zero and no reflection is needed.
fn householder_column<R: FloatScalar>(a: &mut Matrix<R>, j: usize) -> R {
    let (m, n) = a.shape();
    let sigma = (j + 1..m).fold(R::zero(), |s, i| {
        let x = a.data[i * n + j];
        s + x * x
    });
    if sigma == R::zero() {
        return R::zero();
    }
    let alpha = a.data[j * n + j];
    let normx = (alpha * alpha + sigma).sqrt();
    // sign opposite to alpha avoids cancellation in alpha - beta
    let beta = if alpha <= R::zero() { normx } else { -normx };
    let scale = R::one() / (alpha - beta);

    let mut vtv = R::one();
    for i in j + 1..m {
        let x = &mut a.data[i * n + j];
        *x = *x * scale;
        vtv = vtv + *x * *x;
    }
    a.data[j * n + j] = beta;
    R::from_f64(2.0) / vtv
}

/// `[1, a[j+1][j], .., a[m-1][j]]`
fn reflector<R: FloatScalar>(a: &Matrix<R>, j: usize) -> Vec<R> {
    let (m, n) = a.shape();
    let mut v = Vec::with_capacity(m - j);
    v.push(R::one());
    v.extend((j + 1..m).map(|i| a.data[i * n + j]));
    v
}

/// Apply `H = I - tau·v·vᵗ` from the left to a window: `w = Bᵗ·v`, then
/// `B -= tau·v·wᵗ`.
fn reflect<R: FloatScalar>(
    backend: Option<&dyn NativeBackend>,
    target: &mut Matrix<R>,
    (row, col, height, width): (usize, usize, usize, usize),
    v: &[R],
    tau: R,
) -> Result<()> {
    let mut block = target.view_mut(row, col, height, width)?;
    let v = VectorView::from_parts(v, v.len(), 1);
    let w = gemv_with(backend, Op::Trans, block.as_view(), v)?;
    ger_with(backend, &mut block, v, w.as_view(), -tau)
}

fn householder<R: FloatScalar>(
    backend: Option<&dyn NativeBackend>,
    mut work: Matrix<R>,
    q: &mut Matrix<R>,
    r: &mut Matrix<R>,
) -> Result<()> {
    let (m, n) = work.shape();
    let k = m.min(n);
    log::trace!(target: "rowfact_perf", "qr manual {}x{}", m, n);

    let mut taus = Vec::with_capacity(k);
    for j in 0..k {
        let tau = householder_column(&mut work, j);
        taus.push(tau);
        if tau == R::zero() || j + 1 >= n {
            continue;
        }
        let v = reflector(&work, j);
        reflect(backend, &mut work, (j, j + 1, m - j, n - j - 1), &v, tau)?;
    }

    for i in 0..r.rows().min(k) {
        r.row_mut(i)[i..].copy_from_slice(&work.row(i)[i..]);
    }

    // Q = H_0·H_1·…·H_{k-1}·I, accumulated backwards so each step only
    // touches the trailing square window
    let mut q_full = Matrix::identity(m)?;
    for j in (0..k).rev() {
        let tau = taus[j];
        if tau == R::zero() {
            continue;
        }
        let v = reflector(&work, j);
        reflect(backend, &mut q_full, (j, j, m - j, m - j), &v, tau)?;
    }
    let qcols = q.cols();
    for i in 0..m {
        q.row_mut(i).copy_from_slice(&q_full.row(i)[..qcols]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::loosely_equal_eps;

    fn assert_orthonormal_columns(q: &Matrix<f64>) {
        let qtq = q.transposed().matmul(q).unwrap();
        let id = Matrix::<f64>::identity(q.cols()).unwrap();
        assert!(loosely_equal_eps(&qtq, &id, 1e-10), "QᵗQ = {:?}", qtq);
    }

    fn manual(a: &Matrix<f64>, full_q: bool, full_r: bool) -> Qr<f64> {
        qr_with(None, a, full_q, full_r).unwrap()
    }

    #[test]
    fn classic_3x3() {
        let a = Matrix::from_rows(&[[12.0, -51.0, 4.0], [6.0, 167.0, -68.0], [-4.0, 24.0, -41.0]]).unwrap();
        let f = manual(&a, false, false);
        assert_orthonormal_columns(&f.q);
        assert!(f.r.is_upper_triangular());
        // |R| diagonal is unique: 14, 175, 35
        assert!((f.r[(0, 0)].abs() - 14.0).abs() < 1e-10);
        assert!((f.r[(1, 1)].abs() - 175.0).abs() < 1e-10);
        assert!((f.r[(2, 2)].abs() - 35.0).abs() < 1e-10);
        assert!(loosely_equal_eps(&f.q.matmul(&f.r).unwrap(), &a, 1e-9));
    }

    #[test]
    fn positive_leading_entry_gets_negative_diagonal() {
        let a = Matrix::from_rows(&[[3.0, 1.0], [4.0, 2.0]]).unwrap();
        let f = manual(&a, false, false);
        assert!((f.r[(0, 0)] + 5.0).abs() < 1e-12);
    }

    #[test]
    fn every_shape_flag_combination() {
        let tall = Matrix::from_fn(5, 3, |i, j| ((i * 3 + j) as f64).cos() + if i == j { 2.0 } else { 0.0 }).unwrap();
        let wide = tall.transposed();
        for a in [&tall, &wide] {
            let (m, n) = a.shape();
            let k = m.min(n);
            for full_q in [false, true] {
                for full_r in [false, true] {
                    let f = manual(a, full_q, full_r);
                    assert_eq!(f.q.shape(), (m, if full_q { m } else { k }));
                    assert_eq!(f.r.shape(), (if full_r { m } else { k }, n));
                    assert_orthonormal_columns(&f.q);
                    for i in 0..f.r.rows() {
                        for j in 0..i.min(n) {
                            assert_eq!(f.r[(i, j)], 0.0);
                        }
                    }
                    // thin Q with full R cannot be multiplied; compare on the k x n block
                    let q_k = Matrix::from_fn(m, k, |i, j| f.q[(i, j)]).unwrap();
                    let r_k = Matrix::from_fn(k, n, |i, j| f.r[(i, j)]).unwrap();
                    assert!(loosely_equal_eps(&q_k.matmul(&r_k).unwrap(), a, 1e-10));
                }
            }
        }
    }

    #[test]
    fn zero_column_needs_no_reflection() {
        let a = Matrix::from_rows(&[[0.0, 1.0], [0.0, 2.0], [0.0, 3.0]]).unwrap();
        let f = manual(&a, true, true);
        assert_orthonormal_columns(&f.q);
        assert!(loosely_equal_eps(&f.q.matmul(&f.r).unwrap(), &a, 1e-12));
    }

    #[test]
    fn rank_deficient_input() {
        let a = Matrix::from_rows(&[[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [1.0, 1.0, 1.0]]).unwrap();
        let f = manual(&a, true, true);
        assert_orthonormal_columns(&f.q);
        assert!(loosely_equal_eps(&f.q.matmul(&f.r).unwrap(), &a, 1e-10));
    }

    #[test]
    fn single_row_and_column() {
        let row = Matrix::from_rows(&[[-2.0, 5.0]]).unwrap();
        let f = manual(&row, false, false);
        assert_eq!(f.q.as_slice(), &[1.0]);
        assert_eq!(f.r.as_slice(), &[-2.0, 5.0]);

        let col = Matrix::from_rows(&[[3.0], [4.0]]).unwrap();
        let f = manual(&col, false, false);
        assert!((f.r[(0, 0)] + 5.0).abs() < 1e-12);
        assert!(loosely_equal_eps(&f.q.matmul(&f.r).unwrap(), &col, 1e-12));
    }

    #[test]
    fn integer_input_promotes() {
        let a = Matrix::from_rows(&[[2_u32, 0], [0, 3]]).unwrap();
        let f: Qr<f64> = qr_with(None, &a, false, false).unwrap();
        assert_eq!(f.q.as_slice(), &[1.0, 0.0, 0.0, 1.0]);
        assert_eq!(f.r.as_slice(), &[2.0, 0.0, 0.0, 3.0]);
    }

    #[test]
    fn empty_is_invalid() {
        let err = qr(&Matrix::<f64>::default(), false, false).unwrap_err();
        assert!(err.is_invalid_input());
    }
}
