//! Reference BLAS/LAPACK backend.
//!
//! Row-major storage is the transpose of column-major storage with the
//! same leading dimension, so a row-major `m x n` view with stride `s` is
//! handed to BLAS as a column-major `n x m` matrix with `lda = s` and the
//! transpose flag flipped. QR has no such trick: LAPACK works on a
//! column-major copy and the factors are copied back.
//!
//! The final binary must link a provider (e.g. `openblas-src`).

use crate::matrix::{MatrixView, MatrixViewMut};
use crate::vector::VectorView;

use super::native::{BackendError, BackendResult, NativeBackend};
use super::Op;

/// [`NativeBackend`] over the `blas` and `lapack` crates.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlasBackend;

#[inline]
fn idx(routine: &'static str, value: usize) -> BackendResult<i32> {
    i32::try_from(value).map_err(|_| BackendError::TooLarge { routine, value })
}

#[inline]
fn status(routine: &'static str, info: i32) -> BackendResult<()> {
    if info == 0 {
        Ok(())
    } else {
        Err(BackendError::Failed { routine, info })
    }
}

macro_rules! gemv_impl {
    ($name:literal, $routine:path, $t:ty, $op:expr, $a:expr, $x:expr, $y:expr) => {{
        let (a, x, y): (MatrixView<'_, $t>, VectorView<'_, $t>, &mut [$t]) = ($a, $x, $y);
        let m = idx($name, a.cols())?;
        let n = idx($name, a.rows())?;
        let lda = idx($name, a.stride())?;
        let incx = idx($name, x.inc())?;
        let trans = match $op {
            Op::NoTrans => b'T',
            Op::Trans => b'N',
        };
        unsafe {
            $routine(trans, m, n, 1.0, a.as_slice(), lda, x.as_slice(), incx, 0.0, y, 1);
        }
        Ok(())
    }};
}

macro_rules! ger_impl {
    ($name:literal, $routine:path, $t:ty, $a:expr, $alpha:expr, $x:expr, $y:expr) => {{
        let (a, x, y): (&mut MatrixViewMut<'_, $t>, VectorView<'_, $t>, VectorView<'_, $t>) = ($a, $x, $y);
        let m = idx($name, a.cols())?;
        let n = idx($name, a.rows())?;
        let lda = idx($name, a.stride())?;
        let incx = idx($name, x.inc())?;
        let incy = idx($name, y.inc())?;
        // column-major Aᵗ += alpha·y·xᵗ
        unsafe {
            $routine(m, n, $alpha, y.as_slice(), incy, x.as_slice(), incx, a.as_mut_slice(), lda);
        }
        Ok(())
    }};
}

macro_rules! dot_impl {
    ($name:literal, $routine:path, $x:expr, $y:expr) => {{
        let (x, y) = ($x, $y);
        let n = idx($name, x.len())?;
        let incx = idx($name, x.inc())?;
        let incy = idx($name, y.inc())?;
        Ok(unsafe { $routine(n, x.as_slice(), incx, y.as_slice(), incy) })
    }};
}

macro_rules! qr_impl {
    ($t:ty, $gname:literal, $geqrf:path, $oname:literal, $orgqr:path, $a:expr, $q:expr, $r:expr) => {{
        let (a, q, r): (MatrixView<'_, $t>, &mut MatrixViewMut<'_, $t>, &mut MatrixViewMut<'_, $t>) = ($a, $q, $r);
        let (m, n) = a.shape();
        let k = m.min(n);
        let qcols = q.cols();
        let name = $gname;

        // column-major copy with room for every column of Q
        let mut buf: Vec<$t> = vec![0.0; m * n.max(qcols)];
        for i in 0..m {
            for (j, &v) in a.row(i).iter().enumerate() {
                buf[j * m + i] = v;
            }
        }
        let (mi, ni, ki, qi) = (idx(name, m)?, idx(name, n)?, idx(name, k)?, idx(name, qcols)?);
        let mut tau: Vec<$t> = vec![0.0; k.max(1)];
        let mut info = 0;

        let mut query: [$t; 1] = [0.0];
        unsafe { $geqrf(mi, ni, &mut buf, mi, &mut tau, &mut query, -1, &mut info) };
        status(name, info)?;
        let lwork = (query[0] as usize).max(n).max(1);
        let mut work: Vec<$t> = vec![0.0; lwork];
        unsafe { $geqrf(mi, ni, &mut buf, mi, &mut tau, &mut work, idx(name, lwork)?, &mut info) };
        status(name, info)?;

        let mut r_rows: Vec<$t> = vec![0.0; r.rows() * n];
        for i in 0..r.rows().min(k) {
            for j in i..n {
                r_rows[i * n + j] = buf[j * m + i];
            }
        }

        let name = $oname;
        unsafe { $orgqr(mi, qi, ki, &mut buf, mi, &tau, &mut query, -1, &mut info) };
        status(name, info)?;
        let lwork = (query[0] as usize).max(qcols).max(1);
        if work.len() < lwork {
            work.resize(lwork, 0.0);
        }
        unsafe { $orgqr(mi, qi, ki, &mut buf, mi, &tau, &mut work, idx(name, lwork)?, &mut info) };
        status(name, info)?;

        for i in 0..r.rows() {
            r.row_mut(i).copy_from_slice(&r_rows[i * n..(i + 1) * n]);
        }
        for i in 0..m {
            for (j, dst) in q.row_mut(i).iter_mut().enumerate() {
                *dst = buf[j * m + i];
            }
        }
        Ok(())
    }};
}

impl NativeBackend for BlasBackend {
    fn name(&self) -> &'static str {
        "blas"
    }

    fn gemv_f64(&self, op: Op, a: MatrixView<'_, f64>, x: VectorView<'_, f64>, y: &mut [f64]) -> BackendResult<()> {
        gemv_impl!("dgemv", blas::dgemv, f64, op, a, x, y)
    }

    fn gemv_f32(&self, op: Op, a: MatrixView<'_, f32>, x: VectorView<'_, f32>, y: &mut [f32]) -> BackendResult<()> {
        gemv_impl!("sgemv", blas::sgemv, f32, op, a, x, y)
    }

    fn ger_f64(
        &self,
        a: &mut MatrixViewMut<'_, f64>,
        alpha: f64,
        x: VectorView<'_, f64>,
        y: VectorView<'_, f64>,
    ) -> BackendResult<()> {
        ger_impl!("dger", blas::dger, f64, a, alpha, x, y)
    }

    fn ger_f32(
        &self,
        a: &mut MatrixViewMut<'_, f32>,
        alpha: f32,
        x: VectorView<'_, f32>,
        y: VectorView<'_, f32>,
    ) -> BackendResult<()> {
        ger_impl!("sger", blas::sger, f32, a, alpha, x, y)
    }

    fn dot_f64(&self, x: VectorView<'_, f64>, y: VectorView<'_, f64>) -> BackendResult<f64> {
        dot_impl!("ddot", blas::ddot, x, y)
    }

    fn dot_f32(&self, x: VectorView<'_, f32>, y: VectorView<'_, f32>) -> BackendResult<f32> {
        dot_impl!("sdot", blas::sdot, x, y)
    }

    fn qr_f64(
        &self,
        a: MatrixView<'_, f64>,
        q: &mut MatrixViewMut<'_, f64>,
        r: &mut MatrixViewMut<'_, f64>,
    ) -> BackendResult<()> {
        qr_impl!(f64, "dgeqrf", lapack::dgeqrf, "dorgqr", lapack::dorgqr, a, q, r)
    }

    fn qr_f32(
        &self,
        a: MatrixView<'_, f32>,
        q: &mut MatrixViewMut<'_, f32>,
        r: &mut MatrixViewMut<'_, f32>,
    ) -> BackendResult<()> {
        qr_impl!(f32, "sgeqrf", lapack::sgeqrf, "sorgqr", lapack::sorgqr, a, q, r)
    }
}
