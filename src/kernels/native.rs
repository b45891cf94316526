//! Pluggable native backends.
//!
//! A [`NativeBackend`] provides optimized `f32`/`f64` routines for the
//! kernels and for QR. Every method has a default that reports
//! [`BackendError::Unsupported`], so a backend implements only what it
//! accelerates and the kernels run the manual path for the rest.
//!
//! # Design
//! - **Default**: no backend, or [`BlasBackend`](super::BlasBackend) when
//!   the `blas` feature is enabled
//! - **Runtime selection**: [`set_native_backend`] / [`clear_native_backend`]
//! - **Thread-safe**: the global slot is protected by an `RwLock`
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use rowfact::{native_backend, set_native_backend, clear_native_backend, NativeBackend};
//!
//! struct Plain;
//! impl NativeBackend for Plain {
//!     fn name(&self) -> &'static str { "plain" }
//! }
//!
//! set_native_backend(Arc::new(Plain));
//! assert_eq!(native_backend().map(|b| b.name()), Some("plain"));
//! clear_native_backend();
//! assert!(native_backend().is_none());
//! ```

use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use thiserror::Error;

use crate::matrix::{MatrixView, MatrixViewMut};
use crate::vector::VectorView;

use super::Op;

/// Failure reported by a native backend.
///
/// These never reach callers of the kernels: the kernel logs the error
/// and recomputes on the manual path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The backend does not implement this routine.
    #[error("{routine} is not provided by this backend")]
    Unsupported { routine: &'static str },

    /// The routine ran and reported a non-zero status.
    #[error("{routine} failed with info = {info}")]
    Failed { routine: &'static str, info: i32 },

    /// A dimension, stride or increment does not fit the backend's index type.
    #[error("{routine}: {value} exceeds the backend index range")]
    TooLarge { routine: &'static str, value: usize },
}

pub type BackendResult<T> = core::result::Result<T, BackendError>;

/// Optimized routines over row-major views.
///
/// Views carry their slice, row stride and element increment, so a
/// backend can hand them to a native library without copying.
///
/// Implementations must leave every output untouched when they return an
/// error; the caller recomputes the whole result on the manual path.
pub trait NativeBackend: Send + Sync {
    /// Short identifier used in log messages.
    fn name(&self) -> &'static str;

    /// `y = op(A)·x`. `y` arrives zeroed with the output length.
    fn gemv_f64(&self, op: Op, a: MatrixView<'_, f64>, x: VectorView<'_, f64>, y: &mut [f64]) -> BackendResult<()> {
        let _ = (op, a, x, y);
        Err(BackendError::Unsupported { routine: "dgemv" })
    }

    fn gemv_f32(&self, op: Op, a: MatrixView<'_, f32>, x: VectorView<'_, f32>, y: &mut [f32]) -> BackendResult<()> {
        let _ = (op, a, x, y);
        Err(BackendError::Unsupported { routine: "sgemv" })
    }

    /// `A += alpha·x·yᵗ`.
    fn ger_f64(
        &self,
        a: &mut MatrixViewMut<'_, f64>,
        alpha: f64,
        x: VectorView<'_, f64>,
        y: VectorView<'_, f64>,
    ) -> BackendResult<()> {
        let _ = (a, alpha, x, y);
        Err(BackendError::Unsupported { routine: "dger" })
    }

    fn ger_f32(
        &self,
        a: &mut MatrixViewMut<'_, f32>,
        alpha: f32,
        x: VectorView<'_, f32>,
        y: VectorView<'_, f32>,
    ) -> BackendResult<()> {
        let _ = (a, alpha, x, y);
        Err(BackendError::Unsupported { routine: "sger" })
    }

    fn dot_f64(&self, x: VectorView<'_, f64>, y: VectorView<'_, f64>) -> BackendResult<f64> {
        let _ = (x, y);
        Err(BackendError::Unsupported { routine: "ddot" })
    }

    fn dot_f32(&self, x: VectorView<'_, f32>, y: VectorView<'_, f32>) -> BackendResult<f32> {
        let _ = (x, y);
        Err(BackendError::Unsupported { routine: "sdot" })
    }

    /// Householder QR of `a` (`m x n`).
    ///
    /// `q` is `m x m` or `m x min(m, n)`; `r` is `m x n` or `min(m, n) x n`
    /// and arrives zeroed. The shapes of `q` and `r` select the variant.
    fn qr_f64(
        &self,
        a: MatrixView<'_, f64>,
        q: &mut MatrixViewMut<'_, f64>,
        r: &mut MatrixViewMut<'_, f64>,
    ) -> BackendResult<()> {
        let _ = (a, q, r);
        Err(BackendError::Unsupported { routine: "dgeqrf" })
    }

    fn qr_f32(
        &self,
        a: MatrixView<'_, f32>,
        q: &mut MatrixViewMut<'_, f32>,
        r: &mut MatrixViewMut<'_, f32>,
    ) -> BackendResult<()> {
        let _ = (a, q, r);
        Err(BackendError::Unsupported { routine: "sgeqrf" })
    }
}

// ── Global dispatcher ───────────────────────────────────────────────

static NATIVE_BACKEND: Lazy<RwLock<Option<Arc<dyn NativeBackend>>>> =
    Lazy::new(|| RwLock::new(default_backend()));

fn default_backend() -> Option<Arc<dyn NativeBackend>> {
    #[cfg(feature = "blas")]
    let backend: Option<Arc<dyn NativeBackend>> = Some(Arc::new(super::BlasBackend));
    #[cfg(not(feature = "blas"))]
    let backend: Option<Arc<dyn NativeBackend>> = None;
    backend
}

/// Route kernels and QR through `backend` from now on.
pub fn set_native_backend(backend: Arc<dyn NativeBackend>) {
    log::debug!(target: "rowfact_perf", "native backend set to {}", backend.name());
    let mut slot = NATIVE_BACKEND.write().unwrap_or_else(|e| e.into_inner());
    *slot = Some(backend);
}

/// Remove the current backend; every kernel takes the manual path.
pub fn clear_native_backend() {
    log::debug!(target: "rowfact_perf", "native backend cleared");
    let mut slot = NATIVE_BACKEND.write().unwrap_or_else(|e| e.into_inner());
    *slot = None;
}

/// The backend kernels currently dispatch to, if any.
pub fn native_backend() -> Option<Arc<dyn NativeBackend>> {
    NATIVE_BACKEND
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
}

/// Log the outcome of a native call and keep its value on success.
pub(crate) fn accepted<T>(backend: &dyn NativeBackend, kernel: &str, result: BackendResult<T>) -> Option<T> {
    match result {
        Ok(v) => {
            log::trace!(target: "rowfact_perf", "{}: native ({})", kernel, backend.name());
            Some(v)
        }
        Err(e @ BackendError::Unsupported { .. }) => {
            log::debug!(target: "rowfact_perf", "{}: {} on {}, using manual path", kernel, e, backend.name());
            None
        }
        Err(e) => {
            log::warn!(target: "rowfact_perf", "{}: {} backend failed ({}), using manual path", kernel, backend.name(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nothing;

    impl NativeBackend for Nothing {
        fn name(&self) -> &'static str {
            "nothing"
        }
    }

    #[test]
    fn defaults_are_unsupported() {
        let b = Nothing;
        let a = [1.0_f64];
        let view = MatrixView::new(&a, 1, 1, 1).unwrap();
        let x = VectorView::new(&a, 1, 1).unwrap();
        let mut y = [0.0];
        assert_eq!(
            b.gemv_f64(Op::NoTrans, view, x, &mut y),
            Err(BackendError::Unsupported { routine: "dgemv" })
        );
        assert!(b.dot_f64(x, x).is_err());
        assert_eq!(y, [0.0]);
    }

    #[test]
    fn accepted_passes_values_only() {
        let b = Nothing;
        assert_eq!(accepted(&b, "dot", Ok(2.0)), Some(2.0));
        assert_eq!(accepted::<f64>(&b, "dot", Err(BackendError::Failed { routine: "ddot", info: -1 })), None);
        assert_eq!(accepted::<()>(&b, "gemv", Err(BackendError::Unsupported { routine: "dgemv" })), None);
    }

    #[test]
    fn error_messages() {
        let e = BackendError::TooLarge { routine: "dgemv", value: 1_usize << 40 };
        assert_eq!(e.to_string(), "dgemv: 1099511627776 exceeds the backend index range");
    }
}
