//! # rowfact
//!
//! Dense row-major linear algebra with runtime dimensions: matrices, oriented
//! vectors, strided views, GEMV/GER kernels with an optional native backend,
//! and blocked Cholesky, pivoted LU and Householder QR.
//!
//! ## Quick start
//!
//! ```
//! use rowfact::{cholesky, plu, qr, Matrix, Orientation, Vector};
//!
//! let a = Matrix::from_rows(&[[4, 2, 0], [2, 5, 3], [0, 3, 10]]).unwrap();
//!
//! // integer input promotes to f64
//! let l = cholesky(&a).unwrap();
//! assert_eq!(l[(0, 0)], 2.0);
//!
//! let (perm, lower, upper) = plu(&a).unwrap();
//! assert_eq!(perm.len(), 3);
//! assert!(lower.is_lower_triangular() && upper.is_upper_triangular());
//!
//! let f = qr(&a, true, true).unwrap();
//! assert!(rowfact::loosely_equal(&f.q.matmul(&f.r).unwrap(), &a));
//!
//! let x = Vector::from_slice(&[1.0, 0.0, -1.0], Orientation::Column).unwrap();
//! let y = a.mul_vector(&x).unwrap();
//! assert_eq!(y.as_slice(), &[4.0, -1.0, -10.0]);
//! ```
//!
//! ## Modules
//!
//! - [`matrix`] — `Matrix<T>`, a row-major `Vec<T>` with non-zero runtime
//!   dimensions, plus [`MatrixView`] / [`MatrixViewMut`] windows with an
//!   explicit row stride. Structural checks (`is_symmetric`,
//!   `is_upper_triangular`, ...), transposition, products and factories
//!   ([`identity_matrix`], [`permutation_matrix`], [`ones`]).
//!
//! - [`vector`] — `Vector<T>` with a [`Orientation::Row`] or
//!   [`Orientation::Column`] tag that decides which products are defined,
//!   and strided [`VectorView`] / [`VectorViewMut`].
//!
//! - [`kernels`] — [`gemv`], [`ger`], [`dot`] and [`outer`] over views. Each
//!   tries the installed [`NativeBackend`] for `f32`/`f64` operands and
//!   otherwise runs vectorized, optionally multithreaded loops.
//!
//! - [`linalg`] — [`cholesky`], [`plu`] and [`qr`]. Integers promote to
//!   `f64`; the `*_as` variants choose the float type explicitly.
//!
//! - [`params`] — block size, parallel thresholds and tolerances.
//!
//! - [`traits`] — element trait hierarchy:
//!   - [`Scalar`] — all matrix elements (`Copy + PartialOrd + Num + Send + Sync`)
//!   - [`FloatScalar`] — `f32` / `f64`, the types decompositions compute in
//!   - [`Element`] — a `Scalar` with a default float type
//!   - [`Promote`] — common type of two element types
//!
//! ## Errors
//!
//! Every fallible operation returns [`Result`] with a [`LinalgError`].
//! [`LinalgError::is_invalid_input`] separates precondition failures (shape,
//! length, range, symmetry) from [`LinalgError::is_numerical`] failures found
//! mid-factorization (`Singular`, `NotPositiveDefinite`).
//!
//! ## Logging
//!
//! Backend dispatch logs through the [`log`] facade under the target
//! `rowfact_perf`: native successes at `trace`, unsupported routines at
//! `debug` and backend failures at `warn` before falling back.
//!
//! ## Cargo features
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `rayon` | yes     | Parallel outer loops above the [`params`] thresholds |
//! | `blas`  | no      | [`BlasBackend`] over the `blas` / `lapack` interface crates, installed as the default backend |

pub mod kernels;
pub mod linalg;
pub mod matrix;
pub mod params;
pub mod traits;
pub mod vector;

mod error;
mod par;
mod simd;

pub use error::{LinalgError, Result};
#[cfg(feature = "blas")]
pub use kernels::BlasBackend;
pub use kernels::{
    clear_native_backend, dot, dot_with, gemv, gemv_with, ger, ger_with, native_backend, outer, outer_with,
    set_native_backend, BackendError, BackendResult, NativeBackend, Op,
};
pub use linalg::{cholesky, cholesky_as, plu, plu_as, qr, qr_as, qr_with, PluFactors, Qr};
pub use matrix::{
    identity_matrix, loosely_equal, loosely_equal_eps, ones, permutation_matrix, Matrix, MatrixView, MatrixViewMut,
};
pub use traits::{is_close, Element, FloatScalar, Promote, Promoted, Scalar};
pub use vector::{Orientation, Vector, VectorView, VectorViewMut};
