//! Dense factorizations.
//!
//! All three take any element type and compute in a float type: integers
//! promote to `f64` and floats keep their width. The `*_as` variants pick
//! the result type explicitly.
//!
//! | Function | Input | Result |
//! |----------|-------|--------|
//! | [`cholesky`] | symmetric positive definite | `L` with `A = L·Lᵗ` |
//! | [`plu`] | square | `(perm, L, U)` with `P·A = L·U` |
//! | [`qr`] | any non-empty | [`Qr`] with `A = Q·R` |
//!
//! Cholesky and PLU are blocked in panels of
//! [`BLOCK_SIZE`](crate::params::BLOCK_SIZE) columns. QR applies each
//! Householder reflector through [`gemv`](crate::gemv) and
//! [`ger`](crate::ger), so it runs on the native backend when one is
//! installed.

pub(crate) mod cholesky;
pub(crate) mod plu;
pub(crate) mod qr;

pub use cholesky::{cholesky, cholesky_as};
pub use plu::{plu, plu_as, PluFactors};
pub use qr::{qr, qr_as, qr_with, Qr};
