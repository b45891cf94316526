//! Generic scalar fallback implementations for SIMD-dispatched operations.
//!
//! Used for integer element types and on architectures without a
//! dedicated kernel module.

use crate::traits::Scalar;

/// Dot product of two slices (scalar fallback).
#[inline]
pub fn dot<T: Scalar>(a: &[T], b: &[T]) -> T {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .fold(T::zero(), |acc, (&x, &y)| acc + x * y)
}

/// AXPY: y[i] += alpha * x[i] (scalar fallback).
#[inline]
pub fn axpy<T: Scalar>(y: &mut [T], alpha: T, x: &[T]) {
    debug_assert_eq!(y.len(), x.len());
    for (yi, &xi) in y.iter_mut().zip(x.iter()) {
        *yi = *yi + alpha * xi;
    }
}
