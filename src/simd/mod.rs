//! SIMD-accelerated inner loops with compile-time architecture dispatch.
//!
//! This module is private. It provides the two primitives every row-major
//! algorithm in the crate bottoms out in: a dot product over two contiguous
//! slices and an AXPY update along a row.
//!
//! ## Dispatch strategy
//!
//! TypeId-based dispatch at monomorphization time: for `f32`/`f64`, the
//! compiler selects the architecture kernel and dead-code-eliminates the
//! fallback. Integers use the scalar loops in [`scalar`].
//!
//! | Arch      | ISA          | f64 lanes | f32 lanes |
//! |-----------|--------------|-----------|-----------|
//! | `x86_64`  | SSE2         | 2         | 4         |
//! | `x86_64`  | AVX          | 4         | 8         |
//! | `aarch64` | NEON         | 2         | 4         |
//! | other     | scalar       | 1         | 1         |
//!
//! AVX is picked when the crate is compiled with `target_feature = "avx"`
//! (e.g. `-C target-cpu=native`).

pub(crate) mod scalar;

#[cfg(target_arch = "x86_64")]
mod x86;
#[cfg(target_arch = "x86_64")]
use x86 as arch;

#[cfg(target_arch = "aarch64")]
mod neon;
#[cfg(target_arch = "aarch64")]
use neon as arch;

use core::any::TypeId;

use crate::traits::Scalar;

/// Reinterpret `&[T]` as `&[U]` when `T` and `U` are the same type.
#[inline(always)]
pub(crate) fn slice_as<T: 'static, U: 'static>(s: &[T]) -> Option<&[U]> {
    if TypeId::of::<T>() == TypeId::of::<U>() {
        // Safety: identical types have identical layout.
        Some(unsafe { &*(s as *const [T] as *const [U]) })
    } else {
        None
    }
}

/// Mutable counterpart of [`slice_as`].
#[inline(always)]
pub(crate) fn slice_as_mut<T: 'static, U: 'static>(s: &mut [T]) -> Option<&mut [U]> {
    if TypeId::of::<T>() == TypeId::of::<U>() {
        // Safety: identical types have identical layout.
        Some(unsafe { &mut *(s as *mut [T] as *mut [U]) })
    } else {
        None
    }
}

/// Reinterpret a value of `T` as `U` when they are the same type.
#[inline(always)]
pub(crate) fn value_as<T: Copy + 'static, U: Copy + 'static>(v: T) -> Option<U> {
    if TypeId::of::<T>() == TypeId::of::<U>() {
        // Safety: identical types have identical layout.
        Some(unsafe { *(&v as *const T as *const U) })
    } else {
        None
    }
}

/// Dot product of two equal-length slices.
#[inline]
pub(crate) fn dot<T: Scalar>(a: &[T], b: &[T]) -> T {
    debug_assert_eq!(a.len(), b.len());
    #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
    {
        if let (Some(a), Some(b)) = (slice_as::<T, f64>(a), slice_as::<T, f64>(b)) {
            if let Some(r) = value_as::<f64, T>(arch::dot_f64(a, b)) {
                return r;
            }
        }
        if let (Some(a), Some(b)) = (slice_as::<T, f32>(a), slice_as::<T, f32>(b)) {
            if let Some(r) = value_as::<f32, T>(arch::dot_f32(a, b)) {
                return r;
            }
        }
    }
    scalar::dot(a, b)
}

/// Sum of squares of a slice.
#[inline]
pub(crate) fn sum_sq<T: Scalar>(a: &[T]) -> T {
    dot(a, a)
}

/// AXPY: `y[i] += alpha * x[i]`.
///
/// Short slices take the scalar loop; register setup dominates below 8.
#[inline]
pub(crate) fn axpy<T: Scalar>(y: &mut [T], alpha: T, x: &[T]) {
    debug_assert_eq!(y.len(), x.len());
    if y.len() < 8 {
        scalar::axpy(y, alpha, x);
        return;
    }
    #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
    {
        if let (Some(x), Some(a)) = (slice_as::<T, f64>(x), value_as::<T, f64>(alpha)) {
            if let Some(y) = slice_as_mut::<T, f64>(y) {
                arch::axpy_f64(y, a, x);
                return;
            }
        }
        if let (Some(x), Some(a)) = (slice_as::<T, f32>(x), value_as::<T, f32>(alpha)) {
            if let Some(y) = slice_as_mut::<T, f32>(y) {
                arch::axpy_f32(y, a, x);
                return;
            }
        }
    }
    scalar::axpy(y, alpha, x);
}

/// AXPY with negated scale: `y[i] -= alpha * x[i]`.
#[inline]
pub(crate) fn axpy_neg<T: Scalar>(y: &mut [T], alpha: T, x: &[T]) {
    axpy(y, T::zero() - alpha, x);
}
