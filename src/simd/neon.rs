//! NEON kernels for aarch64.
//!
//! NEON is baseline on aarch64: 128-bit registers, 2×f64 / 4×f32 lanes,
//! with fused multiply-add.

use core::arch::aarch64::*;

/// Dot product of two f64 slices with two FMA accumulators.
#[inline]
pub fn dot_f64(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let n = a.len();
    let chunks = n / 4;
    let mut sum = unsafe {
        let (ap, bp) = (a.as_ptr(), b.as_ptr());
        let mut acc0 = vdupq_n_f64(0.0);
        let mut acc1 = vdupq_n_f64(0.0);
        for c in 0..chunks {
            let off = c * 4;
            acc0 = vfmaq_f64(acc0, vld1q_f64(ap.add(off)), vld1q_f64(bp.add(off)));
            acc1 = vfmaq_f64(acc1, vld1q_f64(ap.add(off + 2)), vld1q_f64(bp.add(off + 2)));
        }
        vaddvq_f64(vaddq_f64(acc0, acc1))
    };
    for i in chunks * 4..n {
        sum += a[i] * b[i];
    }
    sum
}

/// AXPY: y[i] += alpha * x[i] via `vfmaq_f64`.
#[inline]
pub fn axpy_f64(y: &mut [f64], alpha: f64, x: &[f64]) {
    debug_assert_eq!(y.len(), x.len());
    let n = y.len();
    let chunks = n / 2;
    unsafe {
        let va = vdupq_n_f64(alpha);
        for c in 0..chunks {
            let off = c * 2;
            let vy = vld1q_f64(y.as_ptr().add(off));
            let vx = vld1q_f64(x.as_ptr().add(off));
            vst1q_f64(y.as_mut_ptr().add(off), vfmaq_f64(vy, va, vx));
        }
    }
    for i in chunks * 2..n {
        y[i] += alpha * x[i];
    }
}

/// Dot product of two f32 slices with two FMA accumulators.
#[inline]
pub fn dot_f32(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let n = a.len();
    let chunks = n / 8;
    let mut sum = unsafe {
        let (ap, bp) = (a.as_ptr(), b.as_ptr());
        let mut acc0 = vdupq_n_f32(0.0);
        let mut acc1 = vdupq_n_f32(0.0);
        for c in 0..chunks {
            let off = c * 8;
            acc0 = vfmaq_f32(acc0, vld1q_f32(ap.add(off)), vld1q_f32(bp.add(off)));
            acc1 = vfmaq_f32(acc1, vld1q_f32(ap.add(off + 4)), vld1q_f32(bp.add(off + 4)));
        }
        vaddvq_f32(vaddq_f32(acc0, acc1))
    };
    for i in chunks * 8..n {
        sum += a[i] * b[i];
    }
    sum
}

/// AXPY: y[i] += alpha * x[i] via `vfmaq_f32`.
#[inline]
pub fn axpy_f32(y: &mut [f32], alpha: f32, x: &[f32]) {
    debug_assert_eq!(y.len(), x.len());
    let n = y.len();
    let chunks = n / 4;
    unsafe {
        let va = vdupq_n_f32(alpha);
        for c in 0..chunks {
            let off = c * 4;
            let vy = vld1q_f32(y.as_ptr().add(off));
            let vx = vld1q_f32(x.as_ptr().add(off));
            vst1q_f32(y.as_mut_ptr().add(off), vfmaq_f32(vy, va, vx));
        }
    }
    for i in chunks * 4..n {
        y[i] += alpha * x[i];
    }
}
