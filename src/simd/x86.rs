//! x86_64 kernels.
//!
//! SSE2 (128-bit, 2×f64 / 4×f32) is baseline on x86_64 and always
//! available. When the crate is compiled with `target_feature = "avx"`
//! the 256-bit versions (4×f64 / 8×f32) replace them.

use core::arch::x86_64::*;

#[inline(always)]
unsafe fn hsum_pd(v: __m128d) -> f64 {
    _mm_cvtsd_f64(_mm_add_sd(v, _mm_unpackhi_pd(v, v)))
}

#[inline(always)]
unsafe fn hsum_ps(v: __m128) -> f32 {
    // [a, b, c, d] + [c, d, c, d] = [a+c, b+d, ..]
    let pairs = _mm_add_ps(v, _mm_movehl_ps(v, v));
    let odd = _mm_shuffle_ps(pairs, pairs, 0b01);
    _mm_cvtss_f32(_mm_add_ss(pairs, odd))
}

// ── f64 ─────────────────────────────────────────────────────────────

/// Dot product of two f64 slices using SSE2 with two accumulators.
#[cfg(not(target_feature = "avx"))]
#[inline]
pub fn dot_f64(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let n = a.len();
    let chunks = n / 4;
    let mut sum = unsafe {
        let (ap, bp) = (a.as_ptr(), b.as_ptr());
        let mut acc0 = _mm_setzero_pd();
        let mut acc1 = _mm_setzero_pd();
        for c in 0..chunks {
            let off = c * 4;
            acc0 = _mm_add_pd(acc0, _mm_mul_pd(_mm_loadu_pd(ap.add(off)), _mm_loadu_pd(bp.add(off))));
            acc1 = _mm_add_pd(acc1, _mm_mul_pd(_mm_loadu_pd(ap.add(off + 2)), _mm_loadu_pd(bp.add(off + 2))));
        }
        hsum_pd(_mm_add_pd(acc0, acc1))
    };
    for i in chunks * 4..n {
        sum += a[i] * b[i];
    }
    sum
}

/// Dot product of two f64 slices using AVX with two accumulators.
#[cfg(target_feature = "avx")]
#[inline]
pub fn dot_f64(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let n = a.len();
    let chunks = n / 8;
    let mut sum = unsafe {
        let (ap, bp) = (a.as_ptr(), b.as_ptr());
        let mut acc0 = _mm256_setzero_pd();
        let mut acc1 = _mm256_setzero_pd();
        for c in 0..chunks {
            let off = c * 8;
            acc0 = _mm256_add_pd(acc0, _mm256_mul_pd(_mm256_loadu_pd(ap.add(off)), _mm256_loadu_pd(bp.add(off))));
            acc1 = _mm256_add_pd(acc1, _mm256_mul_pd(_mm256_loadu_pd(ap.add(off + 4)), _mm256_loadu_pd(bp.add(off + 4))));
        }
        let acc = _mm256_add_pd(acc0, acc1);
        hsum_pd(_mm_add_pd(_mm256_castpd256_pd128(acc), _mm256_extractf128_pd(acc, 1)))
    };
    for i in chunks * 8..n {
        sum += a[i] * b[i];
    }
    sum
}

/// AXPY: y[i] += alpha * x[i] (SSE2).
#[cfg(not(target_feature = "avx"))]
#[inline]
pub fn axpy_f64(y: &mut [f64], alpha: f64, x: &[f64]) {
    debug_assert_eq!(y.len(), x.len());
    let n = y.len();
    let chunks = n / 2;
    unsafe {
        let va = _mm_set1_pd(alpha);
        for c in 0..chunks {
            let off = c * 2;
            let vy = _mm_loadu_pd(y.as_ptr().add(off));
            let vx = _mm_loadu_pd(x.as_ptr().add(off));
            _mm_storeu_pd(y.as_mut_ptr().add(off), _mm_add_pd(vy, _mm_mul_pd(va, vx)));
        }
    }
    for i in chunks * 2..n {
        y[i] += alpha * x[i];
    }
}

/// AXPY: y[i] += alpha * x[i] (AVX).
#[cfg(target_feature = "avx")]
#[inline]
pub fn axpy_f64(y: &mut [f64], alpha: f64, x: &[f64]) {
    debug_assert_eq!(y.len(), x.len());
    let n = y.len();
    let chunks = n / 4;
    unsafe {
        let va = _mm256_set1_pd(alpha);
        for c in 0..chunks {
            let off = c * 4;
            let vy = _mm256_loadu_pd(y.as_ptr().add(off));
            let vx = _mm256_loadu_pd(x.as_ptr().add(off));
            _mm256_storeu_pd(y.as_mut_ptr().add(off), _mm256_add_pd(vy, _mm256_mul_pd(va, vx)));
        }
    }
    for i in chunks * 4..n {
        y[i] += alpha * x[i];
    }
}

// ── f32 ─────────────────────────────────────────────────────────────

/// Dot product of two f32 slices using SSE2 with two accumulators.
#[cfg(not(target_feature = "avx"))]
#[inline]
pub fn dot_f32(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let n = a.len();
    let chunks = n / 8;
    let mut sum = unsafe {
        let (ap, bp) = (a.as_ptr(), b.as_ptr());
        let mut acc0 = _mm_setzero_ps();
        let mut acc1 = _mm_setzero_ps();
        for c in 0..chunks {
            let off = c * 8;
            acc0 = _mm_add_ps(acc0, _mm_mul_ps(_mm_loadu_ps(ap.add(off)), _mm_loadu_ps(bp.add(off))));
            acc1 = _mm_add_ps(acc1, _mm_mul_ps(_mm_loadu_ps(ap.add(off + 4)), _mm_loadu_ps(bp.add(off + 4))));
        }
        hsum_ps(_mm_add_ps(acc0, acc1))
    };
    for i in chunks * 8..n {
        sum += a[i] * b[i];
    }
    sum
}

/// Dot product of two f32 slices using AVX with two accumulators.
#[cfg(target_feature = "avx")]
#[inline]
pub fn dot_f32(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let n = a.len();
    let chunks = n / 16;
    let mut sum = unsafe {
        let (ap, bp) = (a.as_ptr(), b.as_ptr());
        let mut acc0 = _mm256_setzero_ps();
        let mut acc1 = _mm256_setzero_ps();
        for c in 0..chunks {
            let off = c * 16;
            acc0 = _mm256_add_ps(acc0, _mm256_mul_ps(_mm256_loadu_ps(ap.add(off)), _mm256_loadu_ps(bp.add(off))));
            acc1 = _mm256_add_ps(acc1, _mm256_mul_ps(_mm256_loadu_ps(ap.add(off + 8)), _mm256_loadu_ps(bp.add(off + 8))));
        }
        let acc = _mm256_add_ps(acc0, acc1);
        hsum_ps(_mm_add_ps(_mm256_castps256_ps128(acc), _mm256_extractf128_ps(acc, 1)))
    };
    for i in chunks * 16..n {
        sum += a[i] * b[i];
    }
    sum
}

/// AXPY: y[i] += alpha * x[i] (SSE2).
#[cfg(not(target_feature = "avx"))]
#[inline]
pub fn axpy_f32(y: &mut [f32], alpha: f32, x: &[f32]) {
    debug_assert_eq!(y.len(), x.len());
    let n = y.len();
    let chunks = n / 4;
    unsafe {
        let va = _mm_set1_ps(alpha);
        for c in 0..chunks {
            let off = c * 4;
            let vy = _mm_loadu_ps(y.as_ptr().add(off));
            let vx = _mm_loadu_ps(x.as_ptr().add(off));
            _mm_storeu_ps(y.as_mut_ptr().add(off), _mm_add_ps(vy, _mm_mul_ps(va, vx)));
        }
    }
    for i in chunks * 4..n {
        y[i] += alpha * x[i];
    }
}

/// AXPY: y[i] += alpha * x[i] (AVX).
#[cfg(target_feature = "avx")]
#[inline]
pub fn axpy_f32(y: &mut [f32], alpha: f32, x: &[f32]) {
    debug_assert_eq!(y.len(), x.len());
    let n = y.len();
    let chunks = n / 8;
    unsafe {
        let va = _mm256_set1_ps(alpha);
        for c in 0..chunks {
            let off = c * 8;
            let vy = _mm256_loadu_ps(y.as_ptr().add(off));
            let vx = _mm256_loadu_ps(x.as_ptr().add(off));
            _mm256_storeu_ps(y.as_mut_ptr().add(off), _mm256_add_ps(vy, _mm256_mul_ps(va, vx)));
        }
    }
    for i in chunks * 8..n {
        y[i] += alpha * x[i];
    }
}
