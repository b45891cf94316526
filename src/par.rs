//! Fork-join helpers over row-major buffers.
//!
//! Every helper takes a [`Parallelism`] and runs on the rayon pool only when
//! it is `Rayon`. Without the `rayon` feature only `Parallelism::None`
//! exists and all helpers degrade to plain loops with identical results.
//!
//! Parallel loops hand each worker a disjoint `&mut` row obtained from
//! `chunks_mut`, so no locking is ever needed.

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::traits::Scalar;

/// Execution policy for a single loop.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Parallelism {
    /// Run on the calling thread.
    None,
    /// Split the loop across the global rayon pool.
    #[cfg(feature = "rayon")]
    Rayon,
}

impl Parallelism {
    /// `Rayon` when `cond` holds and the feature is enabled, else `None`.
    #[inline]
    pub fn when(cond: bool) -> Self {
        #[cfg(feature = "rayon")]
        {
            if cond {
                return Parallelism::Rayon;
            }
        }
        #[cfg(not(feature = "rayon"))]
        let _ = cond;
        Parallelism::None
    }

    /// `Rayon` once `work` reaches `threshold`.
    #[inline]
    pub fn above(work: usize, threshold: usize) -> Self {
        Self::when(work >= threshold)
    }

    /// `Rayon` once `work` is strictly greater than `threshold`.
    #[inline]
    pub fn beyond(work: usize, threshold: usize) -> Self {
        Self::when(work > threshold)
    }

    #[inline]
    pub fn is_parallel(self) -> bool {
        self != Parallelism::None
    }
}

/// Call `op(i, row)` for each of the `rows` rows in a strided buffer.
///
/// `data` starts at row 0; row `i` begins at `i * stride` and `row` is
/// trimmed to its first `cols` elements.
pub(crate) fn for_each_row_mut<T, F>(
    data: &mut [T],
    stride: usize,
    rows: usize,
    cols: usize,
    op: F,
    par: Parallelism,
) where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    if rows == 0 || cols == 0 {
        return;
    }
    let used = (rows - 1) * stride + cols;
    let data = &mut data[..used];
    match par {
        Parallelism::None => {
            for (i, chunk) in data.chunks_mut(stride).enumerate() {
                op(i, &mut chunk[..cols]);
            }
        }
        #[cfg(feature = "rayon")]
        Parallelism::Rayon => {
            data.par_chunks_mut(stride)
                .enumerate()
                .for_each(|(i, chunk)| op(i, &mut chunk[..cols]));
        }
    }
}

/// Like [`for_each_row_mut`] but walks two equally-shaped contiguous
/// buffers (row length `cols`) in lockstep.
pub(crate) fn for_each_row_pair_mut<T, F>(
    a: &mut [T],
    b: &mut [T],
    cols: usize,
    op: F,
    par: Parallelism,
) where
    T: Send,
    F: Fn(usize, &mut [T], &mut [T]) + Send + Sync,
{
    debug_assert_eq!(a.len(), b.len());
    if cols == 0 {
        return;
    }
    match par {
        Parallelism::None => {
            for (i, (ra, rb)) in a.chunks_mut(cols).zip(b.chunks_mut(cols)).enumerate() {
                op(i, ra, rb);
            }
        }
        #[cfg(feature = "rayon")]
        Parallelism::Rayon => {
            a.par_chunks_mut(cols)
                .zip(b.par_chunks_mut(cols))
                .enumerate()
                .for_each(|(i, (ra, rb))| op(i, ra, rb));
        }
    }
}

/// Hand each owned item to `op` together with its position.
///
/// Used when the work units are disjoint `&mut` pieces carved out up front
/// (e.g. column strips of several rows at once).
pub(crate) fn for_each_item<I, F>(items: Vec<I>, op: F, par: Parallelism)
where
    I: Send,
    F: Fn(usize, I) + Send + Sync,
{
    match par {
        Parallelism::None => {
            for (i, item) in items.into_iter().enumerate() {
                op(i, item);
            }
        }
        #[cfg(feature = "rayon")]
        Parallelism::Rayon => {
            items
                .into_par_iter()
                .enumerate()
                .for_each(|(i, item)| op(i, item));
        }
    }
}

/// Evaluate `op` for every index in `0..n` and collect the results in order.
pub(crate) fn map_collect<R, F>(n: usize, op: F, par: Parallelism) -> Vec<R>
where
    R: Send,
    F: Fn(usize) -> R + Send + Sync,
{
    match par {
        Parallelism::None => (0..n).map(op).collect(),
        #[cfg(feature = "rayon")]
        Parallelism::Rayon => (0..n).into_par_iter().map(op).collect(),
    }
}

/// Sum `op(i)` over `0..n`.
pub(crate) fn sum<T, F>(n: usize, op: F, par: Parallelism) -> T
where
    T: Scalar,
    F: Fn(usize) -> T + Send + Sync,
{
    match par {
        Parallelism::None => (0..n).fold(T::zero(), |acc, i| acc + op(i)),
        #[cfg(feature = "rayon")]
        Parallelism::Rayon => (0..n)
            .into_par_iter()
            .map(op)
            .reduce(T::zero, |a, b| a + b),
    }
}
