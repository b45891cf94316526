use num_traits::AsPrimitive;

use crate::error::{LinalgError, Result};
use crate::matrix::Matrix;
use crate::par::{for_each_item, for_each_row_mut, for_each_row_pair_mut, Parallelism};
use crate::params::{BLOCK_SIZE, PIVOT_TOLERANCE, PLU_EXTRACT_PAR_ORDER, PLU_PANEL_PAR_ROWS, PLU_TRAILING_PAR};
use crate::simd;
use crate::traits::{Element, FloatScalar, Scalar};

/// Row permutation, unit lower factor and upper factor of a PLU
/// decomposition.
pub type PluFactors<R> = (Vec<u32>, Matrix<R>, Matrix<R>);

// ---------------------------------------------------------------------------
// Public functions
// ---------------------------------------------------------------------------

/// Blocked LU decomposition with partial pivoting: `P·A = L·U`.
///
/// Returns `(perm, L, U)`: row `i` of `P·A` is row `perm[i]` of `A`, `L` is
/// unit lower triangular and `U` is upper triangular with zeros below the
/// diagonal. Integer input is promoted to `f64`.
///
/// Fails with [`LinalgError::InvalidInput`] for non-square input and with
/// [`LinalgError::Singular`] when the largest candidate pivot of a column
/// is within `1e-9` of zero.
///
/// # Example
///
/// ```
/// use rowfact::{loosely_equal, permutation_matrix, plu, Matrix};
///
/// let a = Matrix::from_rows(&[[1, 2], [3, 4]]).unwrap();
/// let (perm, l, u) = plu(&a).unwrap();
/// assert_eq!(perm, vec![1, 0]);
/// assert_eq!(l.as_slice(), &[1.0, 0.0, 1.0 / 3.0, 1.0]);
/// assert_eq!(u.row(0), &[3.0, 4.0]);
///
/// let p: Matrix<f64> = permutation_matrix(&perm).unwrap();
/// let pa = p.matmul(&a.cast::<f64>()).unwrap();
/// assert!(loosely_equal(&pa, &l.matmul(&u).unwrap()));
/// ```
pub fn plu<T: Element>(a: &Matrix<T>) -> Result<PluFactors<T::Float>> {
    factor(a.map(|x| x.to_float()))
}

/// [`plu`] computed in an explicitly chosen float type.
pub fn plu_as<R, T>(a: &Matrix<T>) -> Result<PluFactors<R>>
where
    R: FloatScalar,
    T: Scalar + AsPrimitive<R>,
{
    factor(a.cast::<R>())
}

/// Convenience methods on square matrices.
impl<T: Element> Matrix<T> {
    /// See [`plu`].
    #[inline]
    pub fn plu(&self) -> Result<PluFactors<T::Float>> {
        plu(self)
    }
}

// ---------------------------------------------------------------------------
// Blocked right-looking elimination
// ---------------------------------------------------------------------------

/// Works on a private copy `U` of the input. Each panel of `BLOCK_SIZE`
/// columns is pivoted and eliminated column by column, touching only panel
/// columns; the rows of the panel are then finished to the right (U12), and
/// everything below and right of the panel gets one deferred rank-`b`
/// update.
fn factor<R: FloatScalar>(mut a: Matrix<R>) -> Result<PluFactors<R>> {
    if a.is_empty() {
        return Ok((Vec::new(), Matrix::default(), Matrix::default()));
    }
    if !a.is_square() {
        return Err(LinalgError::InvalidInput("plu requires a square matrix"));
    }
    let n = a.rows();
    if u32::try_from(n).is_err() {
        return Err(LinalgError::InvalidInput("plu order exceeds the permutation index range"));
    }

    let tol = R::from_f64(PIVOT_TOLERANCE);
    let mut perm: Vec<u32> = (0..n).map(|i| i as u32).collect();
    let mut l = vec![R::zero(); n * n];
    let u = a.as_mut_slice();
    log::trace!(target: "rowfact_perf", "plu n={} blocks={}", n, (n + BLOCK_SIZE - 1) / BLOCK_SIZE);

    for ib in (0..n).step_by(BLOCK_SIZE) {
        let block_end = (ib + BLOCK_SIZE).min(n);

        for i in ib..block_end {
            // ── Pivot ──
            let mut p = i;
            let mut max = u[i * n + i].abs();
            for r in i + 1..n {
                let v = u[r * n + i].abs();
                if v > max {
                    max = v;
                    p = r;
                }
            }
            if max <= tol {
                return Err(LinalgError::Singular);
            }
            if p != i {
                let (top, bottom) = u.split_at_mut(p * n);
                top[i * n..(i + 1) * n].swap_with_slice(&mut bottom[..n]);
                let (top, bottom) = l.split_at_mut(p * n);
                top[i * n..i * n + i].swap_with_slice(&mut bottom[..i]);
                perm.swap(i, p);
            }

            // ── Panel elimination ──
            let (head, u_below) = u.split_at_mut((i + 1) * n);
            let u_i = &head[i * n..];
            let pivot = u_i[i];
            let l_below = &mut l[(i + 1) * n..];
            let par = Parallelism::when(n - i - 1 > PLU_PANEL_PAR_ROWS);
            for_each_row_pair_mut(
                u_below,
                l_below,
                n,
                |_, ru, rl| {
                    let mult = ru[i] / pivot;
                    rl[i] = mult;
                    simd::axpy_neg(&mut ru[i + 1..block_end], mult, &u_i[i + 1..block_end]);
                },
                par,
            );
        }

        if block_end == n {
            continue;
        }
        let par = Parallelism::when(n - block_end > PLU_TRAILING_PAR);

        // ── U12: finish the panel rows right of the panel ──
        // Rows depend on earlier panel rows, columns are independent, so
        // work is split into column strips carrying every panel row.
        let strips = (n - block_end + BLOCK_SIZE - 1) / BLOCK_SIZE;
        let mut buckets: Vec<Vec<&mut [R]>> = (0..strips).map(|_| Vec::with_capacity(block_end - ib)).collect();
        for row in u[ib * n..block_end * n].chunks_mut(n) {
            for (c, piece) in row[block_end..].chunks_mut(BLOCK_SIZE).enumerate() {
                buckets[c].push(piece);
            }
        }
        let l_ro = &l[..];
        for_each_item(
            buckets,
            |_, mut rows: Vec<&mut [R]>| {
                for r in 1..rows.len() {
                    let i = ib + r;
                    let (done, rest) = rows.split_at_mut(r);
                    let target = &mut *rest[0];
                    for (kk, src) in done.iter().enumerate() {
                        simd::axpy_neg(target, l_ro[i * n + ib + kk], &src[..]);
                    }
                }
            },
            par,
        );

        // ── Trailing update ──
        let (top, bottom) = u.split_at_mut(block_end * n);
        let top = &*top;
        for_each_row_mut(
            bottom,
            n,
            n - block_end,
            n,
            |off, ru| {
                let i = block_end + off;
                for k in ib..block_end {
                    let mult = l_ro[i * n + k];
                    if mult.abs() <= tol {
                        continue;
                    }
                    simd::axpy_neg(&mut ru[block_end..], mult, &top[k * n + block_end..(k + 1) * n]);
                }
            },
            par,
        );
    }

    if u[n * n - 1].abs() <= tol {
        return Err(LinalgError::Singular);
    }

    // ── Extract ──
    let par = Parallelism::when(n > PLU_EXTRACT_PAR_ORDER);
    for_each_row_mut(u, n, n, n, |i, row| row[..i].fill(R::zero()), par);
    for i in 0..n {
        l[i * n + i] = R::one();
    }

    Ok((perm, Matrix::from_vec(n, n, l)?, a))
}
