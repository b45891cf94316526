//! Manual kernel paths: vectorized inner loops, rows or columns split
//! across threads once the problem reaches the parallel thresholds.

use num_traits::AsPrimitive;

use crate::matrix::{MatrixView, MatrixViewMut};
use crate::par::{self, Parallelism};
use crate::params::{LINEAR_PAR_THRESHOLD, QUADRATIC_PAR_THRESHOLD};
use crate::simd;
use crate::traits::Scalar;
use crate::vector::VectorView;

use super::Op;

/// Elements per task in the parallel dot reduction.
const DOT_CHUNK: usize = 4096;

fn convert<S, O>(x: VectorView<'_, S>) -> Vec<O>
where
    S: Scalar + AsPrimitive<O>,
    O: Scalar,
{
    x.iter().map(|&v| v.as_()).collect()
}

/// `Σ row[j]·x[j]`, vectorized when `row` already has the output type.
#[inline]
fn row_dot<T, O>(row: &[T], x: &[O]) -> O
where
    T: Scalar + AsPrimitive<O>,
    O: Scalar,
{
    match simd::slice_as::<T, O>(row) {
        Some(row) => simd::dot(row, x),
        None => row.iter().zip(x).fold(O::zero(), |acc, (&a, &b)| {
            let a: O = a.as_();
            acc + a * b
        }),
    }
}

/// `y[j] += alpha·row[j]`.
#[inline]
fn row_axpy<T, O>(y: &mut [O], alpha: O, row: &[T])
where
    T: Scalar + AsPrimitive<O>,
    O: Scalar,
{
    match simd::slice_as::<T, O>(row) {
        Some(row) => simd::axpy(y, alpha, row),
        None => {
            for (dst, &a) in y.iter_mut().zip(row) {
                let a: O = a.as_();
                *dst = *dst + alpha * a;
            }
        }
    }
}

pub(crate) fn gemv<T, U, O>(op: Op, a: MatrixView<'_, T>, x: VectorView<'_, U>) -> Vec<O>
where
    T: Scalar + AsPrimitive<O>,
    U: Scalar + AsPrimitive<O>,
    O: Scalar,
{
    let xo: Vec<O> = convert(x);
    let (rows, cols) = a.shape();
    let par = Parallelism::above(rows * cols, QUADRATIC_PAR_THRESHOLD);
    log::trace!(target: "rowfact_perf", "gemv {:?} {}x{}: manual {:?}", op, rows, cols, par);
    match op {
        Op::NoTrans => par::map_collect(rows, |i| row_dot(a.row(i), &xo), par),
        // one task per output column, walking down the rows
        Op::Trans if par.is_parallel() => par::map_collect(
            cols,
            |j| {
                (0..rows).fold(O::zero(), |acc, i| {
                    let aij: O = a[(i, j)].as_();
                    acc + xo[i] * aij
                })
            },
            par,
        ),
        // same summation order, but streaming whole rows
        Op::Trans => {
            let mut y = vec![O::zero(); cols];
            for (i, &xi) in xo.iter().enumerate() {
                row_axpy(&mut y, xi, a.row(i));
            }
            y
        }
    }
}

/// `A += alpha·x·yᵗ`. The product is formed in `P` and each updated entry
/// is converted back to `T` once, so integer matrices with float vectors
/// round the sum rather than the operands.
pub(crate) fn ger<T, U, P>(a: &mut MatrixViewMut<'_, T>, alpha: P, x: VectorView<'_, U>, y: VectorView<'_, U>)
where
    T: Scalar + AsPrimitive<P>,
    U: Scalar + AsPrimitive<P>,
    P: Scalar + AsPrimitive<T>,
{
    let xp: Vec<P> = convert(x);
    let yp: Vec<P> = convert(y);
    let (rows, cols, stride) = (a.rows(), a.cols(), a.stride());
    let par = Parallelism::above(rows * cols, QUADRATIC_PAR_THRESHOLD);
    log::trace!(target: "rowfact_perf", "ger {}x{}: manual {:?}", rows, cols, par);
    par::for_each_row_mut(
        a.as_mut_slice(),
        stride,
        rows,
        cols,
        |i, row| {
            let scale = alpha * xp[i];
            match simd::slice_as_mut::<T, P>(row) {
                Some(row) => simd::axpy(row, scale, &yp),
                None => {
                    for (dst, &yj) in row.iter_mut().zip(&yp) {
                        let cur: P = dst.as_();
                        *dst = (cur + scale * yj).as_();
                    }
                }
            }
        },
        par,
    );
}

#[inline]
fn dot_parallelism(n: usize) -> Parallelism {
    Parallelism::beyond(n, LINEAR_PAR_THRESHOLD)
}

pub(crate) fn dot<T, U, O>(x: VectorView<'_, T>, y: VectorView<'_, U>) -> O
where
    T: Scalar + AsPrimitive<O>,
    U: Scalar + AsPrimitive<O>,
    O: Scalar,
{
    let n = x.len();
    let par = dot_parallelism(n);
    let xs = x.as_contiguous().and_then(|s| simd::slice_as::<T, O>(s));
    let ys = y.as_contiguous().and_then(|s| simd::slice_as::<U, O>(s));
    if let (Some(xs), Some(ys)) = (xs, ys) {
        let chunks = (n + DOT_CHUNK - 1) / DOT_CHUNK;
        return par::sum(
            chunks,
            |c| {
                let start = c * DOT_CHUNK;
                let end = (start + DOT_CHUNK).min(n);
                simd::dot(&xs[start..end], &ys[start..end])
            },
            par,
        );
    }
    par::sum(
        n,
        |i| {
            let xi: O = x[i].as_();
            let yi: O = y[i].as_();
            xi * yi
        },
        par,
    )
}

/// Row-major `x.len() x y.len()` buffer holding `x·yᵗ`.
pub(crate) fn outer<T, U, O>(x: VectorView<'_, T>, y: VectorView<'_, U>) -> Vec<O>
where
    T: Scalar + AsPrimitive<O>,
    U: Scalar + AsPrimitive<O>,
    O: Scalar,
{
    let xo: Vec<O> = convert(x);
    let yo: Vec<O> = convert(y);
    let (rows, cols) = (xo.len(), yo.len());
    let mut data = vec![O::zero(); rows * cols];
    par::for_each_row_mut(
        &mut data,
        cols,
        rows,
        cols,
        |i, row| {
            let xi = xo[i];
            for (dst, &yj) in row.iter_mut().zip(&yo) {
                *dst = xi * yj;
            }
        },
        Parallelism::above(rows * cols, QUADRATIC_PAR_THRESHOLD),
    );
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix;

    fn sample(rows: usize, cols: usize) -> Matrix<f64> {
        Matrix::from_fn(rows, cols, |i, j| ((i * 7 + j * 3) % 11) as f64 - 5.0).unwrap()
    }

    #[test]
    fn trans_paths_agree() {
        // 600 x 500 crosses the quadratic threshold
        let a = sample(600, 500);
        let x: Vec<f64> = (0..600).map(|i| (i % 5) as f64 * 0.25).collect();
        let xv = VectorView::new(&x, 600, 1).unwrap();
        let par: Vec<f64> = gemv(Op::Trans, a.as_view(), xv);

        let mut serial = vec![0.0; 500];
        for i in 0..600 {
            for j in 0..500 {
                serial[j] += x[i] * a[(i, j)];
            }
        }
        for (p, s) in par.iter().zip(&serial) {
            assert!((p - s).abs() < 1e-9);
        }
    }

    #[test]
    fn mixed_types_convert_before_multiplying() {
        let a = Matrix::from_rows(&[[1_i32, 2], [3, 4]]).unwrap();
        let x = [0.5_f32, 0.25];
        let y: Vec<f32> = gemv(Op::NoTrans, a.as_view(), VectorView::new(&x, 2, 1).unwrap());
        assert_eq!(y, vec![1.0, 2.5]);
        let y: Vec<f32> = gemv(Op::Trans, a.as_view(), VectorView::new(&x, 2, 1).unwrap());
        assert_eq!(y, vec![1.25, 2.0]);
    }

    #[test]
    fn ger_respects_stride() {
        let mut m = Matrix::<f64>::new(3, 4).unwrap();
        {
            let mut block = m.view_mut(1, 1, 2, 3).unwrap();
            let x = [1.0, 2.0];
            let y = [1.0, 0.0, -1.0];
            ger(
                &mut block,
                2.0_f64,
                VectorView::new(&x, 2, 1).unwrap(),
                VectorView::new(&y, 3, 1).unwrap(),
            );
        }
        assert_eq!(m.row(0), &[0.0; 4]);
        assert_eq!(m.row(1), &[0.0, 2.0, 0.0, -2.0]);
        assert_eq!(m.row(2), &[0.0, 4.0, 0.0, -4.0]);
    }

    #[test]
    fn ger_integer_matrix_rounds_once() {
        let mut m = Matrix::from_rows(&[[0_i32, 10], [1, -3]]).unwrap();
        let x = [0.5_f64, 0.25];
        let y = [2.0_f64, 3.0];
        ger(
            &mut m.as_view_mut(),
            1.0_f64,
            VectorView::new(&x, 2, 1).unwrap(),
            VectorView::new(&y, 2, 1).unwrap(),
        );
        // 0 + 1.0, 10 + 1.5, 1 + 0.5, -3 + 0.75, truncated toward zero
        assert_eq!(m.as_slice(), &[1, 11, 1, -2]);
    }

    #[test]
    fn dot_goes_parallel_past_the_linear_threshold() {
        assert!(!dot_parallelism(LINEAR_PAR_THRESHOLD).is_parallel());
        #[cfg(feature = "rayon")]
        assert!(dot_parallelism(LINEAR_PAR_THRESHOLD + 1).is_parallel());
    }

    #[test]
    fn dot_chunked_and_strided() {
        let n = 10_000;
        let x: Vec<f64> = (0..n).map(|i| (i % 3) as f64).collect();
        let ones = vec![1.0_f64; 2 * n];
        let expected: f64 = x.iter().sum();
        let contiguous: f64 = dot(VectorView::new(&x, n, 1).unwrap(), VectorView::new(&ones, n, 1).unwrap());
        let strided: f64 = dot(VectorView::new(&x, n, 1).unwrap(), VectorView::new(&ones, n, 2).unwrap());
        assert_eq!(contiguous, expected);
        assert_eq!(strided, expected);
    }

    #[test]
    fn outer_fills_every_cell() {
        let x = [1_i64, -2];
        let y = [3_i64, 4, 5];
        let m: Vec<i64> = outer(VectorView::new(&x, 2, 1).unwrap(), VectorView::new(&y, 3, 1).unwrap());
        assert_eq!(m, vec![3, 4, 5, -6, -8, -10]);
    }
}
