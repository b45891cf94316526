//! Native and manual kernel paths must agree.
//!
//! `Reference` stands in for a native library: plain loops over the raw
//! view fields (slice, stride, increment), which is exactly what a BLAS
//! binding receives.

use std::sync::atomic::{AtomicUsize, Ordering};

use approx::assert_relative_eq;
use rowfact::{
    dot_with, gemv_with, ger_with, identity_matrix, outer_with, qr_with, BackendError, BackendResult, Matrix,
    MatrixView, MatrixViewMut, NativeBackend, Op, Orientation, Vector, VectorView,
};

#[derive(Default)]
struct Reference {
    gemv: AtomicUsize,
    ger: AtomicUsize,
    dot: AtomicUsize,
    qr: AtomicUsize,
}

impl Reference {
    fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

impl NativeBackend for Reference {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn gemv_f64(&self, op: Op, a: MatrixView<'_, f64>, x: VectorView<'_, f64>, y: &mut [f64]) -> BackendResult<()> {
        self.gemv.fetch_add(1, Ordering::SeqCst);
        let (data, stride, inc) = (a.as_slice(), a.stride(), x.inc());
        let xs = x.as_slice();
        for i in 0..a.rows() {
            for j in 0..a.cols() {
                let aij = data[i * stride + j];
                match op {
                    Op::NoTrans => y[i] += aij * xs[j * inc],
                    Op::Trans => y[j] += aij * xs[i * inc],
                }
            }
        }
        Ok(())
    }

    fn ger_f64(
        &self,
        a: &mut MatrixViewMut<'_, f64>,
        alpha: f64,
        x: VectorView<'_, f64>,
        y: VectorView<'_, f64>,
    ) -> BackendResult<()> {
        self.ger.fetch_add(1, Ordering::SeqCst);
        for i in 0..a.rows() {
            let xi = x[i];
            for (j, v) in a.row_mut(i).iter_mut().enumerate() {
                *v += alpha * xi * y[j];
            }
        }
        Ok(())
    }

    fn dot_f64(&self, x: VectorView<'_, f64>, y: VectorView<'_, f64>) -> BackendResult<f64> {
        self.dot.fetch_add(1, Ordering::SeqCst);
        Ok(x.iter().zip(y.iter()).map(|(a, b)| a * b).sum())
    }

    fn qr_f64(
        &self,
        a: MatrixView<'_, f64>,
        q: &mut MatrixViewMut<'_, f64>,
        r: &mut MatrixViewMut<'_, f64>,
    ) -> BackendResult<()> {
        self.qr.fetch_add(1, Ordering::SeqCst);
        let full_q = q.cols() == a.rows();
        let full_r = r.rows() == a.rows();
        let f = qr_with(None, &a.to_matrix(), full_q, full_r).map_err(|_| BackendError::Failed {
            routine: "dgeqrf",
            info: -1,
        })?;
        for i in 0..q.rows() {
            q.row_mut(i).copy_from_slice(f.q.row(i));
        }
        for i in 0..r.rows() {
            r.row_mut(i).copy_from_slice(f.r.row(i));
        }
        Ok(())
    }
}

/// Fails every call after touching nothing.
struct Broken;

impl NativeBackend for Broken {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn gemv_f64(&self, _: Op, _: MatrixView<'_, f64>, _: VectorView<'_, f64>, _: &mut [f64]) -> BackendResult<()> {
        Err(BackendError::Failed { routine: "dgemv", info: -6 })
    }

    fn ger_f64(
        &self,
        _: &mut MatrixViewMut<'_, f64>,
        _: f64,
        _: VectorView<'_, f64>,
        _: VectorView<'_, f64>,
    ) -> BackendResult<()> {
        Err(BackendError::Failed { routine: "dger", info: -9 })
    }

    fn qr_f64(
        &self,
        _: MatrixView<'_, f64>,
        _: &mut MatrixViewMut<'_, f64>,
        _: &mut MatrixViewMut<'_, f64>,
    ) -> BackendResult<()> {
        Err(BackendError::Failed { routine: "dgeqrf", info: 1 })
    }
}

fn filled(rows: usize, cols: usize) -> Matrix<f64> {
    Matrix::from_fn(rows, cols, |i, j| ((i * 37 + j * 11) % 23) as f64 / 7.0 - 1.5).unwrap()
}

fn ramp(n: usize, orientation: Orientation) -> Vector<f64> {
    let v: Vec<f64> = (0..n).map(|i| ((i % 13) as f64 - 6.0) / 4.0).collect();
    Vector::from_vec(v, orientation).unwrap()
}

fn assert_slices_close(a: &[f64], b: &[f64]) {
    assert_eq!(a.len(), b.len());
    for (i, (x, y)) in a.iter().zip(b).enumerate() {
        assert!((x - y).abs() < 1e-9 * (1.0 + y.abs()), "mismatch at {}: {} vs {}", i, x, y);
    }
}

// ── GEMV / GER ───────────────────────────────────────────────────────

#[test]
fn gemv_native_matches_manual_on_both_sides_of_threshold() {
    // 400x600 = 240_000 runs serially, 600x500 = 300_000 in parallel
    for &(m, n) in &[(400, 600), (600, 500), (100, 100)] {
        let a = filled(m, n);
        let backend = Reference::default();

        let x = ramp(n, Orientation::Column);
        let native = gemv_with(Some(&backend), Op::NoTrans, a.as_view(), x.as_view()).unwrap();
        let manual = gemv_with(None, Op::NoTrans, a.as_view(), x.as_view()).unwrap();
        assert_eq!(native.orientation(), Orientation::Column);
        assert_slices_close(native.as_slice(), manual.as_slice());

        let z = ramp(m, Orientation::Row);
        let native = gemv_with(Some(&backend), Op::Trans, a.as_view(), z.as_view()).unwrap();
        let manual = gemv_with(None, Op::Trans, a.as_view(), z.as_view()).unwrap();
        assert_eq!(manual.orientation(), Orientation::Row);
        assert_slices_close(native.as_slice(), manual.as_slice());

        assert_eq!(Reference::calls(&backend.gemv), 2);
    }
}

#[test]
fn gemv_on_strided_views() {
    let a = filled(50, 40);
    let window = a.view(5, 3, 30, 20).unwrap();
    let x = ramp(40, Orientation::Column);
    // every other element of x
    let xs = x.view(0, 20, 2).unwrap();
    let backend = Reference::default();
    let native = gemv_with(Some(&backend), Op::NoTrans, window, xs).unwrap();
    let manual = gemv_with(None, Op::NoTrans, window, xs).unwrap();
    assert_slices_close(native.as_slice(), manual.as_slice());

    let expected: Vec<f64> = (0..30)
        .map(|i| (0..20).map(|j| a[(5 + i, 3 + j)] * x[2 * j]).sum())
        .collect();
    assert_slices_close(manual.as_slice(), &expected);
}

#[test]
fn ger_native_matches_manual() {
    for &(m, n) in &[(300, 200), (600, 500)] {
        let x = ramp(m, Orientation::Column);
        let y = ramp(n, Orientation::Row);
        let mut native = filled(m, n);
        let mut manual = native.clone();
        let backend = Reference::default();
        ger_with(Some(&backend), &mut native.as_view_mut(), x.as_view(), y.as_view(), -0.75).unwrap();
        ger_with(None, &mut manual.as_view_mut(), x.as_view(), y.as_view(), -0.75).unwrap();
        assert_eq!(Reference::calls(&backend.ger), 1);
        assert_slices_close(native.as_slice(), manual.as_slice());
    }
}

#[test]
fn ger_touches_only_the_window() {
    let mut a = Matrix::<f64>::new(4, 4).unwrap();
    let x = Vector::from_slice(&[1.0, 2.0], Orientation::Column).unwrap();
    let y = Vector::from_slice(&[3.0, 4.0], Orientation::Row).unwrap();
    {
        let mut w = a.view_mut(1, 1, 2, 2).unwrap();
        ger_with(None, &mut w, x.as_view(), y.as_view(), 1.0).unwrap();
    }
    assert_eq!(a.row(0), &[0.0; 4]);
    assert_eq!(a.row(1), &[0.0, 3.0, 4.0, 0.0]);
    assert_eq!(a.row(2), &[0.0, 6.0, 8.0, 0.0]);
    assert_eq!(a.row(3), &[0.0; 4]);
}

#[test]
fn failing_backend_falls_back() {
    let a = filled(20, 30);
    let x = ramp(30, Orientation::Column);
    let y = gemv_with(Some(&Broken), Op::NoTrans, a.as_view(), x.as_view()).unwrap();
    let expected = gemv_with(None, Op::NoTrans, a.as_view(), x.as_view()).unwrap();
    assert_eq!(y, expected);

    let mut b = a.clone();
    let mut c = a.clone();
    let u = ramp(20, Orientation::Column);
    ger_with(Some(&Broken), &mut b.as_view_mut(), u.as_view(), x.as_view(), 2.0).unwrap();
    ger_with(None, &mut c.as_view_mut(), u.as_view(), x.as_view(), 2.0).unwrap();
    assert_eq!(b, c);
}

#[test]
fn shape_errors_never_reach_the_backend() {
    let backend = Reference::default();
    let a = filled(3, 4);
    let x = ramp(3, Orientation::Column);
    let err = gemv_with(Some(&backend), Op::NoTrans, a.as_view(), x.as_view()).unwrap_err();
    assert!(err.is_invalid_input());
    let mut b = filled(3, 4);
    assert!(ger_with(Some(&backend), &mut b.as_view_mut(), x.as_view(), x.as_view(), 1.0).is_err());
    assert_eq!(Reference::calls(&backend.gemv) + Reference::calls(&backend.ger), 0);
}

#[test]
fn integer_operands_use_the_manual_path() {
    let backend = Reference::default();
    let a = Matrix::from_rows(&[[1_i32, 2], [3, 4]]).unwrap();
    let x = Vector::from_slice(&[1_i32, -1], Orientation::Column).unwrap();
    let y = gemv_with(Some(&backend), Op::NoTrans, a.as_view(), x.as_view()).unwrap();
    assert_eq!(y.as_slice(), &[-1, -1]);
    assert_eq!(Reference::calls(&backend.gemv), 0);
}

#[test]
fn ger_on_integers_with_float_vectors() {
    let backend = Reference::default();
    let mut a = Matrix::<i32>::new(1, 1).unwrap();
    let x = Vector::from_slice(&[0.5_f64], Orientation::Column).unwrap();
    let y = Vector::from_slice(&[2.0_f64], Orientation::Row).unwrap();
    ger_with(Some(&backend), &mut a.as_view_mut(), x.as_view(), y.as_view(), 1.0).unwrap();
    assert_eq!(a[(0, 0)], 1);
    assert_eq!(Reference::calls(&backend.ger), 0);

    // each entry converts once, after the sum
    let mut b = Matrix::from_rows(&[[3_i64, -2], [0, 7]]).unwrap();
    let u = Vector::from_slice(&[0.25_f32, 0.5], Orientation::Column).unwrap();
    let w = Vector::from_slice(&[2.0_f32, 3.0], Orientation::Row).unwrap();
    ger_with(None, &mut b.as_view_mut(), u.as_view(), w.as_view(), 2.0).unwrap();
    // [3 + 1, -2 + 1.5], [0 + 2, 7 + 3], truncated toward zero
    assert_eq!(b.as_slice(), &[4, 0, 2, 10]);
}

#[test]
fn narrow_integers_promote_to_i32() {
    let a = Matrix::from_rows(&[[200_u8, 100], [1, 2]]).unwrap();
    let x = Vector::from_slice(&[2_u8, 3], Orientation::Column).unwrap();
    let y: Vector<i32> = gemv_with(None, Op::NoTrans, a.as_view(), x.as_view()).unwrap();
    assert_eq!(y.as_slice(), &[700, 8]);

    let s = Vector::from_slice(&[-1_i16, 4], Orientation::Row).unwrap();
    let z = s.mul_matrix(&a).unwrap();
    assert_eq!(z.as_slice(), &[-196, -92]);
}

// ── DOT / OUTER ──────────────────────────────────────────────────────

#[test]
fn dot_native_and_manual() {
    let backend = Reference::default();
    for &n in &[10, 1000, 600_000] {
        let x = ramp(n, Orientation::Row);
        let y = ramp(n, Orientation::Column);
        let native = dot_with(Some(&backend), x.as_view(), y.as_view()).unwrap();
        let manual = dot_with(None, x.as_view(), y.as_view()).unwrap();
        assert_relative_eq!(native, manual, max_relative = 1e-12);
    }
    assert_eq!(Reference::calls(&backend.dot), 3);
}

#[test]
fn outer_native_and_manual() {
    let backend = Reference::default();
    let x = ramp(30, Orientation::Column);
    let y = ramp(20, Orientation::Row);
    let native = outer_with(Some(&backend), x.as_view(), y.as_view()).unwrap();
    let manual = outer_with(None, x.as_view(), y.as_view()).unwrap();
    assert_eq!(native.shape(), (30, 20));
    assert_slices_close(native.as_slice(), manual.as_slice());
    assert_eq!(Reference::calls(&backend.ger), 1);
}

// ── QR through the backend ───────────────────────────────────────────

#[test]
fn qr_prefers_native_factorization() {
    let backend = Reference::default();
    let a = filled(9, 5);
    let f = qr_with(Some(&backend), &a, true, false).unwrap();
    assert_eq!(Reference::calls(&backend.qr), 1);
    assert_eq!(f.q.shape(), (9, 9));
    assert_eq!(f.r.shape(), (5, 5));
    assert_slices_close(
        f.q.transposed().matmul(&f.q).unwrap().as_slice(),
        identity_matrix::<f64>(9).unwrap().as_slice(),
    );
}

#[test]
fn qr_failure_reruns_manually_with_kernel_backend() {
    // Broken fails QR and every GEMV/GER; the result still comes out right
    let a = filled(6, 4);
    let f = qr_with(Some(&Broken), &a, false, false).unwrap();
    let expected = qr_with(None, &a, false, false).unwrap();
    assert_eq!(f, expected);
}

#[test]
fn qr_manual_path_uses_backend_kernels() {
    // only GEMV is native here: Householder runs manually and calls it once
    // per reflector
    struct Gemv64Only(AtomicUsize);
    impl NativeBackend for Gemv64Only {
        fn name(&self) -> &'static str {
            "gemv64"
        }
        fn gemv_f64(&self, op: Op, a: MatrixView<'_, f64>, x: VectorView<'_, f64>, y: &mut [f64]) -> BackendResult<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Reference::default().gemv_f64(op, a, x, y)
        }
    }
    let backend = Gemv64Only(AtomicUsize::new(0));
    let a = filled(6, 4);
    let f = qr_with(Some(&backend), &a, true, true).unwrap();
    // 3 reflectors with columns to their right, then 4 applied to Q
    assert_eq!(backend.0.load(Ordering::SeqCst), 3 + 4);
    let qr = f.q.matmul(&f.r).unwrap();
    assert_slices_close(qr.as_slice(), a.as_slice());
}
