use num_traits::AsPrimitive;

use crate::error::{LinalgError, Result};
use crate::par::{self, Parallelism};
use crate::params::{BLOCK_SIZE, TRANSPOSE_PAR_THRESHOLD};
use crate::traits::Scalar;

use super::Matrix;

impl<T: Scalar> Matrix<T> {
    /// Set every element to `value`.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Apply `f` to every element, producing a matrix of the same shape.
    ///
    /// ```
    /// use rowfact::Matrix;
    /// let m = Matrix::from_rows(&[[1, -2], [3, -4]]).unwrap();
    /// let a = m.map(|x: i32| x.abs());
    /// assert_eq!(a.as_slice(), &[1, 2, 3, 4]);
    /// ```
    pub fn map<U: Scalar>(&self, f: impl Fn(T) -> U) -> Matrix<U> {
        Matrix {
            data: self.data.iter().map(|&x| f(x)).collect(),
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Element-wise `as` conversion.
    ///
    /// ```
    /// use rowfact::Matrix;
    /// let m = Matrix::from_rows(&[[1.9_f64, -0.5]]).unwrap();
    /// assert_eq!(m.cast::<i32>().as_slice(), &[1, 0]);
    /// assert_eq!(m.cast::<f32>()[(0, 0)], 1.9_f32);
    /// ```
    pub fn cast<U: Scalar>(&self) -> Matrix<U>
    where
        T: AsPrimitive<U>,
    {
        self.map(|x| x.as_())
    }

    /// Overwrite a square matrix with the identity.
    pub fn make_identity(&mut self) -> Result<()> {
        if self.rows != self.cols {
            return Err(LinalgError::InvalidInput("identity requires a square matrix"));
        }
        let n = self.cols;
        self.data.fill(T::zero());
        for i in 0..n {
            self.data[i * n + i] = T::one();
        }
        Ok(())
    }

    /// Transpose a square matrix in place.
    ///
    /// Works tile by tile (`BLOCK_SIZE` on a side) so that both the row and
    /// the column being swapped stay cache resident.
    ///
    /// ```
    /// use rowfact::Matrix;
    /// let mut m = Matrix::from_rows(&[[1, 2], [3, 4]]).unwrap();
    /// m.transpose().unwrap();
    /// assert_eq!(m.as_slice(), &[1, 3, 2, 4]);
    ///
    /// let mut wide = Matrix::<i32>::new(2, 3).unwrap();
    /// assert!(wide.transpose().is_err());
    /// ```
    pub fn transpose(&mut self) -> Result<()> {
        if self.rows != self.cols {
            return Err(LinalgError::InvalidInput("in-place transpose requires a square matrix"));
        }
        let n = self.rows;
        for ib in (0..n).step_by(BLOCK_SIZE) {
            let i_end = (ib + BLOCK_SIZE).min(n);
            for jb in (ib..n).step_by(BLOCK_SIZE) {
                let j_end = (jb + BLOCK_SIZE).min(n);
                for k in ib..i_end {
                    // diagonal tiles swap only their strict upper half
                    let start = if ib == jb { k + 1 } else { jb };
                    for l in start..j_end {
                        self.data.swap(k * n + l, l * n + k);
                    }
                }
            }
        }
        Ok(())
    }

    /// New `cols x rows` matrix holding the transpose.
    pub fn transposed(&self) -> Matrix<T> {
        let (m, n) = (self.rows, self.cols);
        let mut out = Matrix {
            data: vec![T::zero(); m * n],
            rows: n,
            cols: m,
        };
        let src = &self.data;
        par::for_each_row_mut(
            &mut out.data,
            m,
            n,
            m,
            |j, row| {
                for (i, dst) in row.iter_mut().enumerate() {
                    *dst = src[i * n + j];
                }
            },
            Parallelism::above(m * n, TRANSPOSE_PAR_THRESHOLD),
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transpose_crosses_tile_boundaries() {
        let n = BLOCK_SIZE + 7;
        let orig = Matrix::from_fn(n, n, |i, j| (i * n + j) as i64).unwrap();
        let mut t = orig.clone();
        t.transpose().unwrap();
        for i in 0..n {
            for j in 0..n {
                assert_eq!(t[(i, j)], orig[(j, i)]);
            }
        }
        assert_eq!(t, orig.transposed());
        t.transpose().unwrap();
        assert_eq!(t, orig);
    }

    #[test]
    fn transposed_rectangular() {
        let a = Matrix::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap();
        let t = a.transposed();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.as_slice(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn transposed_large_matches_elementwise() {
        let a = Matrix::from_fn(150, 90, |i, j| (i as f64) - 0.5 * j as f64).unwrap();
        let t = a.transposed();
        for i in 0..150 {
            for j in 0..90 {
                assert_eq!(t[(j, i)], a[(i, j)]);
            }
        }
    }

    #[test]
    fn make_identity_square_only() {
        let mut m = Matrix::filled(3, 3, 7.0_f32).unwrap();
        m.make_identity().unwrap();
        assert_eq!(m, Matrix::identity(3).unwrap());
        let mut r = Matrix::<f32>::new(2, 3).unwrap();
        assert!(r.make_identity().unwrap_err().is_invalid_input());
    }

    #[test]
    fn fill_and_cast() {
        let mut m = Matrix::<u8>::new(2, 2).unwrap();
        m.fill(3);
        let f: Matrix<f64> = m.cast();
        assert!(f.as_slice().iter().all(|&x| x == 3.0));
    }
}
