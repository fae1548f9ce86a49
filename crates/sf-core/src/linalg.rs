use core::ops::Mul;

use crate::{Buffer, Error};

impl Buffer {
    /// Element-wise sum; shapes must match.
    pub fn checked_add(&self, rhs: &Buffer) -> Result<Buffer, Error> {
        self.zip_with(rhs, "add", |a, b| a + b)
    }

    /// Element-wise difference; shapes must match.
    pub fn checked_sub(&self, rhs: &Buffer) -> Result<Buffer, Error> {
        self.zip_with(rhs, "sub", |a, b| a - b)
    }

    /// Matrix product `self * rhs`; requires `self.cols() == rhs.rows()`.
    pub fn matmul(&self, rhs: &Buffer) -> Result<Buffer, Error> {
        if self.cols() != rhs.rows() {
            return Err(Error::DimensionMismatch {
                op: "matmul",
                lhs: self.shape(),
                rhs: rhs.shape(),
            });
        }

        let (n, inner, m) = (self.rows(), self.cols(), rhs.cols());
        let mut out = vec![0.0; n * m];
        let a = self.data();
        let b = rhs.data();
        for i in 0..n {
            for k in 0..inner {
                let aik = a[i * inner + k];
                for j in 0..m {
                    out[i * m + j] += aik * b[k * m + j];
                }
            }
        }

        Buffer::from_vec(n, m, out)
    }

    pub fn transpose(&self) -> Buffer {
        let (rows, cols) = self.shape();
        let src = self.data();
        let mut out = vec![0.0; rows * cols];
        for r in 0..rows {
            for c in 0..cols {
                out[c * rows + r] = src[r * cols + c];
            }
        }

        Buffer::from_vec(cols, rows, out).expect("transpose preserves element count")
    }

    fn zip_with(
        &self,
        rhs: &Buffer,
        op: &'static str,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Buffer, Error> {
        if self.shape() != rhs.shape() {
            return Err(Error::DimensionMismatch {
                op,
                lhs: self.shape(),
                rhs: rhs.shape(),
            });
        }

        let data = self
            .data()
            .iter()
            .zip(rhs.data())
            .map(|(&a, &b)| f(a, b))
            .collect();
        Buffer::from_vec(self.rows(), self.cols(), data)
    }
}

impl Mul<f64> for &Buffer {
    type Output = Buffer;

    fn mul(self, rhs: f64) -> Self::Output {
        self.map(|v| v * rhs)
    }
}

impl Mul<f64> for Buffer {
    type Output = Buffer;

    fn mul(mut self, rhs: f64) -> Self::Output {
        for v in self.data_mut() {
            *v *= rhs;
        }
        self
    }
}

impl Mul<&Buffer> for f64 {
    type Output = Buffer;

    fn mul(self, rhs: &Buffer) -> Self::Output {
        rhs * self
    }
}
