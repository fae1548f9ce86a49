use crate::Error;

/// Row-major 2D grid of `f64` samples.
///
/// Element `(r, c)` lives at `data[r * cols + c]`. A buffer with zero rows
/// or zero columns is empty and has no addressable elements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Buffer {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Buffer {
    /// Zero-filled `rows x cols` buffer.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, 0.0)
    }

    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        let len = rows.checked_mul(cols).expect("buffer size overflow");
        Self {
            rows,
            cols,
            data: vec![value; len],
        }
    }

    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, Error> {
        let expected = rows.checked_mul(cols).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: data.len(),
        })?;

        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self { rows, cols, data })
    }

    /// Builds a buffer from a slice of equally long rows.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, Error> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(Error::SizeMismatch {
                    expected: cols,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }

        if cols == 0 {
            return Ok(Self::new(0, 0));
        }
        Self::from_vec(rows.len(), cols, data)
    }

    pub fn from_u8(rows: usize, cols: usize, pixels: &[u8]) -> Result<Self, Error> {
        Self::from_vec(rows, cols, pixels.iter().map(|&p| f64::from(p)).collect())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn row(&self, r: usize) -> &[f64] {
        assert!(r < self.rows, "row index out of bounds");
        let start = r * self.cols;
        &self.data[start..start + self.cols]
    }

    pub fn row_mut(&mut self, r: usize) -> &mut [f64] {
        assert!(r < self.rows, "row index out of bounds");
        let start = r * self.cols;
        &mut self.data[start..start + self.cols]
    }

    pub fn get(&self, r: usize, c: usize) -> Result<f64, Error> {
        let idx = self.index_of(r, c)?;
        Ok(self.data[idx])
    }

    pub fn set(&mut self, r: usize, c: usize, value: f64) -> Result<(), Error> {
        let idx = self.index_of(r, c)?;
        self.data[idx] = value;
        Ok(())
    }

    /// Re-allocates to `rows x cols`, zero-filled.
    ///
    /// Previous contents are discarded even when the shape is unchanged;
    /// this is not a reshape.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        *self = Self::new(rows, cols);
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Smallest and largest sample, or `None` for an empty buffer.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        let first = *self.data.first()?;
        Some(
            self.data
                .iter()
                .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
        )
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    fn index_of(&self, r: usize, c: usize) -> Result<usize, Error> {
        if r >= self.rows || c >= self.cols {
            return Err(Error::IndexOutOfBounds {
                row: r,
                col: c,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(r * self.cols + c)
    }
}

#[cfg(test)]
mod tests {
    use super::Buffer;
    use crate::Error;

    #[test]
    fn element_access_is_bounds_checked() {
        let mut buf = Buffer::new(2, 3);
        buf.set(1, 2, 7.5).expect("in bounds");

        assert_eq!(buf.get(1, 2), Ok(7.5));
        assert_eq!(buf.data(), &[0.0, 0.0, 0.0, 0.0, 0.0, 7.5]);
        assert_eq!(
            buf.get(2, 0),
            Err(Error::IndexOutOfBounds {
                row: 2,
                col: 0,
                rows: 2,
                cols: 3
            })
        );
        assert!(buf.set(0, 3, 1.0).is_err());
    }

    #[test]
    fn empty_buffer_has_no_elements() {
        for (r, c) in [(0, 0), (0, 4), (3, 0)] {
            let buf = Buffer::new(r, c);
            assert!(buf.is_empty());
            assert!(buf.data().is_empty());
            assert!(buf.get(0, 0).is_err());
            assert_eq!(buf.min_max(), None);
        }
    }

    #[test]
    fn from_vec_and_rows_validate_shape() {
        assert_eq!(
            Buffer::from_vec(2, 2, vec![1.0; 3]),
            Err(Error::SizeMismatch {
                expected: 4,
                actual: 3
            })
        );

        let buf = Buffer::from_rows(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]).expect("valid rows");
        assert_eq!(buf.shape(), (3, 2));
        assert_eq!(buf.row(1), &[3.0, 4.0]);

        let ragged = Buffer::from_rows(&[vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(ragged, Err(Error::SizeMismatch { .. })));

        let empty = Buffer::from_rows::<[f64; 0]>(&[]).expect("empty rows");
        assert!(empty.is_empty());
    }

    #[test]
    fn resize_discards_contents() {
        let mut buf = Buffer::filled(2, 2, 9.0);
        buf.resize(2, 2);
        assert_eq!(buf.data(), &[0.0; 4]);

        buf.set(0, 0, 1.0).expect("in bounds");
        buf.resize(3, 1);
        assert_eq!(buf.shape(), (3, 1));
        assert_eq!(buf.sum(), 0.0);

        buf.resize(0, 5);
        assert!(buf.is_empty());
    }

    #[test]
    fn clone_is_deep() {
        let a = Buffer::filled(1, 2, 1.0);
        let mut b = a.clone();
        b.set(0, 0, 5.0).expect("in bounds");
        assert_eq!(a.get(0, 0), Ok(1.0));
    }

    #[test]
    fn from_u8_and_stats() {
        let buf = Buffer::from_u8(2, 2, &[0, 10, 255, 3]).expect("valid pixels");
        assert_eq!(buf.data(), &[0.0, 10.0, 255.0, 3.0]);
        assert_eq!(buf.min_max(), Some((0.0, 255.0)));
        assert_eq!(buf.sum(), 268.0);
        assert_eq!(buf.map(|v| v * 2.0).get(1, 0), Ok(510.0));
    }
}
