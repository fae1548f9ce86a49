//! Direct 2D kernel correlation with stride and border handling.
//!
//! The kernel is not flipped: output `(i, j)` accumulates
//! `kernel(m, n) * input(i * stride - pad_h + m, j * stride - pad_w + n)`
//! in row-major kernel order.
//!
//! Output shape per axis is `(n + 2 * pad - k) / stride + 1` with signed
//! truncating division, where `pad = (k - 1) / 2` unless padding is
//! [`Padding::None`]. A non-positive size on either axis, or an empty input,
//! produces the empty `0x0` buffer.

use log::debug;
use sf_core::{Buffer, Error, Padding, map_index};

use crate::kernels2d;

/// A kernel bound to a stride and padding policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Conv2D {
    kernel: Buffer,
    stride: usize,
    padding: Padding,
}

impl Default for Conv2D {
    fn default() -> Self {
        Self::new(kernels2d::identity(3))
    }
}

impl Conv2D {
    /// Stride 1, zero padding.
    pub fn new(kernel: Buffer) -> Self {
        Self {
            kernel,
            stride: 1,
            padding: Padding::Zero,
        }
    }

    pub fn with_stride(mut self, stride: usize) -> Result<Self, Error> {
        self.set_stride(stride)?;
        Ok(self)
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    pub fn kernel(&self) -> &Buffer {
        &self.kernel
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    pub fn set_kernel(&mut self, kernel: Buffer) {
        self.kernel = kernel;
    }

    pub fn set_stride(&mut self, stride: usize) -> Result<(), Error> {
        validate_stride(stride)?;
        self.stride = stride;
        Ok(())
    }

    pub fn set_padding(&mut self, padding: Padding) {
        self.padding = padding;
    }

    /// Shape `apply` would produce for an input of `rows x cols`.
    pub fn output_shape(&self, rows: usize, cols: usize) -> (usize, usize) {
        output_shape((rows, cols), self.kernel.shape(), self.stride, self.padding)
    }

    pub fn apply(&self, input: &Buffer) -> Result<Buffer, Error> {
        convolve2d(input, &self.kernel, self.stride, self.padding)
    }
}

/// Output shape for the given input/kernel shapes, stride and padding.
///
/// A zero stride has no valid output and yields `(0, 0)`; [`convolve2d`]
/// rejects it with [`Error::InvalidArgument`].
pub fn output_shape(
    input: (usize, usize),
    kernel: (usize, usize),
    stride: usize,
    padding: Padding,
) -> (usize, usize) {
    if stride == 0 {
        return (0, 0);
    }

    let axis = |n: usize, k: usize| -> usize {
        let pad = padding.extent(k);
        let span = (n + 2 * pad) as isize - k as isize;
        let out = span / stride as isize + 1;
        if out <= 0 { 0 } else { out as usize }
    };

    let rows = axis(input.0, kernel.0);
    let cols = axis(input.1, kernel.1);
    if rows == 0 || cols == 0 {
        (0, 0)
    } else {
        (rows, cols)
    }
}

pub fn convolve2d(
    input: &Buffer,
    kernel: &Buffer,
    stride: usize,
    padding: Padding,
) -> Result<Buffer, Error> {
    validate_stride(stride)?;

    let (kr, kc) = kernel.shape();
    let (out_rows, out_cols) = output_shape(input.shape(), (kr, kc), stride, padding);
    if input.is_empty() || out_rows == 0 {
        debug!(
            "conv2d: {}x{} input, {kr}x{kc} kernel, stride {stride}, {padding:?} -> empty output",
            input.rows(),
            input.cols()
        );
        return Ok(Buffer::new(0, 0));
    }

    debug!(
        "conv2d: {}x{} input, {kr}x{kc} kernel, stride {stride}, {padding:?} -> {out_rows}x{out_cols}",
        input.rows(),
        input.cols()
    );

    let pad_h = padding.extent(kr) as isize;
    let pad_w = padding.extent(kc) as isize;
    let mut out = Buffer::new(out_rows, out_cols);

    for i in 0..out_rows {
        let start_y = (i * stride) as isize - pad_h;
        let out_row = out.row_mut(i);
        for (j, cell) in out_row.iter_mut().enumerate() {
            let start_x = (j * stride) as isize - pad_w;
            *cell = if window_inside(input, start_y, start_x, kr, kc) {
                accumulate_interior(input, kernel, start_y as usize, start_x as usize)
            } else {
                accumulate_border(input, kernel, start_y, start_x, padding)
            };
        }
    }

    Ok(out)
}

fn validate_stride(stride: usize) -> Result<(), Error> {
    if stride == 0 {
        return Err(Error::InvalidArgument("stride must be >= 1".to_string()));
    }
    Ok(())
}

#[inline]
fn window_inside(input: &Buffer, y: isize, x: isize, kr: usize, kc: usize) -> bool {
    y >= 0 && x >= 0 && y as usize + kr <= input.rows() && x as usize + kc <= input.cols()
}

fn accumulate_interior(input: &Buffer, kernel: &Buffer, y: usize, x: usize) -> f64 {
    let kc = kernel.cols();
    let mut acc = 0.0;
    for m in 0..kernel.rows() {
        let src = &input.row(y + m)[x..x + kc];
        for (&s, &w) in src.iter().zip(kernel.row(m)) {
            acc += s * w;
        }
    }
    acc
}

fn accumulate_border(
    input: &Buffer,
    kernel: &Buffer,
    y: isize,
    x: isize,
    padding: Padding,
) -> f64 {
    let mut acc = 0.0;
    for m in 0..kernel.rows() {
        let Some(sy) = map_index(y + m as isize, input.rows(), padding) else {
            continue;
        };
        let src = input.row(sy);
        for (n, &w) in kernel.row(m).iter().enumerate() {
            if let Some(sx) = map_index(x + n as isize, input.cols(), padding) {
                acc += src[sx] * w;
            }
        }
    }
    acc
}
