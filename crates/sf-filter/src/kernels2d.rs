//! Standard square convolution kernels.
//!
//! Conventions:
//! - The center of a `size x size` kernel is `(size / 2, size / 2)`. Even
//!   sizes therefore center on the lower-right of the four middle cells.
//! - Smoothing kernels (box, Gaussian) sum to `1`.
//! - Sobel kernels are the fixed 3x3 integer derivative masks and sum to `0`.

use core::f64::consts::PI;

use sf_core::{Buffer, Error};

/// All zeros except `1.0` at the center cell.
pub fn identity(size: usize) -> Buffer {
    let mut k = Buffer::new(size, size);
    if size > 0 {
        let c = size / 2;
        k.row_mut(c)[c] = 1.0;
    }
    k
}

/// Uniform averaging kernel, every weight `1 / size^2`.
pub fn box_blur(size: usize) -> Buffer {
    let len = size * size;
    Buffer::filled(size, size, 1.0 / len as f64)
}

/// Sampled 2D Gaussian, renormalized by its own sum.
///
/// Weight `(i, j)` is the Gaussian density at offset
/// `(i - size/2, j - size/2)`. `sigma` must be finite and `> 0`.
pub fn gaussian(size: usize, sigma: f64) -> Result<Buffer, Error> {
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(Error::InvalidArgument(format!(
            "gaussian sigma must be finite and > 0, got {sigma}"
        )));
    }

    let center = (size / 2) as isize;
    let sigma2 = sigma * sigma;
    let scale = 1.0 / (2.0 * PI * sigma2);

    let mut k = Buffer::new(size, size);
    for i in 0..size {
        let x = (i as isize - center) as f64;
        for (j, w) in k.row_mut(i).iter_mut().enumerate() {
            let y = (j as isize - center) as f64;
            *w = scale * (-(x * x + y * y) / (2.0 * sigma2)).exp();
        }
    }

    let sum = k.sum();
    if sum > 0.0 {
        for w in k.data_mut() {
            *w /= sum;
        }
    }

    Ok(k)
}

/// Horizontal derivative mask; responds to intensity increasing with column.
pub fn sobel_x() -> Buffer {
    Buffer::from_vec(
        3,
        3,
        vec![
            -1.0, 0.0, 1.0, // row 0
            -2.0, 0.0, 2.0, // row 1
            -1.0, 0.0, 1.0, // row 2
        ],
    )
    .expect("3x3 literal")
}

/// Vertical derivative mask; responds to intensity increasing with row.
pub fn sobel_y() -> Buffer {
    Buffer::from_vec(
        3,
        3,
        vec![
            -1.0, -2.0, -1.0, // row 0
            0.0, 0.0, 0.0, // row 1
            1.0, 2.0, 1.0, // row 2
        ],
    )
    .expect("3x3 literal")
}
