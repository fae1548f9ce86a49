//! Sobel gradient-magnitude edge map.
//!
//! The input is correlated with [`sobel_x`] and [`sobel_y`] at stride 1
//! under the configured padding, and each output cell holds
//! `sqrt(gx^2 + gy^2)`.
//!
//! Post-processing runs in a fixed order:
//! 1. Threshold (when set): `255` if magnitude `> t`, else `0`. A magnitude
//!    equal to the threshold is background.
//! 2. Invert (when set): `255 - v`, floored at `0`.
//!
//! Without thresholding, magnitudes are not clamped and may exceed `255`.

use log::debug;
use sf_core::{Buffer, Error, Padding};

use crate::conv2d::convolve2d;
use crate::kernels2d::{sobel_x, sobel_y};

pub const FOREGROUND: f64 = 255.0;
pub const BACKGROUND: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SobelConfig {
    pub padding: Padding,
    /// Binarization level; `None` keeps raw magnitudes.
    pub threshold: Option<f64>,
    pub invert: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SobelDetector {
    cfg: SobelConfig,
}

impl SobelDetector {
    pub fn new(cfg: SobelConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &SobelConfig {
        &self.cfg
    }

    pub fn set_padding(&mut self, padding: Padding) {
        self.cfg.padding = padding;
    }

    /// Enables thresholding at `t`.
    pub fn set_threshold(&mut self, t: f64) {
        self.cfg.threshold = Some(t);
    }

    pub fn disable_threshold(&mut self) {
        self.cfg.threshold = None;
    }

    pub fn set_invert(&mut self, invert: bool) {
        self.cfg.invert = invert;
    }

    /// Horizontal and vertical derivative responses.
    pub fn gradients(&self, input: &Buffer) -> Result<(Buffer, Buffer), Error> {
        let gx = convolve2d(input, &sobel_x(), 1, self.cfg.padding)?;
        let gy = convolve2d(input, &sobel_y(), 1, self.cfg.padding)?;
        Ok((gx, gy))
    }

    pub fn apply(&self, input: &Buffer) -> Result<Buffer, Error> {
        if let Some(t) = self.cfg.threshold
            && (t.is_nan() || t < 0.0)
        {
            return Err(Error::InvalidArgument(format!(
                "threshold must be >= 0, got {t}"
            )));
        }

        debug!(
            "sobel: {}x{} input, {:?}, threshold {:?}, invert {}",
            input.rows(),
            input.cols(),
            self.cfg.padding,
            self.cfg.threshold,
            self.cfg.invert
        );

        let (gx, gy) = self.gradients(input)?;
        let mut mag = gradient_magnitude(&gx, &gy)?;

        let cfg = self.cfg;
        for v in mag.data_mut() {
            if let Some(t) = cfg.threshold {
                *v = binarize_value(*v, t);
            }
            if cfg.invert {
                *v = invert_value(*v);
            }
        }

        Ok(mag)
    }
}

/// Per-cell `sqrt(gx^2 + gy^2)`; shapes must match.
pub fn gradient_magnitude(gx: &Buffer, gy: &Buffer) -> Result<Buffer, Error> {
    if gx.shape() != gy.shape() {
        return Err(Error::DimensionMismatch {
            op: "gradient_magnitude",
            lhs: gx.shape(),
            rhs: gy.shape(),
        });
    }

    let data = gx
        .data()
        .iter()
        .zip(gy.data())
        .map(|(&x, &y)| (x * x + y * y).sqrt())
        .collect();
    Buffer::from_vec(gx.rows(), gx.cols(), data)
}

/// `255` where the sample is strictly above `t`, `0` elsewhere.
pub fn binarize(buf: &Buffer, t: f64) -> Buffer {
    buf.map(|v| binarize_value(v, t))
}

/// `255 - v` floored at `0`.
pub fn invert(buf: &Buffer) -> Buffer {
    buf.map(invert_value)
}

#[inline]
fn binarize_value(v: f64, t: f64) -> f64 {
    if v > t { FOREGROUND } else { BACKGROUND }
}

#[inline]
fn invert_value(v: f64) -> f64 {
    (FOREGROUND - v).max(0.0)
}
