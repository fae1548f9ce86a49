//! 2D spatial filtering over [`sf_core::Buffer`] rasters.
//!
//! - [`kernels2d`]: identity, box, Gaussian and Sobel kernel generators.
//! - [`conv2d`]: kernel correlation with stride and [`sf_core::Padding`].
//! - [`sobel`]: gradient-magnitude edge map with optional threshold and
//!   inversion.
//!
//! All operations allocate a fresh output and never mutate their input, so
//! distinct calls may run on separate threads.

pub mod conv2d;
pub mod kernels2d;
pub mod sobel;

pub use conv2d::{Conv2D, convolve2d, output_shape};
pub use sobel::{SobelConfig, SobelDetector, binarize, gradient_magnitude, invert};
