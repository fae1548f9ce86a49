//! Foundational primitives for 2D spatial filtering.
//!
//! ## Buffers
//! A [`Buffer`] is a dense row-major grid of `f64` samples addressed as
//! `(row, col)`. It serves both as raster image and as convolution kernel.
//! Element access is bounds-checked and reports [`Error::IndexOutOfBounds`].
//! Sample values are not range-limited; filters may produce negative values
//! or values above `255`, and [`raster::normalize`] or
//! [`raster::to_u8_clamped`] restore a displayable range.
//!
//! ## Padding
//! [`Padding`] selects how windows overhanging the buffer edge are read:
//! no extension, zero fill, or edge replication.
//!
//! ## Linear Algebra
//! Whole-buffer addition, subtraction, matrix product, scalar scaling and
//! transpose are provided for code layered on top of the filters. Shape
//! disagreements report [`Error::DimensionMismatch`].

mod border;
mod buffer;
mod error;
mod linalg;
pub mod raster;

pub use border::{Padding, map_index};
pub use buffer::Buffer;
pub use error::Error;
pub use raster::{crop, normalize, resize_nearest, to_u8_clamped};
