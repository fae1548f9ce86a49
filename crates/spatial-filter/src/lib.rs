//! Umbrella crate for the `spatial-filter` workspace.
//!
//! This crate re-exports the buffer model, the filters and raster I/O so
//! downstream code can depend on a single crate.

pub use sf_core::*;
pub use sf_filter::*;
pub use sf_raster::*;
