//! Image processing utilities.
//!
//! # Modules
//!
//! - [`raster`]: WebP siblings and original-format recompression
//! - [`svg`]: SVG optimization and sprite sheet assembly

pub mod raster;
pub mod svg;
