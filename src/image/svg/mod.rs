//! SVG processing utilities.
//!
//! # Modules
//!
//! - [`optimize`]: SVG optimization using usvg (normalized, minified output)
//! - [`symbol`]: Sprite sheet assembly from optimized SVGs
//!
//! # Architecture
//!
//! ```text
//! img/**/*.svg ──► optimize ──► img/<name>.svg
//!
//! img/sprite/*.svg ──► optimize ──► symbol ──► img/sprite.svg
//! ```

pub mod optimize;
pub mod symbol;

pub use optimize::{OptimizeOptions, optimize_svg};
pub use symbol::{SpriteSymbol, build_sprite};
