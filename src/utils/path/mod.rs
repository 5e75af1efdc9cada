//! Path utilities.
//!
//! - [`fs`]: Filesystem path normalization (`normalize_path`, `is_within`)

pub mod fs;

pub use fs::{is_within, normalize_path};
