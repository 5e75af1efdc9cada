//! Freshness detection for incremental tasks.

pub mod mtime;

pub use mtime::is_up_to_date;
