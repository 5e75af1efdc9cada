//! Command-line interface module.

mod args;
pub mod pipeline;
pub mod serve;

pub use args::{Cli, Commands};
