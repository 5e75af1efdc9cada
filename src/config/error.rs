//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    Validation(String),

    /// The asset path table violates one of its invariants.
    #[error("Path table error: {0}")]
    PathTable(String),

    #[error("Invalid glob `{pattern}`")]
    Glob {
        pattern: String,
        #[source]
        source: ignore::Error,
    },
}
