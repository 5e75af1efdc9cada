//! `[scripts]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [scripts]
//! mangle = true    # Shorten local identifiers while minifying
//! ```

use serde::{Deserialize, Serialize};

/// Script minification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    /// Mangle local identifiers.
    pub mangle: bool,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self { mangle: true }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_scripts_defaults() {
        assert!(test_parse_config("").scripts.mangle);
    }

    #[test]
    fn test_scripts_override() {
        assert!(!test_parse_config("[scripts]\nmangle = false").scripts.mangle);
    }
}
