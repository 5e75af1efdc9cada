//! Pipeline configuration management for `assetline.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/   # [dirs], [serve], [images], [scripts]
//! ├── error      # ConfigError
//! ├── util       # config file discovery
//! └── mod.rs     # PipelineConfig (this file)
//! ```
//!
//! The config file is optional: without one, every section uses its defaults
//! and the project root is the current directory.

pub mod section;
mod error;
mod util;

pub use error::ConfigError;
pub use section::{DirsConfig, ImagesConfig, ScriptsConfig, ServeConfig};

use crate::{
    cli::{Cli, Commands},
    debug, log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use util::find_config_file;

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing assetline.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Absolute path to the config file, if one was found (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Project root directory (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Source and destination roots
    #[serde(default)]
    pub dirs: DirsConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Raster image settings
    #[serde(default)]
    pub images: ImagesConfig,

    /// Script settings
    #[serde(default)]
    pub scripts: ScriptsConfig,
}

impl PipelineConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. The project root is the
    /// config file's parent directory, or cwd when no file exists.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or(cwd);
                config.config_path = Some(path);
                config
            }
            None => {
                debug!("config"; "{} not found, using defaults", cli.config.display());
                Self {
                    root: cwd,
                    ..Self::default()
                }
            }
        };

        config.apply_cli(cli);
        config.normalize_paths();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::from)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {} (ignored): {}", display_path, fields.join(", "));
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply CLI flags on top of file values.
    fn apply_cli(&mut self, cli: &Cli) {
        crate::logger::set_verbose(cli.verbose);

        Self::update_option(&mut self.dirs.source, cli.source.as_ref());
        Self::update_option(&mut self.dirs.destination, cli.output.as_ref());

        if let Commands::Dev { interface, port } = cli.command() {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Normalize all paths relative to root directory.
    fn normalize_paths(&mut self) {
        self.root = crate::utils::path::normalize_path(&self.root);
        let root = self.root.clone();
        self.dirs.normalize(&root);
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate settings that don't depend on the path table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.serve.port == self.serve.reload_port {
            return Err(ConfigError::Validation(format!(
                "serve.port and serve.reload_port must differ (both {})",
                self.serve.port
            )));
        }

        if !(1..=100).contains(&self.images.jpeg_quality) {
            return Err(ConfigError::Validation(format!(
                "images.jpeg_quality must be within 1-100, got {}",
                self.images.jpeg_quality
            )));
        }

        Ok(())
    }

    /// Get path relative to the project root, for display.
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> PipelineConfig {
    let (parsed, ignored) = PipelineConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Config rooted at a temporary project directory with default layout.
#[cfg(test)]
pub fn test_config_at(root: &Path) -> PipelineConfig {
    let mut config = PipelineConfig {
        root: root.to_path_buf(),
        ..PipelineConfig::default()
    };
    config.normalize_paths();
    config
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_fields_collected() {
        let (_, ignored) =
            PipelineConfig::parse_with_ignored("[serve]\nport = 3001\nopen = true").unwrap();
        assert_eq!(ignored, vec!["serve.open".to_string()]);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(PipelineConfig::parse_with_ignored("[serve\nport = 1").is_err());
    }

    #[test]
    fn test_validate_port_clash() {
        let config = test_parse_config("[serve]\nport = 35729");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_validate_jpeg_quality() {
        let config = test_parse_config("[images]\njpeg_quality = 0");
        assert!(config.validate().is_err());

        let config = test_parse_config("[images]\njpeg_quality = 100");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_at_normalizes_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = test_config_at(dir.path());
        assert!(config.dirs.source.ends_with("src"));
        assert!(config.dirs.destination.ends_with("build"));
    }

    #[test]
    fn test_root_relative() {
        let config = PipelineConfig {
            root: PathBuf::from("/project"),
            ..PipelineConfig::default()
        };
        assert_eq!(
            config.root_relative("/project/src/js/app.js"),
            PathBuf::from("src/js/app.js")
        );
    }
}
