//! `[images]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [images]
//! webp = true          # Write a lossless WebP sibling for every raster image
//! jpeg_quality = 75    # Re-encode quality for JPEG copies (1-100)
//! ```

use serde::{Deserialize, Serialize};

/// Raster image optimization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Produce a WebP sibling next to each optimized image.
    pub webp: bool,

    /// JPEG re-encode quality.
    pub jpeg_quality: u8,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            webp: true,
            jpeg_quality: 75,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_images_defaults() {
        let config = test_parse_config("");
        assert!(config.images.webp);
        assert_eq!(config.images.jpeg_quality, 75);
    }

    #[test]
    fn test_images_override() {
        let config = test_parse_config("[images]\nwebp = false\njpeg_quality = 90");
        assert!(!config.images.webp);
        assert_eq!(config.images.jpeg_quality, 90);
    }
}
