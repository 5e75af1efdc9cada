//! Raster image recompression.
//!
//! Two outputs per source: a lossless WebP sibling, and the original format
//! re-encoded with stronger settings. The re-encoded bytes are only used when
//! they are smaller than the input.

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageFormat};

/// Raster formats accepted by the images task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    Jpeg,
    Gif,
}

impl RasterFormat {
    /// Detect from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    const fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Gif => ImageFormat::Gif,
        }
    }
}

fn decode(bytes: &[u8], format: RasterFormat) -> Result<DynamicImage> {
    image::load_from_memory_with_format(bytes, format.image_format())
        .with_context(|| format!("failed to decode {format:?} image"))
}

/// Encode a lossless WebP version of the image.
pub fn to_webp(bytes: &[u8], format: RasterFormat) -> Result<Vec<u8>> {
    let img = decode(bytes, format)?;

    // The lossless encoder only takes 8-bit RGB(A).
    let img = if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    };

    let mut out = Vec::new();
    img.write_with_encoder(WebPEncoder::new_lossless(&mut out))
        .context("failed to encode webp")?;
    Ok(out)
}

/// Re-encode in the original format, keeping whichever bytes are smaller.
pub fn optimize(bytes: &[u8], format: RasterFormat, jpeg_quality: u8) -> Result<Vec<u8>> {
    let img = decode(bytes, format)?;

    let encoded = match format {
        RasterFormat::Png => {
            let mut out = Vec::new();
            let encoder =
                PngEncoder::new_with_quality(&mut out, CompressionType::Best, FilterType::Adaptive);
            img.write_with_encoder(encoder)
                .context("failed to encode png")?;
            out
        }
        RasterFormat::Jpeg => {
            let mut out = Cursor::new(Vec::new());
            let encoder = JpegEncoder::new_with_quality(&mut out, jpeg_quality);
            DynamicImage::ImageRgb8(img.to_rgb8())
                .write_with_encoder(encoder)
                .context("failed to encode jpeg")?;
            out.into_inner()
        }
        // Frames are kept as-is; decoding above validates the file.
        RasterFormat::Gif => return Ok(bytes.to_vec()),
    };

    if encoded.len() < bytes.len() {
        Ok(encoded)
    } else {
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn encode_png(img: DynamicImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn sample_rgb() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(16, 16, |x, y| {
            Rgb([(x * 16) as u8, (y * 16) as u8, 128])
        }))
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(RasterFormat::from_path(Path::new("a.png")), Some(RasterFormat::Png));
        assert_eq!(RasterFormat::from_path(Path::new("a.JPG")), Some(RasterFormat::Jpeg));
        assert_eq!(RasterFormat::from_path(Path::new("a.jpeg")), Some(RasterFormat::Jpeg));
        assert_eq!(RasterFormat::from_path(Path::new("a.gif")), Some(RasterFormat::Gif));
        assert_eq!(RasterFormat::from_path(Path::new("a.svg")), None);
        assert_eq!(RasterFormat::from_path(Path::new("png")), None);
    }

    #[test]
    fn test_to_webp() {
        let png = encode_png(sample_rgb());
        let webp = to_webp(&png, RasterFormat::Png).unwrap();

        assert_eq!(&webp[0..4], b"RIFF");
        assert_eq!(&webp[8..12], b"WEBP");

        let decoded = image::load_from_memory_with_format(&webp, ImageFormat::WebP).unwrap();
        assert_eq!(decoded.width(), 16);
        assert_eq!(decoded.height(), 16);
    }

    #[test]
    fn test_to_webp_keeps_alpha() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 64])));
        let webp = to_webp(&encode_png(img), RasterFormat::Png).unwrap();
        let decoded = image::load_from_memory_with_format(&webp, ImageFormat::WebP).unwrap();
        assert!(decoded.color().has_alpha());
    }

    #[test]
    fn test_optimize_never_grows() {
        let png = encode_png(sample_rgb());
        let optimized = optimize(&png, RasterFormat::Png, 75).unwrap();
        assert!(optimized.len() <= png.len());
        assert!(image::load_from_memory_with_format(&optimized, ImageFormat::Png).is_ok());
    }

    #[test]
    fn test_optimize_jpeg() {
        let mut src = Cursor::new(Vec::new());
        sample_rgb()
            .write_with_encoder(JpegEncoder::new_with_quality(&mut src, 100))
            .unwrap();
        let src = src.into_inner();

        let optimized = optimize(&src, RasterFormat::Jpeg, 40).unwrap();
        assert!(optimized.len() <= src.len());
        assert_eq!(&optimized[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_corrupt_input() {
        assert!(optimize(b"not an image", RasterFormat::Png, 75).is_err());
        assert!(to_webp(b"not an image", RasterFormat::Jpeg).is_err());
    }
}
