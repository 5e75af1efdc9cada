//! SVG optimization using usvg.
//!
//! usvg parses the document into its simplified tree (shapes become paths,
//! styles are resolved, unused defs are dropped) and writes it back without
//! indentation.

use anyhow::{Context, Result};

/// Options for SVG optimization
#[derive(Debug, Clone)]
pub struct OptimizeOptions {
    /// DPI for unit conversion.
    pub dpi: f32,
    /// Coordinate precision written to the output.
    pub precision: u8,
    /// Prefix for generated element ids, keeps ids unique across sprite symbols.
    pub id_prefix: Option<String>,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            dpi: 96.0,
            precision: 3,
            id_prefix: None,
        }
    }
}

/// Optimized SVG result
pub struct OptimizedSvg {
    /// Optimized SVG content as bytes.
    pub data: Vec<u8>,
}

/// Optimize SVG using usvg
pub fn optimize_svg(content: &[u8], options: &OptimizeOptions) -> Result<OptimizedSvg> {
    let usvg_options = usvg::Options {
        dpi: options.dpi,
        ..Default::default()
    };

    let tree = usvg::Tree::from_data(content, &usvg_options).context("Failed to parse SVG")?;

    let write_options = usvg::WriteOptions {
        id_prefix: options.id_prefix.clone(),
        indent: usvg::Indent::None,
        attributes_indent: usvg::Indent::None,
        coordinates_precision: options.precision,
        transforms_precision: options.precision,
        ..Default::default()
    };

    let optimized = tree.to_string(&write_options);

    Ok(OptimizedSvg {
        data: optimized.into_bytes(),
    })
}
