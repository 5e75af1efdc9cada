//! Asset minification for JS and CSS.
//!
//! Uses oxc for JavaScript and lightningcss for CSS. CSS minification also
//! adds vendor prefixes for the browser targets below.

use anyhow::{Result, anyhow};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

/// Minify JavaScript source code.
///
/// Sources are classic scripts loaded with `<script src>`: top-level
/// declarations are globals shared with other scripts and inline handlers,
/// so they are never dropped or renamed. Parse errors are returned joined
/// into one message.
pub fn minify_js(source: &str, mangle: bool) -> Result<String> {
    let allocator = Allocator::default();
    let source_type = SourceType::script();
    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
        let messages: Vec<String> = ret.errors.iter().map(|e| e.to_string()).collect();
        return Err(anyhow!(messages.join("; ")));
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: mangle.then(|| MangleOptions {
            top_level: false,
            ..MangleOptions::default()
        }),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Ok(code)
}

/// Minify CSS and add vendor prefixes for [`browser_targets`].
pub fn minify_css(source: &str) -> Result<String> {
    let targets = browser_targets();

    let mut stylesheet = StyleSheet::parse(source, ParserOptions::default())
        .map_err(|e| anyhow!("css parse error: {e}"))?;
    stylesheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| anyhow!("css minify error: {e}"))?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("css print error: {e}"))?;
    Ok(result.code)
}

/// Browsers that receive vendor prefixes.
pub fn browser_targets() -> Targets {
    Targets::from(Browsers {
        chrome: Some(version(90)),
        edge: Some(version(90)),
        firefox: Some(version(88)),
        safari: Some(version(14)),
        ios_saf: Some(version(14)),
        samsung: Some(version(14)),
        ..Browsers::default()
    })
}

/// lightningcss encodes versions as `major << 16 | minor << 8 | patch`.
const fn version(major: u32) -> u32 {
    major << 16
}
