//! Sprite sheet assembly.
//!
//! Each source SVG becomes a `<symbol>` keyed by its file stem, so pages can
//! reference icons with `<use href="img/sprite.svg#name">`.

use std::io::Cursor;

use anyhow::{Context, Result, bail};
use quick_xml::{
    Reader, Writer,
    events::{BytesEnd, BytesStart, Event},
};

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// One icon to be included in the sprite.
#[derive(Debug, Clone)]
pub struct SpriteSymbol {
    /// Symbol id (the source file stem).
    pub id: String,
    /// Optimized SVG document.
    pub svg: String,
}

/// Root `<svg>` attributes and inner markup of one document.
struct Parsed<'a> {
    view_box: Option<String>,
    events: Vec<Event<'a>>,
}

/// Combine symbols into a single sprite document.
///
/// Symbols are written in the given order. Duplicate ids are rejected.
pub fn build_sprite(symbols: &[SpriteSymbol]) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    let root = BytesStart::new("svg").with_attributes([("xmlns", SVG_NS), ("xmlns:xlink", XLINK_NS)]);
    writer.write_event(Event::Start(root))?;

    for (i, symbol) in symbols.iter().enumerate() {
        if symbols[..i].iter().any(|s| s.id == symbol.id) {
            bail!("duplicate sprite symbol `{}`", symbol.id);
        }

        let parsed = parse_root(&symbol.svg)
            .with_context(|| format!("invalid sprite source `{}`", symbol.id))?;

        let mut start = BytesStart::new("symbol");
        start.push_attribute(("id", symbol.id.as_str()));
        if let Some(view_box) = parsed.view_box.as_deref() {
            start.push_attribute(("viewBox", view_box));
        }

        writer.write_event(Event::Start(start))?;
        for event in parsed.events {
            writer.write_event(event)?;
        }
        writer.write_event(Event::End(BytesEnd::new("symbol")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("svg")))?;

    Ok(String::from_utf8(writer.into_inner().into_inner())?)
}

/// Pull the root element's viewBox and everything nested inside it.
///
/// Without a viewBox, one is derived from `width`/`height`.
fn parse_root(svg: &str) -> Result<Parsed<'_>> {
    let mut reader = Reader::from_str(svg);
    let mut view_box = None;
    let mut events = Vec::new();
    let mut depth = 0usize;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => bail!(
                "XML parse error at position {}: {:?}",
                reader.error_position(),
                e
            ),
        };

        match event {
            Event::Start(elem) if depth == 0 => {
                if elem.name().as_ref() != b"svg" {
                    bail!("root element is not <svg>");
                }
                view_box = root_view_box(&elem);
                depth = 1;
            }
            Event::Empty(elem) if depth == 0 => {
                if elem.name().as_ref() != b"svg" {
                    bail!("root element is not <svg>");
                }
                return Ok(Parsed {
                    view_box: root_view_box(&elem),
                    events,
                });
            }
            Event::Start(elem) => {
                depth += 1;
                events.push(Event::Start(elem));
            }
            Event::End(elem) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Ok(Parsed { view_box, events });
                }
                events.push(Event::End(elem));
            }
            Event::Eof => bail!("missing <svg> root element"),
            // Prolog, comments and doctype never make it into a symbol.
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) | Event::Comment(_) => {}
            event if depth > 0 => events.push(event),
            _ => {}
        }
    }
}

fn root_view_box(elem: &BytesStart<'_>) -> Option<String> {
    let attr = |name: &[u8]| {
        elem.try_get_attribute(name)
            .ok()
            .flatten()
            .map(|a| String::from_utf8_lossy(&a.value).into_owned())
    };

    attr(b"viewBox").or_else(|| {
        let width = attr(b"width")?;
        let height = attr(b"height")?;
        Some(format!("0 0 {} {}", strip_px(&width), strip_px(&height)))
    })
}

fn strip_px(length: &str) -> &str {
    length.trim().trim_end_matches("px")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(id: &str, svg: &str) -> SpriteSymbol {
        SpriteSymbol {
            id: id.to_string(),
            svg: svg.to_string(),
        }
    }

    #[test]
    fn test_build_sprite() {
        let sprite = build_sprite(&[
            symbol(
                "a",
                r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><path d="M0 0h10v10z"/></svg>"#,
            ),
            symbol(
                "b",
                r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 20 20"><g><path d="M1 1"/></g></svg>"#,
            ),
        ])
        .unwrap();

        assert!(sprite.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg""#));
        assert!(sprite.ends_with("</svg>"));
        assert!(sprite.contains(r#"<symbol id="a" viewBox="0 0 10 10"><path d="M0 0h10v10z"/></symbol>"#));
        assert!(sprite.contains(r#"<symbol id="b" viewBox="0 0 20 20"><g><path d="M1 1"/></g></symbol>"#));
        assert_eq!(sprite.matches("<symbol").count(), 2);
    }

    #[test]
    fn test_view_box_from_size() {
        let sprite = build_sprite(&[symbol(
            "icon",
            r#"<?xml version="1.0"?><svg width="24px" height="16"><path d="M0 0"/></svg>"#,
        )])
        .unwrap();
        assert!(sprite.contains(r#"<symbol id="icon" viewBox="0 0 24 16">"#));
        assert!(!sprite.contains("<?xml"));
    }

    #[test]
    fn test_empty_sprite() {
        let sprite = build_sprite(&[]).unwrap();
        assert_eq!(
            sprite,
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"></svg>"#
        );
    }

    #[test]
    fn test_self_closing_root() {
        let sprite = build_sprite(&[symbol("blank", r#"<svg viewBox="0 0 1 1"/>"#)]).unwrap();
        assert!(sprite.contains(r#"<symbol id="blank" viewBox="0 0 1 1"></symbol>"#));
    }

    #[test]
    fn test_duplicate_id() {
        let svg = r#"<svg viewBox="0 0 1 1"/>"#;
        assert!(build_sprite(&[symbol("x", svg), symbol("x", svg)]).is_err());
    }

    #[test]
    fn test_reject_non_svg_root() {
        assert!(build_sprite(&[symbol("x", "<html></html>")]).is_err());
        assert!(build_sprite(&[symbol("x", "")]).is_err());
    }
}
