//! SCSS declaration sorting.
//!
//! Inside every block, consecutive plain declarations are sorted by property
//! name (vendor prefixes sort next to the unprefixed property). Nested rules,
//! at-rules (`@include`, `@extend`) and variables stay where they are and
//! split the runs being sorted. Comments and whitespace travel with the
//! declaration that follows them, so a sorted file sorts to itself.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::TaskReport;
use crate::paths::{AssetKind, PathTable, scan};

/// Sort every watched SCSS file in place, writing only files that change.
pub fn run(table: &PathTable) -> Result<TaskReport> {
    let Some(matcher) = table.watch_matcher(AssetKind::Styles)? else {
        return Ok(TaskReport::default());
    };

    let mut report = TaskReport::default();
    for file in scan(table.source_root(), &matcher, Path::new("")) {
        let source = fs::read_to_string(&file.path)
            .with_context(|| format!("failed to read {}", file.path.display()))?;
        let sorted = sort_declarations(&source);

        if sorted == source {
            report.skipped += 1;
            continue;
        }

        fs::write(&file.path, sorted)
            .with_context(|| format!("failed to write {}", file.path.display()))?;
        crate::debug!("sort"; "{}", file.relative.display());
        report.written.push(file.path);
    }

    Ok(report)
}

/// Sort declarations of every block in an SCSS document.
pub fn sort_declarations(source: &str) -> String {
    let mut parser = Parser::new(source);
    let mut out = String::with_capacity(source.len());

    loop {
        let (nodes, tail) = parser.parse_body();
        // Top-level statements are never reordered.
        render(&nodes, &mut out);
        out.push_str(tail);
        if parser.at_end() {
            break;
        }
    }

    out
}

// ============================================================================
// tree
// ============================================================================

enum Node<'a> {
    /// `prop: value` with leading trivia; `terminated` when followed by `;`
    Decl {
        key: (String, String),
        text: &'a str,
        terminated: bool,
    },
    /// Any other statement ending in `;`
    Statement(&'a str),
    /// `header { body tail }`, where `header` ends with `{` and `tail` with `}`
    Block {
        header: &'a str,
        body: Vec<Node<'a>>,
        tail: &'a str,
    },
}

impl<'a> Node<'a> {
    fn statement(text: &'a str) -> Self {
        let Some(key) = declaration_key(text) else {
            return Self::Statement(text);
        };
        match text.strip_suffix(';') {
            Some(text) => Self::Decl {
                key,
                text,
                terminated: true,
            },
            None => Self::Decl {
                key,
                text,
                terminated: false,
            },
        }
    }
}

fn render(nodes: &[Node<'_>], out: &mut String) {
    for node in nodes {
        match node {
            Node::Decl {
                text, terminated, ..
            } => {
                out.push_str(text);
                if *terminated {
                    out.push(';');
                }
            }
            Node::Statement(text) => out.push_str(text),
            Node::Block { header, body, tail } => {
                out.push_str(header);
                render(body, out);
                out.push_str(tail);
            }
        }
    }
}

/// Sort a block body. A declaration without `;` may only close the block,
/// so the missing separator moves to whichever declaration ends up last.
fn sort_block(nodes: &mut [Node<'_>]) {
    sort_runs(nodes);

    let Some(open) = nodes
        .iter()
        .position(|n| matches!(n, Node::Decl { terminated: false, .. }))
    else {
        return;
    };
    let last = nodes.len() - 1;
    if open == last {
        return;
    }
    if let Node::Decl { terminated, .. } = &mut nodes[open] {
        *terminated = true;
    }
    if let Node::Decl { terminated, .. } = &mut nodes[last] {
        *terminated = false;
    }
}

/// Sort each run of adjacent declarations. Stable, so equal keys keep order.
fn sort_runs(nodes: &mut [Node<'_>]) {
    let mut start = 0;
    while start < nodes.len() {
        if !matches!(nodes[start], Node::Decl { .. }) {
            start += 1;
            continue;
        }
        let end = nodes[start..]
            .iter()
            .position(|n| !matches!(n, Node::Decl { .. }))
            .map_or(nodes.len(), |offset| start + offset);

        nodes[start..end].sort_by(|a, b| match (a, b) {
            (Node::Decl { key: ka, .. }, Node::Decl { key: kb, .. }) => ka.cmp(kb),
            _ => std::cmp::Ordering::Equal,
        });
        start = end;
    }
}

/// Sort key of a declaration statement: `(unprefixed name, full name)`.
fn declaration_key(text: &str) -> Option<(String, String)> {
    let text = strip_leading_trivia(text);
    if text.starts_with(['@', '$', '%', '&', '+']) {
        return None;
    }

    let (name, _) = text.split_once(':')?;
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) || name.contains("#{") {
        return None;
    }

    let name = name.to_ascii_lowercase();
    Some((unprefixed(&name).to_string(), name))
}

fn unprefixed(name: &str) -> &str {
    if name.starts_with("--") {
        return name;
    }
    ["-webkit-", "-moz-", "-ms-", "-o-"]
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .unwrap_or(name)
}

/// Skip whitespace and comments.
fn strip_leading_trivia(mut text: &str) -> &str {
    loop {
        text = text.trim_start();
        if let Some(rest) = text.strip_prefix("/*") {
            text = rest.split_once("*/").map_or("", |(_, after)| after);
        } else if let Some(rest) = text.strip_prefix("//") {
            text = rest.split_once('\n').map_or("", |(_, after)| after);
        } else {
            return text;
        }
    }
}

// ============================================================================
// parser
// ============================================================================

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    /// Parse statements until the `}` closing this body (included in the
    /// returned tail) or the end of input.
    fn parse_body(&mut self) -> (Vec<Node<'a>>, &'a str) {
        let mut nodes = Vec::new();
        let mut start = self.pos;

        loop {
            match self.next_structural() {
                Some((end, b';')) => {
                    nodes.push(Node::statement(&self.src[start..=end]));
                    start = self.pos;
                }
                Some((end, b'{')) => {
                    let header = &self.src[start..=end];
                    let (mut body, tail) = self.parse_body();
                    sort_block(&mut body);
                    nodes.push(Node::Block { header, body, tail });
                    start = self.pos;
                }
                Some((end, _)) => {
                    // Last declaration of a block may omit its `;`.
                    let rest = &self.src[start..end];
                    let len = rest.trim_end().len();
                    if declaration_key(&rest[..len]).is_some() {
                        nodes.push(Node::statement(&rest[..len]));
                        return (nodes, &self.src[start + len..=end]);
                    }
                    return (nodes, &self.src[start..=end]);
                }
                None => return (nodes, &self.src[start..]),
            }
        }
    }

    /// Advance past the next `;`, `{` or `}` outside strings, comments,
    /// parentheses and `#{}` interpolation.
    fn next_structural(&mut self) -> Option<(usize, u8)> {
        let bytes = self.src.as_bytes();
        let mut parens = 0usize;

        while self.pos < bytes.len() {
            let c = bytes[self.pos];
            let next = bytes.get(self.pos + 1).copied();

            match c {
                b'"' | b'\'' => self.skip_string(c),
                b'/' if next == Some(b'*') => self.skip_until("*/"),
                b'/' if next == Some(b'/') && parens == 0 => self.skip_until("\n"),
                b'#' if next == Some(b'{') => self.skip_interpolation(),
                b'(' => parens += 1,
                b')' => parens = parens.saturating_sub(1),
                b';' | b'{' | b'}' if parens == 0 => {
                    let at = self.pos;
                    self.pos += 1;
                    return Some((at, c));
                }
                _ => {}
            }
            self.pos += 1;
        }
        None
    }

    /// Leaves `pos` on the closing quote.
    fn skip_string(&mut self, quote: u8) {
        let bytes = self.src.as_bytes();
        self.pos += 1;
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'\\' => self.pos += 1,
                c if c == quote => return,
                _ => {}
            }
            self.pos += 1;
        }
    }

    /// Leaves `pos` on the last byte of `end`.
    fn skip_until(&mut self, end: &str) {
        match self.src[self.pos + 2..].find(end) {
            Some(offset) => self.pos += 2 + offset + end.len() - 1,
            None => self.pos = self.src.len(),
        }
    }

    /// Leaves `pos` on the `}` closing the interpolation.
    fn skip_interpolation(&mut self) {
        let bytes = self.src.as_bytes();
        let mut depth = 0usize;
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'{' => depth += 1,
                b'}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::{PathTable, default_entries};
    use tempfile::TempDir;

    #[test]
    fn test_sorts_block() {
        let input = ".a {\n  color: red;\n  background: blue;\n  margin: 0;\n}\n";
        assert_eq!(
            sort_declarations(input),
            ".a {\n  background: blue;\n  color: red;\n  margin: 0;\n}\n"
        );
    }

    #[test]
    fn test_nested_rules_split_runs() {
        let input = ".a {\n  z-index: 1;\n  &:hover {\n    color: red;\n    border: 0;\n  }\n  display: block;\n}";
        assert_eq!(
            sort_declarations(input),
            ".a {\n  z-index: 1;\n  &:hover {\n    border: 0;\n    color: red;\n  }\n  display: block;\n}"
        );
    }

    #[test]
    fn test_at_rules_stay_in_place() {
        let input = ".a {\n  width: 1px;\n  @include m;\n  height: 2px;\n  color: red;\n}";
        assert_eq!(
            sort_declarations(input),
            ".a {\n  width: 1px;\n  @include m;\n  color: red;\n  height: 2px;\n}"
        );
    }

    #[test]
    fn test_vendor_prefix_next_to_property() {
        let input = ".a {\n  transition: none;\n  -webkit-transition: none;\n  opacity: 1;\n}";
        assert_eq!(
            sort_declarations(input),
            ".a {\n  opacity: 1;\n  -webkit-transition: none;\n  transition: none;\n}"
        );
    }

    #[test]
    fn test_comment_moves_with_declaration() {
        let input = ".a {\n  /* brand */\n  color: red;\n  background: blue;\n}";
        assert_eq!(
            sort_declarations(input),
            ".a {\n  background: blue;\n  /* brand */\n  color: red;\n}"
        );
    }

    #[test]
    fn test_strings_and_urls_are_opaque() {
        let input = ".a {\n  content: \"b; {c}\";\n  background: url(data:image/png;base64,AA);\n}";
        assert_eq!(
            sort_declarations(input),
            ".a {\n  background: url(data:image/png;base64,AA);\n  content: \"b; {c}\";\n}"
        );
    }

    #[test]
    fn test_interpolation_in_selector() {
        let input = ".col-#{$i} {\n  width: 1px;\n  float: left;\n}";
        assert_eq!(
            sort_declarations(input),
            ".col-#{$i} {\n  float: left;\n  width: 1px;\n}"
        );
    }

    #[test]
    fn test_top_level_untouched() {
        let input = "$b: 2;\n$a: 1;\n@import 'x';\n";
        assert_eq!(sort_declarations(input), input);
    }

    #[test]
    fn test_idempotent() {
        let input = "// header\n.a { b: 1; a: 2; .c { z: 1; y: 2; } }\n.d{x:1;w:2}";
        let once = sort_declarations(input);
        assert_eq!(sort_declarations(&once), once);
        assert!(once.contains("{ a: 2; b: 1; .c { y: 2; z: 1; } }"));
        assert!(once.ends_with(".d{w:2;x:1}"));
    }

    #[test]
    fn test_sorts_declaration_without_semicolon() {
        assert_eq!(sort_declarations(".a { z: 1; a: 2 }"), ".a { a: 2; z: 1 }");
        assert_eq!(
            sort_declarations(".a {\n  b: 1;\n  a: 2\n}\n"),
            ".a {\n  a: 2;\n  b: 1\n}\n"
        );
        // Already last after sorting
        assert_eq!(sort_declarations(".a { b: 1; z: 2 }"), ".a { b: 1; z: 2 }");
    }

    #[test]
    fn test_trailing_at_rule_stays_in_tail() {
        let input = ".a { b: 1; a: 2; @include m }";
        assert_eq!(sort_declarations(input), ".a { a: 2; b: 1; @include m }");
    }

    #[test]
    fn test_unbalanced_input_is_preserved() {
        let input = ".a { color: red; }\n}\n.b { b: 1; a: 2;";
        let sorted = sort_declarations(input);
        assert_eq!(sorted.len(), input.len());
        assert!(sorted.starts_with(".a { color: red; }\n}\n.b {"));
    }

    #[test]
    fn test_run_writes_only_changed_files() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir_all(src.join("scss/blocks")).unwrap();
        std::fs::write(src.join("scss/style.scss"), ".a { a: 1; b: 2; }").unwrap();
        std::fs::write(src.join("scss/blocks/_x.scss"), ".x { b: 1; a: 2; }").unwrap();

        let table = PathTable::new(src.clone(), dir.path().join("build"), default_entries()).unwrap();
        let report = run(&table).unwrap();

        assert_eq!(report.written, vec![src.join("scss/blocks/_x.scss")]);
        assert_eq!(report.skipped, 1);
        assert_eq!(
            std::fs::read_to_string(src.join("scss/blocks/_x.scss")).unwrap(),
            ".x { a: 2; b: 1; }"
        );
    }
}
