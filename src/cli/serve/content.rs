//! Live reload client injection.

use crate::embed::serve::livereload_tag;
use crate::utils::mime::is_html;

/// Inject the live reload tag if content is HTML and reload is enabled
pub fn maybe_inject_livereload(body: Vec<u8>, content_type: &str, enabled: bool) -> Vec<u8> {
    if enabled && is_html(content_type) {
        inject_livereload(&body)
    } else {
        body
    }
}

/// Insert the tag before the last `</body>`, or append it when missing.
fn inject_livereload(content: &[u8]) -> Vec<u8> {
    let tag = livereload_tag();
    let tag = tag.as_bytes();

    const PATTERN: &[u8] = b"</body>";

    let pos = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
        .unwrap_or(content.len());

    let mut result = Vec::with_capacity(content.len() + tag.len());
    result.extend_from_slice(&content[..pos]);
    result.extend_from_slice(tag);
    result.extend_from_slice(&content[pos..]);
    result
}
