//! HTTP response handlers.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use super::ServeState;
use super::content::maybe_inject_livereload;
use crate::utils::mime::types::{HTML, JAVASCRIPT, PLAIN};

/// Respond with a static file, injecting the live reload tag into HTML.
pub fn respond_file(request: Request, path: &Path, state: &ServeState) -> Result<()> {
    let content_type = crate::utils::mime::from_path(path);

    if is_head_request(&request) {
        return send_head(request, 200, content_type);
    }

    if let Some(range) = get_range_header(&request) {
        return respond_range(request, path, content_type, &range);
    }

    let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let body = maybe_inject_livereload(body, content_type, state.reload_enabled());

    send_body(request, 200, content_type, body)
}

/// Handle Range request for media files (video/audio seeking).
fn respond_range(
    request: Request,
    path: &Path,
    content_type: &'static str,
    range: &str,
) -> Result<()> {
    use std::io::{Read, Seek, SeekFrom};

    let file_size = fs::metadata(path)?.len();
    let range = range.strip_prefix("bytes=").unwrap_or(range);
    let Some((start, end)) = parse_range(range, file_size) else {
        let response = Response::empty(StatusCode(416)).with_header(header(
            "Content-Range",
            &format!("bytes */{file_size}"),
        )?);
        request.respond(response)?;
        return Ok(());
    };

    let length = end - start + 1;

    let mut file = fs::File::open(path)?;
    file.seek(SeekFrom::Start(start))?;
    let reader = file.take(length);

    let response = Response::new(
        StatusCode(206),
        vec![
            header("Content-Type", content_type)?,
            header("Content-Range", &format!("bytes {start}-{end}/{file_size}"))?,
            header("Accept-Ranges", "bytes")?,
        ],
        reader,
        Some(length as usize),
        None,
    );

    request.respond(response)?;
    Ok(())
}

/// Parse a `start-end` range into inclusive byte offsets.
fn parse_range(range: &str, file_size: u64) -> Option<(u64, u64)> {
    if file_size == 0 {
        return None;
    }
    let last = file_size - 1;
    let (start, end) = range.trim().split_once('-')?;

    let (start, end) = match (start.trim(), end.trim()) {
        // "-500" - last 500 bytes
        ("", suffix) => (file_size.saturating_sub(suffix.parse().ok()?), last),
        // "0-" - from start to end
        (start, "") => (start.parse().ok()?, last),
        // "0-499" - specific range
        (start, end) => (start.parse().ok()?, end.parse::<u64>().ok()?.min(last)),
    };

    (start <= end).then_some((start, end))
}

fn get_range_header(request: &Request) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.as_str().as_str().eq_ignore_ascii_case("range"))
        .map(|h| h.value.to_string())
}

/// Respond with 404 page (`404.html` from the destination root, or plain text).
pub fn respond_not_found(request: Request, state: &ServeState) -> Result<()> {
    let custom_404 = state.root.join("404.html");
    let has_custom = custom_404.is_file();

    if is_head_request(&request) {
        let mime = if has_custom { HTML } else { PLAIN };
        return send_head(request, 404, mime);
    }

    if has_custom && let Ok(body) = fs::read(&custom_404) {
        let body = maybe_inject_livereload(body, HTML, state.reload_enabled());
        return send_body(request, 404, HTML, body);
    }

    send_body(request, 404, PLAIN, b"404 Not Found".to_vec())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, PLAIN, b"503 Service Unavailable".to_vec())
}

/// Respond with the live reload client.
pub fn respond_livereload_js(request: Request, ws_port: u16, notify: bool) -> Result<()> {
    use crate::embed::serve::{LIVERELOAD_JS, LivereloadVars};

    let body = LIVERELOAD_JS.render(&LivereloadVars { ws_port, notify });
    send_body(request, 200, JAVASCRIPT, body.into_bytes())
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(request: Request, status: u16, content_type: &'static str) -> Result<()> {
    let response = Response::empty(StatusCode(status))
        .with_header(header("Content-Type", content_type)?)
        .with_header(header("Cache-Control", "no-store")?);
    request.respond(response)?;
    Ok(())
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(header("Content-Type", content_type)?)
        .with_header(header("Cache-Control", "no-store")?);
    request.respond(response)?;
    Ok(())
}

fn header(key: &str, value: &str) -> Result<Header> {
    Header::from_bytes(key, value).map_err(|()| anyhow!("invalid header {key}: {value}"))
}
