//! Development server with live reload support.
//!
//! Serves the destination tree over HTTP. When the reload channel is enabled,
//! HTML responses carry the live reload client and a WebSocket server pushes
//! task announcements to connected pages.

mod content;
mod lifecycle;
mod path;
mod response;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tiny_http::{Request, Server};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::actor::messages::WsMsg;
use crate::embed::serve::LIVERELOAD_URL;
use crate::task::TaskContext;
use crate::{debug, log};

/// Request handler state, shared by the worker pool.
pub struct ServeState {
    /// Destination root being served.
    root: PathBuf,
    /// Bound reload port, `None` when live reload is off.
    ws_port: Option<u16>,
    /// Show the in-page connection banner.
    notify: bool,
}

impl ServeState {
    fn reload_enabled(&self) -> bool {
        self.ws_port.is_some()
    }
}

/// Serve the destination root until shutdown.
///
/// `ws_rx` is the receiving end of `ctx.reload`; without it the server runs
/// without live reload.
pub fn serve(ctx: &TaskContext, ws_rx: Option<UnboundedReceiver<WsMsg>>) -> Result<()> {
    let serve = &ctx.config.serve;
    let (server, addr) = lifecycle::bind_with_retry(serve.interface, serve.port)?;
    let server = Arc::new(server);
    crate::core::register_server(Arc::clone(&server));

    let (ws_port, actor) = match (ctx.reload.sender(), ws_rx) {
        (Some(ws_tx), Some(ws_rx)) => {
            let (port, handle) =
                lifecycle::spawn_reload(serve.interface, serve.reload_port, ws_tx, ws_rx)
                    .context("failed to start live reload server")?;
            debug!("reload"; "ws://{}:{}", serve.interface, port);
            (Some(port), Some(handle))
        }
        _ => (None, None),
    };

    let state = Arc::new(ServeState {
        root: ctx.table.dest_root().to_path_buf(),
        ws_port,
        notify: serve.notify,
    });

    log!("serve"; "http://{}", addr);
    run_request_loop(&server, &state)?;

    ctx.reload.shutdown();
    lifecycle::wait_for_shutdown(actor);
    Ok(())
}

/// Handle requests on a small pool until the server is unblocked.
fn run_request_loop(server: &Server, state: &Arc<ServeState>) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .context("failed to create request pool")?;

    for request in server.incoming_requests() {
        let state = Arc::clone(state);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &state) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, state: &ServeState) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    if let Some(port) = state.ws_port
        && request.url().split('?').next() == Some(LIVERELOAD_URL)
    {
        return response::respond_livereload_js(request, port, state.notify);
    }

    if let Some(path) = path::resolve_path(request.url(), &state.root) {
        return response::respond_file(request, &path, state);
    }

    response::respond_not_found(request, state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{Ipv4Addr, TcpStream};
    use tempfile::TempDir;

    /// Start a server on an ephemeral port; returns its address.
    fn start(state: ServeState) -> (Arc<Server>, std::net::SocketAddr) {
        let server = Arc::new(Server::http((Ipv4Addr::LOCALHOST, 0)).unwrap());
        let addr = server.server_addr().to_ip().unwrap();
        let state = Arc::new(state);
        let loop_server = Arc::clone(&server);
        std::thread::spawn(move || run_request_loop(&loop_server, &state));
        (server, addr)
    }

    fn get(addr: std::net::SocketAddr, method: &str, url: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        write!(
            stream,
            "{method} {url} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n"
        )
        .unwrap();
        let mut out = String::new();
        stream.read_to_string(&mut out).unwrap();
        out
    }

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html><body>home</body></html>").unwrap();
        std::fs::write(dir.path().join("app.js"), "let a=1;").unwrap();
        dir
    }

    #[test]
    fn test_serves_with_livereload() {
        let dir = site();
        let (server, addr) = start(ServeState {
            root: dir.path().to_path_buf(),
            ws_port: Some(35999),
            notify: true,
        });

        let index = get(addr, "GET", "/");
        assert!(index.starts_with("HTTP/1.1 200"));
        assert!(index.contains(&format!("home{}</body>", crate::embed::serve::livereload_tag())));

        let js = get(addr, "GET", "/app.js");
        assert!(js.ends_with("let a=1;"));

        let client = get(addr, "GET", LIVERELOAD_URL);
        assert!(client.contains("var port = 35999;"));
        assert!(client.contains("var notify = true;"));

        server.unblock();
    }

    #[test]
    fn test_not_found_and_head() {
        let dir = site();
        let (server, addr) = start(ServeState {
            root: dir.path().to_path_buf(),
            ws_port: None,
            notify: false,
        });

        assert!(get(addr, "GET", "/nope.css").starts_with("HTTP/1.1 404"));
        assert!(get(addr, "GET", LIVERELOAD_URL).starts_with("HTTP/1.1 404"));

        let head = get(addr, "HEAD", "/index.html");
        assert!(head.starts_with("HTTP/1.1 200"));
        assert!(!head.contains("home"));

        std::fs::write(dir.path().join("404.html"), "<body>custom</body>").unwrap();
        let custom = get(addr, "GET", "/nope.css");
        assert!(custom.starts_with("HTTP/1.1 404"));
        assert!(custom.contains("<body>custom</body>"));

        server.unblock();
    }
}
