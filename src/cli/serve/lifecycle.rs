//! Server lifecycle management.

use std::net::{IpAddr, SocketAddr};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Result, anyhow};
use tiny_http::Server;
use tokio::sync::mpsc;

use crate::actor::WsActor;
use crate::actor::messages::WsMsg;
use crate::log;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Bind to the specified interface and port, with automatic port retry.
pub fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..MAX_PORT_RETRIES {
        let Some(port) = base_port.checked_add(offset) else {
            break;
        };
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "failed to bind after {} attempts (from port {}): {}",
        MAX_PORT_RETRIES,
        base_port,
        last_error.map_or_else(|| "port range exhausted".to_string(), |e| e.to_string())
    ))
}

/// Start the reload WebSocket server and its actor.
///
/// Returns the bound port and the actor thread.
pub fn spawn_reload(
    interface: IpAddr,
    reload_port: u16,
    ws_tx: mpsc::UnboundedSender<WsMsg>,
    ws_rx: mpsc::UnboundedReceiver<WsMsg>,
) -> Result<(u16, JoinHandle<()>)> {
    let port = crate::reload::server::start_ws_server(interface, reload_port, ws_tx)?;

    let handle = thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                log!("reload"; "failed to create runtime: {}", e);
                return;
            }
        };
        rt.block_on(WsActor::new(ws_rx).run());
    });

    Ok((port, handle))
}

/// Wait for the reload actor to stop (max 2 seconds).
pub fn wait_for_shutdown(handle: Option<JoinHandle<()>>) {
    let Some(handle) = handle else { return };

    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(Duration::from_millis(50));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, TcpListener};

    #[test]
    fn test_bind_skips_busy_port() {
        let busy = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = busy.local_addr().unwrap().port();

        let (_server, addr) = bind_with_retry(IpAddr::V4(Ipv4Addr::LOCALHOST), port).unwrap();
        assert_ne!(addr.port(), port);
        assert!(addr.port() > port);
    }
}
