//! Reload Module
//!
//! WebSocket-based live reload for the dev scenario.
//!
//! # Architecture
//!
//! ```text
//! task --ReloadHandle--> WsActor --[broadcast]--> Browser
//!                           ^
//!        acceptor thread ---+ (new clients)
//! ```
//!
//! # Modules
//!
//! - `message` - Live reload message types (connected, reload, css)
//! - `server` - WebSocket acceptor for client connections

pub mod message;
pub mod server;

pub use message::ReloadMessage;

use std::path::Path;

use tokio::sync::mpsc;

use crate::actor::messages::WsMsg;

/// Sender side of the live-reload channel, injected into every task.
///
/// A disabled handle (build, clean) silently drops events.
#[derive(Debug, Clone, Default)]
pub struct ReloadHandle {
    tx: Option<mpsc::UnboundedSender<WsMsg>>,
}

impl ReloadHandle {
    /// Handle that never sends.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Create the live-reload channel. The receiver belongs to the `WsActor`.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<WsMsg>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Raw sender, for the acceptor thread.
    pub(crate) fn sender(&self) -> Option<mpsc::UnboundedSender<WsMsg>> {
        self.tx.clone()
    }

    /// Broadcast a message to all connected browsers.
    pub fn send(&self, message: ReloadMessage) {
        let Some(tx) = &self.tx else {
            return;
        };
        crate::debug!("reload"; "{}", message.to_json());
        if tx.send(WsMsg::Broadcast(message)).is_err() {
            crate::debug!("reload"; "reload server is gone, event dropped");
        }
    }

    /// Ask the reload server to close all clients.
    pub fn shutdown(&self) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(WsMsg::Shutdown);
        }
    }
}

/// URL of a destination file as seen by the browser (`/css/style.min.css`).
pub fn url_of(dest_root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(dest_root).unwrap_or(file);
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    format!("/{}", parts.join("/"))
}
