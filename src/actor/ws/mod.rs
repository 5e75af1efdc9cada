//! WebSocket Actor - Live Reload Broadcast
//!
//! This actor is responsible for:
//! - Completing the WebSocket handshake for accepted connections
//! - Broadcasting reload messages to all connected clients
//! - Dropping clients that closed or errored
//!
//! # Architecture
//!
//! ```text
//! tasks --[Broadcast]--> WsActor --[broadcast]--> Clients
//!                           ^
//! acceptor --[AddClient]----+
//! ```

mod client_io;

use std::net::TcpStream;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::messages::WsMsg;
use crate::reload::ReloadMessage;

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

/// WebSocket Actor - manages client connections and broadcasts
pub struct WsActor {
    /// Channel to receive messages
    rx: mpsc::UnboundedReceiver<WsMsg>,
    /// Connected clients (shared for broadcast + read threads)
    clients: Clients,
}

impl WsActor {
    pub fn new(rx: mpsc::UnboundedReceiver<WsMsg>) -> Self {
        Self {
            rx,
            clients: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Run the actor event loop until shutdown or all senders are gone.
    pub async fn run(mut self) {
        let clients_for_reader = Arc::clone(&self.clients);
        std::thread::spawn(move || {
            Self::client_reader_loop(clients_for_reader);
        });

        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::Broadcast(message) => {
                    self.broadcast(&message);
                }

                WsMsg::AddClient(stream) => {
                    self.add_client(stream);
                }

                WsMsg::Shutdown => {
                    crate::debug!("ws"; "shutting down");
                    for mut ws in self.clients.lock().drain(..) {
                        let _ = ws.close(None);
                    }
                    break;
                }
            }
        }
    }

    /// Broadcast a message to all connected clients
    fn broadcast(&self, message: &ReloadMessage) {
        let mut clients = self.clients.lock();
        let count = clients.len();

        if count == 0 {
            crate::debug!("ws"; "no clients connected");
            return;
        }

        let frame = Message::Text(message.to_json().into());
        clients.retain_mut(|ws| match ws.send(frame.clone()) {
            Ok(_) => true,
            Err(e) => {
                crate::debug!("ws"; "client disconnected: {}", e);
                false
            }
        });
        crate::debug!("ws"; "broadcast to {} clients", count);
    }
}
