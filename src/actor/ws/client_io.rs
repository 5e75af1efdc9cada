use std::io::ErrorKind;
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use tungstenite::protocol::Message;

use super::{Clients, WsActor};
use crate::reload::ReloadMessage;

impl WsActor {
    /// Complete the handshake and register the client.
    pub(super) fn add_client(&self, stream: TcpStream) {
        // Blocking during the handshake, non-blocking afterwards for polling reads
        match tungstenite::accept(stream) {
            Ok(mut ws) => {
                let _ = ws.get_ref().set_nonblocking(true);

                let connected = ReloadMessage::connected();
                if let Err(e) = ws.send(Message::Text(connected.to_json().into())) {
                    crate::log!("ws"; "failed to send connected message: {}", e);
                    return;
                }

                let mut clients = self.clients.lock();
                clients.push(ws);
                crate::debug!("ws"; "client connected (total: {})", clients.len());
            }
            Err(e) => {
                crate::log!("ws"; "handshake failed: {}", e);
            }
        }
    }

    /// Drain client frames and drop closed connections.
    ///
    /// Clients never send anything meaningful; reading is only needed to
    /// answer pings and notice disconnects. Exits once the actor is gone.
    pub(super) fn client_reader_loop(clients: Clients) {
        while Arc::strong_count(&clients) > 1 {
            std::thread::sleep(Duration::from_millis(100));

            let mut guard = clients.lock();
            guard.retain_mut(|ws| match ws.read() {
                Ok(Message::Close(_)) => false,
                Ok(_) => true,
                Err(tungstenite::Error::Io(ref e)) if e.kind() == ErrorKind::WouldBlock => true,
                Err(e) => {
                    crate::debug!("ws"; "client dropped: {}", e);
                    false
                }
            });
        }
    }
}
