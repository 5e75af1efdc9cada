//! Actor Message Definitions
//!
//! ```text
//! WatchActor --run_task--> task --ReloadHandle--> WsActor
//! ```

use std::net::TcpStream;

use crate::reload::ReloadMessage;

/// Messages to WebSocket Actor
#[derive(Debug)]
pub enum WsMsg {
    /// Forward a message to every connected client
    Broadcast(ReloadMessage),
    /// Accepted connection awaiting the WebSocket handshake
    AddClient(TcpStream),
    /// Close all clients and stop
    Shutdown,
}
