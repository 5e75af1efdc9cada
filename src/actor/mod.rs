//! Actors for dev mode
//!
//! ```text
//! WatchActor --run_task--> ReloadHandle --[WsMsg]--> WsActor
//!  (notify)                                        (broadcast)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for the WebSocket actor
//! - `fs` - File system watcher with debouncing and task routing
//! - `ws` - WebSocket broadcast

pub mod fs;
pub mod messages;
pub mod ws;

pub use fs::WatchActor;
pub use ws::WsActor;
