//! WebSocket support for live session updates.
//!
//! Clients connect via WebSocket, receive the session state on connect and
//! a push for every notification and state change afterwards. They may
//! also drive the session (save, sync, toggle connectivity) over the same
//! socket.

mod manager;
mod protocol;

pub use manager::ConnectionManager;
pub use protocol::*;
