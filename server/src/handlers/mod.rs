//! Request handlers shared by the HTTP routes and the WebSocket.

pub mod inspections;
pub mod notifications;
pub mod session;
pub mod websocket;

pub use inspections::SaveResponse;
pub use session::{ConnectivityRequest, ConnectivityResponse};
