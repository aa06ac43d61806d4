//! WebSocket broadcast server: routing, handlers and shared state.

mod handler;
mod server;
mod signal;
pub mod state;

pub use handler::websocket::CloseReason;
pub use server::Server;
