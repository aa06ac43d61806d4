//! Real-time WebSocket broadcast servers.
//!
//! One process runs one variant, selected by [`RelayMode`]:
//!
//! - **chat**: every line is relayed to all other connections as `Client <id>: <text>`
//! - **counter**: `increment` / `reset` mutate one shared counter and the new value
//!   is broadcast to everyone
//! - **echo**: every line is answered to its sender
//!
//! Connections live in a [`domain::ConnectionRegistry`]; broadcasts iterate a
//! snapshot of it and drop peers whose writer is gone.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
pub mod error;

pub use config::{Heartbeat, RelayMode, ServerConfig};
pub use error::ServerError;
pub use ui::Server;
