//! The seam between the WebSocket session loop and a broadcast variant.

use async_trait::async_trait;

use crate::domain::{Connection, ConnectionId, PusherChannel};

/// Result of admitting a new connection.
#[derive(Debug)]
pub struct Joined {
    /// Handle of the freshly registered connection
    pub connection: Connection,
    /// First frame to write on the socket, before any queued broadcast
    pub greeting: Option<String>,
}

/// Per-variant behavior driven by the WebSocket session loop.
#[async_trait]
pub trait SessionHandler: Send + Sync {
    /// Register the connection whose outbound queue is `channel`.
    async fn join(&self, channel: PusherChannel) -> Joined;

    /// Handle one inbound text frame from `from`.
    async fn on_message(&self, from: &Connection, text: &str);

    /// Deregister the connection. Safe to call after a broadcast already dropped it.
    async fn leave(&self, id: ConnectionId);
}
