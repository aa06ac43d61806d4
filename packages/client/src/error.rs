//! Error types for the WebSocket client.

use std::time::Duration;

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Nothing is listening at the server address
    #[error("Could not connect to {url}. Make sure the server is running")]
    ConnectionRefused { url: String },

    /// Any other failure to establish or use the connection
    #[error("Connection error: {0}")]
    Connection(String),

    /// The server went away mid-session
    #[error("Connection lost")]
    ConnectionLost,

    /// A scripted message got no answer in time
    #[error("No reply from server within {0:?}")]
    NoReply(Duration),
}
