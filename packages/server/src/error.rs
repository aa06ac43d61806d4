//! Error types for the broadcast server.

use thiserror::Error;

/// Server-fatal errors. Per-connection failures never surface here.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening endpoint could not be bound
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The accept loop failed
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),

    /// Rejected configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
