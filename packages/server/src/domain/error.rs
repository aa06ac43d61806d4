//! Domain error types.

use thiserror::Error;

use super::{ConnectionId, ConnectionState};

/// Failure to hand a message to one connection's outbound writer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PushError {
    /// The writer side of the connection is gone (socket closed or writer task ended)
    #[error("client {0} is gone")]
    PeerGone(ConnectionId),
}

/// A lifecycle transition that the connection state machine does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid connection state transition: {from:?} -> {to:?}")]
pub struct InvalidTransition {
    pub from: ConnectionState,
    pub to: ConnectionState,
}
