//! Connection handles and the per-connection lifecycle.

use std::fmt;

use tokio::sync::mpsc;

use super::{InvalidTransition, PushError};

/// Outbound queue feeding one socket's writer task.
///
/// Unbounded so that a broadcast never waits on a slow peer; FIFO per connection.
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Process-unique sequential connection identifier, assigned at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-owning handle to one open connection.
///
/// The socket itself belongs to the session task; the handle only carries the
/// identifier and a clone of the outbound queue, so the registry can hand out
/// copies freely for broadcast.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    channel: PusherChannel,
}

impl Connection {
    pub fn new(id: ConnectionId, channel: PusherChannel) -> Self {
        Self { id, channel }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue `content` for delivery to this connection.
    ///
    /// # Errors
    ///
    /// Returns [`PushError::PeerGone`] when the writer side has already shut down.
    pub fn push(&self, content: &str) -> Result<(), PushError> {
        self.channel
            .send(content.to_string())
            .map_err(|_| PushError::PeerGone(self.id))
    }

    /// `true` once the writer side has dropped its receiver.
    pub fn is_closed(&self) -> bool {
        self.channel.is_closed()
    }
}

/// Server-side lifecycle of one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Upgraded, greeting not yet delivered
    Connecting,
    /// Registered and looping on inbound reads
    Open,
    /// Read loop ended (end-of-stream, error, close frame or idle timeout)
    Closing,
    /// Deregistered and task finished
    Closed,
}

impl ConnectionState {
    /// Move to `next`, rejecting anything that would reopen or skip backwards.
    pub fn advance(self, next: ConnectionState) -> Result<ConnectionState, InvalidTransition> {
        use ConnectionState::*;

        match (self, next) {
            (Connecting, Open) | (Connecting, Closed) | (Open, Closing) | (Closing, Closed) => {
                Ok(next)
            }
            (from, to) => Err(InvalidTransition { from, to }),
        }
    }

    pub fn is_terminal(self) -> bool {
        self == ConnectionState::Closed
    }
}
