//! Domain layer: connections, the registry seam, the shared counter and the
//! wire vocabulary spoken by every broadcast variant.

mod connection;
mod counter;
mod error;
pub mod message;
mod registry;

pub use connection::{Connection, ConnectionId, ConnectionState, PusherChannel};
pub use counter::{CounterCommand, SharedCounter};
pub use error::{InvalidTransition, PushError};
pub use registry::ConnectionRegistry;

#[cfg(test)]
pub use registry::MockConnectionRegistry;
