//! UseCase layer: what each broadcast variant does with a connection's lifecycle
//! and its inbound frames.

mod broadcast;
mod chat;
mod counter;
mod echo;
mod session;

pub use broadcast::{BroadcastReport, fan_out};
pub use chat::ChatRelayUseCase;
pub use counter::{CounterOutcome, CounterUseCase};
pub use echo::EchoUseCase;
pub use session::{Joined, SessionHandler};
