//! Interactive WebSocket client for the Agora broadcast servers.
//!
//! A session runs a receive loop and a send loop against one connection; the
//! first loop to finish cancels the other.

pub mod domain;
pub mod error;
pub mod formatter;
pub mod runner;
pub mod script;
pub mod session;
pub mod ui;

pub use domain::ClientMode;
pub use error::ClientError;
pub use runner::{ClientConfig, run_client};
pub use script::{Script, run_script};
pub use session::{InputSource, MessageSink, SessionEnd, run_session};
