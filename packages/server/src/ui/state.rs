//! Server state shared by every handler.

use std::sync::Arc;

use crate::{
    config::{Heartbeat, RelayMode},
    domain::ConnectionRegistry,
    usecase::SessionHandler,
};

/// Shared application state
pub struct AppState {
    /// Which variant `session_handler` implements
    pub mode: RelayMode,
    /// ConnectionRegistry（接続中のクライアント）
    pub registry: Arc<dyn ConnectionRegistry>,
    /// Variant behavior for join / inbound frame / leave
    pub session_handler: Arc<dyn SessionHandler>,
    pub heartbeat: Heartbeat,
}
