//! ConnectionRegistry trait 定義
//!
//! ブロードキャスト対象となる接続の集合を管理するインターフェース。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{Connection, ConnectionId, PusherChannel};

/// Authoritative set of currently open connections.
///
/// Broadcasters never iterate the live set: they take a [`snapshot`] and
/// reconcile send failures by calling [`deregister`] back on the registry.
///
/// [`snapshot`]: ConnectionRegistry::snapshot
/// [`deregister`]: ConnectionRegistry::deregister
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// Add a connection and return its sequential identifier.
    async fn register(&self, channel: PusherChannel) -> ConnectionId;

    /// Remove a connection. Returns `false` (and does nothing) when it was already absent.
    async fn deregister(&self, id: ConnectionId) -> bool;

    /// Point-in-time copy of the members, in arrival order.
    async fn snapshot(&self) -> Vec<Connection>;

    /// Number of registered connections.
    async fn count(&self) -> usize;
}
