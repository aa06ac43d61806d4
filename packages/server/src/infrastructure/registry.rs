//! InMemory ConnectionRegistry 実装
//!
//! ドメイン層が定義する ConnectionRegistry trait の具体的な実装。
//! 到着順を保持する Vec を `tokio::sync::Mutex` で保護します。
//!
//! ## 設計ノート
//!
//! - ロックを保持するのは登録・削除・スナップショット作成の間だけ
//! - ブロードキャストはスナップショットをロックの外で走査する
//! - 送信失敗した接続は呼び出し側が `deregister` で取り除く

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Connection, ConnectionId, ConnectionRegistry, PusherChannel};

#[derive(Debug, Default)]
struct Members {
    /// Last identifier handed out; ids start at 1
    last_id: u64,
    /// Registered connections in arrival order
    entries: Vec<Connection>,
}

/// インメモリ ConnectionRegistry 実装
#[derive(Debug, Default)]
pub struct InMemoryConnectionRegistry {
    members: Mutex<Members>,
}

impl InMemoryConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn register(&self, channel: PusherChannel) -> ConnectionId {
        let mut members = self.members.lock().await;
        members.last_id += 1;
        let id = ConnectionId::new(members.last_id);
        members.entries.push(Connection::new(id, channel));
        tracing::debug!(
            "Client {} registered. Total clients: {}",
            id,
            members.entries.len()
        );
        id
    }

    async fn deregister(&self, id: ConnectionId) -> bool {
        let mut members = self.members.lock().await;
        match members.entries.iter().position(|c| c.id() == id) {
            Some(index) => {
                members.entries.remove(index);
                tracing::debug!(
                    "Client {} deregistered. Total clients: {}",
                    id,
                    members.entries.len()
                );
                true
            }
            None => false,
        }
    }

    async fn snapshot(&self) -> Vec<Connection> {
        self.members.lock().await.entries.clone()
    }

    async fn count(&self) -> usize {
        self.members.lock().await.entries.len()
    }
}
