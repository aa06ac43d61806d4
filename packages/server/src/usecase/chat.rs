//! UseCase: チャット中継
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - 接続時の挨拶と連番 ID
//! - 送信者以外の全接続へのブロードキャスト
//! - ブロードキャスト中に切断された接続の扱い
//!
//! ### どのような状況を想定しているか
//! - 正常系：N 人接続時に N-1 人へ届く
//! - エッジケース：送信者のみが接続している場合（ブロードキャスト対象なし）
//! - 異常系：途中で切断した接続がいる場合

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Connection, ConnectionId, ConnectionRegistry, PusherChannel, message};

use super::{BroadcastReport, Joined, SessionHandler, fan_out};

/// Relays every inbound line to all other connections as `Client <id>: <text>`.
pub struct ChatRelayUseCase {
    registry: Arc<dyn ConnectionRegistry>,
}

impl ChatRelayUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Register a connection and build its welcome line.
    pub async fn connect(&self, channel: PusherChannel) -> Joined {
        let id = self.registry.register(channel.clone()).await;
        tracing::info!(
            "Client {} connected! Total clients: {}",
            id,
            self.registry.count().await
        );

        Joined {
            connection: Connection::new(id, channel),
            greeting: Some(message::welcome(id)),
        }
    }

    /// Broadcast `text` from `from` to every other registered connection.
    pub async fn relay(&self, from: ConnectionId, text: &str) -> BroadcastReport {
        tracing::info!("Client {}: {}", from, text);

        let targets: Vec<Connection> = self
            .registry
            .snapshot()
            .await
            .into_iter()
            .filter(|c| c.id() != from)
            .collect();

        fan_out(
            self.registry.as_ref(),
            targets,
            &message::chat_line(from, text),
        )
        .await
    }

    pub async fn disconnect(&self, id: ConnectionId) -> bool {
        let removed = self.registry.deregister(id).await;
        tracing::info!(
            "Client {} left. Total clients: {}",
            id,
            self.registry.count().await
        );
        removed
    }
}

#[async_trait]
impl SessionHandler for ChatRelayUseCase {
    async fn join(&self, channel: PusherChannel) -> Joined {
        self.connect(channel).await
    }

    async fn on_message(&self, from: &Connection, text: &str) {
        self.relay(from.id(), text).await;
    }

    async fn leave(&self, id: ConnectionId) {
        self.disconnect(id).await;
    }
}
