//! UseCase: echo server. Every frame is answered to its sender only.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    Connection, ConnectionId, ConnectionRegistry, PushError, PusherChannel, message,
};

use super::{Joined, SessionHandler};

pub struct EchoUseCase {
    registry: Arc<dyn ConnectionRegistry>,
}

impl EchoUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    pub async fn connect(&self, channel: PusherChannel) -> Joined {
        let id = self.registry.register(channel.clone()).await;
        tracing::info!("New client connected! (client {})", id);

        Joined {
            connection: Connection::new(id, channel),
            greeting: None,
        }
    }

    /// Answer `text` back to `from`, deregistering it if its writer is gone.
    pub async fn reply(&self, from: &Connection, text: &str) -> Result<(), PushError> {
        tracing::info!("Received: {}", text);
        let response = message::echo_reply(text);

        if let Err(e) = from.push(&response) {
            tracing::warn!("Failed to echo to client {}: {}", from.id(), e);
            self.registry.deregister(from.id()).await;
            return Err(e);
        }
        tracing::debug!("Sent back: {}", response);
        Ok(())
    }

    pub async fn disconnect(&self, id: ConnectionId) -> bool {
        let removed = self.registry.deregister(id).await;
        tracing::info!("Client {} disconnected!", id);
        removed
    }
}

#[async_trait]
impl SessionHandler for EchoUseCase {
    async fn join(&self, channel: PusherChannel) -> Joined {
        self.connect(channel).await
    }

    async fn on_message(&self, from: &Connection, text: &str) {
        // 送信失敗時の登録解除は reply 内で完了している
        let _ = self.reply(from, text).await;
    }

    async fn leave(&self, id: ConnectionId) {
        self.disconnect(id).await;
    }
}
