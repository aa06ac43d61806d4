//! UseCase: 共有カウンター
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - 接続時に現在値が新規接続にだけ送られること
//! - increment / reset が送信者を含む全接続にブロードキャストされること
//! - 同時 increment で更新が失われないこと
//! - 語彙にないコマンドが無視されること

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Connection, ConnectionId, ConnectionRegistry, CounterCommand, PusherChannel, SharedCounter,
    message,
};

use super::{BroadcastReport, Joined, SessionHandler, fan_out};

/// What a counter frame led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterOutcome {
    Incremented { value: i64, report: BroadcastReport },
    Reset { report: BroadcastReport },
    /// Not part of the vocabulary; nothing was sent to anyone
    Ignored,
}

/// Shared counter server: `increment` and `reset` are applied to one
/// [`SharedCounter`] and the result is broadcast to every connection.
pub struct CounterUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    counter: Arc<SharedCounter>,
    /// Held across register + read and across mutate + fan-out.
    sequencer: Mutex<()>,
}

impl CounterUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>, counter: Arc<SharedCounter>) -> Self {
        Self {
            registry,
            counter,
            sequencer: Mutex::new(()),
        }
    }

    /// Register a connection and build its `Current counter` greeting.
    pub async fn connect(&self, channel: PusherChannel) -> Joined {
        let (id, value) = {
            let _turn = self.sequencer.lock().await;
            let id = self.registry.register(channel.clone()).await;
            (id, self.counter.get())
        };
        tracing::info!(
            "Client {} connected! Total clients: {}",
            id,
            self.registry.count().await
        );

        Joined {
            connection: Connection::new(id, channel),
            greeting: Some(message::current_counter(value)),
        }
    }

    /// Apply one inbound frame from `from`.
    pub async fn apply(&self, from: ConnectionId, text: &str) -> CounterOutcome {
        tracing::info!("Client {} sent: {}", from, text);

        let Some(command) = CounterCommand::parse(text) else {
            tracing::debug!("Ignoring unrecognized command from client {}", from);
            return CounterOutcome::Ignored;
        };

        let _turn = self.sequencer.lock().await;
        match command {
            CounterCommand::Increment => {
                let value = self.counter.increment();
                tracing::info!("Counter incremented to: {}", value);
                let report = self.broadcast(&message::counter_value(value)).await;
                CounterOutcome::Incremented { value, report }
            }
            CounterCommand::Reset => {
                self.counter.reset();
                tracing::info!("Counter reset to 0");
                let report = self.broadcast(message::COUNTER_RESET).await;
                CounterOutcome::Reset { report }
            }
        }
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

    pub fn value(&self) -> i64 {
        self.counter.get()
    }

    async fn broadcast(&self, content: &str) -> BroadcastReport {
        let targets = self.registry.snapshot().await;
        fan_out(self.registry.as_ref(), targets, content).await
    }
}

#[async_trait]
impl SessionHandler for CounterUseCase {
    async fn join(&self, channel: PusherChannel) -> Joined {
        self.connect(channel).await
    }

    async fn on_message(&self, from: &Connection, text: &str) {
        self.apply(from.id(), text).await;
    }

    async fn leave(&self, id: ConnectionId) {
        self.disconnect(id).await;
    }
}
