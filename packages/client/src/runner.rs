//! Client execution logic with reconnection support.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::{
    domain::{ClientMode, prompt, should_attempt_reconnect},
    error::ClientError,
    session::{InputSource, MessageSink, SessionEnd, run_session},
    ui::{Terminal, spawn_readline},
};

pub const DEFAULT_URL: &str = "ws://127.0.0.1:8765/ws";
pub const MAX_RECONNECT_ATTEMPTS: u32 = 5;
pub const RECONNECT_INTERVAL: Duration = Duration::from_secs(5);

/// Settings of an interactive client run
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub url: String,
    /// Shown in the local prompt only
    pub name: String,
    pub mode: ClientMode,
    pub max_reconnects: u32,
    pub reconnect_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            name: "me".to_string(),
            mode: ClientMode::default(),
            max_reconnects: MAX_RECONNECT_ATTEMPTS,
            reconnect_interval: RECONNECT_INTERVAL,
        }
    }
}

/// Run the interactive client on the terminal until the user leaves.
pub async fn run_client(config: ClientConfig) -> Result<SessionEnd, ClientError> {
    let prompt = prompt(config.mode, &config.name);
    println!("{}", config.mode.banner());

    let input: InputSource = Arc::new(Mutex::new(spawn_readline(prompt.clone())));
    let terminal = Arc::new(Terminal::new(prompt));

    run_with_reconnect(&config, input, terminal).await
}

/// Run sessions against `config.url`, reconnecting after lost or refused connections.
pub async fn run_with_reconnect<S: MessageSink>(
    config: &ClientConfig,
    input: InputSource,
    sink: Arc<S>,
) -> Result<SessionEnd, ClientError> {
    let mut reconnect_count = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {} (attempt {}/{})",
            config.url,
            reconnect_count + 1,
            config.max_reconnects + 1
        );

        let error = match run_session(&config.url, input.clone(), sink.clone()).await {
            Ok(SessionEnd::ConnectionLost) => {
                sink.status("Connection lost!");
                ClientError::ConnectionLost
            }
            Ok(end) => {
                tracing::info!("Client session ended normally ({:?})", end);
                return Ok(end);
            }
            Err(e) => e,
        };

        if !should_attempt_reconnect(&error, reconnect_count, config.max_reconnects) {
            tracing::error!(
                "Giving up after {} attempts: {}",
                reconnect_count + 1,
                error
            );
            return Err(error);
        }

        reconnect_count += 1;
        tracing::warn!("{}", error);
        tracing::info!(
            "Reconnecting in {:?}... (attempt {}/{})",
            config.reconnect_interval,
            reconnect_count + 1,
            config.max_reconnects + 1
        );
        tokio::time::sleep(config.reconnect_interval).await;
    }
}
