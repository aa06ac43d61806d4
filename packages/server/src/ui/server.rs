//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::{Heartbeat, RelayMode, ServerConfig},
    domain::{ConnectionRegistry, SharedCounter},
    error::ServerError,
    infrastructure::InMemoryConnectionRegistry,
    usecase::{ChatRelayUseCase, CounterUseCase, EchoUseCase, SessionHandler},
};

use super::{
    handler::{http::health_check, websocket::websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket broadcast server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(ServerConfig {
///     mode: RelayMode::Counter,
///     ..ServerConfig::default()
/// });
/// server.run().await?;
/// ```
pub struct Server {
    config: ServerConfig,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Build the router with fresh state: an empty registry and, in counter
    /// mode, a counter starting at 0.
    pub fn router(&self) -> Router {
        let state = build_state(self.config.mode, self.config.heartbeat);

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Bind the configured address and serve until Ctrl+C / SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be bound, or
    /// [`ServerError::Serve`] if the accept loop fails.
    pub async fn run(self) -> Result<(), ServerError> {
        let bind_addr = self.config.bind_addr();
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: bind_addr.clone(),
                source,
            })?;

        tracing::info!("Press Ctrl+C to shutdown gracefully");
        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let local_addr = listener.local_addr()?;

        tracing::info!(
            "WebSocket {} server listening on {}",
            self.config.mode,
            local_addr
        );
        tracing::info!("Connect to: ws://{}/ws", local_addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

fn build_state(mode: RelayMode, heartbeat: Heartbeat) -> Arc<AppState> {
    let registry: Arc<dyn ConnectionRegistry> = Arc::new(InMemoryConnectionRegistry::new());
    let session_handler: Arc<dyn SessionHandler> = match mode {
        RelayMode::Chat => Arc::new(ChatRelayUseCase::new(registry.clone())),
        RelayMode::Counter => Arc::new(CounterUseCase::new(
            registry.clone(),
            Arc::new(SharedCounter::new()),
        )),
        RelayMode::Echo => Arc::new(EchoUseCase::new(registry.clone())),
    };

    Arc::new(AppState {
        mode,
        registry,
        session_handler,
        heartbeat,
    })
}
