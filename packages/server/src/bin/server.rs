//! WebSocket broadcast server.
//!
//! Runs one of three variants:
//! - `chat`: relays every line to all other clients as `Client <id>: <text>`
//! - `counter`: `increment` / `reset` a shared counter, broadcast to everyone
//! - `echo`: answers every line with `Server received: <text>`
//!
//! Run with:
//! ```not_rust
//! cargo run --bin agora-server
//! cargo run --bin agora-server -- --mode counter --host 0.0.0.0 --port 3000
//! ```

use agora_server::{
    Heartbeat, RelayMode, Server, ServerConfig,
    config::{DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_PING_INTERVAL_SECS, DEFAULT_PORT},
};
use agora_shared::logger::setup_logger;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "agora-server")]
#[command(about = "WebSocket broadcast server (chat, counter, echo)", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Broadcast variant to run
    #[arg(short = 'm', long, value_enum, default_value_t = RelayMode::Chat)]
    mode: RelayMode,

    /// Seconds between server pings to quiet clients (0 disables)
    #[arg(long, default_value_t = DEFAULT_PING_INTERVAL_SECS)]
    ping_interval_secs: u64,

    /// Seconds of silence after which a client is disconnected (0 disables)
    #[arg(long, default_value_t = DEFAULT_IDLE_TIMEOUT_SECS)]
    idle_timeout_secs: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    let heartbeat = match Heartbeat::from_secs(args.ping_interval_secs, args.idle_timeout_secs) {
        Ok(heartbeat) => heartbeat,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(2);
        }
    };

    let server = Server::new(ServerConfig {
        host: args.host,
        port: args.port,
        mode: args.mode,
        heartbeat,
    });
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
