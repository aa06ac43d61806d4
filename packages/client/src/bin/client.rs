//! Interactive WebSocket client for the chat, counter and echo servers.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin agora-client -- --name alice
//! cargo run --bin agora-client -- --mode counter
//! cargo run --bin agora-client -- --mode echo --message "Hello" --message "Bye"
//! ```

use std::sync::Arc;
use std::time::Duration;

use agora_client::{
    ClientConfig, ClientMode, Script, run_client, run_script,
    runner::{DEFAULT_URL, MAX_RECONNECT_ATTEMPTS},
    ui::Transcript,
};
use agora_shared::logger::setup_logger;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "WebSocket broadcast client", long_about = None)]
struct Args {
    /// WebSocket server URL
    #[arg(short, long, default_value = DEFAULT_URL)]
    url: String,

    /// Name shown in the local prompt
    #[arg(short, long, default_value = "me")]
    name: String,

    /// Which server is on the other end
    #[arg(short, long, value_enum, default_value_t = ClientMode::Chat)]
    mode: ClientMode,

    /// Reconnection attempts after a lost connection
    #[arg(long, default_value_t = MAX_RECONNECT_ATTEMPTS)]
    max_reconnects: u32,

    /// Seconds to wait between reconnection attempts
    #[arg(long, default_value_t = 5)]
    reconnect_interval_secs: u64,

    /// Send these messages one by one, print each reply and exit
    #[arg(long = "message")]
    messages: Vec<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    setup_logger(env!("CARGO_BIN_NAME"), "warn");

    if !args.messages.is_empty() {
        let script = Script::new(args.messages, args.mode.expects_greeting());
        if let Err(e) = run_script(&args.url, &script, Arc::new(Transcript)).await {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
        return;
    }

    let config = ClientConfig {
        url: args.url,
        name: args.name,
        mode: args.mode,
        max_reconnects: args.max_reconnects,
        reconnect_interval: Duration::from_secs(args.reconnect_interval_secs),
    };

    if let Err(e) = run_client(config).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
