//! Wire vocabulary. Every logical message is one plain text frame.

use super::ConnectionId;

/// Sent by the counter server after a reset.
pub const COUNTER_RESET: &str = "Counter reset to 0";

/// Greeting for a new chat connection.
pub fn welcome(id: ConnectionId) -> String {
    format!("Welcome! You are client {}", id)
}

/// A chat line relayed to the other connections.
pub fn chat_line(from: ConnectionId, text: &str) -> String {
    format!("Client {}: {}", from, text)
}

/// Greeting for a new counter connection.
pub fn current_counter(value: i64) -> String {
    format!("Current counter: {}", value)
}

/// Broadcast after an increment.
pub fn counter_value(value: i64) -> String {
    format!("Counter: {}", value)
}

/// Reply from the echo server.
pub fn echo_reply(text: &str) -> String {
    format!("Server received: {}", text)
}
