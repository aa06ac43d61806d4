//! Domain logic for client-side operations.
//!
//! This module contains pure functions that implement business logic
//! without side effects, making them easy to test.

use clap::ValueEnum;

use crate::error::ClientError;

/// Inputs that end the session voluntarily (case-insensitive).
pub const QUIT_COMMANDS: [&str; 3] = ["quit", "exit", "bye"];

/// Which server the client talks to; only affects local display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ClientMode {
    #[default]
    Chat,
    Counter,
    Echo,
}

impl ClientMode {
    /// Help text printed once before connecting
    pub fn banner(self) -> &'static str {
        match self {
            ClientMode::Chat => "Type messages and press Enter to send. Type 'quit' to leave.",
            ClientMode::Counter => "Commands: 'increment', 'reset', 'quit'",
            ClientMode::Echo => "Every message is echoed back by the server. Type 'quit' to leave.",
        }
    }

    /// Whether the server sends a greeting frame right after connecting
    pub fn expects_greeting(self) -> bool {
        !matches!(self, ClientMode::Echo)
    }
}

/// Check whether a line of input is a quit sentinel.
pub fn is_quit_command(input: &str) -> bool {
    let input = input.trim();
    QUIT_COMMANDS
        .iter()
        .any(|command| input.eq_ignore_ascii_case(command))
}

/// What the send loop does with one line of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction<'a> {
    /// Blank line, nothing is sent
    Skip,
    /// Quit sentinel
    Quit,
    /// Send as one text frame; only the line terminator is removed
    Send(&'a str),
}

/// Classify a line of input. Surrounding whitespace decides blank lines and
/// quit sentinels but is kept in what is sent.
pub fn classify_input(line: &str) -> InputAction<'_> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        InputAction::Skip
    } else if is_quit_command(line) {
        InputAction::Quit
    } else {
        InputAction::Send(line)
    }
}

/// Build the input prompt. The name is only shown locally, never transmitted.
pub fn prompt(mode: ClientMode, name: &str) -> String {
    match mode {
        ClientMode::Counter => "Command: ".to_string(),
        ClientMode::Chat | ClientMode::Echo => format!("{}: ", name),
    }
}

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `error` - The client error that occurred
/// * `current_attempt` - The current reconnection attempt count (0-indexed)
/// * `max_attempts` - The maximum number of reconnection attempts allowed
pub fn should_attempt_reconnect(
    error: &ClientError,
    current_attempt: u32,
    max_attempts: u32,
) -> bool {
    let retryable = matches!(
        error,
        ClientError::ConnectionRefused { .. }
            | ClientError::Connection(_)
            | ClientError::ConnectionLost
    );

    retryable && current_attempt < max_attempts
}
