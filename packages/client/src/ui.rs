//! Terminal input and output for the client.

use std::io::Write;

use agora_shared::time::{Clock, SystemClock};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;

use crate::{formatter::MessageFormatter, session::MessageSink};

/// Redisplay the prompt after receiving a message
pub fn redisplay_prompt(prompt: &str) {
    print!("{}", prompt);
    std::io::stdout().flush().ok();
}

/// Interactive display: timestamped lines followed by the prompt.
pub struct Terminal<C: Clock = SystemClock> {
    prompt: String,
    clock: C,
}

impl Terminal {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self::with_clock(prompt, SystemClock)
    }
}

impl<C: Clock> Terminal<C> {
    pub fn with_clock(prompt: impl Into<String>, clock: C) -> Self {
        Self {
            prompt: prompt.into(),
            clock,
        }
    }

    /// The received line as shown, stamped with the clock's current time
    fn render(&self, message: &str) -> String {
        MessageFormatter::format_incoming(&self.clock.now(), message)
    }
}

impl<C: Clock + 'static> MessageSink for Terminal<C> {
    fn show(&self, message: &str) {
        print!("{}", self.render(message));
        redisplay_prompt(&self.prompt);
    }

    fn status(&self, text: &str) {
        println!("\n{}", text);
    }
}

/// Plain display for scripted runs.
#[derive(Debug, Default)]
pub struct Transcript;

impl MessageSink for Transcript {
    fn show(&self, message: &str) {
        println!("{}", MessageFormatter::format_received(message));
    }

    fn status(&self, text: &str) {
        println!("{}", text);
    }
}

/// Read lines on a dedicated thread and forward them over a channel.
///
/// The channel closes on Ctrl+C, Ctrl+D, or a readline failure. The thread
/// outlives individual sessions so reconnects keep the same input history.
pub fn spawn_readline(prompt: String) -> mpsc::UnboundedReceiver<String> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line.as_str()).ok();
                    if input_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}
