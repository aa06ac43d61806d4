//! Message formatting utilities for client display.

use agora_shared::time::format_clock_time;
use chrono::{DateTime, TimeZone};

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format a frame received during an interactive session
    ///
    /// # Arguments
    ///
    /// * `received_at` - When the frame arrived
    /// * `text` - The frame content, shown verbatim
    ///
    /// # Returns
    ///
    /// The text prefixed with the local `HH:MM:SS`, on its own line
    pub fn format_incoming<Tz: TimeZone>(received_at: &DateTime<Tz>, text: &str) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        format!("\n[{}] {}\n", format_clock_time(received_at), text)
    }

    /// Format a line announcing a scripted message
    pub fn format_sending(text: &str) -> String {
        format!("Sending: {}", text)
    }

    /// Format a reply received in scripted mode
    pub fn format_received(text: &str) -> String {
        format!("Received: {}", text)
    }
}
