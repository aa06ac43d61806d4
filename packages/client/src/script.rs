//! Scripted mode: send a fixed list of messages, one reply each.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::protocol::Message;

use crate::{
    error::ClientError,
    formatter::MessageFormatter,
    session::{MessageSink, WsStream, connect},
};

pub const REPLY_TIMEOUT: Duration = Duration::from_secs(5);
pub const PAUSE_BETWEEN_MESSAGES: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct Script {
    pub messages: Vec<String>,
    /// Read and show the server greeting before sending anything
    pub expect_greeting: bool,
    pub reply_timeout: Duration,
    pub pause: Duration,
}

impl Script {
    pub fn new(messages: Vec<String>, expect_greeting: bool) -> Self {
        Self {
            messages,
            expect_greeting,
            reply_timeout: REPLY_TIMEOUT,
            pause: PAUSE_BETWEEN_MESSAGES,
        }
    }
}

/// Connect to `url`, play `script` and return the reply to each message.
pub async fn run_script<S: MessageSink>(
    url: &str,
    script: &Script,
    sink: Arc<S>,
) -> Result<Vec<String>, ClientError> {
    sink.status("Connecting to WebSocket server...");
    let mut ws_stream = connect(url).await?;
    sink.status("Connected successfully!");

    if script.expect_greeting {
        let greeting = next_reply(&mut ws_stream, script.reply_timeout).await?;
        sink.show(&greeting);
    }

    let mut replies = Vec::with_capacity(script.messages.len());
    for (index, message) in script.messages.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(script.pause).await;
        }

        sink.status(&MessageFormatter::format_sending(message));
        ws_stream
            .send(Message::text(message.clone()))
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        let reply = next_reply(&mut ws_stream, script.reply_timeout).await?;
        sink.show(&reply);
        replies.push(reply);
    }

    if let Err(e) = ws_stream.close(None).await {
        tracing::debug!("Failed to close connection: {}", e);
    }
    sink.status("Connection closed");

    Ok(replies)
}

async fn next_reply(ws_stream: &mut WsStream, limit: Duration) -> Result<String, ClientError> {
    loop {
        match tokio::time::timeout(limit, ws_stream.next()).await {
            Err(_) => return Err(ClientError::NoReply(limit)),
            Ok(None) | Ok(Some(Ok(Message::Close(_)))) => return Err(ClientError::ConnectionLost),
            Ok(Some(Err(e))) => return Err(ClientError::Connection(e.to_string())),
            Ok(Some(Ok(Message::Text(text)))) => return Ok(text.as_str().to_owned()),
            Ok(Some(Ok(_))) => continue,
        }
    }
}
