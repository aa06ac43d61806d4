//! WebSocket client session management.

use std::io;
use std::sync::Arc;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::tungstenite::{Error as WsError, protocol::Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::{
    domain::{InputAction, classify_input},
    error::ClientError,
};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Lines typed by the user. Shared across reconnects; a session holds the
/// lock for as long as its send loop runs.
pub type InputSource = Arc<Mutex<mpsc::UnboundedReceiver<String>>>;

/// Where received frames and status lines go.
pub trait MessageSink: Send + Sync + 'static {
    /// Display one received text frame
    fn show(&self, message: &str);

    /// Display a local status line (connected, connection lost, ...)
    fn status(&self, _text: &str) {}
}

impl MessageSink for mpsc::UnboundedSender<String> {
    fn show(&self, message: &str) {
        let _ = self.send(message.to_string());
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user typed a quit command
    Quit,
    /// The input source was closed (Ctrl+C / Ctrl+D)
    InputClosed,
    /// The server closed the connection or a frame could not be exchanged
    ConnectionLost,
}

/// Open a WebSocket connection to `url`.
pub async fn connect(url: &str) -> Result<WsStream, ClientError> {
    match connect_async(url).await {
        Ok((ws_stream, _response)) => Ok(ws_stream),
        Err(WsError::Io(e)) if e.kind() == io::ErrorKind::ConnectionRefused => {
            Err(ClientError::ConnectionRefused {
                url: url.to_string(),
            })
        }
        Err(e) => Err(ClientError::Connection(e.to_string())),
    }
}

/// Run the WebSocket client session
pub async fn run_session<S: MessageSink>(
    url: &str,
    input: InputSource,
    sink: Arc<S>,
) -> Result<SessionEnd, ClientError> {
    let ws_stream = connect(url).await?;
    tracing::info!("Connected to {}", url);
    sink.status(&format!("Connected to {}", url));

    Ok(drive_session(ws_stream, input, sink).await)
}

/// Run the receive and send loops until either finishes, then abort the other.
pub async fn drive_session<S: MessageSink>(
    ws_stream: WsStream,
    input: InputSource,
    sink: Arc<S>,
) -> SessionEnd {
    let (write, read) = ws_stream.split();

    let mut read_task = tokio::spawn(receive_loop(read, sink));
    let mut write_task = tokio::spawn(send_loop(write, input));

    tokio::select! {
        _ = &mut read_task => {
            write_task.abort();
            SessionEnd::ConnectionLost
        }
        write_result = &mut write_task => {
            read_task.abort();
            write_result.unwrap_or(SessionEnd::ConnectionLost)
        }
    }
}

async fn receive_loop<S: MessageSink>(mut read: SplitStream<WsStream>, sink: Arc<S>) {
    while let Some(message) = read.next().await {
        match message {
            Ok(Message::Text(text)) => sink.show(text.as_str()),
            Ok(Message::Binary(data)) => {
                tracing::debug!("Ignoring binary frame ({} bytes)", data.len());
            }
            Ok(Message::Close(_)) => {
                tracing::info!("Server closed the connection");
                break;
            }
            Err(e) => {
                tracing::warn!("WebSocket read error: {}", e);
                break;
            }
            _ => {}
        }
    }
}

async fn send_loop(mut write: SplitSink<WsStream, Message>, input: InputSource) -> SessionEnd {
    let mut input = input.lock().await;

    while let Some(line) = input.recv().await {
        let text = match classify_input(&line) {
            InputAction::Skip => continue,
            InputAction::Quit => {
                tracing::info!("Leaving the session");
                if let Err(e) = write.send(Message::Close(None)).await {
                    tracing::debug!("Failed to send close frame: {}", e);
                }
                return SessionEnd::Quit;
            }
            InputAction::Send(text) => text,
        };

        if let Err(e) = write.send(Message::text(text.to_owned())).await {
            tracing::warn!("Failed to send message: {}", e);
            return SessionEnd::ConnectionLost;
        }
    }

    SessionEnd::InputClosed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_sink_forwards_frames() {
        // テスト項目: チャネルを表示先にすると受信フレームがそのまま転送される
        // given (前提条件):
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        // when (操作):
        tx.show("Counter: 1");
        tx.status("Connected to ws://127.0.0.1:8765/ws");

        // then (期待する結果):
        assert_eq!(rx.try_recv().unwrap(), "Counter: 1");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // テスト項目: 待ち受けのないアドレスへの接続は ConnectionRefused になる
        // given (前提条件):
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let url = format!("ws://{}/ws", addr);

        // when (操作):
        let result = connect(&url).await;

        // then (期待する結果):
        match result {
            Err(ClientError::ConnectionRefused { url: refused }) => assert_eq!(refused, url),
            other => panic!("expected ConnectionRefused, got {:?}", other.map(|_| ())),
        }
    }
}
