//! WebSocket connection handlers.
//!
//! Each upgraded socket is split into a read half, driven by [`receive_loop`],
//! and a write half owned by [`pusher_loop`], which drains the connection's
//! outbound queue. When the read loop ends first the pusher is aborted. When
//! the pusher ends first the read loop is told to stop and finishes the frame
//! it is handling, so a broadcast already under way always completes. The
//! session leaves the registry exactly once.

use std::{sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, Stream, StreamExt},
};
use tokio::{
    sync::{mpsc, oneshot},
    task::{JoinError, JoinHandle},
    time::{Instant, Interval},
};

use crate::{
    domain::{Connection, ConnectionId, ConnectionState},
    ui::state::AppState,
    usecase::{Joined, SessionHandler},
};

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The client sent a Close frame
    ClientClosed,
    /// The stream ended without a Close frame
    EndOfStream,
    /// Reading the next frame failed
    ReceiveFailure,
    /// Nothing arrived within the idle timeout
    IdleTimeout,
    /// Writing to the socket failed
    WriterStopped,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let mut lifecycle = ConnectionState::Connecting;
    let (mut sender, receiver) = socket.split();

    // Create a channel for this client to receive broadcasts
    let (tx, rx) = mpsc::unbounded_channel();
    let Joined {
        connection,
        greeting,
    } = state.session_handler.join(tx).await;
    let id = connection.id();

    // Greet before the pusher starts draining broadcasts queued since registration
    if let Some(greeting) = greeting
        && let Err(e) = sender.send(Message::Text(greeting.into())).await
    {
        tracing::warn!("Failed to greet client {}: {}", id, e);
        state.session_handler.leave(id).await;
        transition(&mut lifecycle, ConnectionState::Closed, id);
        return;
    }
    transition(&mut lifecycle, ConnectionState::Open, id);

    let mut push_task = pusher_loop(rx, sender, id, state.heartbeat.ping_interval);
    let (stop_tx, stop_rx) = oneshot::channel();
    let mut recv_task = tokio::spawn(receive_loop(
        receiver,
        state.session_handler.clone(),
        connection,
        state.heartbeat.idle_timeout,
        stop_rx,
    ));

    let reason = tokio::select! {
        result = &mut recv_task => {
            push_task.abort();
            read_outcome(result, id)
        }
        _ = &mut push_task => {
            // The read loop may be inside a broadcast; let it finish that frame
            let _ = stop_tx.send(());
            read_outcome(recv_task.await, id)
        }
    };
    transition(&mut lifecycle, ConnectionState::Closing, id);
    tracing::info!("Client {} disconnected ({:?})", id, reason);

    state.session_handler.leave(id).await;
    transition(&mut lifecycle, ConnectionState::Closed, id);
}

fn read_outcome(result: Result<CloseReason, JoinError>, id: ConnectionId) -> CloseReason {
    result.unwrap_or_else(|e| {
        tracing::error!("Read loop for client {} failed: {}", id, e);
        CloseReason::ReceiveFailure
    })
}

/// Reads inbound frames and hands text to the session handler until the
/// connection closes, fails, stays silent past `idle_timeout`, or `stop` fires.
///
/// `stop` is only observed while waiting for the next frame. A frame that is
/// being handled runs to completion.
async fn receive_loop<S>(
    mut receiver: S,
    handler: Arc<dyn SessionHandler>,
    connection: Connection,
    idle_timeout: Option<Duration>,
    mut stop: oneshot::Receiver<()>,
) -> CloseReason
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    loop {
        let next = tokio::select! {
            _ = &mut stop => {
                tracing::debug!("Writer for client {} stopped. Closing read loop", connection.id());
                return CloseReason::WriterStopped;
            }
            next = next_frame(&mut receiver, idle_timeout) => next,
        };

        let Some(next) = next else {
            tracing::warn!(
                "Client {} silent for {:?}. Closing connection",
                connection.id(),
                idle_timeout.unwrap_or_default()
            );
            return CloseReason::IdleTimeout;
        };

        let msg = match next {
            Some(Ok(msg)) => msg,
            Some(Err(e)) => {
                tracing::warn!("WebSocket error from client {}: {}", connection.id(), e);
                return CloseReason::ReceiveFailure;
            }
            None => return CloseReason::EndOfStream,
        };

        match msg {
            Message::Text(text) => handler.on_message(&connection, text.as_str()).await,
            Message::Close(_) => {
                tracing::info!("Client {} requested close", connection.id());
                return CloseReason::ClientClosed;
            }
            Message::Binary(data) => {
                tracing::debug!(
                    "Ignoring {} bytes of binary data from client {}",
                    data.len(),
                    connection.id()
                );
            }
            // Any frame counts as activity; pongs are answered by the protocol layer
            Message::Ping(_) | Message::Pong(_) => {
                tracing::trace!("Heartbeat from client {}", connection.id());
            }
        }
    }
}

/// Next item of `receiver`, or `None` when nothing arrived within `idle_timeout`.
async fn next_frame<S>(receiver: &mut S, idle_timeout: Option<Duration>) -> Option<Option<S::Item>>
where
    S: Stream + Unpin,
{
    match idle_timeout {
        Some(limit) => tokio::time::timeout(limit, receiver.next()).await.ok(),
        None => Some(receiver.next().await),
    }
}

/// Spawns a task that drains `rx` into the WebSocket sender, pinging the peer
/// whenever `ping_interval` elapses.
///
/// The task ends when a write fails; the receiver is dropped with it, so later
/// pushes to this connection fail and the broadcaster deregisters it.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
    id: ConnectionId,
    ping_interval: Option<Duration>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut heartbeat =
            ping_interval.map(|period| tokio::time::interval_at(Instant::now() + period, period));

        loop {
            let frame = tokio::select! {
                outbound = rx.recv() => match outbound {
                    Some(text) => Message::Text(text.into()),
                    None => break,
                },
                _ = next_tick(&mut heartbeat) => Message::Ping(Bytes::new()),
            };

            if let Err(e) = sender.send(frame).await {
                tracing::debug!("Failed to write to client {}: {}", id, e);
                break;
            }
        }
    })
}

async fn next_tick(heartbeat: &mut Option<Interval>) {
    match heartbeat {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn transition(state: &mut ConnectionState, next: ConnectionState, id: ConnectionId) {
    match state.advance(next) {
        Ok(advanced) => {
            tracing::debug!("Client {}: {:?} -> {:?}", id, state, advanced);
            *state = advanced;
        }
        Err(e) => tracing::warn!("Client {}: {}", id, e),
    }
}
