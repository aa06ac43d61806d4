//! Client sessions against an in-process server on an ephemeral port.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use agora_client::{
    ClientConfig, ClientError, InputSource, Script, SessionEnd, run_script, run_session,
    runner::run_with_reconnect,
};
use agora_server::{Heartbeat, RelayMode, Server, ServerConfig};
use futures_util::StreamExt;
use tokio::{
    net::TcpListener,
    sync::{Mutex, mpsc, oneshot},
    task::JoinHandle,
    time::{Instant, timeout},
};
use tokio_tungstenite::{accept_async, tungstenite::protocol::Message};

const WAIT: Duration = Duration::from_secs(3);
const SILENCE: Duration = Duration::from_millis(200);

async fn start_server(mode: RelayMode) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = Server::new(ServerConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        mode,
        heartbeat: Heartbeat::disabled(),
    });
    tokio::spawn(server.serve(listener, std::future::pending()));
    addr
}

fn ws_url(addr: SocketAddr) -> String {
    format!("ws://{}/ws", addr)
}

/// Address that refuses connections
fn closed_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

struct TestSession {
    input: mpsc::UnboundedSender<String>,
    frames: mpsc::UnboundedReceiver<String>,
    handle: JoinHandle<Result<SessionEnd, ClientError>>,
}

impl TestSession {
    fn start(url: String) -> Self {
        let (input, input_rx) = mpsc::unbounded_channel();
        let (sink, frames) = mpsc::unbounded_channel::<String>();
        let source: InputSource = Arc::new(Mutex::new(input_rx));
        let handle = tokio::spawn(async move { run_session(&url, source, Arc::new(sink)).await });
        Self {
            input,
            frames,
            handle,
        }
    }

    fn type_line(&self, line: &str) {
        self.input.send(line.to_string()).unwrap();
    }

    async fn next_frame(&mut self) -> String {
        timeout(WAIT, self.frames.recv())
            .await
            .expect("timed out waiting for a frame")
            .expect("sink closed")
    }

    async fn assert_silent(&mut self) {
        if let Ok(Some(frame)) = timeout(SILENCE, self.frames.recv()).await {
            panic!("expected no frame, got {:?}", frame);
        }
    }

    async fn end(self) -> SessionEnd {
        timeout(WAIT, self.handle)
            .await
            .expect("session did not end in time")
            .unwrap()
            .unwrap()
    }
}

#[tokio::test]
async fn test_chat_line_reaches_other_session() {
    // テスト項目: 送信した行が他のクライアントに届き、自分には返ってこない
    // given (前提条件):
    let addr = start_server(RelayMode::Chat).await;
    let mut alice = TestSession::start(ws_url(addr));
    assert_eq!(alice.next_frame().await, "Welcome! You are client 1");
    let mut bob = TestSession::start(ws_url(addr));
    assert_eq!(bob.next_frame().await, "Welcome! You are client 2");

    // when (操作):
    alice.type_line("hello");

    // then (期待する結果):
    assert_eq!(bob.next_frame().await, "Client 1: hello");
    alice.assert_silent().await;
}

#[tokio::test]
async fn test_empty_lines_are_not_sent() {
    // テスト項目: 空行は送信されない
    // given (前提条件):
    let addr = start_server(RelayMode::Chat).await;
    let mut alice = TestSession::start(ws_url(addr));
    alice.next_frame().await;
    let mut bob = TestSession::start(ws_url(addr));
    bob.next_frame().await;

    // when (操作):
    alice.type_line("   ");
    alice.type_line("");
    alice.type_line("after blanks");

    // then (期待する結果):
    assert_eq!(bob.next_frame().await, "Client 1: after blanks");
    bob.assert_silent().await;
}

#[tokio::test]
async fn test_surrounding_spaces_are_relayed_verbatim() {
    // テスト項目: 行の前後の空白は取り除かれずにそのまま中継される
    // given (前提条件):
    let addr = start_server(RelayMode::Chat).await;
    let mut alice = TestSession::start(ws_url(addr));
    alice.next_frame().await;
    let mut bob = TestSession::start(ws_url(addr));
    bob.next_frame().await;

    // when (操作):
    alice.type_line("  indented and padded  ");

    // then (期待する結果):
    assert_eq!(bob.next_frame().await, "Client 1:   indented and padded  ");
}

#[tokio::test]
async fn test_quit_ends_session_while_server_is_silent() {
    // テスト項目: サーバーから何も届かなくても quit で速やかにセッションが終わる
    // given (前提条件):
    let addr = start_server(RelayMode::Chat).await;
    let mut session = TestSession::start(ws_url(addr));
    session.next_frame().await;

    // when (操作):
    let started = Instant::now();
    session.type_line("QUIT");
    let end = session.end().await;

    // then (期待する結果):
    assert_eq!(end, SessionEnd::Quit);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_closed_input_ends_session() {
    // テスト項目: 入力が閉じられるとセッションは InputClosed で終わる
    // given (前提条件):
    let addr = start_server(RelayMode::Echo).await;
    let TestSession { input, handle, .. } = TestSession::start(ws_url(addr));

    // when (操作):
    drop(input);
    let end = timeout(WAIT, handle).await.unwrap().unwrap().unwrap();

    // then (期待する結果):
    assert_eq!(end, SessionEnd::InputClosed);
}

#[tokio::test]
async fn test_counter_session_sees_own_increment() {
    // テスト項目: カウンターでは自分の increment の結果も受信する
    // given (前提条件):
    let addr = start_server(RelayMode::Counter).await;
    let mut session = TestSession::start(ws_url(addr));
    assert_eq!(session.next_frame().await, "Current counter: 0");

    // when (操作):
    session.type_line("increment");
    session.type_line("reset");

    // then (期待する結果):
    assert_eq!(session.next_frame().await, "Counter: 1");
    assert_eq!(session.next_frame().await, "Counter reset to 0");
}

#[tokio::test]
async fn test_connection_refused() {
    // テスト項目: サーバーが起動していなければ ConnectionRefused が返る
    // given (前提条件):
    let url = ws_url(closed_addr());
    let (_input, input_rx) = mpsc::unbounded_channel();
    let (sink, _frames) = mpsc::unbounded_channel::<String>();

    // when (操作):
    let result = run_session(&url, Arc::new(Mutex::new(input_rx)), Arc::new(sink)).await;

    // then (期待する結果):
    assert!(matches!(result, Err(ClientError::ConnectionRefused { .. })));
}

#[tokio::test]
async fn test_server_close_ends_session_as_connection_lost() {
    // テスト項目: サーバー側が切断するとセッションは ConnectionLost で終わる
    // given (前提条件):
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.close(None).await.ok();
    });

    // when (操作):
    let session = TestSession::start(ws_url(addr));
    let end = session.end().await;

    // then (期待する結果):
    assert_eq!(end, SessionEnd::ConnectionLost);
}

#[tokio::test]
async fn test_runner_gives_up_after_max_reconnects() {
    // テスト項目: 接続できない場合は上限回数まで再試行してからエラーを返す
    // given (前提条件):
    let config = ClientConfig {
        url: ws_url(closed_addr()),
        max_reconnects: 2,
        reconnect_interval: Duration::from_millis(50),
        ..ClientConfig::default()
    };
    let (_input, input_rx) = mpsc::unbounded_channel();
    let (sink, _frames) = mpsc::unbounded_channel::<String>();

    // when (操作):
    let started = Instant::now();
    let result = run_with_reconnect(&config, Arc::new(Mutex::new(input_rx)), Arc::new(sink)).await;

    // then (期待する結果):
    assert!(matches!(result, Err(ClientError::ConnectionRefused { .. })));
    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn test_runner_reconnects_after_connection_lost() {
    // テスト項目: 接続が失われると再接続し、再接続後も同じ入力で quit できる
    // given (前提条件):
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (closed_tx, closed_rx) = oneshot::channel();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut first = accept_async(stream).await.unwrap();
        first.close(None).await.ok();

        let (stream, _) = listener.accept().await.unwrap();
        let mut second = accept_async(stream).await.unwrap();
        while let Some(Ok(message)) = second.next().await {
            if let Message::Close(_) = message {
                closed_tx.send(()).ok();
                break;
            }
        }
    });
    let config = ClientConfig {
        url: ws_url(addr),
        max_reconnects: 3,
        reconnect_interval: Duration::from_millis(50),
        ..ClientConfig::default()
    };
    let (input, input_rx) = mpsc::unbounded_channel::<String>();
    let (sink, _frames) = mpsc::unbounded_channel::<String>();
    let runner = tokio::spawn(async move {
        run_with_reconnect(&config, Arc::new(Mutex::new(input_rx)), Arc::new(sink)).await
    });

    // when (操作):
    tokio::time::sleep(Duration::from_millis(300)).await;
    input.send("bye".to_string()).unwrap();

    // then (期待する結果):
    let end = timeout(WAIT, runner).await.unwrap().unwrap().unwrap();
    assert_eq!(end, SessionEnd::Quit);
    timeout(WAIT, closed_rx).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_script_against_echo_server() {
    // テスト項目: スクリプトモードで各メッセージへの応答を 1 つずつ受け取る
    // given (前提条件):
    let addr = start_server(RelayMode::Echo).await;
    let script = Script {
        pause: Duration::from_millis(10),
        ..Script::new(
            vec!["Hello, WebSocket!".to_string(), "How are you?".to_string()],
            false,
        )
    };
    let (sink, _frames) = mpsc::unbounded_channel::<String>();

    // when (操作):
    let replies = run_script(&ws_url(addr), &script, Arc::new(sink)).await.unwrap();

    // then (期待する結果):
    assert_eq!(
        replies,
        vec![
            "Server received: Hello, WebSocket!",
            "Server received: How are you?",
        ]
    );
}

#[tokio::test]
async fn test_script_against_counter_server_reads_greeting_first() {
    // テスト項目: 挨拶を送るサーバーでは挨拶を読み飛ばしてから応答を集める
    // given (前提条件):
    let addr = start_server(RelayMode::Counter).await;
    let script = Script {
        pause: Duration::ZERO,
        ..Script::new(
            vec![
                "increment".to_string(),
                "increment".to_string(),
                "reset".to_string(),
            ],
            true,
        )
    };
    let (sink, mut frames) = mpsc::unbounded_channel::<String>();

    // when (操作):
    let replies = run_script(&ws_url(addr), &script, Arc::new(sink)).await.unwrap();

    // then (期待する結果):
    assert_eq!(frames.recv().await.unwrap(), "Current counter: 0");
    assert_eq!(replies, vec!["Counter: 1", "Counter: 2", "Counter reset to 0"]);
}
