//! Server configuration.

use std::{fmt, time::Duration};

use clap::ValueEnum;
use serde::Serialize;

use crate::error::ServerError;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8765;
pub const DEFAULT_PING_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 90;

/// Which broadcast variant the server runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayMode {
    /// Relay every line to all other clients
    #[default]
    Chat,
    /// Shared counter driven by `increment` / `reset`
    Counter,
    /// Answer every line to its sender
    Echo,
}

impl fmt::Display for RelayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelayMode::Chat => "chat",
            RelayMode::Counter => "counter",
            RelayMode::Echo => "echo",
        };
        f.write_str(name)
    }
}

/// Liveness settings for every connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heartbeat {
    /// How often the server pings an otherwise quiet connection
    pub ping_interval: Option<Duration>,
    /// How long a connection may stay silent (pongs count) before it is closed
    pub idle_timeout: Option<Duration>,
}

impl Heartbeat {
    /// Build from whole seconds; `0` disables the corresponding mechanism.
    ///
    /// # Errors
    ///
    /// Rejects an idle timeout that does not exceed the ping interval, since
    /// a healthy but quiet client would then be disconnected between pings.
    pub fn from_secs(ping_interval: u64, idle_timeout: u64) -> Result<Self, ServerError> {
        if ping_interval > 0 && idle_timeout > 0 && idle_timeout <= ping_interval {
            return Err(ServerError::InvalidConfig(format!(
                "idle timeout ({}s) must be longer than the ping interval ({}s)",
                idle_timeout, ping_interval
            )));
        }

        let non_zero = |secs: u64| (secs > 0).then_some(Duration::from_secs(secs));
        Ok(Self {
            ping_interval: non_zero(ping_interval),
            idle_timeout: non_zero(idle_timeout),
        })
    }

    /// No pings, no idle deadline.
    pub fn disabled() -> Self {
        Self {
            ping_interval: None,
            idle_timeout: None,
        }
    }
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self {
            ping_interval: Some(Duration::from_secs(DEFAULT_PING_INTERVAL_SECS)),
            idle_timeout: Some(Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub mode: RelayMode,
    pub heartbeat: Heartbeat,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            mode: RelayMode::default(),
            heartbeat: Heartbeat::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heartbeat_from_secs() {
        // テスト項目: 秒数から Heartbeat が生成される
        // given (前提条件):
        let (ping, idle) = (10, 25);

        // when (操作):
        let heartbeat = Heartbeat::from_secs(ping, idle).unwrap();

        // then (期待する結果):
        assert_eq!(heartbeat.ping_interval, Some(Duration::from_secs(10)));
        assert_eq!(heartbeat.idle_timeout, Some(Duration::from_secs(25)));
    }

    #[test]
    fn test_heartbeat_zero_disables() {
        // テスト項目: 0 を指定した機構は無効になる
        // given (前提条件):
        let (ping, idle) = (0, 0);

        // when (操作):
        let heartbeat = Heartbeat::from_secs(ping, idle).unwrap();

        // then (期待する結果):
        assert_eq!(heartbeat, Heartbeat::disabled());
    }

    #[test]
    fn test_heartbeat_rejects_idle_timeout_shorter_than_ping() {
        // テスト項目: アイドルタイムアウトが ping 間隔以下の場合はエラーになる
        // given (前提条件):
        let (ping, idle) = (30, 30);

        // when (操作):
        let result = Heartbeat::from_secs(ping, idle);

        // then (期待する結果):
        assert!(matches!(result, Err(ServerError::InvalidConfig(_))));
    }

    #[test]
    fn test_default_config() {
        // テスト項目: 既定値は 127.0.0.1:8765 のチャットサーバー
        // given (前提条件):
        let config = ServerConfig::default();

        // when (操作):
        let addr = config.bind_addr();

        // then (期待する結果):
        assert_eq!(addr, "127.0.0.1:8765");
        assert_eq!(config.mode, RelayMode::Chat);
        assert_eq!(config.mode.to_string(), "chat");
    }
}
