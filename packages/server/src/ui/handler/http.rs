//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;

use crate::{config::RelayMode, ui::state::AppState};

/// Liveness probe payload
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub mode: RelayMode,
    pub connections: usize,
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok",
        mode: state.mode,
        connections: state.registry.count().await,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_report_json_shape() {
        // テスト項目: ヘルスチェックの JSON 形式
        // given (前提条件):
        let report = HealthReport {
            status: "ok",
            mode: RelayMode::Counter,
            connections: 3,
        };

        // when (操作):
        let json = serde_json::to_value(&report).unwrap();

        // then (期待する結果):
        assert_eq!(
            json,
            serde_json::json!({"status": "ok", "mode": "counter", "connections": 3})
        );
    }
}
