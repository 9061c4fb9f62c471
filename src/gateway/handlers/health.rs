//! Health check handler

use std::sync::Arc;

use axum::{Json, extract::State};
use chrono::Utc;

use super::super::state::AppState;
use super::super::types::HealthResponse;

/// Health check endpoint
///
/// Always 200 while the process serves requests. The RPC node is not contacted;
/// its reachability shows up in balance lookups instead.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse, content_type = "application/json")
    ),
    tag = "System"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime: state.uptime_secs(),
        timestamp: Utc::now(),
        environment: state.config.environment.clone(),
        version: state.config.version.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::test_state;

    #[tokio::test]
    async fn test_health_report() {
        let state = test_state();
        let Json(report) = health_check(State(state)).await;

        assert_eq!(report.status, "healthy");
        assert_eq!(report.environment, "test");
        assert_eq!(report.version, "1.0.0");
        assert!(report.uptime >= 0.0);
    }

    #[tokio::test]
    async fn test_health_json_shape() {
        let Json(report) = health_check(State(test_state())).await;
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["status"], "healthy");
        assert!(json["uptime"].is_f64());
        // RFC 3339 with explicit UTC marker
        let ts = json["timestamp"].as_str().unwrap();
        assert!(ts.ends_with('Z'));
    }
}
