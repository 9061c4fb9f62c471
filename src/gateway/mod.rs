//! HTTP Gateway
//!
//! Read-only surface next to the desk: health, client configuration, balance
//! lookups and the OpenAPI document. Transfers are never started over HTTP;
//! they need the user's wallet.

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use std::sync::Arc;

use axum::{Json, Router, routing::get};
use tokio::net::TcpListener;
use tracing::info;
use utoipa::OpenApi;

use crate::balance::BalanceService;
use crate::config::AppConfig;
use state::AppState;

/// Build the gateway router over `state`
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/config", get(handlers::get_config))
        .route("/balance/{address}", get(handlers::get_balance))
        .route(
            "/openapi.json",
            get(|| async { Json(openapi::ApiDoc::openapi()) }),
        );

    Router::new().nest("/api", api).with_state(state)
}

/// Start HTTP Gateway server; returns only on bind or serve failure
pub async fn run_server(
    config: Arc<AppConfig>,
    balances: Arc<BalanceService>,
) -> std::io::Result<()> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let state = Arc::new(AppState::new(config, balances));
    let app = router(state);

    let listener = TcpListener::bind(&addr).await?;

    info!(%addr, "Gateway listening");
    info!("API Docs: http://{}/api/openapi.json", addr);

    axum::serve(listener, app).await
}

#[cfg(test)]
pub(crate) fn test_state_with_rpc(rpc: Arc<dyn crate::rpc::RpcClient>) -> Arc<AppState> {
    let config = AppConfig::from_yaml_str(
        r#"
log_level: debug
log_dir: logs
log_file: test.log
use_json: false
rotation: never
environment: test
gateway:
  host: 127.0.0.1
  port: 0
network: devnet
default_recipient: 9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM
"#,
    )
    .expect("test config");
    Arc::new(AppState::new(
        Arc::new(config),
        Arc::new(BalanceService::new(rpc)),
    ))
}

#[cfg(test)]
pub(crate) fn test_state() -> Arc<AppState> {
    test_state_with_rpc(Arc::new(crate::rpc::MockRpcClient::new()))
}
