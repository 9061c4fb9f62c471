use std::sync::Arc;

use axum::{Json, extract::State};

use super::super::state::AppState;
use super::super::types::PublicConfig;

/// Network settings a client needs to talk to the same cluster
#[utoipa::path(
    get,
    path = "/api/config",
    responses(
        (status = 200, description = "Client configuration", body = PublicConfig, content_type = "application/json")
    ),
    tag = "System"
)]
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<PublicConfig> {
    let config = &state.config;
    Json(PublicConfig {
        network: config.network.as_str().to_string(),
        rpc_endpoint: config.rpc_endpoint().to_string(),
        default_recipient: config.default_recipient.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::test_state;

    #[tokio::test]
    async fn test_public_config() {
        let Json(cfg) = get_config(State(test_state())).await;
        assert_eq!(cfg.network, "devnet");
        assert_eq!(cfg.rpc_endpoint, "https://api.devnet.solana.com");
        assert_eq!(
            cfg.default_recipient.as_deref(),
            Some("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM")
        );
    }
}
