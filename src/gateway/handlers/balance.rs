//! Balance lookup handler

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use super::super::state::AppState;
use super::super::types::{ApiResponse, BalanceData, error_codes};
use crate::balance::BalanceError;

/// Balance of an account, in lamports and SOL
///
/// - 200: `{code: 0, data: {...}}`
/// - 400: malformed address, `code = INVALID_ADDRESS`
/// - 503: RPC node failed, `code = BALANCE_UNAVAILABLE`. No zero balance is
///   ever reported for a failed lookup.
#[utoipa::path(
    get,
    path = "/api/balance/{address}",
    params(
        ("address" = String, Path, description = "Base58 account address")
    ),
    responses(
        (status = 200, description = "Balance fetched", body = ApiResponse<BalanceData>, content_type = "application/json"),
        (status = 400, description = "Malformed address"),
        (status = 503, description = "RPC node unavailable")
    ),
    tag = "Account"
)]
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> (StatusCode, Json<ApiResponse<BalanceData>>) {
    match state.balances.fetch_balance(&address).await {
        Ok(snapshot) => (
            StatusCode::OK,
            Json(ApiResponse::success(BalanceData::from(snapshot))),
        ),
        Err(e @ BalanceError::InvalidAddress(_)) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(error_codes::INVALID_ADDRESS, e.to_string())),
        ),
        Err(e @ BalanceError::Rpc(_)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse::error(
                error_codes::BALANCE_UNAVAILABLE,
                e.to_string(),
            )),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;
    use crate::gateway::test_state_with_rpc;
    use crate::rpc::MockRpcClient;

    const ACCOUNT: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";

    #[tokio::test]
    async fn test_balance_ok() {
        let rpc = Arc::new(MockRpcClient::new());
        let address: Address = ACCOUNT.parse().unwrap();
        rpc.set_balance(address, 1_500_000_000);

        let (status, Json(body)) =
            get_balance(State(test_state_with_rpc(rpc)), Path(ACCOUNT.to_string())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.code, 0);
        let data = body.data.unwrap();
        assert_eq!(data.lamports, 1_500_000_000);
        assert_eq!(data.sol, "1.5");
        assert_eq!(data.display, "1.5 SOL");
    }

    #[tokio::test]
    async fn test_balance_bad_address() {
        let rpc = Arc::new(MockRpcClient::new());
        let (status, Json(body)) = get_balance(
            State(test_state_with_rpc(rpc.clone())),
            Path("not-an-address".to_string()),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, error_codes::INVALID_ADDRESS);
        assert!(body.data.is_none());
        assert_eq!(rpc.call_count(), 0);
    }

    #[tokio::test]
    async fn test_balance_rpc_down() {
        let rpc = Arc::new(MockRpcClient::new());
        rpc.set_offline(true);

        let (status, Json(body)) =
            get_balance(State(test_state_with_rpc(rpc)), Path(ACCOUNT.to_string())).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.code, error_codes::BALANCE_UNAVAILABLE);
        assert!(body.data.is_none());
    }
}
