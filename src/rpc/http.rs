//! JSON-RPC 2.0 client for Solana-compatible nodes

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use super::{Commitment, ConfirmationStatus, RecentBlockhash, RpcClient, RpcError};
use crate::address::{Address, Signature};
use crate::transaction::SignedTransaction;

/// JSON-RPC request structure
#[derive(Serialize)]
struct JsonRpcRequest<T> {
    jsonrpc: &'static str,
    method: &'static str,
    params: T,
    id: u64,
}

/// JSON-RPC response structure
#[derive(Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// `{ context, value }` envelope used by most Solana read methods
#[derive(Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockhashValue {
    blockhash: String,
    last_valid_block_height: u64,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SignatureStatusValue {
    #[serde(default)]
    confirmations: Option<u64>,
    #[serde(default)]
    err: Option<serde_json::Value>,
    #[serde(default)]
    confirmation_status: Option<Commitment>,
}

/// Decode a JSON-RPC response body into its `result`
fn decode_response<R: DeserializeOwned>(body: &str) -> Result<R, RpcError> {
    let response: JsonRpcResponse<R> = serde_json::from_str(body)
        .map_err(|e| RpcError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    if let Some(error) = response.error {
        return Err(RpcError::Node {
            code: error.code,
            message: error.message,
        });
    }

    response
        .result
        .ok_or_else(|| RpcError::InvalidResponse("No result in RPC response".to_string()))
}

fn status_from(value: Option<SignatureStatusValue>, commitment: Commitment) -> ConfirmationStatus {
    let Some(status) = value else {
        return ConfirmationStatus::Pending;
    };

    // Nodes that omit confirmationStatus report `confirmations: null` once rooted
    let reached = match status.confirmation_status {
        Some(level) => level >= commitment,
        None => status.confirmations.is_none(),
    };

    if !reached {
        return ConfirmationStatus::Pending;
    }

    match status.err {
        Some(err) if !err.is_null() => ConfirmationStatus::Failed(err.to_string()),
        _ => ConfirmationStatus::Confirmed,
    }
}

/// RPC client talking JSON over HTTP
pub struct HttpRpcClient {
    url: String,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl HttpRpcClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RpcError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
            next_id: AtomicU64::new(1),
        })
    }

    async fn rpc_call<T, R>(&self, method: &'static str, params: T) -> Result<R, RpcError>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };

        debug!(method, id, url = %self.url, "RPC call");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RpcError::Transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RpcError::Transport(format!("Failed to read response: {}", e)))?;

        match decode_response(&body) {
            Err(RpcError::InvalidResponse(_)) if !status.is_success() => {
                warn!(method, %status, "RPC endpoint returned HTTP error");
                Err(RpcError::Transport(format!("HTTP {}", status)))
            }
            other => other,
        }
    }
}

#[async_trait]
impl RpcClient for HttpRpcClient {
    fn endpoint(&self) -> &str {
        &self.url
    }

    async fn get_balance(&self, address: &Address) -> Result<u64, RpcError> {
        let result: WithContext<u64> = self
            .rpc_call(
                "getBalance",
                json!([address.to_string(), { "commitment": Commitment::Confirmed }]),
            )
            .await?;
        Ok(result.value)
    }

    async fn get_latest_blockhash(&self) -> Result<RecentBlockhash, RpcError> {
        let result: WithContext<BlockhashValue> = self
            .rpc_call(
                "getLatestBlockhash",
                json!([{ "commitment": Commitment::Confirmed }]),
            )
            .await?;

        let blockhash = result
            .value
            .blockhash
            .parse()
            .map_err(|e| RpcError::InvalidResponse(format!("Invalid blockhash: {}", e)))?;

        Ok(RecentBlockhash {
            blockhash,
            last_valid_block_height: result.value.last_valid_block_height,
        })
    }

    async fn send_transaction(&self, tx: &SignedTransaction) -> Result<Signature, RpcError> {
        let result: String = self
            .rpc_call(
                "sendTransaction",
                json!([
                    tx.to_base64(),
                    { "encoding": "base64", "preflightCommitment": Commitment::Confirmed }
                ]),
            )
            .await?;

        result
            .parse()
            .map_err(|e| RpcError::InvalidResponse(format!("Invalid signature: {}", e)))
    }

    async fn confirm_transaction(
        &self,
        signature: &Signature,
        commitment: Commitment,
    ) -> Result<ConfirmationStatus, RpcError> {
        let result: WithContext<Vec<Option<SignatureStatusValue>>> = self
            .rpc_call(
                "getSignatureStatuses",
                json!([[signature.to_string()], { "searchTransactionHistory": false }]),
            )
            .await?;

        let value = result.value.into_iter().next().flatten();
        Ok(status_from(value, commitment))
    }
}
