//! Network RPC boundary
//!
//! The four chain calls the desk needs. Wire format belongs to the
//! implementation; callers only see typed results.

pub mod http;
#[cfg(any(test, feature = "mock-chain"))]
pub mod mock;

pub use http::HttpRpcClient;
#[cfg(any(test, feature = "mock-chain"))]
pub use mock::MockRpcClient;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::{Address, Hash, Signature};
use crate::transaction::SignedTransaction;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RpcError {
    /// Endpoint unreachable, timed out, or returned a non-JSON body
    #[error("RPC transport failed: {0}")]
    Transport(String),

    /// Node answered with a JSON-RPC error object
    #[error("RPC error {code}: {message}")]
    Node { code: i64, message: String },

    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),
}

impl RpcError {
    /// Node-side rejection, as opposed to not reaching the node at all
    pub fn is_rejection(&self) -> bool {
        matches!(self, RpcError::Node { .. })
    }
}

/// Durability level requested when reading chain state
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recency marker attached to a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecentBlockhash {
    pub blockhash: Hash,
    /// Last block height at which a transaction using this hash is accepted
    pub last_valid_block_height: u64,
}

/// Result of one confirmation poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    /// Unknown to the node, or not yet at the requested commitment
    Pending,
    /// Reached the requested commitment and executed successfully
    Confirmed,
    /// Landed on chain but execution failed
    Failed(String),
}

/// Chain access used by the balance service, the workflow and signer sessions
#[async_trait]
pub trait RpcClient: Send + Sync {
    /// Endpoint URL or mock label, for logging
    fn endpoint(&self) -> &str;

    /// Balance of `address` in lamports
    async fn get_balance(&self, address: &Address) -> Result<u64, RpcError>;

    async fn get_latest_blockhash(&self) -> Result<RecentBlockhash, RpcError>;

    /// Broadcast a signed transaction, returning its submission id
    async fn send_transaction(&self, tx: &SignedTransaction) -> Result<Signature, RpcError>;

    /// Single status poll for `signature` at `commitment`
    async fn confirm_transaction(
        &self,
        signature: &Signature,
        commitment: Commitment,
    ) -> Result<ConfirmationStatus, RpcError>;
}
