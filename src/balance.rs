//! Balance Query Service
//!
//! Point-in-time balance reads. Nothing is cached: every call goes to the
//! node, and a failure is reported as an error, never as a zero balance.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::address::{Address, AddressError};
use crate::money::{DEFAULT_DISPLAY_DIGITS, format_sol, to_display_units};
use crate::rpc::{RpcClient, RpcError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BalanceError {
    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] AddressError),

    #[error("Balance unavailable: {0}")]
    Rpc(#[from] RpcError),
}

/// One successful balance read; may already be stale when displayed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceSnapshot {
    pub address: Address,
    pub lamports: u64,
    /// Display units
    pub amount: Decimal,
    pub fetched_at: DateTime<Utc>,
}

/// What the wallet card shows for the balance line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceView {
    NotConnected,
    Loading,
    Available(BalanceSnapshot),
    /// Read failed; shown as unavailable, never as zero
    Unavailable(String),
}

impl BalanceView {
    pub fn from_result(result: Result<BalanceSnapshot, BalanceError>) -> Self {
        match result {
            Ok(snapshot) => BalanceView::Available(snapshot),
            Err(e) => BalanceView::Unavailable(e.to_string()),
        }
    }

    pub fn label(&self) -> String {
        match self {
            BalanceView::NotConnected => "Wallet not connected".to_string(),
            BalanceView::Loading => "Loading...".to_string(),
            BalanceView::Available(s) => format_sol(s.amount, DEFAULT_DISPLAY_DIGITS),
            BalanceView::Unavailable(_) => "Unavailable".to_string(),
        }
    }
}

pub struct BalanceService {
    rpc: Arc<dyn RpcClient>,
}

impl BalanceService {
    pub fn new(rpc: Arc<dyn RpcClient>) -> Self {
        Self { rpc }
    }

    pub fn endpoint(&self) -> &str {
        self.rpc.endpoint()
    }

    /// Fetch the current balance of a base58 address. No retries.
    pub async fn fetch_balance(&self, address: &str) -> Result<BalanceSnapshot, BalanceError> {
        let address: Address = address.parse()?;
        self.fetch(&address).await
    }

    pub async fn fetch(&self, address: &Address) -> Result<BalanceSnapshot, BalanceError> {
        let lamports = self.rpc.get_balance(address).await.inspect_err(|e| {
            warn!(address = %address, endpoint = self.rpc.endpoint(), error = %e, "Balance fetch failed");
        })?;

        debug!(address = %address, lamports, "Balance fetched");

        Ok(BalanceSnapshot {
            address: *address,
            lamports,
            amount: to_display_units(lamports),
            fetched_at: Utc::now(),
        })
    }

    /// Balance line for the currently connected account, if any
    pub async fn view(&self, address: Option<&Address>) -> BalanceView {
        match address {
            None => BalanceView::NotConnected,
            Some(addr) => BalanceView::from_result(self.fetch(addr).await),
        }
    }
}
