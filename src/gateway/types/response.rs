//! API Response types and error codes
//!
//! - `ApiResponse<T>`: Unified response wrapper
//! - `error_codes`: Standard error code constants
//! - Response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::balance::BalanceSnapshot;
use crate::money::{DEFAULT_DISPLAY_DIGITS, format_sol};

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or absent (error)
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    /// Response data (only present when code == 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: error_codes::SUCCESS,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    pub fn error(code: i32, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Health report
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    /// Seconds since the process started
    #[schema(example = 12.5)]
    pub uptime: f64,
    /// RFC 3339, UTC
    #[schema(example = "2026-01-01T00:00:00Z")]
    pub timestamp: DateTime<Utc>,
    #[schema(example = "development")]
    pub environment: String,
    #[schema(example = "1.0.0")]
    pub version: String,
}

/// Client-visible configuration
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicConfig {
    #[schema(example = "devnet")]
    pub network: String,
    #[schema(example = "https://api.devnet.solana.com")]
    pub rpc_endpoint: String,
    /// Pre-fill for the transfer form's recipient field
    pub default_recipient: Option<String>,
}

/// Balance of one account
#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceData {
    #[schema(example = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM")]
    pub address: String,
    #[schema(example = 1500000000_u64)]
    pub lamports: u64,
    /// Exact amount in SOL
    #[schema(example = "1.5")]
    pub sol: String,
    #[schema(example = "1.5 SOL")]
    pub display: String,
    pub fetched_at: DateTime<Utc>,
}

impl From<BalanceSnapshot> for BalanceData {
    fn from(snapshot: BalanceSnapshot) -> Self {
        Self {
            address: snapshot.address.to_string(),
            lamports: snapshot.lamports,
            sol: snapshot.amount.to_string(),
            display: format_sol(snapshot.amount, DEFAULT_DISPLAY_DIGITS),
            fetched_at: snapshot.fetched_at,
        }
    }
}

// ============================================================================
// Error Codes
// ============================================================================

/// Standard API error codes
pub mod error_codes {
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_ADDRESS: i32 = 1001;

    // Server errors (5xxx)
    pub const BALANCE_UNAVAILABLE: i32 = 5001;
}
