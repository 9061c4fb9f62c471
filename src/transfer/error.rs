//! Transfer Error Types
//!
//! Every FAILED workflow carries exactly one [`TransferError`]. Refusals at
//! submit time, which leave the workflow untouched, are [`SubmitRejected`].

use thiserror::Error;

use super::types::InputField;
use crate::address::Signature;
use crate::rpc::RpcError;
use crate::wallet::WalletError;

/// How the failure is presented and whether re-submitting is safe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// User-correctable, shown next to the offending field
    Input,
    /// Node unreachable; safe to retry with a new request
    Connectivity,
    /// Rejected or interrupted by the wallet; no automatic retry
    Wallet,
    /// Failed or unknown after broadcast; never retried
    OnChain,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: InputField, reason: String },

    #[error("Wallet not connected")]
    WalletNotConnected,

    #[error("Signing rejected: {0}")]
    SigningRejected(String),

    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("Transaction rejected by the network: {cause}")]
    SubmissionRejected { cause: String },

    #[error("Confirmation timed out for {signature}")]
    ConfirmationTimeout { signature: Signature },

    #[error("Transaction failed on chain: {cause}")]
    OnChainFailure { cause: String },
}

impl TransferError {
    /// Get the error code for API responses and logs
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::InvalidInput { .. } => "INVALID_INPUT",
            TransferError::WalletNotConnected => "WALLET_NOT_CONNECTED",
            TransferError::SigningRejected(_) => "SIGNING_REJECTED",
            TransferError::NetworkUnavailable(_) => "NETWORK_UNAVAILABLE",
            TransferError::SubmissionRejected { .. } => "SUBMISSION_REJECTED",
            TransferError::ConfirmationTimeout { .. } => "CONFIRMATION_TIMEOUT",
            TransferError::OnChainFailure { .. } => "ON_CHAIN_FAILURE",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            TransferError::InvalidInput { .. } => ErrorCategory::Input,
            TransferError::NetworkUnavailable(_) => ErrorCategory::Connectivity,
            TransferError::WalletNotConnected | TransferError::SigningRejected(_) => {
                ErrorCategory::Wallet
            }
            TransferError::SubmissionRejected { .. }
            | TransferError::ConfirmationTimeout { .. }
            | TransferError::OnChainFailure { .. } => ErrorCategory::OnChain,
        }
    }

    /// Only connectivity failures may be retried, and only as a new request
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Connectivity
    }

    /// Offending form field, for inline display
    pub fn field(&self) -> Option<InputField> {
        match self {
            TransferError::InvalidInput { field, .. } => Some(*field),
            _ => None,
        }
    }

    /// Notification title
    pub fn title(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Invalid transfer",
            ErrorCategory::Connectivity => "Network unavailable",
            ErrorCategory::Wallet => "Wallet error",
            ErrorCategory::OnChain => "Transfer failed",
        }
    }
}

impl From<WalletError> for TransferError {
    fn from(e: WalletError) -> Self {
        match e {
            WalletError::NotConnected => TransferError::WalletNotConnected,
            WalletError::SigningRejected(reason) => TransferError::SigningRejected(reason),
            WalletError::NetworkUnavailable(cause) => TransferError::NetworkUnavailable(cause),
            WalletError::SubmissionRejected(cause) => TransferError::SubmissionRejected { cause },
        }
    }
}

impl From<RpcError> for TransferError {
    fn from(e: RpcError) -> Self {
        TransferError::NetworkUnavailable(e.to_string())
    }
}

/// Submit refused before the workflow left IDLE
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    #[error("Wallet not connected")]
    WalletNotConnected,

    #[error("A transfer is already in progress")]
    Busy,
}
