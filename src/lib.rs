//! Sol Wallet Desk - wallet-connected SOL transfers
//!
//! Checks a connected wallet's balance and sends SOL from it through a
//! single-flight transfer workflow with user notifications.
//!
//! # Modules
//!
//! - [`address`] - Base58 addresses, signatures, blockhashes
//! - [`money`] - SOL ↔ lamport conversion and display
//! - [`rpc`] - JSON-RPC node boundary (HTTP client, mock)
//! - [`transaction`] - System-program transfer construction and wire encoding
//! - [`balance`] - Balance query service
//! - [`wallet`] - Wallet session boundary (signer adapter, mock)
//! - [`notify`] - Notification sink and toast board
//! - [`transfer`] - Transfer state machine and workflow
//! - [`config`] - YAML configuration with environment overrides
//! - [`logging`] - tracing subscriber setup
//! - [`gateway`] - HTTP health/config/balance endpoints

pub mod address;
pub mod money;

// Chain boundary
pub mod rpc;
pub mod transaction;

// Desk services
pub mod balance;
pub mod notify;
pub mod transfer;
pub mod wallet;

// Infrastructure
pub mod config;
pub mod gateway;
pub mod logging;

// Convenient re-exports at crate root
pub use address::{Address, Hash, Signature, is_valid_address, shorten_address};
pub use balance::{BalanceService, BalanceSnapshot, BalanceView};
pub use money::{format_sol, is_positive_amount, to_base_units, to_display_units};
pub use notify::{Notification, NotificationSink, Severity, ToastBoard};
pub use rpc::{Commitment, RpcClient};
pub use transfer::{
    SubmitRejected, TransferError, TransferForm, TransferOutcome, TransferState,
    TransferWorkflow,
};
pub use wallet::{WalletError, WalletSession};
