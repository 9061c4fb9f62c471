//! Wallet Session
//!
//! The desk never touches key material. A session only reports whether a
//! wallet is connected, which address it controls, and forwards a built
//! transaction to the wallet for signing and broadcast.

pub mod signer;
#[cfg(any(test, feature = "mock-chain"))]
pub mod mock;

pub use signer::{SignerSession, TransactionSigner};
#[cfg(any(test, feature = "mock-chain"))]
pub use mock::MockWallet;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, warn};

use crate::address::{Address, Signature};
use crate::notify::{Notification, NotificationSink};
use crate::transaction::Transaction;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Wallet not connected")]
    NotConnected,

    /// User declined, or the device refused to sign
    #[error("Signing rejected: {0}")]
    SigningRejected(String),

    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    /// Node refused the signed transaction (preflight, fee, blockhash...)
    #[error("Transaction rejected: {0}")]
    SubmissionRejected(String),
}

/// In-flight marker owned by a session. At most one transfer holds it at a
/// time, however many workflows share the session.
#[derive(Debug, Default)]
pub struct TransferSlot(Arc<Mutex<()>>);

impl TransferSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the slot; `None` while another transfer holds it. Released when
    /// the guard drops.
    pub fn try_acquire(&self) -> Option<OwnedMutexGuard<()>> {
        self.0.clone().try_lock_owned().ok()
    }

    pub fn is_held(&self) -> bool {
        self.0.try_lock().is_err()
    }
}

/// Connection to a wallet extension or hardware device.
///
/// Owned by the application shell; a transfer workflow borrows it for the
/// duration of one transfer.
#[async_trait]
pub trait WalletSession: Send + Sync {
    /// Wallet name for logging ("Phantom", "Ledger", ...)
    fn name(&self) -> &str;

    fn is_connected(&self) -> bool {
        self.current_address().is_some()
    }

    fn current_address(&self) -> Option<Address>;

    /// Single-flight slot shared by every workflow over this session
    fn transfer_slot(&self) -> &TransferSlot;

    /// Sign `tx` with the connected account and broadcast it.
    ///
    /// Suspends until the wallet answers. Returns the submission id.
    async fn sign_and_send(&self, tx: &Transaction) -> Result<Signature, WalletError>;

    async fn disconnect(&self) -> Result<(), WalletError>;
}

/// Disconnect `session` and tell the user how it went
pub async fn notify_disconnect(
    session: &dyn WalletSession,
    sink: &dyn NotificationSink,
) -> Result<(), WalletError> {
    match session.disconnect().await {
        Ok(()) => {
            info!(wallet = session.name(), "Wallet disconnected");
            sink.notify(Notification::success(
                "Wallet disconnected",
                format!("{} has been disconnected", session.name()),
            ));
            Ok(())
        }
        Err(e) => {
            warn!(wallet = session.name(), error = %e, "Wallet disconnect failed");
            sink.notify(Notification::error("Disconnect failed", e.to_string()));
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{Severity, ToastBoard};

    #[test]
    fn test_transfer_slot_single_holder() {
        let slot = TransferSlot::new();
        let guard = slot.try_acquire().unwrap();
        assert!(slot.is_held());
        assert!(slot.try_acquire().is_none());

        drop(guard);
        assert!(!slot.is_held());
        assert!(slot.try_acquire().is_some());
    }

    #[tokio::test]
    async fn test_notify_disconnect() {
        let wallet = MockWallet::connected(Address::new([3; 32]));
        let board = ToastBoard::new();

        notify_disconnect(&wallet, &board).await.unwrap();

        assert!(!wallet.is_connected());
        let active = board.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].severity, Severity::Success);
        assert_eq!(active[0].title, "Wallet disconnected");
    }
}
