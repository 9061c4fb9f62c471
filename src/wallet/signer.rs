//! Session backed by an external signer
//!
//! Adapts anything that can sign a message (browser extension bridge,
//! hardware device) into a [`WalletSession`] that broadcasts through an
//! [`RpcClient`].

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tracing::{info, warn};

use super::{TransferSlot, WalletError, WalletSession};
use crate::address::{Address, Signature};
use crate::rpc::{RpcClient, RpcError};
use crate::transaction::Transaction;

/// Signing capability provided by the wallet itself
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    fn public_key(&self) -> Address;

    /// Sign serialized message bytes. Fails with `SigningRejected` if the
    /// user declines.
    async fn sign_message(&self, message: &[u8]) -> Result<Signature, WalletError>;
}

pub struct SignerSession {
    name: String,
    signer: RwLock<Option<Arc<dyn TransactionSigner>>>,
    rpc: Arc<dyn RpcClient>,
    slot: TransferSlot,
}

impl SignerSession {
    /// Disconnected session
    pub fn new(name: impl Into<String>, rpc: Arc<dyn RpcClient>) -> Self {
        Self {
            name: name.into(),
            signer: RwLock::new(None),
            rpc,
            slot: TransferSlot::new(),
        }
    }

    pub fn connect(&self, signer: Arc<dyn TransactionSigner>) {
        let address = signer.public_key();
        if let Ok(mut slot) = self.signer.write() {
            *slot = Some(signer);
            info!(wallet = %self.name, address = %address, "Wallet connected");
        }
    }

    fn signer(&self) -> Option<Arc<dyn TransactionSigner>> {
        self.signer.read().ok().and_then(|slot| slot.clone())
    }
}

#[async_trait]
impl WalletSession for SignerSession {
    fn name(&self) -> &str {
        &self.name
    }

    fn current_address(&self) -> Option<Address> {
        self.signer().map(|s| s.public_key())
    }

    fn transfer_slot(&self) -> &TransferSlot {
        &self.slot
    }

    async fn sign_and_send(&self, tx: &Transaction) -> Result<Signature, WalletError> {
        let signer = self.signer().ok_or(WalletError::NotConnected)?;

        if signer.public_key() != tx.fee_payer() {
            warn!(
                wallet = %self.name,
                fee_payer = %tx.fee_payer(),
                "Fee payer is not the connected account"
            );
            return Err(WalletError::SigningRejected(
                "fee payer is not the connected account".to_string(),
            ));
        }

        let signature = signer.sign_message(&tx.message_bytes()).await?;
        let signed = tx.with_signature(signature);

        match self.rpc.send_transaction(&signed).await {
            Ok(id) => Ok(id),
            Err(RpcError::Node { message, .. }) => Err(WalletError::SubmissionRejected(message)),
            // The node may have taken it before the answer was lost. Hand back
            // the local id so confirmation decides; never resend.
            Err(e) => {
                warn!(
                    wallet = %self.name,
                    signature = %signature,
                    error = %e,
                    "Broadcast outcome unknown, tracking local signature"
                );
                Ok(signature)
            }
        }
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        let mut slot = self
            .signer
            .write()
            .map_err(|_| WalletError::NotConnected)?;
        if slot.take().is_some() {
            info!(wallet = %self.name, "Wallet disconnected");
        }
        Ok(())
    }
}
