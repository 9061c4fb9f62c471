//! Scriptable wallet for tests

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::{TransferSlot, WalletError, WalletSession};
use crate::address::{Address, Signature};
use crate::transaction::Transaction;

pub struct MockWallet {
    address: Mutex<Option<Address>>,
    /// Track signed transactions for verification
    signed: Mutex<Vec<Transaction>>,
    sign_count: AtomicUsize,
    /// Configured behavior
    sign_error: Mutex<Option<WalletError>>,
    sign_delay: Mutex<Duration>,
    disconnect_on_sign: Mutex<bool>,
    slot: TransferSlot,
}

impl MockWallet {
    pub fn connected(address: Address) -> Self {
        Self {
            address: Mutex::new(Some(address)),
            signed: Mutex::new(Vec::new()),
            sign_count: AtomicUsize::new(0),
            sign_error: Mutex::new(None),
            sign_delay: Mutex::new(Duration::ZERO),
            disconnect_on_sign: Mutex::new(false),
            slot: TransferSlot::new(),
        }
    }

    pub fn disconnected() -> Self {
        let wallet = Self::connected(Address::new([0; 32]));
        *wallet.address.lock().unwrap() = None;
        wallet
    }

    pub fn set_address(&self, address: Option<Address>) {
        *self.address.lock().unwrap() = address;
    }

    pub fn set_sign_error(&self, error: Option<WalletError>) {
        *self.sign_error.lock().unwrap() = error;
    }

    /// Hold every signing request for `delay` before answering
    pub fn set_sign_delay(&self, delay: Duration) {
        *self.sign_delay.lock().unwrap() = delay;
    }

    /// Simulate the extension dropping the connection as the prompt opens
    pub fn set_disconnect_on_sign(&self, disconnect: bool) {
        *self.disconnect_on_sign.lock().unwrap() = disconnect;
    }

    pub fn sign_count(&self) -> usize {
        self.sign_count.load(Ordering::SeqCst)
    }

    pub fn signed_transactions(&self) -> Vec<Transaction> {
        self.signed.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletSession for MockWallet {
    fn name(&self) -> &str {
        "mock"
    }

    fn current_address(&self) -> Option<Address> {
        *self.address.lock().unwrap()
    }

    fn transfer_slot(&self) -> &TransferSlot {
        &self.slot
    }

    async fn sign_and_send(&self, tx: &Transaction) -> Result<Signature, WalletError> {
        let n = self.sign_count.fetch_add(1, Ordering::SeqCst) + 1;

        let delay = *self.sign_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if *self.disconnect_on_sign.lock().unwrap() {
            *self.address.lock().unwrap() = None;
            return Err(WalletError::NotConnected);
        }

        if let Some(err) = self.sign_error.lock().unwrap().clone() {
            return Err(err);
        }

        self.signed.lock().unwrap().push(tx.clone());

        let mut bytes = [0x5A; 64];
        bytes[..8].copy_from_slice(&(n as u64).to_le_bytes());
        Ok(Signature::new(bytes))
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        *self.address.lock().unwrap() = None;
        Ok(())
    }
}
