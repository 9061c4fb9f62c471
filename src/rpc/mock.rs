//! In-memory RPC node for tests and offline demos

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{Commitment, ConfirmationStatus, RecentBlockhash, RpcClient, RpcError};
use crate::address::{Address, Hash, Signature};
use crate::transaction::SignedTransaction;

pub struct MockRpcClient {
    balances: Mutex<HashMap<Address, u64>>,
    blockhash: RecentBlockhash,
    /// Scripted poll results, consumed front to back; `Confirmed` once empty
    confirmations: Mutex<VecDeque<ConfirmationStatus>>,
    sent: Mutex<Vec<SignedTransaction>>,
    /// Count of each operation type
    balance_count: AtomicUsize,
    blockhash_count: AtomicUsize,
    send_count: AtomicUsize,
    confirm_count: AtomicUsize,
    /// Configured behavior
    offline: Mutex<bool>,
    fail_blockhash: Mutex<bool>,
    reject_send: Mutex<Option<String>>,
    fail_send: Mutex<bool>,
    never_confirm: Mutex<bool>,
}

impl Default for MockRpcClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRpcClient {
    pub fn new() -> Self {
        Self {
            balances: Mutex::new(HashMap::new()),
            blockhash: RecentBlockhash {
                blockhash: Hash::new([0xAB; 32]),
                last_valid_block_height: 150,
            },
            confirmations: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            balance_count: AtomicUsize::new(0),
            blockhash_count: AtomicUsize::new(0),
            send_count: AtomicUsize::new(0),
            confirm_count: AtomicUsize::new(0),
            offline: Mutex::new(false),
            fail_blockhash: Mutex::new(false),
            reject_send: Mutex::new(None),
            fail_send: Mutex::new(false),
            never_confirm: Mutex::new(false),
        }
    }

    pub fn set_balance(&self, address: Address, lamports: u64) {
        self.balances.lock().unwrap().insert(address, lamports);
    }

    /// Every call fails with a transport error
    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap() = offline;
    }

    pub fn set_fail_blockhash(&self, fail: bool) {
        *self.fail_blockhash.lock().unwrap() = fail;
    }

    /// `sendTransaction` answers with a node error carrying `cause`
    pub fn set_reject_send(&self, cause: Option<&str>) {
        *self.reject_send.lock().unwrap() = cause.map(str::to_string);
    }

    /// `sendTransaction` accepts the transaction, then the answer is lost
    /// (transport error). Other calls are unaffected.
    pub fn set_fail_send(&self, fail: bool) {
        *self.fail_send.lock().unwrap() = fail;
    }

    /// Confirmation polls stay `Pending` forever
    pub fn set_never_confirm(&self, never: bool) {
        *self.never_confirm.lock().unwrap() = never;
    }

    pub fn push_confirmation(&self, status: ConfirmationStatus) {
        self.confirmations.lock().unwrap().push_back(status);
    }

    pub fn recent_blockhash(&self) -> RecentBlockhash {
        self.blockhash
    }

    pub fn sent_transactions(&self) -> Vec<SignedTransaction> {
        self.sent.lock().unwrap().clone()
    }

    pub fn balance_count(&self) -> usize {
        self.balance_count.load(Ordering::SeqCst)
    }

    pub fn blockhash_count(&self) -> usize {
        self.blockhash_count.load(Ordering::SeqCst)
    }

    pub fn send_count(&self) -> usize {
        self.send_count.load(Ordering::SeqCst)
    }

    pub fn confirm_count(&self) -> usize {
        self.confirm_count.load(Ordering::SeqCst)
    }

    /// Total chain calls of any kind
    pub fn call_count(&self) -> usize {
        self.balance_count() + self.blockhash_count() + self.send_count() + self.confirm_count()
    }

    fn check_online(&self) -> Result<(), RpcError> {
        if *self.offline.lock().unwrap() {
            Err(RpcError::Transport("Mock node offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RpcClient for MockRpcClient {
    fn endpoint(&self) -> &str {
        "mock://localnet"
    }

    async fn get_balance(&self, address: &Address) -> Result<u64, RpcError> {
        self.balance_count.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(address)
            .copied()
            .unwrap_or(0))
    }

    async fn get_latest_blockhash(&self) -> Result<RecentBlockhash, RpcError> {
        self.blockhash_count.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        if *self.fail_blockhash.lock().unwrap() {
            return Err(RpcError::Transport("Mock blockhash unavailable".to_string()));
        }
        Ok(self.blockhash)
    }

    async fn send_transaction(&self, tx: &SignedTransaction) -> Result<Signature, RpcError> {
        self.send_count.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;

        if let Some(cause) = self.reject_send.lock().unwrap().clone() {
            return Err(RpcError::Node {
                code: -32002,
                message: cause,
            });
        }

        let id = tx
            .id()
            .copied()
            .ok_or_else(|| RpcError::Node {
                code: -32602,
                message: "transaction has no signatures".to_string(),
            })?;

        self.sent.lock().unwrap().push(tx.clone());

        if *self.fail_send.lock().unwrap() {
            return Err(RpcError::Transport("Mock send answer lost".to_string()));
        }
        Ok(id)
    }

    async fn confirm_transaction(
        &self,
        _signature: &Signature,
        _commitment: Commitment,
    ) -> Result<ConfirmationStatus, RpcError> {
        self.confirm_count.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;

        if *self.never_confirm.lock().unwrap() {
            return Ok(ConfirmationStatus::Pending);
        }

        Ok(self
            .confirmations
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ConfirmationStatus::Confirmed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Transaction;

    #[tokio::test]
    async fn test_mock_balance_and_offline() {
        let rpc = MockRpcClient::new();
        let addr = Address::new([4; 32]);
        rpc.set_balance(addr, 42);

        assert_eq!(rpc.get_balance(&addr).await.unwrap(), 42);
        assert_eq!(rpc.get_balance(&Address::new([5; 32])).await.unwrap(), 0);

        rpc.set_offline(true);
        assert!(matches!(
            rpc.get_balance(&addr).await,
            Err(RpcError::Transport(_))
        ));
        assert_eq!(rpc.balance_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_send_and_confirm_script() {
        let rpc = MockRpcClient::new();
        let tx = Transaction::new_transfer(
            Address::new([1; 32]),
            Address::new([2; 32]),
            5,
            rpc.recent_blockhash(),
        )
        .with_signature(Signature::new([8; 64]));

        let sig = rpc.send_transaction(&tx).await.unwrap();
        assert_eq!(sig, Signature::new([8; 64]));
        assert_eq!(rpc.sent_transactions().len(), 1);

        rpc.push_confirmation(ConfirmationStatus::Pending);
        assert_eq!(
            rpc.confirm_transaction(&sig, Commitment::Confirmed).await.unwrap(),
            ConfirmationStatus::Pending
        );
        assert_eq!(
            rpc.confirm_transaction(&sig, Commitment::Confirmed).await.unwrap(),
            ConfirmationStatus::Confirmed
        );
    }

    #[tokio::test]
    async fn test_mock_reject_send() {
        let rpc = MockRpcClient::new();
        rpc.set_reject_send(Some("insufficient funds for fee"));
        let tx = SignedTransaction {
            signatures: vec![Signature::new([1; 64])],
            message: vec![],
        };
        let err = rpc.send_transaction(&tx).await.unwrap_err();
        assert!(err.is_rejection());
        assert!(rpc.sent_transactions().is_empty());
    }
}
