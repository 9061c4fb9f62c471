//! Transfer Workflow
//!
//! Drives one transfer from submit to a terminal state. This is the central
//! component that owns state transitions and user feedback.
//!
//! At most one run is in flight per wallet session: the session's
//! [`TransferSlot`](crate::wallet::TransferSlot) is held for the whole run, so even separate workflows over
//! the same session cannot race. A second submit while one is running is
//! refused with [`SubmitRejected::Busy`] without touching the running transfer.

use std::sync::Arc;

use tokio::sync::{OwnedMutexGuard, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use ulid::Ulid;

use super::error::{SubmitRejected, TransferError};
use super::state::TransferState;
use super::types::{
    InputField, TransferEvent, TransferForm, TransferOutcome, TransferRequest, TransferResult,
    ValidatedTransfer,
};
use crate::address::{Address, Signature, shorten_address};
use crate::config::{CONFIRMATION_LEVEL, TransferSettings};
use crate::money::{SOL_DECIMALS, format_sol, is_positive_amount, parse_amount, to_base_units};
use crate::notify::{Notification, NotificationSink, Notifier};
use crate::rpc::{ConfirmationStatus, RpcClient};
use crate::transaction::Transaction;
use crate::wallet::WalletSession;

const EVENT_BUFFER: usize = 64;

/// Check recipient and amount. The recipient is checked first, so when both
/// are bad the recipient is reported.
pub fn validate(request: &TransferRequest) -> Result<ValidatedTransfer, TransferError> {
    let recipient: Address =
        request
            .recipient
            .trim()
            .parse()
            .map_err(|e: crate::address::AddressError| TransferError::InvalidInput {
                field: InputField::Recipient,
                reason: e.to_string(),
            })?;

    let invalid_amount = |reason: String| TransferError::InvalidInput {
        field: InputField::Amount,
        reason,
    };

    if !is_positive_amount(&request.amount) {
        return Err(invalid_amount("Amount must be a number greater than zero".to_string()));
    }

    let amount = parse_amount(&request.amount).map_err(|e| invalid_amount(e.to_string()))?;
    let lamports = to_base_units(amount).map_err(|e| invalid_amount(e.to_string()))?;
    if lamports == 0 {
        return Err(invalid_amount("Amount is smaller than 1 lamport".to_string()));
    }

    Ok(ValidatedTransfer {
        recipient,
        amount,
        lamports,
    })
}

/// Single-flight transfer runner bound to one wallet session
pub struct TransferWorkflow {
    rpc: Arc<dyn RpcClient>,
    wallet: Arc<dyn WalletSession>,
    sink: Arc<dyn NotificationSink>,
    settings: TransferSettings,
    events: broadcast::Sender<TransferEvent>,
}

/// Running transfer started with [`TransferWorkflow::spawn`]
pub struct TransferHandle {
    pub request_id: Ulid,
    notifier: Notifier,
    join: JoinHandle<TransferOutcome>,
}

impl TransferHandle {
    /// Stop sending notifications (the form went away). The transfer keeps
    /// running; a broadcast transaction cannot be recalled.
    pub fn detach(&self) {
        self.notifier.detach();
    }

    pub async fn wait(self) -> Result<TransferOutcome, tokio::task::JoinError> {
        self.join.await
    }
}

impl TransferWorkflow {
    pub fn new(
        rpc: Arc<dyn RpcClient>,
        wallet: Arc<dyn WalletSession>,
        sink: Arc<dyn NotificationSink>,
        settings: TransferSettings,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            rpc,
            wallet,
            sink,
            settings,
            events,
        }
    }

    /// Observe state changes of every run on this workflow
    pub fn subscribe(&self) -> broadcast::Receiver<TransferEvent> {
        self.events.subscribe()
    }

    /// `true` while a transfer is running on this session; the UI disables
    /// submit
    pub fn is_busy(&self) -> bool {
        self.wallet.transfer_slot().is_held()
    }

    /// Run a transfer to completion on the current task
    pub async fn submit(&self, form: TransferForm) -> Result<TransferOutcome, SubmitRejected> {
        let (request, guard) = self.begin(form)?;
        let run = self.new_run(request.id, Notifier::new(self.sink.clone()));
        Ok(run.execute(request, guard).await)
    }

    /// Start a transfer on a background task.
    ///
    /// The in-flight slot is taken before this returns, so a submit issued
    /// right after is refused.
    pub fn spawn(&self, form: TransferForm) -> Result<TransferHandle, SubmitRejected> {
        let (request, guard) = self.begin(form)?;
        let request_id = request.id;
        let notifier = Notifier::new(self.sink.clone());
        let run = self.new_run(request_id, notifier.clone());
        let join = tokio::spawn(run.execute(request, guard));

        Ok(TransferHandle {
            request_id,
            notifier,
            join,
        })
    }

    /// IDLE → VALIDATING guard. Refusals change no state.
    fn begin(
        &self,
        form: TransferForm,
    ) -> Result<(TransferRequest, OwnedMutexGuard<()>), SubmitRejected> {
        let Some(guard) = self.wallet.transfer_slot().try_acquire() else {
            debug!("Submit refused: transfer already in flight");
            self.sink.notify(Notification::warning(
                "Transfer in progress",
                "Wait for the current transfer to finish",
            ));
            return Err(SubmitRejected::Busy);
        };

        let Some(sender) = self.wallet.current_address() else {
            warn!(wallet = self.wallet.name(), "Submit refused: wallet not connected");
            self.sink.notify(Notification::warning(
                "Wallet not connected",
                "Connect a wallet before sending",
            ));
            return Err(SubmitRejected::WalletNotConnected);
        };

        Ok((TransferRequest::new(sender, form), guard))
    }

    fn new_run(&self, request_id: Ulid, notifier: Notifier) -> Run {
        Run {
            request_id,
            rpc: self.rpc.clone(),
            wallet: self.wallet.clone(),
            notifier,
            events: self.events.clone(),
            settings: self.settings.clone(),
            state: TransferState::Idle,
            transitions: Vec::with_capacity(6),
            result: TransferResult::Pending,
            sent: None,
        }
    }
}

/// State of a single run
struct Run {
    request_id: Ulid,
    rpc: Arc<dyn RpcClient>,
    wallet: Arc<dyn WalletSession>,
    notifier: Notifier,
    events: broadcast::Sender<TransferEvent>,
    settings: TransferSettings,
    state: TransferState,
    transitions: Vec<TransferState>,
    result: TransferResult,
    /// Set once the wallet reports a broadcast; survives later failures
    sent: Option<Signature>,
}

impl Run {
    /// Consumes the request: one request, at most one broadcast.
    async fn execute(
        mut self,
        request: TransferRequest,
        _guard: OwnedMutexGuard<()>,
    ) -> TransferOutcome {
        info!(
            request_id = %self.request_id,
            sender = %request.sender,
            recipient = %request.recipient,
            amount = %request.amount,
            "Transfer submitted"
        );

        if let Err(e) = self.drive(request).await {
            self.fail(e);
        }

        TransferOutcome {
            request_id: self.request_id,
            signature: self.sent,
            result: self.result,
            transitions: self.transitions,
        }
    }

    async fn drive(&mut self, request: TransferRequest) -> Result<(), TransferError> {
        // === VALIDATING ===
        self.enter(TransferState::Validating, "Checking transfer details", None);
        let transfer = validate(&request)?;

        // The session may have dropped or switched accounts since submit
        if self.wallet.current_address() != Some(request.sender) {
            return Err(TransferError::WalletNotConnected);
        }

        // === BUILDING ===
        self.enter(TransferState::Building, "Preparing transaction", None);
        self.notifier
            .notify(Notification::info("Preparing transaction", "Please wait..."));

        let recent = self.rpc.get_latest_blockhash().await.map_err(|e| {
            warn!(request_id = %self.request_id, error = %e, "Blockhash fetch failed");
            TransferError::from(e)
        })?;
        let tx = Transaction::new_transfer(
            request.sender,
            transfer.recipient,
            transfer.lamports,
            recent,
        );
        debug!(
            request_id = %self.request_id,
            lamports = transfer.lamports,
            blockhash = %recent.blockhash,
            "Transaction built"
        );

        // === SUBMITTING ===
        self.enter(TransferState::Submitting, "Waiting for wallet signature", None);
        self.notifier.notify(Notification::info(
            "Confirm in wallet",
            format!("Approve sending {} in {}", display_amount(&transfer), self.wallet.name()),
        ));

        let signature = self.wallet.sign_and_send(&tx).await?;
        self.sent = Some(signature);
        self.result.advance(TransferResult::Submitted(signature));

        // === AWAITING_CONFIRMATION ===
        self.enter(
            TransferState::AwaitingConfirmation,
            "Transaction sent to the network",
            Some(signature),
        );
        self.notifier.notify(Notification::info(
            "Awaiting confirmation",
            format!(
                "Transaction {} sent to the network",
                shorten_address(&signature.to_string(), 8, 8)
            ),
        ));

        self.await_confirmation(&signature).await?;

        // === CONFIRMED ===
        self.result.advance(TransferResult::Confirmed(signature));
        self.enter(TransferState::Confirmed, "Transfer confirmed", Some(signature));
        self.notifier.notify(Notification::success(
            "Transfer complete",
            format!(
                "Sent {} to {}. Confirmed on chain.",
                display_amount(&transfer),
                transfer.recipient.short()
            ),
        ));

        Ok(())
    }

    /// Poll until [`CONFIRMATION_LEVEL`], an on-chain error, or timeout.
    /// RPC errors while polling are logged and polling continues.
    async fn await_confirmation(&self, signature: &Signature) -> Result<(), TransferError> {
        let commitment = CONFIRMATION_LEVEL;
        let poll_interval = self.settings.poll_interval();

        let poll = async {
            loop {
                match self.rpc.confirm_transaction(signature, commitment).await {
                    Ok(ConfirmationStatus::Confirmed) => return Ok(()),
                    Ok(ConfirmationStatus::Failed(cause)) => {
                        return Err(TransferError::OnChainFailure { cause });
                    }
                    Ok(ConfirmationStatus::Pending) => {}
                    Err(e) => {
                        warn!(request_id = %self.request_id, error = %e, "Confirmation poll failed");
                    }
                }
                tokio::time::sleep(poll_interval).await;
            }
        };

        match tokio::time::timeout(self.settings.confirmation_timeout(), poll).await {
            Ok(result) => result,
            Err(_) => Err(TransferError::ConfirmationTimeout {
                signature: *signature,
            }),
        }
    }

    fn enter(&mut self, next: TransferState, message: &str, signature: Option<Signature>) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );

        info!(
            request_id = %self.request_id,
            from = %self.state,
            to = %next,
            "{}",
            message
        );

        self.state = next;
        self.transitions.push(next);

        // No subscribers is fine
        let _ = self.events.send(TransferEvent {
            request_id: self.request_id,
            state: next,
            message: message.to_string(),
            signature,
        });
    }

    fn fail(&mut self, error: TransferError) {
        warn!(
            request_id = %self.request_id,
            state = %self.state,
            code = error.code(),
            error = %error,
            "Transfer failed"
        );

        self.result.advance(TransferResult::Failed(error.clone()));
        self.enter(TransferState::Failed, &error.to_string(), self.sent);
        self.notifier
            .notify(Notification::error(error.title(), error.to_string()));
    }
}

fn display_amount(transfer: &ValidatedTransfer) -> String {
    format_sol(transfer.amount, SOL_DECIMALS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{Severity, ToastBoard};
    use crate::rpc::MockRpcClient;
    use crate::wallet::{MockWallet, WalletError};
    use std::time::Duration;

    const RECIPIENT: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";

    struct TestHarness {
        workflow: TransferWorkflow,
        rpc: Arc<MockRpcClient>,
        wallet: Arc<MockWallet>,
        board: Arc<ToastBoard>,
    }

    impl TestHarness {
        fn new() -> Self {
            Self::with_wallet(MockWallet::connected(Address::new([1; 32])))
        }

        fn with_wallet(wallet: MockWallet) -> Self {
            let rpc = Arc::new(MockRpcClient::new());
            let wallet = Arc::new(wallet);
            let board = Arc::new(ToastBoard::new());
            let settings = TransferSettings {
                confirmation_timeout_ms: 200,
                poll_interval_ms: 10,
            };
            let workflow =
                TransferWorkflow::new(rpc.clone(), wallet.clone(), board.clone(), settings);
            Self {
                workflow,
                rpc,
                wallet,
                board,
            }
        }
    }

    fn form(amount: &str) -> TransferForm {
        TransferForm::new(RECIPIENT, amount)
    }

    // ========================================================================
    // Validation
    // ========================================================================

    #[test]
    fn test_validate_reports_recipient_first() {
        let req = TransferRequest::new(Address::new([1; 32]), TransferForm::new("bogus", "0"));
        let err = validate(&req).unwrap_err();
        assert_eq!(err.field(), Some(InputField::Recipient));
    }

    #[test]
    fn test_validate_sub_lamport_amount() {
        let req = TransferRequest::new(Address::new([1; 32]), form("0.0000000001"));
        let err = validate(&req).unwrap_err();
        assert_eq!(err.field(), Some(InputField::Amount));
    }

    #[test]
    fn test_validate_ok() {
        let req = TransferRequest::new(Address::new([1; 32]), form("0.01"));
        let v = validate(&req).unwrap();
        assert_eq!(v.lamports, 10_000_000);
        assert_eq!(v.recipient.to_string(), RECIPIENT);
    }

    #[test]
    fn test_validate_trims_recipient_input() {
        let padded = format!("  {}\n", RECIPIENT);
        let req = TransferRequest::new(Address::new([1; 32]), TransferForm::new(&padded, "1"));
        let v = validate(&req).unwrap();
        assert_eq!(v.recipient.to_string(), RECIPIENT);
    }

    #[test]
    fn test_validate_amounts_beyond_decimal() {
        for amount in [
            "100000000000000000000000000000",
            "0.00000000000000000000000000000001",
        ] {
            let req = TransferRequest::new(Address::new([1; 32]), form(amount));
            let err = validate(&req).unwrap_err();
            assert_eq!(err.field(), Some(InputField::Amount), "{}", amount);
            assert!(!err.to_string().contains("greater than zero"), "{}", amount);
        }
    }

    // ========================================================================
    // Happy Path
    // ========================================================================

    /// Flow: VALIDATING → BUILDING → SUBMITTING → AWAITING_CONFIRMATION → CONFIRMED
    #[tokio::test]
    async fn test_happy_path() {
        let h = TestHarness::new();
        h.rpc.push_confirmation(ConfirmationStatus::Pending);

        let outcome = h.workflow.submit(form("0.01")).await.unwrap();

        assert!(outcome.is_confirmed());
        assert_eq!(
            outcome.transitions,
            [
                TransferState::Validating,
                TransferState::Building,
                TransferState::Submitting,
                TransferState::AwaitingConfirmation,
                TransferState::Confirmed,
            ]
        );
        assert!(outcome.signature.is_some());
        assert_eq!(h.wallet.sign_count(), 1);
        assert_eq!(h.rpc.confirm_count(), 2);

        let signed = h.wallet.signed_transactions();
        assert_eq!(signed[0].instruction.lamports, 10_000_000);
        assert_eq!(signed[0].fee_payer(), Address::new([1; 32]));
        assert_eq!(signed[0].recent_blockhash, h.rpc.recent_blockhash().blockhash);

        assert_eq!(h.board.count(Severity::Success), 1);
        assert_eq!(h.board.count(Severity::Error), 0);
        assert!(!h.workflow.is_busy());
    }

    #[tokio::test]
    async fn test_events_are_broadcast() {
        let h = TestHarness::new();
        let mut rx = h.workflow.subscribe();

        let outcome = h.workflow.submit(form("1")).await.unwrap();

        let mut states = Vec::new();
        while let Ok(event) = rx.try_recv() {
            assert_eq!(event.request_id, outcome.request_id);
            states.push(event.state);
        }
        assert_eq!(states, outcome.transitions);
    }

    // ========================================================================
    // Refusals
    // ========================================================================

    #[tokio::test]
    async fn test_disconnected_wallet_refused() {
        let h = TestHarness::with_wallet(MockWallet::disconnected());
        let mut rx = h.workflow.subscribe();

        let err = h.workflow.submit(form("0.01")).await.unwrap_err();
        assert_eq!(err, SubmitRejected::WalletNotConnected);
        assert!(rx.try_recv().is_err());
        assert_eq!(h.rpc.call_count(), 0);
        assert_eq!(h.board.count(Severity::Warning), 1);
        assert!(!h.workflow.is_busy());
    }

    #[tokio::test]
    async fn test_second_submit_refused_while_in_flight() {
        let h = TestHarness::new();
        h.wallet.set_sign_delay(Duration::from_millis(50));

        let handle = h.workflow.spawn(form("0.01")).unwrap();
        assert!(h.workflow.is_busy());

        let second = h.workflow.submit(form("0.02")).await.unwrap_err();
        assert_eq!(second, SubmitRejected::Busy);
        assert_eq!(h.board.count(Severity::Warning), 1);

        let outcome = handle.wait().await.unwrap();
        assert!(outcome.is_confirmed());
        assert_eq!(h.wallet.sign_count(), 1);

        // slot released afterwards
        let third = h.workflow.submit(form("0.03")).await.unwrap();
        assert!(third.is_confirmed());
    }

    #[tokio::test]
    async fn test_workflows_share_session_slot() {
        let h = TestHarness::new();
        h.wallet.set_sign_delay(Duration::from_millis(50));
        let other = TransferWorkflow::new(
            h.rpc.clone(),
            h.wallet.clone(),
            h.board.clone(),
            TransferSettings::default(),
        );

        let handle = h.workflow.spawn(form("0.01")).unwrap();
        assert!(other.is_busy());
        assert_eq!(other.spawn(form("0.01")).err(), Some(SubmitRejected::Busy));

        assert!(handle.wait().await.unwrap().is_confirmed());
        assert_eq!(h.wallet.sign_count(), 1);
        assert!(!other.is_busy());
    }

    // ========================================================================
    // Failures
    // ========================================================================

    #[tokio::test]
    async fn test_zero_amount_fails_without_network() {
        let h = TestHarness::new();
        let outcome = h.workflow.submit(form("0")).await.unwrap();

        assert_eq!(
            outcome.transitions,
            [TransferState::Validating, TransferState::Failed]
        );
        assert_eq!(outcome.error().and_then(|e| e.field()), Some(InputField::Amount));
        assert_eq!(h.rpc.call_count(), 0);
        assert_eq!(h.wallet.sign_count(), 0);
        assert_eq!(h.board.count(Severity::Error), 1);
    }

    #[tokio::test]
    async fn test_blockhash_failure_is_network_unavailable() {
        let h = TestHarness::new();
        h.rpc.set_fail_blockhash(true);

        let outcome = h.workflow.submit(form("0.01")).await.unwrap();

        assert_eq!(outcome.final_state(), TransferState::Failed);
        assert!(outcome.reached(TransferState::Building));
        assert!(!outcome.reached(TransferState::Submitting));
        assert!(matches!(
            outcome.error(),
            Some(TransferError::NetworkUnavailable(_))
        ));
        assert_eq!(h.wallet.sign_count(), 0);
        assert_eq!(h.board.count(Severity::Error), 1);
        assert_eq!(h.board.count(Severity::Success), 0);
    }

    #[tokio::test]
    async fn test_signing_rejected() {
        let h = TestHarness::new();
        h.wallet
            .set_sign_error(Some(WalletError::SigningRejected("User rejected".into())));

        let outcome = h.workflow.submit(form("0.01")).await.unwrap();

        assert_eq!(
            outcome.error(),
            Some(&TransferError::SigningRejected("User rejected".into()))
        );
        assert!(outcome.signature.is_none());
        assert_eq!(h.rpc.confirm_count(), 0);
        assert_eq!(h.board.count(Severity::Error), 1);
    }

    #[tokio::test]
    async fn test_wallet_drops_during_signing() {
        let h = TestHarness::new();
        h.wallet.set_disconnect_on_sign(true);

        let outcome = h.workflow.submit(form("0.01")).await.unwrap();
        assert_eq!(outcome.error(), Some(&TransferError::WalletNotConnected));
    }

    #[tokio::test]
    async fn test_on_chain_failure() {
        let h = TestHarness::new();
        h.rpc
            .push_confirmation(ConfirmationStatus::Failed("InsufficientFundsForRent".into()));

        let outcome = h.workflow.submit(form("0.01")).await.unwrap();

        assert_eq!(
            outcome.error(),
            Some(&TransferError::OnChainFailure {
                cause: "InsufficientFundsForRent".into()
            })
        );
        assert!(outcome.signature.is_some());
        assert_eq!(h.wallet.sign_count(), 1);
    }

    #[tokio::test]
    async fn test_confirmation_timeout_keeps_signature() {
        let h = TestHarness::new();
        h.rpc.set_never_confirm(true);

        let outcome = h.workflow.submit(form("0.01")).await.unwrap();

        let sig = outcome.signature.expect("broadcast signature");
        assert_eq!(
            outcome.error(),
            Some(&TransferError::ConfirmationTimeout { signature: sig })
        );
        // never re-sent while waiting
        assert_eq!(h.wallet.sign_count(), 1);
        assert!(h.rpc.confirm_count() > 1);
    }

    #[tokio::test]
    async fn test_detached_handle_stops_notifications() {
        let h = TestHarness::new();
        h.wallet.set_sign_delay(Duration::from_millis(30));

        let handle = h.workflow.spawn(form("0.01")).unwrap();
        handle.detach();
        let outcome = handle.wait().await.unwrap();

        assert!(outcome.is_confirmed());
        assert!(h.board.active().is_empty());
    }
}
