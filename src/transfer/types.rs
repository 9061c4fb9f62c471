//! Transfer request, result and event types

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use ulid::Ulid;

use super::error::TransferError;
use super::state::TransferState;
use crate::address::{Address, Signature};

/// Amount pre-filled into a fresh form
pub const DEFAULT_FORM_AMOUNT: &str = "0.01";

/// Transfer form field, for inline error placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputField {
    Recipient,
    Amount,
}

impl InputField {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputField::Recipient => "recipient",
            InputField::Amount => "amount",
        }
    }
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw form input as typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferForm {
    pub recipient: String,
    /// Display units (SOL)
    pub amount: String,
}

impl TransferForm {
    pub fn new(recipient: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            amount: amount.into(),
        }
    }

    /// Fresh form: configured recipient (if any) and the default amount
    pub fn prefilled(default_recipient: Option<&str>) -> Self {
        Self::new(default_recipient.unwrap_or_default(), DEFAULT_FORM_AMOUNT)
    }
}

/// A submitted transfer.
///
/// Deliberately not `Clone`: the workflow consumes it, so one request can
/// drive at most one submission. Retrying means building a new request.
#[derive(Debug)]
pub struct TransferRequest {
    pub id: Ulid,
    pub sender: Address,
    pub recipient: String,
    pub amount: String,
    pub created_at: DateTime<Utc>,
}

impl TransferRequest {
    pub fn new(sender: Address, form: TransferForm) -> Self {
        Self {
            id: Ulid::new(),
            sender,
            recipient: form.recipient,
            amount: form.amount,
            created_at: Utc::now(),
        }
    }
}

/// Request fields after validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedTransfer {
    pub recipient: Address,
    /// Display units
    pub amount: Decimal,
    pub lamports: u64,
}

/// Outcome of a transfer, advancing forward only
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferResult {
    Pending,
    Submitted(Signature),
    Confirmed(Signature),
    Failed(TransferError),
}

impl TransferResult {
    fn rank(&self) -> u8 {
        match self {
            TransferResult::Pending => 0,
            TransferResult::Submitted(_) => 1,
            TransferResult::Confirmed(_) | TransferResult::Failed(_) => 2,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.rank() == 2
    }

    /// Move to `next` if that is a forward step. Returns `false` and leaves
    /// the result untouched otherwise.
    pub fn advance(&mut self, next: TransferResult) -> bool {
        if next.rank() <= self.rank() {
            return false;
        }
        *self = next;
        true
    }

    pub fn signature(&self) -> Option<&Signature> {
        match self {
            TransferResult::Submitted(sig) | TransferResult::Confirmed(sig) => Some(sig),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&TransferError> {
        match self {
            TransferResult::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// State change broadcast to observers
#[derive(Debug, Clone)]
pub struct TransferEvent {
    pub request_id: Ulid,
    pub state: TransferState,
    pub message: String,
    pub signature: Option<Signature>,
}

/// Final report of one workflow run
#[derive(Debug, Clone)]
pub struct TransferOutcome {
    pub request_id: Ulid,
    pub result: TransferResult,
    /// States entered, in order, starting at VALIDATING
    pub transitions: Vec<TransferState>,
    /// Signature of the broadcast transaction, kept even when confirmation fails
    pub signature: Option<Signature>,
}

impl TransferOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self.result, TransferResult::Confirmed(_))
    }

    pub fn error(&self) -> Option<&TransferError> {
        self.result.error()
    }

    pub fn final_state(&self) -> TransferState {
        self.transitions.last().copied().unwrap_or(TransferState::Idle)
    }

    pub fn reached(&self, state: TransferState) -> bool {
        self.transitions.contains(&state)
    }
}
