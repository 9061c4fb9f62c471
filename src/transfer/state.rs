//! Transfer workflow states

use std::fmt;

/// Workflow states, in forward order.
///
/// Terminal states: CONFIRMED, FAILED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferState {
    /// No transfer running
    Idle,

    /// Checking recipient and amount against the connected session
    Validating,

    /// Fetching a recent blockhash and building the transaction
    Building,

    /// Waiting for the wallet to sign and broadcast
    Submitting,

    /// Broadcast accepted; polling for the requested commitment
    AwaitingConfirmation,

    /// Terminal: transfer confirmed on chain
    Confirmed,

    /// Terminal: transfer did not happen, or its outcome is unknown
    Failed,
}

impl TransferState {
    /// Check if this is a terminal state (no more transitions possible)
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferState::Confirmed | TransferState::Failed)
    }

    /// The single forward successor on the happy path
    pub fn next(&self) -> Option<TransferState> {
        match self {
            TransferState::Idle => Some(TransferState::Validating),
            TransferState::Validating => Some(TransferState::Building),
            TransferState::Building => Some(TransferState::Submitting),
            TransferState::Submitting => Some(TransferState::AwaitingConfirmation),
            TransferState::AwaitingConfirmation => Some(TransferState::Confirmed),
            TransferState::Confirmed | TransferState::Failed => None,
        }
    }

    /// Legal transitions: the happy-path successor, or FAILED from any
    /// running state
    pub fn can_transition_to(&self, to: TransferState) -> bool {
        if self.next() == Some(to) {
            return true;
        }
        to == TransferState::Failed
            && !self.is_terminal()
            && *self != TransferState::Idle
    }

    /// Get human-readable state name
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferState::Idle => "IDLE",
            TransferState::Validating => "VALIDATING",
            TransferState::Building => "BUILDING",
            TransferState::Submitting => "SUBMITTING",
            TransferState::AwaitingConfirmation => "AWAITING_CONFIRMATION",
            TransferState::Confirmed => "CONFIRMED",
            TransferState::Failed => "FAILED",
        }
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
