//! Transfer Workflow
//!
//! Moves one SOL transfer from the form to a terminal state and reports
//! progress to the user.
//!
//! # State Machine
//!
//! ```text
//! IDLE → VALIDATING → BUILDING → SUBMITTING → AWAITING_CONFIRMATION → CONFIRMED
//!            ↓            ↓           ↓                 ↓
//!          FAILED       FAILED      FAILED            FAILED
//! ```
//!
//! # Guarantees
//!
//! 1. **Guarded start**: IDLE → VALIDATING only with a connected wallet and no
//!    other transfer in flight; otherwise [`SubmitRejected`] and no state change
//! 2. **At most one broadcast**: a [`TransferRequest`] is consumed by its run
//!    and is never signed twice
//! 3. **One outcome message**: every run ends with exactly one Success or
//!    exactly one Error notification
//! 4. **No silent resubmission**: after broadcast, a timeout or RPC error is
//!    reported, never retried

pub mod error;
pub mod state;
pub mod types;
pub mod workflow;

pub use error::{ErrorCategory, SubmitRejected, TransferError};
pub use state::TransferState;
pub use types::{
    InputField, TransferEvent, TransferForm, TransferOutcome, TransferRequest, TransferResult,
    ValidatedTransfer,
};
pub use workflow::{TransferHandle, TransferWorkflow, validate};
