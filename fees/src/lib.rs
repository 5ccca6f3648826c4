//! Fee gate for the Lumeos contract.
//!
//! Poll creation is free up to a threshold; beyond it every creation emits
//! one fixed-fee transfer from the creator to the settlement account.
//! Priced polls emit a transfer of their price when bought.
//!
//! Transfers are instructions handed to an external settlement ledger
//! through the [`Settlement`] trait. The contract never waits for or
//! observes their confirmation.

pub mod error;
pub mod gate;
pub mod transfer;

pub use error::{FeeError, SettlementError};
pub use gate::FeeGate;
pub use transfer::{Settlement, TransferInstruction};
