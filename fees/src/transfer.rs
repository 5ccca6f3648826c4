//! Outbound transfer instructions.

use crate::error::SettlementError;
use lumeos_types::{AccountName, Asset};
use serde::{Deserialize, Serialize};

/// A value transfer to be executed by the token contract on the settlement
/// ledger, authorized under `authorizer`'s own principal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferInstruction {
    /// Token contract that executes the transfer.
    pub contract: AccountName,
    pub from: AccountName,
    pub to: AccountName,
    pub quantity: Asset,
    pub memo: String,
    pub authorizer: AccountName,
}

/// Sink for outbound transfers.
///
/// `submit` only hands the instruction over; it must not block on the
/// settlement ledger. An `Err` means the hand-off itself failed.
pub trait Settlement: Send + Sync {
    fn submit(&self, instruction: TransferInstruction) -> Result<(), SettlementError>;
}
