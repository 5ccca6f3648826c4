//! Fee computation and emission.

use crate::error::FeeError;
use crate::transfer::{Settlement, TransferInstruction};
use lumeos_types::{AccountName, Asset, ContractParams, PollId};

/// Decides when a transfer is owed and hands it to the settlement sink.
pub struct FeeGate<'a> {
    params: &'a ContractParams,
    settlement: &'a dyn Settlement,
}

impl<'a> FeeGate<'a> {
    pub fn new(params: &'a ContractParams, settlement: &'a dyn Settlement) -> Self {
        Self { params, settlement }
    }

    /// Whether a creation with this many prior polls is charged.
    pub fn is_chargeable(&self, polls_created_before: u32) -> bool {
        polls_created_before > self.params.free_polls
    }

    /// The fee transfer for `creator`'s poll number `poll_number`.
    pub fn poll_fee_instruction(
        &self,
        creator: &AccountName,
        poll_number: u32,
    ) -> TransferInstruction {
        TransferInstruction {
            contract: self.params.token_contract.clone(),
            from: creator.clone(),
            to: self.params.settlement_account.clone(),
            quantity: self.params.poll_fee.clone(),
            memo: format!("fee:{creator};n:{poll_number}"),
            authorizer: creator.clone(),
        }
    }

    /// Emit the creation fee if owed. Call only after the poll and the
    /// creator's counter have committed.
    ///
    /// Fire-and-forget: a failed hand-off is logged and otherwise ignored,
    /// the creation stands either way. Returns the instruction that was
    /// emitted, if any.
    pub fn charge_poll_creation(
        &self,
        creator: &AccountName,
        polls_created_before: u32,
    ) -> Option<TransferInstruction> {
        if !self.is_chargeable(polls_created_before) {
            return None;
        }
        if !self.params.poll_fee.is_positive() {
            tracing::warn!(fee = %self.params.poll_fee, "poll fee is not positive, skipping charge");
            return None;
        }
        let instruction =
            self.poll_fee_instruction(creator, polls_created_before.saturating_add(1));
        match self.settlement.submit(instruction.clone()) {
            Ok(()) => {
                tracing::info!(
                    creator = %creator,
                    fee = %instruction.quantity,
                    to = %instruction.to,
                    "poll fee transfer emitted"
                );
            }
            Err(e) => {
                tracing::warn!(
                    creator = %creator,
                    error = %e,
                    "poll fee hand-off failed; poll stands, settlement must reconcile"
                );
            }
        }
        Some(instruction)
    }

    /// Emit the purchase transfer for a priced poll.
    ///
    /// Unlike the creation fee this is the whole effect of the request, so a
    /// failed hand-off is returned to the caller.
    pub fn charge_purchase(
        &self,
        buyer: &AccountName,
        poll_id: PollId,
        price: Option<&Asset>,
    ) -> Result<TransferInstruction, FeeError> {
        let price = match price {
            Some(p) if p.is_positive() => p,
            other => {
                return Err(FeeError::InvalidPrice {
                    poll_id,
                    price: other.map_or_else(|| "none".to_string(), Asset::to_string),
                })
            }
        };
        let instruction = TransferInstruction {
            contract: self.params.token_contract.clone(),
            from: buyer.clone(),
            to: self.params.settlement_account.clone(),
            quantity: price.clone(),
            memo: format!("b:{buyer};pid:{poll_id};p:{}", price.amount()),
            authorizer: buyer.clone(),
        };
        self.settlement.submit(instruction.clone())?;
        tracing::info!(buyer = %buyer, poll_id = %poll_id, price = %price, "poll purchase transfer emitted");
        Ok(instruction)
    }
}
