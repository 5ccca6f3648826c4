use lumeos_types::{Asset, ErrorKind, PollId};
use thiserror::Error;

/// Failure reported by a settlement sink when handed an instruction.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SettlementError {
    #[error("settlement sink unavailable: {0}")]
    Unavailable(String),

    #[error("transfer rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum FeeError {
    #[error("poll {poll_id} has no positive price (price: {price})")]
    InvalidPrice { poll_id: PollId, price: String },

    #[error("configured poll fee {0} is not a positive amount")]
    InvalidFee(Asset),

    #[error(transparent)]
    Settlement(#[from] SettlementError),
}

impl FeeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FeeError::InvalidPrice { .. } | FeeError::InvalidFee(_) => ErrorKind::Validation,
            FeeError::Settlement(_) => ErrorKind::Settlement,
        }
    }
}
