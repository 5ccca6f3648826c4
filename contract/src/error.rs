use lumeos_identity::IdentityError;
use lumeos_polls::PollError;
use lumeos_types::{ErrorKind, ValueError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContractError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Poll(#[from] PollError),

    #[error("{action}: {source}")]
    Invalid {
        action: &'static str,
        #[source]
        source: ValueError,
    },

    #[error("malformed request: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ContractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContractError::Identity(e) => e.kind(),
            ContractError::Poll(e) => e.kind(),
            ContractError::Invalid { .. } | ContractError::Decode(_) | ContractError::Config(_) => {
                ErrorKind::Validation
            }
        }
    }
}
