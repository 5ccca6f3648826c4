use lumeos_auth::AuthError;
use lumeos_fees::FeeError;
use lumeos_store::StoreError;
use lumeos_types::{AccountName, ErrorKind, PollId, ValueError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PollError {
    #[error("{operation}: account {account} not found")]
    AccountNotFound {
        operation: &'static str,
        account: AccountName,
    },

    #[error("{operation}: poll {poll_id} not found")]
    PollNotFound {
        operation: &'static str,
        poll_id: PollId,
    },

    #[error(transparent)]
    Unauthorized(#[from] AuthError),

    #[error("{operation}: {account} is not the creator of poll {poll_id}")]
    NotCreator {
        operation: &'static str,
        poll_id: PollId,
        account: AccountName,
    },

    #[error("answerpoll: {account} already voted on poll {poll_id}")]
    AlreadyVoted { poll_id: PollId, account: AccountName },

    #[error("removepoll: poll {poll_id} has {participants} participant(s)")]
    HasParticipants { poll_id: PollId, participants: usize },

    #[error("answerpoll: choice {index} out of range for poll {poll_id} ({choices} choices)")]
    ChoiceOutOfRange {
        poll_id: PollId,
        index: u8,
        choices: usize,
    },

    #[error("{operation}: {reason}")]
    Invalid {
        operation: &'static str,
        reason: String,
    },

    #[error("{operation}: {source}")]
    Value {
        operation: &'static str,
        #[source]
        source: ValueError,
    },

    #[error(transparent)]
    Fee(#[from] FeeError),

    #[error("{operation} on {key}: {source}")]
    Store {
        operation: &'static str,
        key: String,
        #[source]
        source: StoreError,
    },
}

impl PollError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PollError::AccountNotFound { .. } | PollError::PollNotFound { .. } => {
                ErrorKind::NotFound
            }
            PollError::Unauthorized(e) => e.kind(),
            PollError::NotCreator { .. } => ErrorKind::Authorization,
            PollError::AlreadyVoted { .. } | PollError::HasParticipants { .. } => {
                ErrorKind::Conflict
            }
            PollError::ChoiceOutOfRange { .. }
            | PollError::Invalid { .. }
            | PollError::Value { .. } => ErrorKind::Validation,
            PollError::Fee(e) => e.kind(),
            PollError::Store { source, .. } => match source {
                StoreError::NotFound(_) => ErrorKind::NotFound,
                StoreError::Duplicate(_) => ErrorKind::AlreadyExists,
                StoreError::Conflict(_) => ErrorKind::Conflict,
                _ => ErrorKind::Storage,
            },
        }
    }

    pub(crate) fn store(
        operation: &'static str,
        key: impl ToString,
    ) -> impl FnOnce(StoreError) -> Self {
        let key = key.to_string();
        move |source| PollError::Store {
            operation,
            key,
            source,
        }
    }

    pub(crate) fn invalid(operation: &'static str, reason: impl Into<String>) -> Self {
        PollError::Invalid {
            operation,
            reason: reason.into(),
        }
    }
}
