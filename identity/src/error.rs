use lumeos_auth::AuthError;
use lumeos_store::StoreError;
use lumeos_types::{AccountName, ErrorKind, ValueError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("{operation}: account {account} not found")]
    NotFound {
        operation: &'static str,
        account: AccountName,
    },

    #[error("createuser: account {0} already exists")]
    AlreadyExists(AccountName),

    #[error(transparent)]
    Unauthorized(#[from] AuthError),

    #[error("{operation}: {source}")]
    Invalid {
        operation: &'static str,
        #[source]
        source: ValueError,
    },

    #[error("updateflist: account {0} cannot befriend itself")]
    SelfFriendship(AccountName),

    #[error("{operation} on {key}: {source}")]
    Store {
        operation: &'static str,
        key: String,
        #[source]
        source: StoreError,
    },
}

impl IdentityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IdentityError::NotFound { .. } => ErrorKind::NotFound,
            IdentityError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            IdentityError::Unauthorized(e) => e.kind(),
            IdentityError::Invalid { .. } | IdentityError::SelfFriendship(_) => {
                ErrorKind::Validation
            }
            IdentityError::Store { source, .. } => match source {
                StoreError::NotFound(_) => ErrorKind::NotFound,
                StoreError::Duplicate(_) => ErrorKind::AlreadyExists,
                StoreError::Conflict(_) => ErrorKind::Conflict,
                _ => ErrorKind::Storage,
            },
        }
    }

    pub(crate) fn store(
        operation: &'static str,
        key: &AccountName,
    ) -> impl FnOnce(StoreError) -> Self {
        let key = key.to_string();
        move |source| IdentityError::Store {
            operation,
            key,
            source,
        }
    }

    pub(crate) fn invalid(operation: &'static str) -> impl FnOnce(ValueError) -> Self {
        move |source| IdentityError::Invalid { operation, source }
    }
}
