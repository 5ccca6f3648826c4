use lumeos_types::{AccountName, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{operation}: principal {principal} is not authorized, requires {required}")]
    Denied {
        operation: &'static str,
        principal: AccountName,
        required: String,
    },
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Authorization
    }
}
