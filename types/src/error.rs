//! Error taxonomy shared across crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The class of a failure, independent of which crate raised it.
///
/// Callers branch on this rather than on concrete error enums.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// A referenced account or poll does not exist.
    NotFound,
    /// A create targeted a key that is already taken.
    AlreadyExists,
    /// The invocation principal is not entitled to the operation.
    Authorization,
    /// An argument is malformed or out of range.
    Validation,
    /// The current state forbids the operation (double vote, non-empty poll).
    Conflict,
    /// The indexed store failed underneath the operation.
    Storage,
    /// The settlement sink refused a transfer instruction.
    Settlement,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::Authorization => "authorization",
            ErrorKind::Validation => "validation",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Storage => "storage",
            ErrorKind::Settlement => "settlement",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Malformed value errors raised while parsing or constructing value types.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("invalid account name '{name}': {reason}")]
    AccountName { name: String, reason: &'static str },

    #[error("invalid symbol '{0}'")]
    Symbol(String),

    #[error("invalid asset '{input}': {reason}")]
    Asset { input: String, reason: &'static str },

    #[error("invalid date of birth {0}: expected YYYYMMDD")]
    DateOfBirth(u32),

    #[error("invalid postal address '{0}': expected street:city:country:postal_code")]
    PostalAddress(String),

    #[error("invalid email '{0}'")]
    Email(String),

    #[error("invalid content hash '{0}'")]
    ContentHash(String),

    #[error("display name must not be empty")]
    EmptyName,
}

impl ValueError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}
