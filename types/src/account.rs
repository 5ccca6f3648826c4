//! Account name type.

use crate::error::ValueError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A ledger account name, which is also the key of an account record and
/// the principal an invocation is authorized under.
///
/// Names follow the host ledger's rules: 1 to 12 characters drawn from
/// `a-z`, `1-5` and `.`, never ending with a dot.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountName(String);

impl AccountName {
    /// Maximum length of an account name.
    pub const MAX_LEN: usize = 12;

    /// Parse and validate an account name.
    pub fn new(raw: impl Into<String>) -> Result<Self, ValueError> {
        let s = raw.into();
        if let Err(reason) = Self::check(&s) {
            return Err(ValueError::AccountName { name: s, reason });
        }
        Ok(Self(s))
    }

    fn check(s: &str) -> Result<(), &'static str> {
        if s.is_empty() {
            return Err("must not be empty");
        }
        if s.len() > Self::MAX_LEN {
            return Err("longer than 12 characters");
        }
        if !s
            .bytes()
            .all(|b| matches!(b, b'a'..=b'z' | b'1'..=b'5' | b'.'))
        {
            return Err("only a-z, 1-5 and '.' are allowed");
        }
        if s.ends_with('.') {
            return Err("must not end with '.'");
        }
        Ok(())
    }

    /// Return the raw name string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountName {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AccountName {
    type Error = ValueError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<AccountName> for String {
    fn from(name: AccountName) -> Self {
        name.0
    }
}
