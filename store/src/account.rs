//! Account table.

use crate::StoreError;
use lumeos_types::{AccountName, ContentHash, Profile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One registered participant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Primary key; immutable once created.
    pub name: AccountName,
    pub profile: Profile,
    pub content_hash: Option<ContentHash>,
    /// Symmetric: `b` is here iff this account is in `b`'s set.
    pub friends: BTreeSet<AccountName>,
    /// Number of polls this account has created. Drives the fee gate.
    pub polls_created: u32,
}

impl Account {
    pub fn new(name: AccountName, profile: Profile, content_hash: Option<ContentHash>) -> Self {
        Self {
            name,
            profile,
            content_hash,
            friends: BTreeSet::new(),
            polls_created: 0,
        }
    }

    pub fn is_friend(&self, other: &AccountName) -> bool {
        self.friends.contains(other)
    }
}

/// Trait for account table operations.
pub trait AccountStore {
    /// Fetch an account, `NotFound` if absent.
    fn get_account(&self, name: &AccountName) -> Result<Account, StoreError>;

    fn account_exists(&self, name: &AccountName) -> Result<bool, StoreError>;

    /// Insert a new record; `Duplicate` if the key is taken.
    fn insert_account(&self, account: &Account) -> Result<(), StoreError>;

    /// Atomically replace `expected` with `updated`.
    ///
    /// Fails with `Conflict` if the stored record is not equal to `expected`
    /// and `NotFound` if there is no record. Both records must share a key.
    fn swap_account(&self, expected: &Account, updated: &Account) -> Result<(), StoreError>;

    /// Erase a record; `NotFound` if absent.
    fn delete_account(&self, name: &AccountName) -> Result<(), StoreError>;

    /// Erase the record only while it still equals `expected`.
    ///
    /// `Conflict` if the stored record differs, `NotFound` if absent.
    fn delete_account_if(&self, expected: &Account) -> Result<(), StoreError>;

    fn iter_accounts(&self) -> Result<Vec<Account>, StoreError>;

    fn account_count(&self) -> Result<u64, StoreError> {
        self.iter_accounts().map(|v| v.len() as u64)
    }
}
