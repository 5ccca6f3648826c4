//! Poll table.

use crate::StoreError;
use lumeos_types::{AccountName, Asset, ContentHash, PollId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One answer option and its tally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    pub votes: u64,
}

impl Choice {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            votes: 0,
        }
    }
}

/// A question with an ordered, fixed list of choices.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub id: PollId,
    pub creator: AccountName,
    pub question: String,
    /// Length and labels never change after creation.
    pub choices: Vec<Choice>,
    pub tags: BTreeSet<String>,
    /// Accounts that have voted; each appears at most once.
    pub participants: BTreeSet<AccountName>,
    /// Purchase price, for priced polls.
    pub price: Option<Asset>,
    pub content_hash: Option<ContentHash>,
}

impl Poll {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn has_voted(&self, account: &AccountName) -> bool {
        self.participants.contains(account)
    }

    /// Sum of all choice tallies; equals the participant count.
    pub fn total_votes(&self) -> u64 {
        self.choices.iter().map(|c| c.votes).sum()
    }
}

/// Trait for poll table operations.
pub trait PollStore {
    fn get_poll(&self, id: PollId) -> Result<Poll, StoreError>;

    fn poll_exists(&self, id: PollId) -> Result<bool, StoreError>;

    /// Insert a new record; `Duplicate` if the id is taken.
    fn insert_poll(&self, poll: &Poll) -> Result<(), StoreError>;

    /// Atomically replace `expected` with `updated`; see
    /// [`crate::AccountStore::swap_account`].
    fn swap_poll(&self, expected: &Poll, updated: &Poll) -> Result<(), StoreError>;

    fn delete_poll(&self, id: PollId) -> Result<(), StoreError>;

    /// Erase the poll only while it still equals `expected`; see
    /// [`crate::AccountStore::delete_account_if`].
    fn delete_poll_if(&self, expected: &Poll) -> Result<(), StoreError>;

    /// The first poll with an id strictly greater than `cursor` (or the
    /// first poll overall when `cursor` is `None`), in id order.
    fn next_poll_after(&self, cursor: Option<PollId>) -> Result<Option<Poll>, StoreError>;

    fn iter_polls(&self) -> Result<Vec<Poll>, StoreError>;

    fn poll_count(&self) -> Result<u64, StoreError> {
        self.iter_polls().map(|v| v.len() as u64)
    }

    /// Reserve the next poll id. Never returns the same id twice, across
    /// deletions and restarts.
    fn next_poll_id(&self) -> Result<PollId, StoreError>;
}
