//! Nullable store: thread-safe in-memory indexed store for testing.

use lumeos_store::{Account, AccountStore, Poll, PollStore, StoreError};
use lumeos_types::{AccountName, PollId};
use std::collections::{BTreeMap, HashSet};
use std::ops::Bound;
use std::sync::Mutex;

/// An in-memory account + poll store for testing.
///
/// Writes to accounts registered with [`NullStore::fail_writes_to`] fail
/// with a backend error, which lets tests drive the engines' rollback paths.
pub struct NullStore {
    accounts: Mutex<BTreeMap<AccountName, Account>>,
    polls: Mutex<BTreeMap<PollId, Poll>>,
    next_poll_id: Mutex<u64>,
    failing_accounts: Mutex<HashSet<AccountName>>,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(BTreeMap::new()),
            polls: Mutex::new(BTreeMap::new()),
            next_poll_id: Mutex::new(PollId::FIRST.value()),
            failing_accounts: Mutex::new(HashSet::new()),
        }
    }

    /// Make every subsequent write to `name` fail.
    pub fn fail_writes_to(&self, name: &AccountName) {
        self.failing_accounts.lock().unwrap().insert(name.clone());
    }

    /// Undo [`NullStore::fail_writes_to`].
    pub fn heal(&self, name: &AccountName) {
        self.failing_accounts.lock().unwrap().remove(name);
    }

    fn check_writable(&self, name: &AccountName) -> Result<(), StoreError> {
        if self.failing_accounts.lock().unwrap().contains(name) {
            return Err(StoreError::Backend(format!("injected write failure for {name}")));
        }
        Ok(())
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountStore for NullStore {
    fn get_account(&self, name: &AccountName) -> Result<Account, StoreError> {
        self.accounts
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("account {name}")))
    }

    fn account_exists(&self, name: &AccountName) -> Result<bool, StoreError> {
        Ok(self.accounts.lock().unwrap().contains_key(name))
    }

    fn insert_account(&self, account: &Account) -> Result<(), StoreError> {
        self.check_writable(&account.name)?;
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(&account.name) {
            return Err(StoreError::Duplicate(format!("account {}", account.name)));
        }
        accounts.insert(account.name.clone(), account.clone());
        Ok(())
    }

    fn swap_account(&self, expected: &Account, updated: &Account) -> Result<(), StoreError> {
        if expected.name != updated.name {
            return Err(StoreError::Conflict(format!(
                "swap cannot rename {} to {}",
                expected.name, updated.name
            )));
        }
        self.check_writable(&expected.name)?;
        let mut accounts = self.accounts.lock().unwrap();
        match accounts.get_mut(&expected.name) {
            None => Err(StoreError::NotFound(format!("account {}", expected.name))),
            Some(current) if current != expected => Err(StoreError::Conflict(format!(
                "account {}",
                expected.name
            ))),
            Some(current) => {
                *current = updated.clone();
                Ok(())
            }
        }
    }

    fn delete_account(&self, name: &AccountName) -> Result<(), StoreError> {
        self.check_writable(name)?;
        self.accounts
            .lock()
            .unwrap()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("account {name}")))
    }

    fn delete_account_if(&self, expected: &Account) -> Result<(), StoreError> {
        self.check_writable(&expected.name)?;
        let mut accounts = self.accounts.lock().unwrap();
        match accounts.get(&expected.name) {
            None => Err(StoreError::NotFound(format!("account {}", expected.name))),
            Some(current) if current != expected => Err(StoreError::Conflict(format!(
                "account {}",
                expected.name
            ))),
            Some(_) => {
                accounts.remove(&expected.name);
                Ok(())
            }
        }
    }

    fn iter_accounts(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self.accounts.lock().unwrap().values().cloned().collect())
    }

    fn account_count(&self) -> Result<u64, StoreError> {
        Ok(self.accounts.lock().unwrap().len() as u64)
    }
}

impl PollStore for NullStore {
    fn get_poll(&self, id: PollId) -> Result<Poll, StoreError> {
        self.polls
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("poll {id}")))
    }

    fn poll_exists(&self, id: PollId) -> Result<bool, StoreError> {
        Ok(self.polls.lock().unwrap().contains_key(&id))
    }

    fn insert_poll(&self, poll: &Poll) -> Result<(), StoreError> {
        let mut polls = self.polls.lock().unwrap();
        if polls.contains_key(&poll.id) {
            return Err(StoreError::Duplicate(format!("poll {}", poll.id)));
        }
        polls.insert(poll.id, poll.clone());
        Ok(())
    }

    fn swap_poll(&self, expected: &Poll, updated: &Poll) -> Result<(), StoreError> {
        if expected.id != updated.id {
            return Err(StoreError::Conflict(format!(
                "swap cannot move poll {} to {}",
                expected.id, updated.id
            )));
        }
        let mut polls = self.polls.lock().unwrap();
        match polls.get_mut(&expected.id) {
            None => Err(StoreError::NotFound(format!("poll {}", expected.id))),
            Some(current) if current != expected => {
                Err(StoreError::Conflict(format!("poll {}", expected.id)))
            }
            Some(current) => {
                *current = updated.clone();
                Ok(())
            }
        }
    }

    fn delete_poll(&self, id: PollId) -> Result<(), StoreError> {
        self.polls
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("poll {id}")))
    }

    fn delete_poll_if(&self, expected: &Poll) -> Result<(), StoreError> {
        let mut polls = self.polls.lock().unwrap();
        match polls.get(&expected.id) {
            None => Err(StoreError::NotFound(format!("poll {}", expected.id))),
            Some(current) if current != expected => {
                Err(StoreError::Conflict(format!("poll {}", expected.id)))
            }
            Some(_) => {
                polls.remove(&expected.id);
                Ok(())
            }
        }
    }

    fn next_poll_after(&self, cursor: Option<PollId>) -> Result<Option<Poll>, StoreError> {
        let polls = self.polls.lock().unwrap();
        let lower = match cursor {
            Some(id) => Bound::Excluded(id),
            None => Bound::Unbounded,
        };
        Ok(polls
            .range((lower, Bound::Unbounded))
            .next()
            .map(|(_, poll)| poll.clone()))
    }

    fn iter_polls(&self) -> Result<Vec<Poll>, StoreError> {
        Ok(self.polls.lock().unwrap().values().cloned().collect())
    }

    fn poll_count(&self) -> Result<u64, StoreError> {
        Ok(self.polls.lock().unwrap().len() as u64)
    }

    fn next_poll_id(&self) -> Result<PollId, StoreError> {
        let mut next = self.next_poll_id.lock().unwrap();
        let id = PollId::new(*next);
        *next = next
            .checked_add(1)
            .ok_or_else(|| StoreError::Corruption("poll id counter exhausted".into()))?;
        Ok(id)
    }
}
