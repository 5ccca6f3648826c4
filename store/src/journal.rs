//! Compensation journal for mutations that span several keys.
//!
//! The store only guarantees atomicity per key. An engine that must touch
//! several records applies each step through a [`Journal`]; if a later step
//! fails it calls [`Journal::rollback`], which undoes the applied steps in
//! reverse order, so no partial effect survives the failed invocation.

use crate::{Account, AccountStore, Poll, PollStore, StoreError};
use lumeos_types::PollId;

enum Undo {
    /// Swap `applied` back to `previous`.
    Account { previous: Account, applied: Account },
    /// Re-insert a deleted account.
    Reinsert(Account),
    /// Delete an inserted poll.
    Poll(PollId),
}

/// Records applied steps so they can be undone.
pub struct Journal<'a> {
    accounts: &'a dyn AccountStore,
    polls: Option<&'a dyn PollStore>,
    undo: Vec<Undo>,
}

impl<'a> Journal<'a> {
    pub fn new(accounts: &'a dyn AccountStore) -> Self {
        Self {
            accounts,
            polls: None,
            undo: Vec::new(),
        }
    }

    /// Journal that can also record poll inserts.
    pub fn with_polls(accounts: &'a dyn AccountStore, polls: &'a dyn PollStore) -> Self {
        Self {
            accounts,
            polls: Some(polls),
            undo: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.undo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty()
    }

    pub fn swap_account(&mut self, expected: &Account, updated: &Account) -> Result<(), StoreError> {
        self.accounts.swap_account(expected, updated)?;
        self.undo.push(Undo::Account {
            previous: expected.clone(),
            applied: updated.clone(),
        });
        Ok(())
    }

    /// Delete `account`, failing with `Conflict` if the stored record has
    /// moved on since it was loaded.
    pub fn delete_account(&mut self, account: &Account) -> Result<(), StoreError> {
        self.accounts.delete_account_if(account)?;
        self.undo.push(Undo::Reinsert(account.clone()));
        Ok(())
    }

    pub fn insert_poll(&mut self, poll: &Poll) -> Result<(), StoreError> {
        let polls = self
            .polls
            .ok_or_else(|| StoreError::Backend("journal has no poll table".into()))?;
        polls.insert_poll(poll)?;
        self.undo.push(Undo::Poll(poll.id));
        Ok(())
    }

    /// Keep every applied step.
    pub fn commit(mut self) {
        self.undo.clear();
    }

    /// Undo every applied step, newest first.
    ///
    /// Keeps going past a failed undo so the remaining steps still get
    /// reverted; returns the first failure.
    pub fn rollback(mut self) -> Result<(), StoreError> {
        let mut first_error = None;
        while let Some(step) = self.undo.pop() {
            let result = match &step {
                Undo::Account { previous, applied } => {
                    self.accounts.swap_account(applied, previous)
                }
                Undo::Reinsert(account) => self.accounts.insert_account(account),
                Undo::Poll(id) => match self.polls {
                    Some(polls) => polls.delete_poll(*id),
                    None => Ok(()),
                },
            };
            if let Err(e) = result {
                tracing::error!(error = %e, "rollback step failed");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for Journal<'_> {
    fn drop(&mut self) {
        if !self.is_empty() {
            tracing::error!(
                steps = self.len(),
                "journal dropped without commit or rollback"
            );
        }
    }
}
