//! Symmetric friend relation.
//!
//! Both endpoints of an edge are written as two per-key swaps under one
//! [`Journal`]. Either both records change or, after rollback, neither does.

use crate::error::IdentityError;
use lumeos_auth::AuthGuard;
use lumeos_store::{Account, AccountStore, Journal, StoreError};
use lumeos_types::AccountName;
use std::collections::BTreeSet;

const OP: &str = "updateflist";

pub struct FriendGraph<'a> {
    accounts: &'a dyn AccountStore,
    guard: &'a AuthGuard,
}

impl<'a> FriendGraph<'a> {
    pub fn new(accounts: &'a dyn AccountStore, guard: &'a AuthGuard) -> Self {
        Self { accounts, guard }
    }

    /// Connect or disconnect `a` and `b`. Must be called by `a`.
    ///
    /// Returns `false` when the edge was already in the requested state.
    pub fn set_edge(
        &self,
        principal: &AccountName,
        a: &AccountName,
        b: &AccountName,
        connect: bool,
    ) -> Result<bool, IdentityError> {
        self.guard.require_self(OP, principal, a)?;
        if a == b {
            return Err(IdentityError::SelfFriendship(a.clone()));
        }

        let first = self.load(a)?;
        let second = self.load(b)?;
        if first.is_friend(b) == connect && second.is_friend(a) == connect {
            tracing::debug!(a = %a, b = %b, connect, "friend edge unchanged");
            return Ok(false);
        }

        let mut journal = Journal::new(self.accounts);
        let applied = Self::toggle(&mut journal, &first, b, connect)
            .and_then(|()| Self::toggle(&mut journal, &second, a, connect));
        if let Err(e) = applied {
            tracing::warn!(a = %a, b = %b, error = %e, "friend edge update failed, rolling back");
            if let Err(undo) = journal.rollback() {
                tracing::error!(a = %a, b = %b, error = %undo, "friend edge rollback incomplete");
            }
            return Err(e);
        }
        journal.commit();

        tracing::info!(a = %a, b = %b, connect, "friend edge updated");
        Ok(true)
    }

    pub fn connect(
        &self,
        principal: &AccountName,
        a: &AccountName,
        b: &AccountName,
    ) -> Result<bool, IdentityError> {
        self.set_edge(principal, a, b, true)
    }

    pub fn disconnect(
        &self,
        principal: &AccountName,
        a: &AccountName,
        b: &AccountName,
    ) -> Result<bool, IdentityError> {
        self.set_edge(principal, a, b, false)
    }

    pub fn friends(&self, name: &AccountName) -> Result<BTreeSet<AccountName>, IdentityError> {
        Ok(self.load(name)?.friends)
    }

    pub fn are_friends(&self, a: &AccountName, b: &AccountName) -> Result<bool, IdentityError> {
        Ok(self.load(a)?.is_friend(b))
    }

    fn toggle(
        journal: &mut Journal<'_>,
        account: &Account,
        other: &AccountName,
        connect: bool,
    ) -> Result<(), IdentityError> {
        if account.is_friend(other) == connect {
            return Ok(());
        }
        let mut updated = account.clone();
        if connect {
            updated.friends.insert(other.clone());
        } else {
            updated.friends.remove(other);
        }
        journal
            .swap_account(account, &updated)
            .map_err(IdentityError::store(OP, &account.name))
    }

    fn load(&self, name: &AccountName) -> Result<Account, IdentityError> {
        self.accounts.get_account(name).map_err(|e| match e {
            StoreError::NotFound(_) => IdentityError::NotFound {
                operation: OP,
                account: name.clone(),
            },
            other => IdentityError::store(OP, name)(other),
        })
    }
}
