//! Account records: create, edit, remove, look up.

use crate::error::IdentityError;
use lumeos_auth::AuthGuard;
use lumeos_store::{Account, AccountStore, Journal, StoreError};
use lumeos_types::profile::{validate_display_name, validate_email};
use lumeos_types::{AccountName, ContentHash, DateOfBirth, PostalAddress, Profile, ValueError};
use serde::{Deserialize, Serialize};

/// A single-field profile edit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileUpdate {
    Name(String),
    Email(String),
    DateOfBirth(DateOfBirth),
    Address(PostalAddress),
    ContentHash(ContentHash),
}

impl ProfileUpdate {
    /// Name of the action that carries this edit.
    pub fn operation(&self) -> &'static str {
        match self {
            ProfileUpdate::Name(_) => "setname",
            ProfileUpdate::Email(_) => "setemail",
            ProfileUpdate::DateOfBirth(_) => "setdob",
            ProfileUpdate::Address(_) => "setaddress",
            ProfileUpdate::ContentHash(_) => "updateuser",
        }
    }

    /// Replace the addressed field, leaving every other field alone.
    fn apply(self, account: &mut Account) -> Result<(), ValueError> {
        match self {
            ProfileUpdate::Name(name) => {
                validate_display_name(&name)?;
                account.profile.display_name = name;
            }
            ProfileUpdate::Email(email) => {
                validate_email(&email)?;
                account.profile.email = email;
            }
            ProfileUpdate::DateOfBirth(dob) => account.profile.date_of_birth = Some(dob),
            ProfileUpdate::Address(address) => account.profile.address = Some(address),
            ProfileUpdate::ContentHash(hash) => account.content_hash = Some(hash),
        }
        Ok(())
    }
}

/// Owns the account table.
pub struct IdentityRegistry<'a> {
    accounts: &'a dyn AccountStore,
    guard: &'a AuthGuard,
}

impl<'a> IdentityRegistry<'a> {
    pub fn new(accounts: &'a dyn AccountStore, guard: &'a AuthGuard) -> Self {
        Self { accounts, guard }
    }

    /// Register `name`. Self-authorized: only `name` may create itself.
    pub fn create(
        &self,
        principal: &AccountName,
        name: &AccountName,
        profile: Profile,
        content_hash: Option<ContentHash>,
    ) -> Result<Account, IdentityError> {
        const OP: &str = "createuser";
        self.guard.require_self(OP, principal, name)?;
        profile.validate().map_err(IdentityError::invalid(OP))?;

        if self.exists(name)? {
            return Err(IdentityError::AlreadyExists(name.clone()));
        }
        let account = Account::new(name.clone(), profile, content_hash);
        self.accounts
            .insert_account(&account)
            .map_err(|e| match e {
                StoreError::Duplicate(_) => IdentityError::AlreadyExists(name.clone()),
                other => IdentityError::store(OP, name)(other),
            })?;

        tracing::info!(account = %name, "account created");
        Ok(account)
    }

    /// Apply one profile edit to `name`'s record.
    pub fn update(
        &self,
        principal: &AccountName,
        name: &AccountName,
        update: ProfileUpdate,
    ) -> Result<Account, IdentityError> {
        let op = update.operation();
        self.guard.require_self_or_admin(op, principal, name)?;

        let current = self.load(op, name)?;
        let mut updated = current.clone();
        update
            .apply(&mut updated)
            .map_err(IdentityError::invalid(op))?;
        if updated == current {
            return Ok(current);
        }
        self.accounts
            .swap_account(&current, &updated)
            .map_err(IdentityError::store(op, name))?;

        tracing::info!(account = %name, operation = op, "profile updated");
        Ok(updated)
    }

    pub fn set_name(
        &self,
        principal: &AccountName,
        name: &AccountName,
        display_name: String,
    ) -> Result<Account, IdentityError> {
        self.update(principal, name, ProfileUpdate::Name(display_name))
    }

    pub fn set_email(
        &self,
        principal: &AccountName,
        name: &AccountName,
        email: String,
    ) -> Result<Account, IdentityError> {
        self.update(principal, name, ProfileUpdate::Email(email))
    }

    pub fn set_date_of_birth(
        &self,
        principal: &AccountName,
        name: &AccountName,
        dob: DateOfBirth,
    ) -> Result<Account, IdentityError> {
        self.update(principal, name, ProfileUpdate::DateOfBirth(dob))
    }

    pub fn set_address(
        &self,
        principal: &AccountName,
        name: &AccountName,
        address: PostalAddress,
    ) -> Result<Account, IdentityError> {
        self.update(principal, name, ProfileUpdate::Address(address))
    }

    /// Delete `name`'s record.
    ///
    /// No check for outstanding polls: polls created by or voted on by the
    /// account stay in place. The account is detached from every friend's
    /// set in the same step so the friend relation stays symmetric. If the
    /// record changed after it was loaded the detach is rolled back and the
    /// call fails with `Conflict`.
    pub fn remove(
        &self,
        principal: &AccountName,
        name: &AccountName,
        reason: &str,
    ) -> Result<Account, IdentityError> {
        const OP: &str = "removeuser";
        self.guard.require_self_or_admin(OP, principal, name)?;

        let account = self.load(OP, name)?;
        let mut journal = Journal::new(self.accounts);
        if let Err(e) = self.detach_and_delete(&mut journal, &account) {
            tracing::warn!(account = %name, error = %e, "account removal failed, rolling back");
            if let Err(undo) = journal.rollback() {
                tracing::error!(account = %name, error = %undo, "account removal rollback incomplete");
            }
            return Err(e);
        }
        journal.commit();

        tracing::info!(account = %name, reason, "account removed");
        Ok(account)
    }

    fn detach_and_delete(
        &self,
        journal: &mut Journal<'_>,
        account: &Account,
    ) -> Result<(), IdentityError> {
        const OP: &str = "removeuser";
        for friend_name in &account.friends {
            let friend = match self.accounts.get_account(friend_name) {
                Ok(friend) => friend,
                Err(StoreError::NotFound(_)) => {
                    tracing::debug!(friend = %friend_name, "dangling friend reference skipped");
                    continue;
                }
                Err(e) => return Err(IdentityError::store(OP, friend_name)(e)),
            };
            if !friend.is_friend(&account.name) {
                continue;
            }
            let mut detached = friend.clone();
            detached.friends.remove(&account.name);
            journal
                .swap_account(&friend, &detached)
                .map_err(IdentityError::store(OP, friend_name))?;
        }
        journal
            .delete_account(account)
            .map_err(IdentityError::store(OP, &account.name))
    }

    /// Read-only lookup.
    pub fn get(&self, name: &AccountName) -> Result<Account, IdentityError> {
        let account = self.load("getuser", name)?;
        tracing::debug!(account = %name, friends = account.friends.len(), "account read");
        Ok(account)
    }

    /// Whether `name` is registered.
    pub fn exists(&self, name: &AccountName) -> Result<bool, IdentityError> {
        self.accounts
            .account_exists(name)
            .map_err(IdentityError::store("exists", name))
    }

    /// Fail with `NotFound` unless `name` is registered.
    pub fn ensure_exists(
        &self,
        operation: &'static str,
        name: &AccountName,
    ) -> Result<(), IdentityError> {
        if self.exists(name)? {
            Ok(())
        } else {
            Err(IdentityError::NotFound {
                operation,
                account: name.clone(),
            })
        }
    }

    fn load(&self, operation: &'static str, name: &AccountName) -> Result<Account, IdentityError> {
        self.accounts.get_account(name).map_err(|e| match e {
            StoreError::NotFound(_) => IdentityError::NotFound {
                operation,
                account: name.clone(),
            },
            other => IdentityError::store(operation, name)(other),
        })
    }
}
