//! LMDB implementation of AccountStore.

use lumeos_store::{Account, AccountStore, StoreError};
use lumeos_types::AccountName;

use crate::environment::{decode, encode, LmdbEnvironment};
use crate::LmdbError;

impl AccountStore for LmdbEnvironment {
    fn get_account(&self, name: &AccountName) -> Result<Account, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let bytes = self
            .accounts_db
            .get(&rtxn, name.as_str().as_bytes())
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("account {name}")))?;
        Ok(decode(bytes)?)
    }

    fn account_exists(&self, name: &AccountName) -> Result<bool, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self
            .accounts_db
            .get(&rtxn, name.as_str().as_bytes())
            .map_err(LmdbError::from)?
            .is_some())
    }

    fn insert_account(&self, account: &Account) -> Result<(), StoreError> {
        let key = account.name.as_str().as_bytes();
        let value = encode(account)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self
            .accounts_db
            .get(&wtxn, key)
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(StoreError::Duplicate(format!("account {}", account.name)));
        }
        self.accounts_db
            .put(&mut wtxn, key, &value)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn swap_account(&self, expected: &Account, updated: &Account) -> Result<(), StoreError> {
        if expected.name != updated.name {
            return Err(StoreError::Conflict(format!(
                "swap would rename {} to {}",
                expected.name, updated.name
            )));
        }
        let key = expected.name.as_str().as_bytes();
        let value = encode(updated)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let current: Account = match self.accounts_db.get(&wtxn, key).map_err(LmdbError::from)? {
            Some(bytes) => decode(bytes)?,
            None => return Err(StoreError::NotFound(format!("account {}", expected.name))),
        };
        if &current != expected {
            return Err(StoreError::Conflict(format!("account {}", expected.name)));
        }
        self.accounts_db
            .put(&mut wtxn, key, &value)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn delete_account(&self, name: &AccountName) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let deleted = self
            .accounts_db
            .delete(&mut wtxn, name.as_str().as_bytes())
            .map_err(LmdbError::from)?;
        if !deleted {
            return Err(StoreError::NotFound(format!("account {name}")));
        }
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn delete_account_if(&self, expected: &Account) -> Result<(), StoreError> {
        let key = expected.name.as_str().as_bytes();
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let current: Account = match self.accounts_db.get(&wtxn, key).map_err(LmdbError::from)? {
            Some(bytes) => decode(bytes)?,
            None => return Err(StoreError::NotFound(format!("account {}", expected.name))),
        };
        if &current != expected {
            return Err(StoreError::Conflict(format!("account {}", expected.name)));
        }
        self.accounts_db
            .delete(&mut wtxn, key)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn iter_accounts(&self) -> Result<Vec<Account>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut accounts = Vec::new();
        for entry in self.accounts_db.iter(&rtxn).map_err(LmdbError::from)? {
            let (_, bytes) = entry.map_err(LmdbError::from)?;
            accounts.push(decode(bytes)?);
        }
        Ok(accounts)
    }

    fn account_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.accounts_db.len(&rtxn).map_err(LmdbError::from)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::DEFAULT_MAP_SIZE;
    use lumeos_types::Profile;

    fn open() -> (tempfile::TempDir, LmdbEnvironment) {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open(dir.path(), DEFAULT_MAP_SIZE).unwrap();
        (dir, env)
    }

    fn account(name: &str) -> Account {
        Account::new(AccountName::new(name).unwrap(), Profile::default(), None)
    }

    #[test]
    fn insert_get_delete() {
        let (_dir, env) = open();
        let alice = account("alice");
        env.insert_account(&alice).unwrap();
        assert_eq!(env.get_account(&alice.name).unwrap(), alice);
        assert!(matches!(
            env.insert_account(&alice),
            Err(StoreError::Duplicate(_))
        ));

        env.delete_account(&alice.name).unwrap();
        assert!(!env.account_exists(&alice.name).unwrap());
        assert!(matches!(
            env.delete_account(&alice.name),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn swap_detects_stale_expected() {
        let (_dir, env) = open();
        let alice = account("alice");
        env.insert_account(&alice).unwrap();

        let mut first = alice.clone();
        first.polls_created = 1;
        env.swap_account(&alice, &first).unwrap();

        let mut second = alice.clone();
        second.polls_created = 7;
        assert!(matches!(
            env.swap_account(&alice, &second),
            Err(StoreError::Conflict(_))
        ));
        assert_eq!(env.get_account(&alice.name).unwrap().polls_created, 1);
    }

    #[test]
    fn conditional_delete_keeps_changed_record() {
        let (_dir, env) = open();
        let alice = account("alice");
        env.insert_account(&alice).unwrap();

        let mut befriended = alice.clone();
        befriended.friends.insert(AccountName::new("bob").unwrap());
        env.swap_account(&alice, &befriended).unwrap();

        assert!(matches!(
            env.delete_account_if(&alice),
            Err(StoreError::Conflict(_))
        ));
        assert_eq!(env.get_account(&alice.name).unwrap(), befriended);

        env.delete_account_if(&befriended).unwrap();
        assert!(matches!(
            env.delete_account_if(&befriended),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn iter_and_count() {
        let (_dir, env) = open();
        for n in ["carol", "alice", "bob"] {
            env.insert_account(&account(n)).unwrap();
        }
        let names: Vec<String> = env
            .iter_accounts()
            .unwrap()
            .into_iter()
            .map(|a| a.name.to_string())
            .collect();
        assert_eq!(names, ["alice", "bob", "carol"]);
        assert_eq!(env.account_count().unwrap(), 3);
    }
}
