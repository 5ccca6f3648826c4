//! LMDB implementation of PollStore.

use std::ops::Bound;

use lumeos_store::{Poll, PollStore, StoreError};
use lumeos_types::PollId;

use crate::environment::{decode, encode, LmdbEnvironment};
use crate::LmdbError;

impl PollStore for LmdbEnvironment {
    fn get_poll(&self, id: PollId) -> Result<Poll, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let bytes = self
            .polls_db
            .get(&rtxn, &id.to_key())
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("poll {id}")))?;
        Ok(decode(bytes)?)
    }

    fn poll_exists(&self, id: PollId) -> Result<bool, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self
            .polls_db
            .get(&rtxn, &id.to_key())
            .map_err(LmdbError::from)?
            .is_some())
    }

    fn insert_poll(&self, poll: &Poll) -> Result<(), StoreError> {
        let key = poll.id.to_key();
        let value = encode(poll)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self.polls_db.get(&wtxn, &key).map_err(LmdbError::from)?.is_some() {
            return Err(StoreError::Duplicate(format!("poll {}", poll.id)));
        }
        self.polls_db
            .put(&mut wtxn, &key, &value)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn swap_poll(&self, expected: &Poll, updated: &Poll) -> Result<(), StoreError> {
        if expected.id != updated.id {
            return Err(StoreError::Conflict(format!(
                "swap would move poll {} to {}",
                expected.id, updated.id
            )));
        }
        let key = expected.id.to_key();
        let value = encode(updated)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let current: Poll = match self.polls_db.get(&wtxn, &key).map_err(LmdbError::from)? {
            Some(bytes) => decode(bytes)?,
            None => return Err(StoreError::NotFound(format!("poll {}", expected.id))),
        };
        if &current != expected {
            return Err(StoreError::Conflict(format!("poll {}", expected.id)));
        }
        self.polls_db
            .put(&mut wtxn, &key, &value)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn delete_poll(&self, id: PollId) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let deleted = self
            .polls_db
            .delete(&mut wtxn, &id.to_key())
            .map_err(LmdbError::from)?;
        if !deleted {
            return Err(StoreError::NotFound(format!("poll {id}")));
        }
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn delete_poll_if(&self, expected: &Poll) -> Result<(), StoreError> {
        let key = expected.id.to_key();
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let current: Poll = match self.polls_db.get(&wtxn, &key).map_err(LmdbError::from)? {
            Some(bytes) => decode(bytes)?,
            None => return Err(StoreError::NotFound(format!("poll {}", expected.id))),
        };
        if &current != expected {
            return Err(StoreError::Conflict(format!("poll {}", expected.id)));
        }
        self.polls_db
            .delete(&mut wtxn, &key)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn next_poll_after(&self, cursor: Option<PollId>) -> Result<Option<Poll>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let entry = match cursor {
            None => self.polls_db.first(&rtxn).map_err(LmdbError::from)?,
            Some(id) => {
                let key = id.to_key();
                let range = (Bound::Excluded(&key[..]), Bound::Unbounded);
                let mut iter = self.polls_db.range(&rtxn, &range).map_err(LmdbError::from)?;
                iter.next().transpose().map_err(LmdbError::from)?
            }
        };
        match entry {
            Some((_, bytes)) => Ok(Some(decode(bytes)?)),
            None => Ok(None),
        }
    }

    fn iter_polls(&self) -> Result<Vec<Poll>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut polls = Vec::new();
        for entry in self.polls_db.iter(&rtxn).map_err(LmdbError::from)? {
            let (_, bytes) = entry.map_err(LmdbError::from)?;
            polls.push(decode(bytes)?);
        }
        Ok(polls)
    }

    fn poll_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.polls_db.len(&rtxn).map_err(LmdbError::from)?)
    }

    fn next_poll_id(&self) -> Result<PollId, StoreError> {
        Ok(self.reserve_poll_id()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::DEFAULT_MAP_SIZE;
    use lumeos_store::Choice;
    use lumeos_types::AccountName;
    use std::collections::BTreeSet;

    fn poll(id: PollId, tags: &[&str]) -> Poll {
        Poll {
            id,
            creator: AccountName::new("alice").unwrap(),
            question: "Favourite color?".into(),
            choices: vec![Choice::new("red"), Choice::new("blue")],
            tags: tags.iter().map(|t| t.to_string()).collect(),
            participants: BTreeSet::new(),
            price: None,
            content_hash: None,
        }
    }

    #[test]
    fn ids_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let env = LmdbEnvironment::open(dir.path(), DEFAULT_MAP_SIZE).unwrap();
            assert_eq!(env.next_poll_id().unwrap(), PollId::new(1));
            let second = env.next_poll_id().unwrap();
            env.insert_poll(&poll(second, &[])).unwrap();
            env.delete_poll(second).unwrap();
        }
        let env = LmdbEnvironment::open(dir.path(), DEFAULT_MAP_SIZE).unwrap();
        assert_eq!(env.next_poll_id().unwrap(), PollId::new(3));
    }

    #[test]
    fn scan_in_id_order() {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open(dir.path(), DEFAULT_MAP_SIZE).unwrap();
        // 256 sorts after 2 only with big-endian keys.
        for raw in [256, 2, 1] {
            env.insert_poll(&poll(PollId::new(raw), &[])).unwrap();
        }

        let mut seen = Vec::new();
        let mut cursor = None;
        while let Some(p) = env.next_poll_after(cursor).unwrap() {
            seen.push(p.id.value());
            cursor = Some(p.id);
        }
        assert_eq!(seen, [1, 2, 256]);
        assert_eq!(env.poll_count().unwrap(), 3);
    }

    #[test]
    fn swap_and_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open(dir.path(), DEFAULT_MAP_SIZE).unwrap();
        let original = poll(PollId::FIRST, &["colors"]);
        env.insert_poll(&original).unwrap();
        assert!(matches!(
            env.insert_poll(&original),
            Err(StoreError::Duplicate(_))
        ));

        let mut voted = original.clone();
        voted.choices[1].votes = 1;
        voted
            .participants
            .insert(AccountName::new("bob").unwrap());
        env.swap_poll(&original, &voted).unwrap();
        assert!(matches!(
            env.swap_poll(&original, &voted),
            Err(StoreError::Conflict(_))
        ));
        assert_eq!(env.get_poll(PollId::FIRST).unwrap(), voted);
    }

    #[test]
    fn conditional_delete_spares_voted_poll() {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open(dir.path(), DEFAULT_MAP_SIZE).unwrap();
        let original = poll(PollId::FIRST, &[]);
        env.insert_poll(&original).unwrap();

        let mut voted = original.clone();
        voted.choices[0].votes = 1;
        voted
            .participants
            .insert(AccountName::new("bob").unwrap());
        env.swap_poll(&original, &voted).unwrap();

        assert!(matches!(
            env.delete_poll_if(&original),
            Err(StoreError::Conflict(_))
        ));
        assert!(env.poll_exists(PollId::FIRST).unwrap());

        env.delete_poll_if(&voted).unwrap();
        assert!(!env.poll_exists(PollId::FIRST).unwrap());
    }
}
