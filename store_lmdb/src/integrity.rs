//! LMDB database integrity checks.
//!
//! Run on startup (and by the `check` command) to detect corruption before
//! the contract starts serving requests.

use std::collections::BTreeMap;
use std::path::Path;

use lumeos_store::{Account, Poll};
use lumeos_types::{AccountName, PollId};

use crate::environment::{decode, LmdbEnvironment, ACCOUNTS_DB, DATABASES, POLLS_DB};
use crate::LmdbError;

/// Summary of an integrity check run.
#[derive(Debug, Default)]
pub struct IntegrityReport {
    pub databases_checked: u32,
    pub accounts: u64,
    pub polls: u64,
    pub errors: Vec<String>,
}

impl IntegrityReport {
    /// Returns `true` if no errors were detected.
    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check every record in the environment.
///
/// Read failures and invariant violations are recorded in the report
/// rather than causing a hard error. Checked: every record decodes and sits
/// under its own key, friend sets are symmetric, tallies match participant
/// counts, and the poll id counter is ahead of every stored poll.
pub fn check_integrity(env: &LmdbEnvironment) -> Result<IntegrityReport, LmdbError> {
    let mut report = IntegrityReport::default();
    let rtxn = env.env.read_txn()?;

    for &db_name in DATABASES {
        match env
            .env
            .open_database::<heed::types::Bytes, heed::types::Bytes>(&rtxn, Some(db_name))
        {
            Ok(Some(_)) => report.databases_checked += 1,
            Ok(None) => report.errors.push(format!("database '{db_name}' is missing")),
            Err(e) => report
                .errors
                .push(format!("failed to open database '{db_name}': {e}")),
        }
    }

    let mut accounts = Vec::new();
    for entry in env.accounts_db.iter(&rtxn)? {
        let (key, bytes) = entry?;
        match decode::<Account>(bytes) {
            Ok(account) if account.name.as_str().as_bytes() == key => accounts.push(account),
            Ok(account) => report.errors.push(format!(
                "{ACCOUNTS_DB}: record for {} stored under key {:?}",
                account.name,
                String::from_utf8_lossy(key)
            )),
            Err(e) => report.errors.push(format!(
                "{ACCOUNTS_DB}: undecodable record under key {:?}: {e}",
                String::from_utf8_lossy(key)
            )),
        }
    }
    report.accounts = accounts.len() as u64;

    let by_name: BTreeMap<&AccountName, &Account> =
        accounts.iter().map(|a| (&a.name, a)).collect();
    for account in &accounts {
        for friend in &account.friends {
            let mirrored = by_name.get(friend).map(|a| a.is_friend(&account.name));
            match mirrored {
                Some(true) => {}
                Some(false) => report.errors.push(format!(
                    "friend edge {} -> {friend} is one-sided",
                    account.name
                )),
                None => report.errors.push(format!(
                    "{} lists missing friend {friend}",
                    account.name
                )),
            }
        }
    }

    let mut highest = None;
    for entry in env.polls_db.iter(&rtxn)? {
        let (key, bytes) = entry?;
        let poll = match decode::<Poll>(bytes) {
            Ok(poll) => poll,
            Err(e) => {
                report
                    .errors
                    .push(format!("{POLLS_DB}: undecodable record under key {key:?}: {e}"));
                continue;
            }
        };
        report.polls += 1;
        if poll.id.to_key() != key {
            report
                .errors
                .push(format!("{POLLS_DB}: poll {} stored under key {key:?}", poll.id));
        }
        if poll.total_votes() != poll.participants.len() as u64 {
            report.errors.push(format!(
                "poll {}: {} votes but {} participants",
                poll.id,
                poll.total_votes(),
                poll.participants.len()
            ));
        }
        highest = Some(poll.id);
    }
    drop(rtxn);

    let next = env.peek_next_poll_id()?;
    if let Some(highest) = highest {
        if next <= highest {
            report.errors.push(format!(
                "poll id counter {next} is not ahead of stored poll {highest}"
            ));
        }
    }

    tracing::info!(
        databases = report.databases_checked,
        accounts = report.accounts,
        polls = report.polls,
        errors = report.errors.len(),
        "integrity check finished"
    );
    Ok(report)
}

/// Check if the LMDB data directory looks valid before opening.
///
/// Returns `Ok(())` for a fresh (nonexistent) directory. Returns an error
/// if the directory exists but `data.mdb` is missing, which suggests
/// corruption or misconfiguration.
pub fn check_data_dir(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Ok(());
    }
    let data_file = path.join("data.mdb");
    if !data_file.exists() {
        return Err(format!(
            "LMDB directory exists but data.mdb is missing at {}",
            path.display()
        ));
    }
    Ok(())
}

/// Highest id handed out so far, if any.
pub fn last_poll_id(env: &LmdbEnvironment) -> Result<Option<PollId>, LmdbError> {
    let next = env.peek_next_poll_id()?;
    Ok((next > PollId::FIRST).then(|| PollId::new(next.value() - 1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::DEFAULT_MAP_SIZE;
    use lumeos_store::{AccountStore, Choice, PollStore};
    use lumeos_types::Profile;
    use std::collections::BTreeSet;

    fn open() -> (tempfile::TempDir, LmdbEnvironment) {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open(dir.path(), DEFAULT_MAP_SIZE).unwrap();
        (dir, env)
    }

    fn name(s: &str) -> AccountName {
        AccountName::new(s).unwrap()
    }

    #[test]
    fn check_data_dir_fresh_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_data_dir(&dir.path().join("missing")).is_ok());
        assert!(check_data_dir(dir.path()).is_err());
    }

    #[test]
    fn empty_environment_is_healthy() {
        let (_dir, env) = open();
        let report = check_integrity(&env).unwrap();
        assert!(report.is_healthy(), "{:?}", report.errors);
        assert_eq!(report.databases_checked, 3);
        assert_eq!(last_poll_id(&env).unwrap(), None);
    }

    #[test]
    fn one_sided_edge_is_reported() {
        let (_dir, env) = open();
        let mut alice = Account::new(name("alice"), Profile::default(), None);
        alice.friends.insert(name("bob"));
        env.insert_account(&alice).unwrap();
        env.insert_account(&Account::new(name("bob"), Profile::default(), None))
            .unwrap();

        let report = check_integrity(&env).unwrap();
        assert_eq!(report.accounts, 2);
        assert_eq!(report.errors, ["friend edge alice -> bob is one-sided"]);
    }

    #[test]
    fn missing_friend_is_reported() {
        let (_dir, env) = open();
        let mut carol = Account::new(name("carol"), Profile::default(), None);
        carol.friends.insert(name("dave"));
        env.insert_account(&carol).unwrap();

        let report = check_integrity(&env).unwrap();
        assert_eq!(report.errors, ["carol lists missing friend dave"]);
    }

    #[test]
    fn counter_behind_polls_is_reported() {
        let (_dir, env) = open();
        let poll = Poll {
            id: PollId::new(5),
            creator: name("alice"),
            question: "Color?".into(),
            choices: vec![Choice::new("red")],
            tags: BTreeSet::new(),
            participants: BTreeSet::new(),
            price: None,
            content_hash: None,
        };
        env.insert_poll(&poll).unwrap();

        let report = check_integrity(&env).unwrap();
        assert_eq!(report.polls, 1);
        assert!(report.errors.iter().any(|e| e.contains("counter")));
    }
}
