//! The contract over the LMDB backend, across restarts.

use std::sync::Arc;

use lumeos_contract::{Action, Contract, Outcome, Request};
use lumeos_nullables::NullSettlement;
use lumeos_polls::PollDraft;
use lumeos_store::{AccountStore, PollStore};
use lumeos_store_lmdb::{check_integrity, LmdbEnvironment};
use lumeos_types::{AccountName, ContractParams, PollId, Profile};

const MAP_SIZE: usize = 64 * 1024 * 1024;

fn name(s: &str) -> AccountName {
    AccountName::new(s).unwrap()
}

fn open(path: &std::path::Path) -> Contract<LmdbEnvironment> {
    let env = LmdbEnvironment::open(path, MAP_SIZE).unwrap();
    Contract::new(env, ContractParams::default(), Arc::new(NullSettlement::new()))
}

fn exec(contract: &Contract<LmdbEnvironment>, principal: &str, action: Action) -> Outcome {
    contract.execute(Request::new(name(principal), action)).unwrap()
}

#[test]
fn state_and_counter_persist() {
    let dir = tempfile::tempdir().unwrap();
    let first;
    {
        let contract = open(dir.path());
        for n in ["alice", "bob"] {
            exec(
                &contract,
                n,
                Action::CreateUser {
                    account: name(n),
                    profile: Profile {
                        display_name: n.into(),
                        email: format!("{n}@lumeos.io"),
                        ..Profile::default()
                    },
                    content_hash: None,
                },
            );
        }
        exec(
            &contract,
            "alice",
            Action::UpdateFriendList {
                account: name("alice"),
                friend: name("bob"),
                connect: true,
            },
        );
        first = match exec(
            &contract,
            "alice",
            Action::CreatePoll {
                account: name("alice"),
                poll: PollDraft::new("Color?", &["red", "blue"]).with_tags(&["colors"]),
            },
        ) {
            Outcome::PollCreated(id) => id,
            other => panic!("unexpected outcome {other:?}"),
        };
        exec(
            &contract,
            "alice",
            Action::RemovePoll {
                account: name("alice"),
                poll_id: first,
            },
        );
    }

    let contract = open(dir.path());
    assert!(contract
        .store()
        .get_account(&name("bob"))
        .unwrap()
        .is_friend(&name("alice")));
    assert!(!contract.store().poll_exists(first).unwrap());

    let second = match exec(
        &contract,
        "alice",
        Action::CreatePoll {
            account: name("alice"),
            poll: PollDraft::new("Again?", &["yes"]),
        },
    ) {
        Outcome::PollCreated(id) => id,
        other => panic!("unexpected outcome {other:?}"),
    };
    assert_eq!(first, PollId::FIRST);
    assert_eq!(second, PollId::new(2));
    assert_eq!(
        contract.store().get_account(&name("alice")).unwrap().polls_created,
        2
    );

    let report = check_integrity(contract.store()).unwrap();
    assert!(report.is_healthy(), "{:?}", report.errors);
}
