//! Poll lifecycle.

use crate::draft::{validate_price, PollDraft};
use crate::error::PollError;
use crate::search::PollSearch;
use lumeos_auth::AuthGuard;
use lumeos_fees::{FeeGate, TransferInstruction};
use lumeos_store::{Account, AccountStore, Journal, Poll, PollStore, StoreError};
use lumeos_types::{AccountName, Asset, ContentHash, PollId};

pub struct PollRegistry<'a> {
    accounts: &'a dyn AccountStore,
    polls: &'a dyn PollStore,
    guard: &'a AuthGuard,
    fees: FeeGate<'a>,
}

impl<'a> PollRegistry<'a> {
    pub fn new(
        accounts: &'a dyn AccountStore,
        polls: &'a dyn PollStore,
        guard: &'a AuthGuard,
        fees: FeeGate<'a>,
    ) -> Self {
        Self {
            accounts,
            polls,
            guard,
            fees,
        }
    }

    /// Create a poll owned by `creator` and bump the creator's counter.
    ///
    /// The poll insert and the counter bump commit together. The creation
    /// fee, if owed, is emitted only after both have committed.
    pub fn create(
        &self,
        principal: &AccountName,
        creator: &AccountName,
        draft: PollDraft,
    ) -> Result<PollId, PollError> {
        const OP: &str = "createpoll";
        self.guard.require_self(OP, principal, creator)?;
        draft.validate()?;

        let account = self.load_account(OP, creator)?;
        let prior = account.polls_created;
        let mut bumped = account.clone();
        bumped.polls_created = prior
            .checked_add(1)
            .ok_or_else(|| PollError::invalid(OP, "poll counter overflow"))?;

        let id = self
            .polls
            .next_poll_id()
            .map_err(PollError::store(OP, "next_poll_id"))?;
        let poll = draft.into_poll(id, creator.clone());

        let mut journal = Journal::with_polls(self.accounts, self.polls);
        let applied = journal
            .insert_poll(&poll)
            .map_err(PollError::store(OP, id))
            .and_then(|()| {
                journal
                    .swap_account(&account, &bumped)
                    .map_err(PollError::store(OP, creator))
            });
        if let Err(e) = applied {
            tracing::warn!(poll_id = %id, creator = %creator, error = %e, "poll creation failed, rolling back");
            if let Err(undo) = journal.rollback() {
                tracing::error!(poll_id = %id, error = %undo, "poll creation rollback incomplete");
            }
            return Err(e);
        }
        journal.commit();

        tracing::info!(
            poll_id = %id,
            creator = %creator,
            choices = poll.choices.len(),
            polls_created = bumped.polls_created,
            "poll created"
        );
        self.fees.charge_poll_creation(creator, prior);
        Ok(id)
    }

    /// Record `voter`'s answer. Participant and tally change in one swap.
    pub fn answer(
        &self,
        principal: &AccountName,
        voter: &AccountName,
        poll_id: PollId,
        choice: u8,
    ) -> Result<Poll, PollError> {
        const OP: &str = "answerpoll";
        self.guard.require_self(OP, principal, voter)?;
        self.ensure_account(OP, voter)?;

        let poll = self.load_poll(OP, poll_id)?;
        if poll.has_voted(voter) {
            return Err(PollError::AlreadyVoted {
                poll_id,
                account: voter.clone(),
            });
        }
        let index = usize::from(choice);
        if index >= poll.choices.len() {
            return Err(PollError::ChoiceOutOfRange {
                poll_id,
                index: choice,
                choices: poll.choices.len(),
            });
        }

        let mut updated = poll.clone();
        updated.participants.insert(voter.clone());
        let slot = &mut updated.choices[index];
        slot.votes = slot
            .votes
            .checked_add(1)
            .ok_or_else(|| PollError::invalid(OP, "vote counter overflow"))?;
        self.polls
            .swap_poll(&poll, &updated)
            .map_err(PollError::store(OP, poll_id))?;

        tracing::info!(poll_id = %poll_id, voter = %voter, choice, "vote recorded");
        Ok(updated)
    }

    /// Delete a poll. Only its creator may, and only before anyone voted.
    pub fn remove(
        &self,
        principal: &AccountName,
        account: &AccountName,
        poll_id: PollId,
    ) -> Result<Poll, PollError> {
        const OP: &str = "removepoll";
        self.guard.require_self(OP, principal, account)?;

        let poll = self.load_poll(OP, poll_id)?;
        if &poll.creator != account {
            return Err(PollError::NotCreator {
                operation: OP,
                poll_id,
                account: account.clone(),
            });
        }
        if !poll.participants.is_empty() {
            return Err(PollError::HasParticipants {
                poll_id,
                participants: poll.participants.len(),
            });
        }
        // Conflict if a vote landed after the participant check.
        self.polls
            .delete_poll_if(&poll)
            .map_err(PollError::store(OP, poll_id))?;

        tracing::info!(poll_id = %poll_id, creator = %account, "poll removed");
        Ok(poll)
    }

    /// Change the price and/or content hash. Choices, question and tally
    /// are never touched.
    pub fn update(
        &self,
        principal: &AccountName,
        account: &AccountName,
        poll_id: PollId,
        price: Option<Asset>,
        content_hash: Option<ContentHash>,
    ) -> Result<Poll, PollError> {
        const OP: &str = "updatepoll";
        self.guard.require_self(OP, principal, account)?;
        if let Some(price) = &price {
            validate_price(OP, price)?;
        }

        let poll = self.load_poll(OP, poll_id)?;
        if &poll.creator != account {
            return Err(PollError::NotCreator {
                operation: OP,
                poll_id,
                account: account.clone(),
            });
        }
        let mut updated = poll.clone();
        if price.is_some() {
            updated.price = price;
        }
        if content_hash.is_some() {
            updated.content_hash = content_hash;
        }
        if updated == poll {
            return Ok(poll);
        }
        self.polls
            .swap_poll(&poll, &updated)
            .map_err(PollError::store(OP, poll_id))?;

        tracing::info!(poll_id = %poll_id, "poll updated");
        Ok(updated)
    }

    /// Emit the purchase transfer for a priced poll.
    pub fn buy(
        &self,
        principal: &AccountName,
        buyer: &AccountName,
        poll_id: PollId,
    ) -> Result<TransferInstruction, PollError> {
        const OP: &str = "buy";
        self.guard.require_self(OP, principal, buyer)?;
        self.ensure_account(OP, buyer)?;
        let poll = self.load_poll(OP, poll_id)?;
        Ok(self.fees.charge_purchase(buyer, poll_id, poll.price.as_ref())?)
    }

    pub fn get(&self, poll_id: PollId) -> Result<Poll, PollError> {
        self.load_poll("getpoll", poll_id)
    }

    /// Polls tagged `tag`. No authorization.
    pub fn search(&self, tag: &str) -> PollSearch<'a> {
        tracing::debug!(tag, "poll search started");
        PollSearch::new(self.polls, tag)
    }

    fn ensure_account(&self, operation: &'static str, name: &AccountName) -> Result<(), PollError> {
        let exists = self
            .accounts
            .account_exists(name)
            .map_err(PollError::store(operation, name))?;
        if exists {
            Ok(())
        } else {
            Err(PollError::AccountNotFound {
                operation,
                account: name.clone(),
            })
        }
    }

    fn load_account(
        &self,
        operation: &'static str,
        name: &AccountName,
    ) -> Result<Account, PollError> {
        self.accounts.get_account(name).map_err(|e| match e {
            StoreError::NotFound(_) => PollError::AccountNotFound {
                operation,
                account: name.clone(),
            },
            other => PollError::store(operation, name)(other),
        })
    }

    fn load_poll(&self, operation: &'static str, poll_id: PollId) -> Result<Poll, PollError> {
        self.polls.get_poll(poll_id).map_err(|e| match e {
            StoreError::NotFound(_) => PollError::PollNotFound { operation, poll_id },
            other => PollError::store(operation, poll_id)(other),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumeos_nullables::{NullSettlement, NullStore};
    use lumeos_types::{ContractParams, ErrorKind, Profile};
    use std::cell::Cell;

    fn name(s: &str) -> AccountName {
        AccountName::new(s).unwrap()
    }

    struct Fixture {
        store: NullStore,
        settlement: NullSettlement,
        params: ContractParams,
        guard: AuthGuard,
    }

    impl Fixture {
        fn new(accounts: &[&str]) -> Self {
            let store = NullStore::new();
            for n in accounts {
                let account = Account::new(name(n), Profile::default(), None);
                store.insert_account(&account).unwrap();
            }
            let params = ContractParams::default();
            let guard = AuthGuard::new(&params);
            Self {
                store,
                settlement: NullSettlement::new(),
                params,
                guard,
            }
        }

        fn registry(&self) -> PollRegistry<'_> {
            PollRegistry::new(
                &self.store,
                &self.store,
                &self.guard,
                FeeGate::new(&self.params, &self.settlement),
            )
        }

        fn poll(&self, id: PollId) -> Poll {
            self.store.get_poll(id).unwrap()
        }
    }

    fn color_poll() -> PollDraft {
        PollDraft::new("Favourite color?", &["red", "blue"]).with_tags(&["colors"])
    }

    #[test]
    fn vote_scenario() {
        let fx = Fixture::new(&["alice"]);
        let polls = fx.registry();
        let alice = name("alice");

        let id = polls.create(&alice, &alice, color_poll()).unwrap();
        assert_eq!(id, PollId::FIRST);

        polls.answer(&alice, &alice, id, 0).unwrap();
        let after_first = fx.poll(id);
        assert_eq!(after_first.choices[0].votes, 1);
        assert_eq!(after_first.participants.len(), 1);
        assert!(after_first.has_voted(&alice));

        let err = polls.answer(&alice, &alice, id, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(fx.poll(id), after_first);
    }

    #[test]
    fn out_of_range_choice_leaves_poll_unchanged() {
        let fx = Fixture::new(&["alice", "bob"]);
        let polls = fx.registry();
        let (alice, bob) = (name("alice"), name("bob"));
        let id = polls.create(&alice, &alice, color_poll()).unwrap();
        let before = fx.poll(id);

        let err = polls.answer(&bob, &bob, id, 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(fx.poll(id), before);
    }

    #[test]
    fn answer_requires_registered_voter_and_existing_poll() {
        let fx = Fixture::new(&["alice"]);
        let polls = fx.registry();
        let (alice, ghost) = (name("alice"), name("ghost"));
        let id = polls.create(&alice, &alice, color_poll()).unwrap();

        assert_eq!(
            polls.answer(&ghost, &ghost, id, 0).unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            polls.answer(&alice, &alice, PollId::new(99), 0).unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            polls.answer(&ghost, &alice, id, 0).unwrap_err().kind(),
            ErrorKind::Authorization
        );
    }

    #[test]
    fn create_requires_registered_creator() {
        let fx = Fixture::new(&[]);
        let polls = fx.registry();
        let ghost = name("ghost");
        let err = polls.create(&ghost, &ghost, color_poll()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(fx.store.poll_count().unwrap(), 0);
    }

    #[test]
    fn create_bumps_counter() {
        let fx = Fixture::new(&["alice"]);
        let polls = fx.registry();
        let alice = name("alice");
        polls.create(&alice, &alice, color_poll()).unwrap();
        polls.create(&alice, &alice, color_poll()).unwrap();
        assert_eq!(fx.store.get_account(&alice).unwrap().polls_created, 2);
    }

    #[test]
    fn failed_counter_bump_removes_poll() {
        let fx = Fixture::new(&["alice"]);
        let polls = fx.registry();
        let alice = name("alice");

        fx.store.fail_writes_to(&alice);
        let err = polls.create(&alice, &alice, color_poll()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
        fx.store.heal(&alice);

        assert_eq!(fx.store.poll_count().unwrap(), 0);
        assert_eq!(fx.store.get_account(&alice).unwrap().polls_created, 0);
        assert!(fx.settlement.submitted().is_empty());

        // The burned id is not handed out again.
        let id = polls.create(&alice, &alice, color_poll()).unwrap();
        assert_eq!(id, PollId::new(2));
    }

    #[test]
    fn fee_charged_past_free_tier() {
        let fx = Fixture::new(&["alice"]);
        let polls = fx.registry();
        let alice = name("alice");
        for _ in 0..4 {
            polls.create(&alice, &alice, color_poll()).unwrap();
        }
        assert!(fx.settlement.submitted().is_empty());

        polls.create(&alice, &alice, color_poll()).unwrap();
        let sent = fx.settlement.submitted();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, alice);
        assert_eq!(sent[0].to, fx.params.settlement_account);
        assert_eq!(sent[0].quantity, fx.params.poll_fee);
        assert_eq!(sent[0].memo, "fee:alice;n:5");
        assert_eq!(fx.store.get_account(&alice).unwrap().polls_created, 5);
    }

    #[test]
    fn rejected_fee_keeps_poll() {
        let fx = Fixture::new(&["alice"]);
        let polls = fx.registry();
        let alice = name("alice");
        for _ in 0..4 {
            polls.create(&alice, &alice, color_poll()).unwrap();
        }
        fx.settlement.set_rejecting(true);

        let id = polls.create(&alice, &alice, color_poll()).unwrap();
        assert!(fx.store.poll_exists(id).unwrap());
        assert_eq!(fx.store.get_account(&alice).unwrap().polls_created, 5);
        assert_eq!(fx.settlement.rejected().len(), 1);
    }

    #[test]
    fn remove_rules() {
        let fx = Fixture::new(&["alice", "bob"]);
        let polls = fx.registry();
        let (alice, bob) = (name("alice"), name("bob"));
        let id = polls.create(&alice, &alice, color_poll()).unwrap();

        let err = polls.remove(&bob, &bob, id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);

        polls.answer(&bob, &bob, id, 1).unwrap();
        let err = polls.remove(&alice, &alice, id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(fx.store.poll_exists(id).unwrap());

        let fresh = polls.create(&alice, &alice, color_poll()).unwrap();
        polls.remove(&alice, &alice, fresh).unwrap();
        assert!(!fx.store.poll_exists(fresh).unwrap());
        assert_eq!(
            polls.remove(&alice, &alice, fresh).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    /// Poll table that lets `voter` answer poll 1 just before the first
    /// conditional delete reaches the store.
    struct VoteBeforeDelete<'a> {
        inner: &'a NullStore,
        voter: AccountName,
        fired: Cell<bool>,
    }

    impl PollStore for VoteBeforeDelete<'_> {
        fn get_poll(&self, id: PollId) -> Result<Poll, StoreError> {
            self.inner.get_poll(id)
        }

        fn poll_exists(&self, id: PollId) -> Result<bool, StoreError> {
            self.inner.poll_exists(id)
        }

        fn insert_poll(&self, poll: &Poll) -> Result<(), StoreError> {
            self.inner.insert_poll(poll)
        }

        fn swap_poll(&self, expected: &Poll, updated: &Poll) -> Result<(), StoreError> {
            self.inner.swap_poll(expected, updated)
        }

        fn delete_poll(&self, id: PollId) -> Result<(), StoreError> {
            self.inner.delete_poll(id)
        }

        fn delete_poll_if(&self, expected: &Poll) -> Result<(), StoreError> {
            if !self.fired.replace(true) {
                let current = self.inner.get_poll(expected.id)?;
                let mut voted = current.clone();
                voted.participants.insert(self.voter.clone());
                voted.choices[0].votes += 1;
                self.inner.swap_poll(&current, &voted)?;
            }
            self.inner.delete_poll_if(expected)
        }

        fn next_poll_after(&self, cursor: Option<PollId>) -> Result<Option<Poll>, StoreError> {
            self.inner.next_poll_after(cursor)
        }

        fn iter_polls(&self) -> Result<Vec<Poll>, StoreError> {
            self.inner.iter_polls()
        }

        fn next_poll_id(&self) -> Result<PollId, StoreError> {
            self.inner.next_poll_id()
        }
    }

    #[test]
    fn remove_loses_to_concurrent_vote() {
        let fx = Fixture::new(&["alice", "bob"]);
        let alice = name("alice");
        let id = fx.registry().create(&alice, &alice, color_poll()).unwrap();

        let racing = VoteBeforeDelete {
            inner: &fx.store,
            voter: name("bob"),
            fired: Cell::new(false),
        };
        let polls = PollRegistry::new(
            &fx.store,
            &racing,
            &fx.guard,
            FeeGate::new(&fx.params, &fx.settlement),
        );

        let err = polls.remove(&alice, &alice, id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        let survivor = fx.poll(id);
        assert!(survivor.has_voted(&name("bob")));
        assert_eq!(survivor.total_votes(), 1);
    }

    #[test]
    fn update_price_and_hash() {
        let fx = Fixture::new(&["alice", "bob"]);
        let polls = fx.registry();
        let (alice, bob) = (name("alice"), name("bob"));
        let id = polls.create(&alice, &alice, color_poll()).unwrap();

        let hash = ContentHash::new("QmPoll").unwrap();
        let updated = polls
            .update(&alice, &alice, id, Some(Asset::lume(25_000)), Some(hash.clone()))
            .unwrap();
        assert_eq!(updated.price, Some(Asset::lume(25_000)));
        assert_eq!(updated.content_hash, Some(hash));
        assert_eq!(updated.choices, fx.poll(id).choices);

        assert_eq!(
            polls
                .update(&alice, &alice, id, Some(Asset::lume(-1)), None)
                .unwrap_err()
                .kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            polls
                .update(&bob, &bob, id, Some(Asset::lume(1)), None)
                .unwrap_err()
                .kind(),
            ErrorKind::Authorization
        );
    }

    #[test]
    fn buy_priced_poll() {
        let fx = Fixture::new(&["alice", "bob"]);
        let polls = fx.registry();
        let (alice, bob) = (name("alice"), name("bob"));
        let id = polls
            .create(&alice, &alice, color_poll().with_price(Asset::lume(50_000)))
            .unwrap();

        let transfer = polls.buy(&bob, &bob, id).unwrap();
        assert_eq!(transfer.from, bob);
        assert_eq!(transfer.quantity, Asset::lume(50_000));
        assert_eq!(transfer.memo, "b:bob;pid:1;p:50000");
        assert_eq!(fx.settlement.submitted(), vec![transfer]);
    }

    #[test]
    fn buy_unpriced_or_rejected() {
        let fx = Fixture::new(&["alice", "bob"]);
        let polls = fx.registry();
        let (alice, bob) = (name("alice"), name("bob"));
        let free = polls.create(&alice, &alice, color_poll()).unwrap();
        assert_eq!(
            polls.buy(&bob, &bob, free).unwrap_err().kind(),
            ErrorKind::Validation
        );

        let priced = polls
            .create(&alice, &alice, color_poll().with_price(Asset::lume(10)))
            .unwrap();
        fx.settlement.set_rejecting(true);
        assert_eq!(
            polls.buy(&bob, &bob, priced).unwrap_err().kind(),
            ErrorKind::Settlement
        );
    }

    #[test]
    fn search_filters_by_tag_and_restarts() {
        let fx = Fixture::new(&["alice"]);
        let polls = fx.registry();
        let alice = name("alice");
        let a = polls.create(&alice, &alice, color_poll()).unwrap();
        polls
            .create(&alice, &alice, PollDraft::new("Lunch?", &["yes", "no"]).with_tags(&["food"]))
            .unwrap();
        let c = polls
            .create(
                &alice,
                &alice,
                PollDraft::new("Paint?", &["oil", "acrylic"]).with_tags(&["colors", "art"]),
            )
            .unwrap();

        let mut search = polls.search("colors");
        let ids: Vec<PollId> = search.by_ref().map(|p| p.unwrap().id).collect();
        assert_eq!(ids, vec![a, c]);
        assert!(search.next().is_none());

        search.restart();
        assert_eq!(search.count(), 2);
        assert_eq!(polls.search("missing").count(), 0);
    }
}
