//! Request dispatch.

use std::sync::Arc;

use lumeos_auth::AuthGuard;
use lumeos_fees::{FeeGate, Settlement};
use lumeos_identity::{FriendGraph, IdentityRegistry, ProfileUpdate};
use lumeos_polls::PollRegistry;
use lumeos_store::{AccountStore, PollStore};
use lumeos_types::{ContractParams, PostalAddress};

use crate::action::{Action, Outcome, Request};
use crate::error::ContractError;

/// The contract over one store.
///
/// Requests are executed one at a time against `store`; each returns before
/// the next is admitted.
pub struct Contract<S> {
    store: S,
    params: ContractParams,
    guard: AuthGuard,
    settlement: Arc<dyn Settlement>,
}

impl<S: AccountStore + PollStore> Contract<S> {
    pub fn new(store: S, params: ContractParams, settlement: Arc<dyn Settlement>) -> Self {
        let guard = AuthGuard::new(&params);
        Self {
            store,
            params,
            guard,
            settlement,
        }
    }

    /// Use a custom guard, e.g. one backed by a different [`lumeos_auth::Authorizer`].
    pub fn with_guard(mut self, guard: AuthGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn params(&self) -> &ContractParams {
        &self.params
    }

    pub fn identity(&self) -> IdentityRegistry<'_> {
        IdentityRegistry::new(&self.store, &self.guard)
    }

    pub fn friends(&self) -> FriendGraph<'_> {
        FriendGraph::new(&self.store, &self.guard)
    }

    pub fn polls(&self) -> PollRegistry<'_> {
        PollRegistry::new(
            &self.store,
            &self.store,
            &self.guard,
            FeeGate::new(&self.params, self.settlement.as_ref()),
        )
    }

    /// Parse and execute one JSON request.
    pub fn execute_json(&self, line: &str) -> Result<Outcome, ContractError> {
        let request: Request = serde_json::from_str(line)?;
        self.execute(request)
    }

    /// Execute one request. A failed request leaves no partial effect.
    pub fn execute(&self, request: Request) -> Result<Outcome, ContractError> {
        let action_name = request.action.name();
        let span = tracing::info_span!(
            "execute",
            action = action_name,
            principal = %request.principal
        );
        let _enter = span.enter();

        let result = self.dispatch(request);
        match &result {
            Ok(_) => tracing::debug!("request completed"),
            Err(e) => tracing::warn!(kind = %e.kind(), error = %e, "request failed"),
        }
        result
    }

    fn dispatch(&self, request: Request) -> Result<Outcome, ContractError> {
        let Request { principal, action } = request;
        let p = &principal;
        let outcome = match action {
            Action::CreateUser {
                account,
                profile,
                content_hash,
            } => Outcome::Account(self.identity().create(p, &account, profile, content_hash)?),
            Action::UpdateUser {
                account,
                content_hash,
            } => Outcome::Account(self.identity().update(
                p,
                &account,
                ProfileUpdate::ContentHash(content_hash),
            )?),
            Action::RemoveUser { account, reason } => {
                self.identity().remove(p, &account, &reason)?;
                Outcome::Done
            }
            Action::GetUser { account } => Outcome::Account(self.identity().get(&account)?),
            Action::SetEmail { account, email } => {
                Outcome::Account(self.identity().set_email(p, &account, email)?)
            }
            Action::SetName { account, name } => {
                Outcome::Account(self.identity().set_name(p, &account, name)?)
            }
            Action::SetDateOfBirth {
                account,
                date_of_birth,
            } => Outcome::Account(self.identity().set_date_of_birth(p, &account, date_of_birth)?),
            Action::SetAddress { account, address } => {
                let address: PostalAddress =
                    address.parse().map_err(|source| ContractError::Invalid {
                        action: "setaddress",
                        source,
                    })?;
                Outcome::Account(self.identity().set_address(p, &account, address)?)
            }
            Action::UpdateFriendList {
                account,
                friend,
                connect,
            } => {
                self.friends().set_edge(p, &account, &friend, connect)?;
                Outcome::Done
            }
            Action::CreatePoll { account, poll } => {
                Outcome::PollCreated(self.polls().create(p, &account, poll)?)
            }
            Action::UpdatePoll {
                account,
                poll_id,
                price,
                content_hash,
            } => {
                self.polls()
                    .update(p, &account, poll_id, price, content_hash)?;
                Outcome::Done
            }
            Action::RemovePoll { account, poll_id } => {
                self.polls().remove(p, &account, poll_id)?;
                Outcome::Done
            }
            Action::AnswerPoll {
                account,
                poll_id,
                choice,
            } => {
                self.polls().answer(p, &account, poll_id, choice)?;
                Outcome::Done
            }
            Action::SearchPoll { tag } => {
                let polls = self.polls().search(&tag).collect::<Result<Vec<_>, _>>()?;
                Outcome::Polls(polls)
            }
            Action::Buy { account, poll_id } => {
                self.polls().buy(p, &account, poll_id)?;
                Outcome::Done
            }
        };
        Ok(outcome)
    }
}
