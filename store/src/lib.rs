//! Abstract indexed-store traits for the Lumeos contract.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The engines depend only on the traits, never on a backend.
//!
//! The contract is per-key atomic: each call either fully applies or leaves
//! the store untouched. Operations spanning several keys are composed by the
//! engines on top of [`AccountStore::swap_account`] and
//! [`PollStore::swap_poll`].

pub mod account;
pub mod error;
pub mod journal;
pub mod poll;

pub use account::{Account, AccountStore};
pub use error::StoreError;
pub use journal::Journal;
pub use poll::{Choice, Poll, PollStore};
