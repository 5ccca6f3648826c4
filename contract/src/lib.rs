//! The Lumeos contract: named actions dispatched to the engines.
//!
//! A [`Request`] pairs the principal the host authenticated with one
//! [`Action`]. [`Contract::execute`] routes it to the identity registry, the
//! friend graph or the poll registry, all sharing one store and one
//! authorization guard, and returns an [`Outcome`] or a [`ContractError`]
//! whose [`kind`](ContractError::kind) places it in the error taxonomy.

pub mod action;
pub mod config;
pub mod contract;
pub mod error;

pub use action::{Action, Outcome, Request};
pub use config::ContractConfig;
pub use contract::Contract;
pub use error::ContractError;
