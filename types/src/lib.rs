//! Fundamental types for the Lumeos contract.
//!
//! This crate defines the value types shared across every other crate in the
//! workspace: account names, poll identifiers, token assets, profile fields,
//! contract parameters and the error taxonomy every failure maps onto.

pub mod account;
pub mod asset;
pub mod error;
pub mod params;
pub mod poll;
pub mod profile;

pub use account::AccountName;
pub use asset::{Asset, Symbol};
pub use error::{ErrorKind, ValueError};
pub use params::ContractParams;
pub use poll::PollId;
pub use profile::{ContentHash, DateOfBirth, PostalAddress, Profile};
