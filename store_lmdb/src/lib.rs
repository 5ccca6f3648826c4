//! LMDB storage backend for the Lumeos contract.
//!
//! Implements `AccountStore` and `PollStore` from `lumeos-store` using the
//! `heed` LMDB bindings. Accounts, polls and bookkeeping values live in three
//! named databases within a single environment. Every compare-and-swap runs
//! inside one write transaction, which LMDB serialises.

pub mod account;
pub mod environment;
pub mod error;
pub mod integrity;
pub mod meta;
pub mod migration;
pub mod poll;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use integrity::{check_data_dir, check_integrity, IntegrityReport};
