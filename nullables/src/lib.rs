//! Nullable infrastructure for deterministic testing.
//!
//! All external collaborators of the contract (the indexed store and the
//! settlement ledger) are abstracted behind traits. This crate provides
//! test-friendly implementations that:
//! - Keep everything in memory
//! - Can be controlled programmatically (fault injection, rejection)
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod settlement;
pub mod store;

pub use settlement::NullSettlement;
pub use store::NullStore;
