//! Account lifecycle and the friend graph.
//!
//! The [`IdentityRegistry`] owns account records: creation, profile edits,
//! removal and the `exists` predicate the poll registry builds on. The
//! [`FriendGraph`] keeps the friend relation symmetric across two account
//! records, rolling back the first half of an edge if the second half fails.

pub mod error;
pub mod friends;
pub mod registry;

pub use error::IdentityError;
pub use friends::FriendGraph;
pub use registry::{IdentityRegistry, ProfileUpdate};
