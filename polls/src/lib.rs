//! Poll registry for the Lumeos contract.
//!
//! Polls are created by registered accounts, answered once per account and
//! removed by their creator while nobody has voted. Creation runs through
//! the fee gate once the creator is past the free tier. Search is a linear
//! scan over the poll table filtered by tag.

pub mod draft;
pub mod error;
pub mod registry;
pub mod search;

pub use draft::PollDraft;
pub use error::PollError;
pub use registry::PollRegistry;
pub use search::PollSearch;
