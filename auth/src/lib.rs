//! Authorization guard for the Lumeos contract.
//!
//! Every mutating operation names the principal it requires: either the
//! account performing a self-service action, or the fixed administrator.
//! The guard compares that requirement against the principal the host
//! ledger authenticated for the invocation and fails fast on mismatch, so
//! no engine ever starts mutating on behalf of the wrong caller.
//!
//! Credential checking itself is not done here. The host proves who the
//! principal is; the [`Authorizer`] capability only decides whether that
//! principal satisfies a required identity.

pub mod error;
pub mod guard;

pub use error::AuthError;
pub use guard::{AuthGuard, Authorizer, PrincipalMatch, Requirement};
