//! Principal checks.

use crate::error::AuthError;
use lumeos_types::{AccountName, ContractParams};
use std::fmt;

/// Injected capability: does `principal` satisfy the `required` identity?
pub trait Authorizer: Send + Sync {
    fn authorize(&self, principal: &AccountName, required: &AccountName) -> bool;
}

/// Default authorizer: the principal must be exactly the required account.
#[derive(Clone, Copy, Debug, Default)]
pub struct PrincipalMatch;

impl Authorizer for PrincipalMatch {
    fn authorize(&self, principal: &AccountName, required: &AccountName) -> bool {
        principal == required
    }
}

/// The identity an operation requires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Requirement {
    /// A self-service action of this account.
    Account(AccountName),
    /// An administrative action.
    Administrator,
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Account(name) => write!(f, "account {name}"),
            Requirement::Administrator => f.write_str("administrator"),
        }
    }
}

/// Evaluates requirements against invocation principals.
pub struct AuthGuard {
    authorizer: Box<dyn Authorizer>,
    administrator: AccountName,
    admin_override: bool,
}

impl AuthGuard {
    /// Guard with the default [`PrincipalMatch`] authorizer.
    pub fn new(params: &ContractParams) -> Self {
        Self::with_authorizer(Box::new(PrincipalMatch), params)
    }

    pub fn with_authorizer(authorizer: Box<dyn Authorizer>, params: &ContractParams) -> Self {
        Self {
            authorizer,
            administrator: params.administrator.clone(),
            admin_override: params.admin_override,
        }
    }

    pub fn administrator(&self) -> &AccountName {
        &self.administrator
    }

    pub fn admin_override(&self) -> bool {
        self.admin_override
    }

    /// Check `principal` against `requirement`.
    pub fn require(
        &self,
        operation: &'static str,
        principal: &AccountName,
        requirement: Requirement,
    ) -> Result<(), AuthError> {
        let required = match &requirement {
            Requirement::Account(name) => name,
            Requirement::Administrator => &self.administrator,
        };
        if self.authorizer.authorize(principal, required) {
            return Ok(());
        }
        tracing::warn!(
            operation,
            principal = %principal,
            required = %requirement,
            "authorization denied"
        );
        Err(AuthError::Denied {
            operation,
            principal: principal.clone(),
            required: requirement.to_string(),
        })
    }

    /// Strict self-service: only `account` itself.
    pub fn require_self(
        &self,
        operation: &'static str,
        principal: &AccountName,
        account: &AccountName,
    ) -> Result<(), AuthError> {
        self.require(operation, principal, Requirement::Account(account.clone()))
    }

    /// Self-service, or the administrator when the legacy override is on.
    pub fn require_self_or_admin(
        &self,
        operation: &'static str,
        principal: &AccountName,
        account: &AccountName,
    ) -> Result<(), AuthError> {
        if self.admin_override && self.authorizer.authorize(principal, &self.administrator) {
            tracing::debug!(operation, account = %account, "administrator override");
            return Ok(());
        }
        self.require_self(operation, principal, account)
    }

    pub fn require_admin(
        &self,
        operation: &'static str,
        principal: &AccountName,
    ) -> Result<(), AuthError> {
        self.require(operation, principal, Requirement::Administrator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumeos_types::ErrorKind;

    fn name(s: &str) -> AccountName {
        AccountName::new(s).unwrap()
    }

    #[test]
    fn self_service_requires_exact_principal() {
        let guard = AuthGuard::new(&ContractParams::default());
        assert!(guard.require_self("setname", &name("alice"), &name("alice")).is_ok());
        let err = guard
            .require_self("setname", &name("bob"), &name("alice"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert!(err.to_string().contains("setname"));
        assert!(err.to_string().contains("account alice"));
    }

    #[test]
    fn administrator_requirement() {
        let params = ContractParams::default();
        let guard = AuthGuard::new(&params);
        assert!(guard.require_admin("op", &params.administrator).is_ok());
        assert!(guard.require_admin("op", &name("alice")).is_err());
    }

    #[test]
    fn admin_override_is_opt_in() {
        let mut params = ContractParams::default();
        let admin = params.administrator.clone();

        let strict = AuthGuard::new(&params);
        assert!(strict
            .require_self_or_admin("removeuser", &admin, &name("alice"))
            .is_err());

        params.admin_override = true;
        let legacy = AuthGuard::new(&params);
        assert!(legacy
            .require_self_or_admin("removeuser", &admin, &name("alice"))
            .is_ok());
        assert!(legacy
            .require_self_or_admin("removeuser", &name("carol"), &name("alice"))
            .is_err());
    }

    struct DenyAll;

    impl Authorizer for DenyAll {
        fn authorize(&self, _principal: &AccountName, _required: &AccountName) -> bool {
            false
        }
    }

    #[test]
    fn injected_authorizer_is_consulted() {
        let guard = AuthGuard::with_authorizer(Box::new(DenyAll), &ContractParams::default());
        assert!(guard.require_self("op", &name("alice"), &name("alice")).is_err());
    }
}
