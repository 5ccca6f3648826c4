//! Contract parameters: the fixed identities and fee schedule the engines
//! are configured with.

use crate::account::AccountName;
use crate::asset::Asset;
use serde::{Deserialize, Serialize};

/// Parameters shared by every engine of the contract.
///
/// All fields have serde defaults so a partial TOML table is enough.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractParams {
    // ── Identities ───────────────────────────────────────────────────────
    /// The account the contract itself is deployed under.
    #[serde(default = "default_contract_account")]
    pub contract_account: AccountName,

    /// Fixed administrator identity for administrative actions.
    #[serde(default = "default_administrator")]
    pub administrator: AccountName,

    /// Legacy variant: the administrator may also update and remove any
    /// account. Off by default; accounts are strictly self-service.
    #[serde(default)]
    pub admin_override: bool,

    // ── Fee gate ─────────────────────────────────────────────────────────
    /// Number of polls an account may have created before further creations
    /// are charged. Charging applies once the prior count exceeds this value.
    #[serde(default = "default_free_polls")]
    pub free_polls: u32,

    /// Fixed fee charged per poll above the free tier.
    #[serde(default = "default_poll_fee")]
    pub poll_fee: Asset,

    /// Account that receives poll fees and purchases.
    #[serde(default = "default_settlement_account")]
    pub settlement_account: AccountName,

    /// Token contract that executes transfers on the settlement ledger.
    #[serde(default = "default_token_contract")]
    pub token_contract: AccountName,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_contract_account() -> AccountName {
    known_name("lumeos")
}

fn default_administrator() -> AccountName {
    known_name("lumeosadmin")
}

fn default_free_polls() -> u32 {
    3
}

fn default_poll_fee() -> Asset {
    Asset::lume(10_000)
}

fn default_settlement_account() -> AccountName {
    known_name("lumeoslumeos")
}

fn default_token_contract() -> AccountName {
    known_name("lumeostokens")
}

fn known_name(s: &'static str) -> AccountName {
    AccountName::new(s).expect("built-in account names are valid")
}

impl Default for ContractParams {
    fn default() -> Self {
        Self {
            contract_account: default_contract_account(),
            administrator: default_administrator(),
            admin_override: false,
            free_polls: default_free_polls(),
            poll_fee: default_poll_fee(),
            settlement_account: default_settlement_account(),
            token_contract: default_token_contract(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployed_contract() {
        let params = ContractParams::default();
        assert_eq!(params.free_polls, 3);
        assert_eq!(params.poll_fee.to_string(), "1.0000 LUME");
        assert_eq!(params.settlement_account.as_str(), "lumeoslumeos");
        assert!(!params.admin_override);
    }
}
