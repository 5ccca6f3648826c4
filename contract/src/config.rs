//! Contract configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use lumeos_types::ContractParams;
use lumeos_utils::LogFormat;

use crate::ContractError;

/// Configuration for a Lumeos contract host.
///
/// Can be loaded from a TOML file via [`ContractConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConfig {
    /// Data directory for the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in MiB.
    #[serde(default = "default_map_size_mb")]
    pub map_size_mb: usize,

    /// JSON-lines file transfer instructions are appended to. Defaults to
    /// `outbox.jsonl` inside `data_dir`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbox: Option<PathBuf>,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Identities and fee schedule.
    #[serde(default)]
    pub params: ContractParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./lumeos_data")
}

fn default_map_size_mb() -> usize {
    1024
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ContractConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ContractError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ContractError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ContractError> {
        let config: Self = toml::from_str(s).map_err(|e| ContractError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ContractError> {
        toml::to_string_pretty(self).map_err(|e| ContractError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ContractError> {
        if self.map_size_mb == 0 {
            return Err(ContractError::Config("map_size_mb must be positive".into()));
        }
        if !self.params.poll_fee.is_valid() || self.params.poll_fee.amount() < 0 {
            return Err(ContractError::Config(format!(
                "poll_fee {} is not a valid non-negative amount",
                self.params.poll_fee
            )));
        }
        Ok(())
    }

    pub fn map_size_bytes(&self) -> usize {
        self.map_size_mb.saturating_mul(1024 * 1024)
    }

    pub fn outbox_path(&self) -> PathBuf {
        self.outbox
            .clone()
            .unwrap_or_else(|| self.data_dir.join("outbox.jsonl"))
    }
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            map_size_mb: default_map_size_mb(),
            outbox: None,
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            params: ContractParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumeos_types::Asset;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = ContractConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = ContractConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = ContractConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.map_size_mb, 1024);
        assert_eq!(config.log_format, LogFormat::Human);
        assert_eq!(config.params.free_polls, 3);
        assert_eq!(config.outbox_path(), PathBuf::from("./lumeos_data/outbox.jsonl"));
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            data_dir = "/var/lib/lumeos"
            log_format = "json"

            [params]
            free_polls = 10
            poll_fee = "2.5000 LUME"
        "#;
        let config = ContractConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/lumeos"));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.params.free_polls, 10);
        assert_eq!(config.params.poll_fee, Asset::lume(25_000));
        assert_eq!(config.params.administrator.as_str(), "lumeosadmin");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn rejects_zero_map_size() {
        let err = ContractConfig::from_toml_str("map_size_mb = 0").unwrap_err();
        assert!(matches!(err, ContractError::Config(_)));
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = ContractConfig::from_toml_file(Path::new("/nonexistent/lumeos.toml"));
        assert!(matches!(result, Err(ContractError::Config(_))));
    }
}
