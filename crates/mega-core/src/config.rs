use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{MegaError, MegaResult};

/// Top-level configuration (loaded from mega.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MegaConfig {
    pub log: LogConfig,
    pub transfer: TransferConfig,
    pub ids: IdConfig,
}

impl MegaConfig {
    /// Parse a configuration from TOML text. Missing sections and keys fall
    /// back to their defaults.
    pub fn from_toml_str(s: &str) -> MegaResult<Self> {
        toml::from_str(s).map_err(|e| MegaError::Config(format!("parsing config: {e}")))
    }

    /// Load the configuration file at `path`, or the defaults if it does not exist.
    pub fn load(path: &Path) -> MegaResult<Self> {
        if !path.exists() {
            tracing::warn!("config file not found: {}  (using defaults)", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| MegaError::Config(format!("parsing config {}: {e}", path.display())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level or EnvFilter directive (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Text,
        }
    }
}

/// Chunked transfer parameters.
///
/// The defaults are the values the service computes its per-chunk MACs with;
/// anything else only interoperates with itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Size of the first chunk in bytes (default: 131072)
    pub chunk_initial: u64,
    /// Growth per chunk in bytes (default: 131072)
    pub chunk_step: u64,
    /// Largest chunk size in bytes (default: 1048576)
    pub chunk_cap: u64,
    /// Check the condensed file MAC against the node key after a download
    pub verify_mac: bool,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_initial: 0x20000,
            chunk_step: 0x20000,
            chunk_cap: 0x100000,
            verify_mac: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdConfig {
    /// Length of generated request correlation IDs (default: 10)
    pub request_id_length: usize,
}

impl Default for IdConfig {
    fn default() -> Self {
        Self {
            request_id_length: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[log]
level = "debug"
format = "json"

[transfer]
chunk_initial = 65536
chunk_step = 65536
chunk_cap = 524288
verify_mac = false

[ids]
request_id_length = 16
"#;
        let config = MegaConfig::from_toml_str(toml_str).unwrap();

        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.transfer.chunk_initial, 65536);
        assert_eq!(config.transfer.chunk_cap, 524288);
        assert!(!config.transfer.verify_mac);
        assert_eq!(config.ids.request_id_length, 16);
    }

    #[test]
    fn test_parse_defaults() {
        let config = MegaConfig::from_toml_str("").unwrap();

        assert_eq!(config.log.level, "info");
        assert_eq!(config.log.format, LogFormat::Text);
        assert_eq!(config.transfer.chunk_initial, 131072);
        assert_eq!(config.transfer.chunk_step, 131072);
        assert_eq!(config.transfer.chunk_cap, 1048576);
        assert!(config.transfer.verify_mac);
        assert_eq!(config.ids.request_id_length, 10);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"
[transfer]
verify_mac = false
"#;
        let config = MegaConfig::from_toml_str(toml_str).unwrap();

        // Overridden
        assert!(!config.transfer.verify_mac);
        // Defaults
        assert_eq!(config.transfer.chunk_cap, 1048576);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_invalid_format_rejected() {
        let result = MegaConfig::from_toml_str("[log]\nformat = \"xml\"\n");
        assert!(matches!(result, Err(MegaError::Config(_))));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = MegaConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.ids.request_id_length, 10);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mega.toml");
        std::fs::write(&path, "[ids]\nrequest_id_length = 24\n").unwrap();

        let config = MegaConfig::load(&path).unwrap();
        assert_eq!(config.ids.request_id_length, 24);
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = MegaConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed = MegaConfig::from_toml_str(&toml_str).unwrap();

        assert_eq!(config.log.level, parsed.log.level);
        assert_eq!(config.transfer.chunk_step, parsed.transfer.chunk_step);
        assert_eq!(config.ids.request_id_length, parsed.ids.request_id_length);
    }
}
