//! Runtime configuration, loaded from a JSON file.
//!
//! ```json
//! {
//!   "storage": { "type": "file", "path": "/var/lib/certcenter" },
//!   "key_type": "ECDSA_P384",
//!   "leaf_expiration_days": 90
//! }
//! ```
//!
//! Every field is optional and falls back to [`Config::default`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::Duration;
use tracing::debug;

use crate::error::{CertCenterError, Result};
use crate::key::KeyType;

/// Where organizations, certificates and keys are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    #[default]
    Memory,
    File {
        path: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    #[serde(with = "key_type_name")]
    pub key_type: KeyType,
    pub rsa_bits: usize,
    pub root_expiration_days: i64,
    pub intermediate_expiration_days: i64,
    pub leaf_expiration_days: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            key_type: KeyType::EcdsaP384,
            rsa_bits: 2048,
            root_expiration_days: 3650,
            intermediate_expiration_days: 1825,
            leaf_expiration_days: 365,
        }
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            CertCenterError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config = Self::from_json(&json)?;
        debug!(path = %path.display(), ?config, "loaded configuration");
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CertCenterError::Config(e.to_string()))
    }

    pub fn root_expiration(&self) -> Duration {
        Duration::days(self.root_expiration_days)
    }

    pub fn intermediate_expiration(&self) -> Duration {
        Duration::days(self.intermediate_expiration_days)
    }

    pub fn leaf_expiration(&self) -> Duration {
        Duration::days(self.leaf_expiration_days)
    }
}

mod key_type_name {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use crate::key::KeyType;

    pub fn serialize<S: Serializer>(key_type: &KeyType, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(key_type.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<KeyType, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.storage, StorageConfig::Memory);
        assert_eq!(config.key_type, KeyType::EcdsaP384);
        assert_eq!(config.root_expiration(), Duration::days(3650));
        assert_eq!(config.intermediate_expiration(), Duration::days(1825));
        assert_eq!(config.leaf_expiration(), Duration::days(365));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "storage": {{ "type": "file", "path": "/tmp/certcenter" }},
                "key_type": "Ed25519",
                "leaf_expiration_days": 30
            }}"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(
            config.storage,
            StorageConfig::File {
                path: PathBuf::from("/tmp/certcenter")
            }
        );
        assert_eq!(config.key_type, KeyType::Ed25519);
        assert_eq!(config.leaf_expiration(), Duration::days(30));
        assert_eq!(config.rsa_bits, 2048);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            Config::from_json(r#"{"key_type": "DSA"}"#),
            Err(CertCenterError::Config(_))
        ));
        assert!(matches!(
            Config::from_json("not json"),
            Err(CertCenterError::Config(_))
        ));
        assert!(matches!(
            Config::from_file("/nonexistent/certcenter.json"),
            Err(CertCenterError::Config(_))
        ));
    }

    #[test]
    fn test_key_type_serializes_by_name() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert_eq!(json["key_type"], "ECDSA_P384");
        assert_eq!(json["storage"]["type"], "memory");
    }
}
