//! YAML configuration for the registry.
//!
//! ```yaml
//! data_file: "data/db.json"
//!
//! # Written to the data file only when it does not exist yet.
//! seed:
//!   KSC: ["Kennedy Space Center", "Karlsruher Sport Club"]
//!   OOO: ["Out of Office", "Out of Order", "Out of Orbit"]
//! ```
//!
//! Seed abbreviations are normalized on load; seeds that collide after
//! normalization are rejected.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::normalize::normalize;
use crate::registry::{Registry, default_registry};

/// Errors that can occur when loading a registry configuration file.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Where the registry lives and what a fresh data file starts with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistryConfig {
    /// Path of the JSON data file
    pub data_file: PathBuf,

    /// Contents of a newly created data file
    pub seed: Registry,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            seed: default_registry(),
        }
    }
}

impl RegistryConfig {
    pub fn with_data_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.data_file = path.into();
        self
    }

    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let raw: RawRegistryConfig = serde_yaml::from_str(yaml)?;

        let seed = match raw.seed {
            Some(entries) => normalize_seed(entries)?,
            None => default_registry(),
        };

        Ok(Self {
            data_file: raw.data_file.unwrap_or_else(default_data_file),
            seed,
        })
    }
}

/// Seed keys as written by a human: any case, possibly padded.
#[derive(Deserialize)]
struct RawRegistryConfig {
    data_file: Option<PathBuf>,
    seed: Option<IndexMap<String, Vec<String>>>,
}

fn normalize_seed(entries: IndexMap<String, Vec<String>>) -> Result<Registry, ConfigLoadError> {
    let mut seed = Registry::with_capacity(entries.len());
    for (raw_key, meanings) in entries {
        let key = normalize(&raw_key);
        if meanings.is_empty() {
            return Err(ConfigLoadError::Validation(format!(
                "seed abbreviation \"{key}\" needs at least one meaning"
            )));
        }
        let mut deduped: Vec<String> = Vec::with_capacity(meanings.len());
        for meaning in meanings {
            if deduped.contains(&meaning) {
                return Err(ConfigLoadError::Validation(format!(
                    "seed abbreviation \"{key}\" lists meaning \"{meaning}\" twice"
                )));
            }
            deduped.push(meaning);
        }
        if seed.insert(key.clone(), deduped).is_some() {
            return Err(ConfigLoadError::Validation(format!(
                "seed abbreviation \"{raw_key}\" collides with \"{key}\""
            )));
        }
    }
    Ok(seed)
}

fn default_data_file() -> PathBuf {
    PathBuf::from("db.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();
        assert_eq!(config.data_file, PathBuf::from("db.json"));
        assert_eq!(config.seed.len(), 2);
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = RegistryConfig::from_yaml("{}").unwrap();
        assert_eq!(config, RegistryConfig::default());
    }

    #[test]
    fn test_seed_is_normalized() {
        let yaml = r#"
data_file: "/tmp/abk.json"
seed:
  " api ": ["Application Programming Interface"]
  dns: ["Domain Name System"]
"#;
        let config = RegistryConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.data_file, PathBuf::from("/tmp/abk.json"));
        let keys: Vec<_> = config.seed.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, ["API", "DNS"]);
    }

    #[test]
    fn test_colliding_seed_rejected() {
        let yaml = r#"
seed:
  ksc: ["a"]
  KSC: ["b"]
"#;
        let err = RegistryConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("collides"));
    }

    #[test]
    fn test_empty_seed_list_rejected() {
        let err = RegistryConfig::from_yaml("seed:\n  KSC: []\n").unwrap_err();
        assert!(matches!(err, ConfigLoadError::Validation(_)));
    }

    #[test]
    fn test_duplicate_seed_meaning_rejected() {
        let err = RegistryConfig::from_yaml("seed:\n  KSC: [a, a]\n").unwrap_err();
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"data_file: \"registry.json\"\n")
            .unwrap();

        let config = RegistryConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.data_file, PathBuf::from("registry.json"));
        assert_eq!(config.seed, default_registry());
    }
}
