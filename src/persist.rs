//! Persistence for the registry.
//!
//! The registry is stored as one JSON object: canonical abbreviations are the
//! top-level keys and each value is a non-empty array of meanings. Every
//! mutation rewrites the whole file through a temporary sibling that is
//! renamed over the original, so readers of the file never see a half-written
//! document.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::PersistError;
use crate::normalize::CanonicalKey;
use crate::registry::Registry;

/// Storage backend the registry store flushes into after every mutation.
pub trait RegistryBackend: Send + Sync {
    /// Replace the persisted registry with `registry`.
    fn flush(&self, registry: &Registry) -> Result<(), PersistError>;

    /// Human-readable location, used in log lines.
    fn describe(&self) -> String;
}

/// Backend writing the registry to a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Read the registry from disk, creating the file from `defaults` when it
    /// does not exist yet.
    pub fn load(&self, defaults: &Registry) -> Result<Registry, PersistError> {
        load(&self.path, defaults)
    }
}

impl RegistryBackend for JsonFileBackend {
    fn flush(&self, registry: &Registry) -> Result<(), PersistError> {
        flush(registry, &self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Backend keeping the last flushed registry in memory. Used by tests and by
/// callers that do not want a data file.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    flushed: Mutex<Option<Registry>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry as of the most recent flush, if any.
    pub fn last_flushed(&self) -> Option<Registry> {
        self.flushed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl RegistryBackend for InMemoryBackend {
    fn flush(&self, registry: &Registry) -> Result<(), PersistError> {
        let mut guard = self
            .flushed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(registry.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}

/// Load the registry stored at `path`.
///
/// A missing file is created and populated with `defaults`. A file that exists
/// but cannot be parsed, or whose content breaks the registry invariants, is
/// an error; it is never silently replaced.
pub fn load(path: &Path, defaults: &Registry) -> Result<Registry, PersistError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(
                path = %path.display(),
                abbreviations = defaults.len(),
                "Data file not found, seeding defaults"
            );
            validate(defaults, path)?;
            flush(defaults, path)?;
            return Ok(defaults.clone());
        }
        Err(err) => return Err(PersistError::io(path, err)),
    };

    let registry: Registry =
        serde_json::from_slice(&bytes).map_err(|source| PersistError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    validate(&registry, path)?;

    tracing::info!(
        path = %path.display(),
        abbreviations = registry.len(),
        "Loaded registry from data file"
    );
    Ok(registry)
}

/// Serialize the full registry to `path`, replacing its previous contents.
pub fn flush(registry: &Registry, path: &Path) -> Result<(), PersistError> {
    let json = serde_json::to_vec_pretty(registry).map_err(PersistError::Serialize)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PersistError::io(parent, e))?;
    }

    let temp_path = temp_path_for(path);
    let write_temp = || -> std::io::Result<()> {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(&json)?;
        file.write_all(b"\n")?;
        file.sync_all()
    };
    if let Err(err) = write_temp() {
        let _ = fs::remove_file(&temp_path);
        return Err(PersistError::io(&temp_path, err));
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        PersistError::io(path, e)
    })?;

    tracing::debug!(
        path = %path.display(),
        bytes = json.len(),
        "Flushed registry"
    );
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Check the invariants a persisted registry must satisfy: canonical keys,
/// at least one meaning per key, no empty or duplicate meanings within a key.
pub fn validate(registry: &Registry, path: &Path) -> Result<(), PersistError> {
    let invalid = |reason: String| PersistError::Invalid {
        path: path.to_path_buf(),
        reason,
    };

    for (key, meanings) in registry {
        if !CanonicalKey::is_canonical(key.as_str()) {
            return Err(invalid(format!("abbreviation \"{key}\" is not normalized")));
        }
        if meanings.is_empty() {
            return Err(invalid(format!("abbreviation \"{key}\" has no meanings")));
        }
        let mut seen = HashSet::with_capacity(meanings.len());
        for meaning in meanings {
            if meaning.is_empty() {
                return Err(invalid(format!("abbreviation \"{key}\" has an empty meaning")));
            }
            if !seen.insert(meaning.as_str()) {
                return Err(invalid(format!(
                    "abbreviation \"{key}\" lists meaning \"{meaning}\" twice"
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::default_registry;
    use tempfile::TempDir;

    #[test]
    fn load_seeds_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");

        let registry = load(&path, &default_registry()).unwrap();
        assert_eq!(registry, default_registry());
        assert!(path.exists());

        let reloaded = load(&path, &Registry::new()).unwrap();
        assert_eq!(reloaded, default_registry());
    }

    #[test]
    fn flush_replaces_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");

        flush(&default_registry(), &path).unwrap();
        flush(&Registry::new(), &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim(), "{}");
        assert!(!dir.path().join("db.json.tmp").exists());
    }

    #[test]
    fn file_layout_is_plain_object() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        flush(&default_registry(), &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            value["KSC"],
            serde_json::json!(["Kennedy Space Center", "Karlsruher Sport Club"])
        );
        assert_eq!(value["OOO"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn key_order_survives_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, r#"{"ZZZ": ["z"], "AAA": ["a"], "MMM": ["m"]}"#).unwrap();

        let registry = load(&path, &Registry::new()).unwrap();
        let keys: Vec<_> = registry.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, ["ZZZ", "AAA", "MMM"]);
    }

    #[test]
    fn creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("data").join("db.json");
        load(&path, &default_registry()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn corrupt_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, "not json").unwrap();

        let err = load(&path, &default_registry()).unwrap_err();
        assert!(matches!(err, PersistError::Parse { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "not json");
    }

    #[test]
    fn invariant_violations_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");

        for content in [
            r#"{"KSC": []}"#,
            r#"{"ksc": ["Kennedy Space Center"]}"#,
            r#"{"KSC": ["a", "a"]}"#,
            r#"{"KSC": ["Kennedy Space Center", ""]}"#,
        ] {
            fs::write(&path, content).unwrap();
            let err = load(&path, &Registry::new()).unwrap_err();
            assert!(matches!(err, PersistError::Invalid { .. }), "{content}");
        }
    }

    #[test]
    fn meanings_differing_in_case_are_distinct() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, r#"{"KSC": ["foo", "Foo"]}"#).unwrap();
        assert_eq!(load(&path, &Registry::new()).unwrap().len(), 1);
    }

    #[test]
    fn flush_into_missing_directory_fails_when_parent_is_a_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let err = flush(&default_registry(), &blocker.join("db.json")).unwrap_err();
        assert!(matches!(err, PersistError::Io { .. }));
    }

    #[test]
    fn in_memory_backend_records_flush() {
        let backend = InMemoryBackend::new();
        assert!(backend.last_flushed().is_none());
        backend.flush(&default_registry()).unwrap();
        assert_eq!(backend.last_flushed(), Some(default_registry()));
    }
}
