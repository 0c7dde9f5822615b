//! The abbreviation registry and the store that owns it.
//!
//! [`RegistryStore`] holds the current registry behind an `RwLock<Arc<_>>`.
//! Readers clone the `Arc` and work on an immutable snapshot. Writers hold the
//! write lock for the whole check-mutate-flush sequence, build the next
//! registry on a private copy, and only swap it in once the backend has
//! accepted it. A failed flush therefore leaves the visible state untouched.

use std::ops::Deref;
use std::path::Path;
use std::sync::{Arc, RwLock};

use indexmap::IndexMap;

use crate::config::RegistryConfig;
use crate::error::{PersistError, RegistryError, RegistryResult};
use crate::metrics::{RegistryMetrics, compute_metrics};
use crate::normalize::CanonicalKey;
use crate::persist::{InMemoryBackend, JsonFileBackend, RegistryBackend};

/// Ordered meanings of one abbreviation; never empty, no exact duplicates.
pub type MeaningList = Vec<String>;

/// Abbreviation to meanings, in insertion order.
pub type Registry = IndexMap<CanonicalKey, MeaningList>;

/// The two abbreviations every fresh data file starts with.
pub fn default_registry() -> Registry {
    let mut registry = Registry::new();
    registry.insert(
        crate::normalize("KSC"),
        vec![
            "Kennedy Space Center".to_string(),
            "Karlsruher Sport Club".to_string(),
        ],
    );
    registry.insert(
        crate::normalize("OOO"),
        vec![
            "Out of Office".to_string(),
            "Out of Order".to_string(),
            "Out of Orbit".to_string(),
        ],
    );
    registry
}

/// Read-only view of the registry at one point in time.
#[derive(Debug, Clone)]
pub struct Snapshot(Arc<Registry>);

impl Deref for Snapshot {
    type Target = Registry;

    fn deref(&self) -> &Registry {
        &self.0
    }
}

/// Owner of the in-memory registry and the backend it is persisted to.
pub struct RegistryStore {
    current: RwLock<Arc<Registry>>,
    backend: Box<dyn RegistryBackend>,
}

impl std::fmt::Debug for RegistryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryStore")
            .field("backend", &self.backend.describe())
            .field("abbreviations", &self.snapshot().len())
            .finish()
    }
}

impl RegistryStore {
    /// Wrap an already loaded registry. Nothing is flushed until the first
    /// mutation.
    pub fn new(registry: Registry, backend: Box<dyn RegistryBackend>) -> Self {
        Self {
            current: RwLock::new(Arc::new(registry)),
            backend,
        }
    }

    /// Store without a data file.
    pub fn in_memory(registry: Registry) -> Self {
        Self::new(registry, Box::new(InMemoryBackend::new()))
    }

    /// Load (or seed) the JSON data file at `path` and serve from it.
    pub fn open<P: AsRef<Path>>(path: P, defaults: &Registry) -> Result<Self, PersistError> {
        let backend = JsonFileBackend::new(path);
        let registry = backend.load(defaults)?;
        Ok(Self::new(registry, Box::new(backend)))
    }

    /// Open the store described by `config`.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, PersistError> {
        Self::open(&config.data_file, &config.seed)
    }

    /// Meanings of `key`, or `None` when the abbreviation is unknown.
    pub fn lookup(&self, key: &CanonicalKey) -> Option<MeaningList> {
        self.read().get(key).cloned()
    }

    /// Add `meaning` to `key`, creating the abbreviation if needed.
    ///
    /// Returns the updated list. An exact duplicate fails with
    /// [`RegistryError::AlreadyExists`], which carries the unchanged list; an
    /// empty meaning with [`RegistryError::EmptyMeaning`].
    pub fn add_meaning(&self, key: &CanonicalKey, meaning: &str) -> RegistryResult<MeaningList> {
        if meaning.is_empty() {
            return Err(RegistryError::EmptyMeaning { key: key.clone() });
        }
        self.mutate(|registry| match registry.get_mut(key) {
            Some(meanings) if meanings.iter().any(|m| m == meaning) => {
                Err(RegistryError::AlreadyExists {
                    key: key.clone(),
                    meaning: meaning.to_string(),
                    current: meanings.clone(),
                })
            }
            Some(meanings) => {
                meanings.push(meaning.to_string());
                Ok(meanings.clone())
            }
            None => {
                let meanings = vec![meaning.to_string()];
                registry.insert(key.clone(), meanings.clone());
                Ok(meanings)
            }
        })
        .inspect(|meanings| {
            tracing::debug!(key = %key, meanings = meanings.len(), "Added meaning");
        })
    }

    /// Delete `key` with all its meanings; returns how many were removed.
    pub fn remove_abbreviation(&self, key: &CanonicalKey) -> RegistryResult<usize> {
        self.mutate(|registry| {
            registry
                .shift_remove(key)
                .map(|meanings| meanings.len())
                .ok_or_else(|| RegistryError::NotFound { key: key.clone() })
        })
        .inspect(|removed| {
            tracing::debug!(key = %key, removed, "Removed abbreviation");
        })
    }

    /// Delete one meaning of `key`.
    ///
    /// Fails with `NotFound` for an unknown abbreviation, `LastMeaning` when
    /// the list holds a single meaning (remove the abbreviation instead), and
    /// `MeaningNotFound` when `meaning` is not in the list.
    pub fn remove_meaning(&self, key: &CanonicalKey, meaning: &str) -> RegistryResult<()> {
        self.mutate(|registry| {
            let meanings = registry
                .get_mut(key)
                .ok_or_else(|| RegistryError::NotFound { key: key.clone() })?;
            // A single-meaning list is never shrunk, whatever meaning is named.
            if meanings.len() == 1 {
                return Err(RegistryError::LastMeaning { key: key.clone() });
            }
            let position = meanings.iter().position(|m| m == meaning).ok_or_else(|| {
                RegistryError::MeaningNotFound {
                    key: key.clone(),
                    meaning: meaning.to_string(),
                }
            })?;
            meanings.remove(position);
            Ok(())
        })
        .inspect(|_| {
            tracing::debug!(key = %key, "Removed meaning");
        })
    }

    /// Immutable view of the current registry.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot(self.read())
    }

    /// Aggregate counts over the current registry.
    pub fn metrics(&self) -> RegistryMetrics {
        compute_metrics(&self.snapshot())
    }

    fn read(&self) -> Arc<Registry> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Run `op` on a copy of the registry under the write lock. The copy is
    /// flushed and published only if `op` succeeds.
    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut Registry) -> RegistryResult<T>,
    ) -> RegistryResult<T> {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut next = Registry::clone(&guard);
        let outcome = op(&mut next)?;

        if let Err(err) = self.backend.flush(&next) {
            tracing::error!(
                backend = %self.backend.describe(),
                error = %err,
                "Flush failed, mutation rolled back"
            );
            return Err(err.into());
        }

        *guard = Arc::new(next);
        Ok(outcome)
    }
}
