use crate::config::ServerConfig;
use crate::error::ServerResult;
use abkverz::{RegistryConfig, RegistryStore};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared application state
///
/// Everything a handler or middleware touches lives here; independent
/// instances do not share counters or registries.
#[derive(Debug)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// The abbreviation registry (shared across requests)
    pub store: Arc<RegistryStore>,

    /// Requests seen since startup
    request_counter: AtomicU64,
}

impl ServerState {
    /// Open the registry named by `config` and build the state around it
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let registry_config = match &config.registry_config {
            Some(path) => RegistryConfig::from_file(path)?,
            None => RegistryConfig::default(),
        }
        .with_data_file(config.data_file.clone());

        let store = RegistryStore::from_config(&registry_config)?;
        tracing::info!(
            data_file = %registry_config.data_file.display(),
            abbreviations = store.snapshot().len(),
            "Registry ready"
        );

        Ok(Self::with_store(config, Arc::new(store)))
    }

    /// Build state around an existing store
    pub fn with_store(config: ServerConfig, store: Arc<RegistryStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
            request_counter: AtomicU64::new(0),
        }
    }

    /// Check if API key is valid
    pub fn is_valid_api_key(&self, key: &str) -> bool {
        self.config.api_keys.contains(key)
    }

    /// Count one more request and return the new total
    pub fn next_request_count(&self) -> u64 {
        self.request_counter.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abkverz::default_registry;

    #[test]
    fn counters_are_per_instance() {
        let a = ServerState::with_store(
            ServerConfig::default(),
            Arc::new(RegistryStore::in_memory(default_registry())),
        );
        let b = ServerState::with_store(
            ServerConfig::default(),
            Arc::new(RegistryStore::in_memory(default_registry())),
        );

        assert_eq!(a.next_request_count(), 1);
        assert_eq!(a.next_request_count(), 2);
        assert_eq!(b.next_request_count(), 1);
    }

    #[test]
    fn new_seeds_data_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ServerConfig {
            data_file: dir.path().join("db.json"),
            ..ServerConfig::default()
        };

        let state = ServerState::new(config).unwrap();
        assert_eq!(state.store.snapshot().len(), 2);
        assert!(dir.path().join("db.json").exists());
    }

    #[test]
    fn api_key_check() {
        let state = ServerState::with_store(
            ServerConfig::default(),
            Arc::new(RegistryStore::in_memory(default_registry())),
        );
        assert!(state.is_valid_api_key("xyz-789"));
        assert!(!state.is_valid_api_key("invalid-key"));
    }
}
