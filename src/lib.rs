//! Abbreviation registry (Abkürzungsverzeichnis).
//!
//! Maps case-insensitive abbreviations to an ordered list of meanings and
//! keeps that mapping in a flat JSON file. The HTTP surface lives in the
//! `abkverz-server` crate; this crate holds everything the handlers build on:
//!
//! - [`normalize`]: canonical form of an abbreviation (trimmed, upper-case)
//! - [`RegistryStore`]: the single owner of the in-memory registry
//! - [`persist`]: JSON file loading, seeding and atomic rewrites
//! - [`compute_metrics`]: abbreviation and meaning counts
//!
//! ```rust
//! use abkverz::{RegistryStore, default_registry, normalize};
//!
//! let store = RegistryStore::in_memory(default_registry());
//! let meanings = store.add_meaning(&normalize("ksc"), "Foo").unwrap();
//! assert_eq!(meanings.last().map(String::as_str), Some("Foo"));
//! assert_eq!(store.metrics().meaning_count, 6);
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod normalize;
pub mod persist;
pub mod registry;

pub use config::{ConfigLoadError, RegistryConfig};
pub use error::{PersistError, RegistryError, RegistryResult};
pub use metrics::{RegistryMetrics, compute_metrics};
pub use normalize::{CanonicalKey, normalize};
pub use persist::{InMemoryBackend, JsonFileBackend, RegistryBackend};
pub use registry::{MeaningList, Registry, RegistryStore, Snapshot, default_registry};
