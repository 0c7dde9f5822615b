use std::path::PathBuf;

use thiserror::Error;

use crate::normalize::CanonicalKey;
use crate::registry::MeaningList;

/// Failures while reading or writing the backing JSON file.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to access data file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse data file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize registry: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("invalid data file {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

impl PersistError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PersistError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Outcomes of registry operations other than success.
///
/// `NotFound`, `MeaningNotFound`, `AlreadyExists`, `LastMeaning` and
/// `EmptyMeaning` are expected, caller-triggered outcomes. `Persistence` is an infrastructure
/// fault; the in-memory change has already been rolled back when it is
/// returned.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("abbreviation \"{key}\" not found")]
    NotFound { key: CanonicalKey },

    #[error("meaning \"{meaning}\" for abbreviation \"{key}\" not found")]
    MeaningNotFound { key: CanonicalKey, meaning: String },

    #[error("meaning \"{meaning}\" for abbreviation \"{key}\" already present")]
    AlreadyExists {
        key: CanonicalKey,
        meaning: String,
        current: MeaningList,
    },

    #[error("cannot remove the only meaning of abbreviation \"{key}\"")]
    LastMeaning { key: CanonicalKey },

    #[error("empty meaning for abbreviation \"{key}\"")]
    EmptyMeaning { key: CanonicalKey },

    #[error("persistence failure: {0}")]
    Persistence(#[from] PersistError),
}

pub type RegistryResult<T> = Result<T, RegistryError>;
