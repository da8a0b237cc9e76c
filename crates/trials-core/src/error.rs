//! Error types for trials-core
//!
//! Domain operations return the narrow error of the type they act on
//! (`TrialError`, `ConstructionError`, `SnapshotError`, `RepositoryError`).
//! [`Error`] is the crate-level umbrella used where several of those meet:
//! configuration loading, config-driven trial creation, tracing setup and
//! repository updates. Snapshot failures reach it through `RepositoryError`.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::{ConstructionError, RepositoryError, TrialError};

/// Core error type for trials-core operations
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration value is present but invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration file could not be read
    #[error("failed to read configuration file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for [`crate::TrialsConfig`]
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Tracing subscriber could not be installed
    #[error("tracing setup failed: {0}")]
    Telemetry(String),

    /// Trial could not be constructed
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    /// Trial operation was rejected
    #[error(transparent)]
    Trial(#[from] TrialError),

    /// Repository operation failed
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result type alias for trials-core operations
pub type Result<T> = std::result::Result<T, Error>;
