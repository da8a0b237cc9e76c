//! Repository trait interface for trial persistence.
//!
//! The domain layer defines the boundary; storage backends implement it.
//! A trial is always loaded and saved as a whole: implementations store
//! [`crate::TrialSnapshot`]s and rebuild aggregates with
//! [`crate::Trial::restore`], never by writing fields directly.
//!
//! # Example
//!
//! ```rust,ignore
//! use trials_core::{TrialRepository, RepositoryError, Trial, TrialState};
//!
//! fn active_trials(repo: &dyn TrialRepository) -> Result<Vec<Trial>, RepositoryError> {
//!     repo.list_ids()?
//!         .iter()
//!         .map(|id| repo.load(id))
//!         .filter(|t| t.as_ref().map_or(true, |t| t.state() == TrialState::Active))
//!         .collect()
//! }
//! ```

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use crate::domain::{aggregates::Trial, identifiers::TrialId, snapshot::SnapshotError};

/// Common errors across repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Trial not found in repository
    #[error("entity not found: {0}")]
    NotFound(String),

    /// Stored data no longer satisfies the aggregate invariants
    #[error("corrupt stored trial: {0}")]
    Corrupt(#[from] SnapshotError),

    /// Underlying storage failure
    #[error("storage error: {0}")]
    StorageError(String),
}

impl RepositoryError {
    /// Create a not found error
    #[must_use]
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{entity} '{id}'"))
    }

    /// Create a storage error
    #[must_use]
    pub fn storage_error(reason: impl Into<String>) -> Self {
        Self::StorageError(reason.into())
    }
}

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Persistence boundary for [`Trial`] aggregates.
pub trait TrialRepository: Send + Sync {
    /// Load a trial by id.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no trial has this id
    /// - `Corrupt` if the stored snapshot fails validation
    /// - `StorageError` on backend failure
    fn load(&self, id: &TrialId) -> RepositoryResult<Trial>;

    /// Insert or replace a trial. Pending events are not persisted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    fn save(&self, trial: &Trial) -> RepositoryResult<()>;

    /// Remove a trial.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no trial has this id.
    fn delete(&self, id: &TrialId) -> RepositoryResult<()>;

    /// All stored trial ids, sorted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    fn list_ids(&self) -> RepositoryResult<Vec<TrialId>>;

    /// Check whether a trial exists.
    ///
    /// # Errors
    ///
    /// Propagates any error from `load` other than `NotFound`.
    fn exists(&self, id: &TrialId) -> RepositoryResult<bool> {
        match self.load(id) {
            Ok(_) => Ok(true),
            Err(RepositoryError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
