//! In-memory trial repository
//!
//! Stores one snapshot per trial behind its own mutex. [`InMemoryTrialRepository::update`]
//! holds that mutex for the whole load-mutate-save cycle, so mutations of the
//! same trial are serialized while different trials never contend.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, RwLock},
};

use crate::{
    domain::{
        RepositoryError, RepositoryResult, Trial, TrialError, TrialEvent, TrialId,
        TrialRepository, TrialSnapshot,
    },
    Result,
};

type Slot = Arc<Mutex<TrialSnapshot>>;

/// Outcome of a committed [`InMemoryTrialRepository::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Updated<T> {
    pub value: T,
    /// Events produced by the mutation, in order
    pub events: Vec<TrialEvent>,
}

/// Thread-safe repository holding trials in process memory.
#[derive(Debug, Default)]
pub struct InMemoryTrialRepository {
    trials: RwLock<HashMap<TrialId, Slot>>,
}

impl InMemoryTrialRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `id`, apply `mutate` under the trial's lock, and save on success.
    ///
    /// If `mutate` fails the stored trial is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `Error::Repository` if the trial is missing or corrupt and
    /// `Error::Trial` if `mutate` rejects the operation.
    pub fn update<T>(
        &self,
        id: &TrialId,
        mutate: impl FnOnce(&mut Trial) -> std::result::Result<T, TrialError>,
    ) -> Result<Updated<T>> {
        let slot = self.slot(id)?;
        let mut stored = lock(&slot)?;

        let mut trial = Trial::restore(stored.clone()).map_err(RepositoryError::from)?;
        let value = mutate(&mut trial)?;
        let events = trial.take_events();
        *stored = trial.snapshot();

        tracing::debug!(trial_id = %id, events = events.len(), "trial updated");
        Ok(Updated { value, events })
    }

    fn slot(&self, id: &TrialId) -> RepositoryResult<Slot> {
        self.trials
            .read()
            .map_err(|_| RepositoryError::storage_error("trial index lock poisoned"))?
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("trial", id))
    }
}

fn lock(slot: &Slot) -> RepositoryResult<MutexGuard<'_, TrialSnapshot>> {
    slot.lock()
        .map_err(|_| RepositoryError::storage_error("trial lock poisoned"))
}

impl TrialRepository for InMemoryTrialRepository {
    fn load(&self, id: &TrialId) -> RepositoryResult<Trial> {
        let slot = self.slot(id)?;
        let snapshot = lock(&slot)?.clone();
        Ok(Trial::restore(snapshot)?)
    }

    fn save(&self, trial: &Trial) -> RepositoryResult<()> {
        let snapshot = trial.snapshot();
        let slot = Arc::clone(
            self.trials
                .write()
                .map_err(|_| RepositoryError::storage_error("trial index lock poisoned"))?
                .entry(trial.id())
                .or_insert_with(|| Arc::new(Mutex::new(snapshot.clone()))),
        );
        *lock(&slot)? = snapshot;

        tracing::debug!(trial_id = %trial.id(), state = %trial.state(), "trial saved");
        Ok(())
    }

    fn delete(&self, id: &TrialId) -> RepositoryResult<()> {
        self.trials
            .write()
            .map_err(|_| RepositoryError::storage_error("trial index lock poisoned"))?
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("trial", id))
    }

    fn list_ids(&self) -> RepositoryResult<Vec<TrialId>> {
        let mut ids: Vec<TrialId> = self
            .trials
            .read()
            .map_err(|_| RepositoryError::storage_error("trial index lock poisoned"))?
            .keys()
            .copied()
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}
