//! Per-project allocation of monotonic build numbers.

use crate::build::{
    domain::{BuildNumber, ProjectId},
    ports::{BuildRepository, BuildRepositoryResult},
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::OwnedMutexGuard;

/// A build number reserved for one creation attempt.
///
/// The reservation holds its project's allocation lock, so no competing
/// creation can reserve a number for the same project until it is dropped.
/// Hold the reservation until the build is stored.
#[derive(Debug)]
pub struct NumberReservation {
    number: BuildNumber,
    _guard: OwnedMutexGuard<()>,
}

impl NumberReservation {
    /// Returns the reserved number.
    #[must_use]
    pub const fn number(&self) -> BuildNumber {
        self.number
    }
}

/// Allocates the next build number within a project's sequence.
///
/// Allocation serialises per project: concurrent reservations for one
/// project queue on an async lock while distinct projects proceed
/// independently. The registry holds the locks weakly; a project's lock
/// lives only while reservations hold it, and dead entries are swept when
/// a fresh lock is minted. Numbers come from the repository's recorded
/// maximum, so a reservation that is dropped without a store is reissued
/// to the next caller.
#[derive(Clone)]
pub struct NumberAllocator<R>
where
    R: BuildRepository,
{
    repository: Arc<R>,
    locks: Arc<Mutex<HashMap<ProjectId, Weak<tokio::sync::Mutex<()>>>>>,
}

impl<R> NumberAllocator<R>
where
    R: BuildRepository,
{
    /// Creates an allocator backed by the given repository.
    #[must_use]
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Reserves the next number in the project's sequence.
    ///
    /// # Errors
    ///
    /// Returns [`crate::build::ports::BuildRepositoryError`] when the
    /// repository cannot report the project's highest number.
    pub async fn reserve(
        &self,
        project_id: ProjectId,
    ) -> BuildRepositoryResult<NumberReservation> {
        let lock = self.lock_for(project_id);
        let guard = lock.lock_owned().await;
        let number = self
            .repository
            .max_number(project_id)
            .await?
            .map_or(BuildNumber::FIRST, BuildNumber::next);
        Ok(NumberReservation {
            number,
            _guard: guard,
        })
    }

    fn lock_for(&self, project_id: ProjectId) -> Arc<tokio::sync::Mutex<()>> {
        let mut registry = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(lock) = registry.get(&project_id).and_then(Weak::upgrade) {
            return lock;
        }
        // A dead entry means every reservation for its project was dropped.
        registry.retain(|_, entry| entry.strong_count() > 0);
        let lock = Arc::new(tokio::sync::Mutex::new(()));
        registry.insert(project_id, Arc::downgrade(&lock));
        lock
    }

    #[cfg(test)]
    pub(crate) fn lock_count(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
