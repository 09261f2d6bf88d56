//! Service layer for build creation.

use crate::build::{
    domain::{
        Build, BuildConfig, BuildDomainError, CommitId, MatrixExpander, NewBuildParams,
        ProjectId, RequestId,
    },
    ports::{BuildRepository, BuildRepositoryError},
};
use mockable::Clock;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use super::allocator::NumberAllocator;

/// Upper bound on store attempts when build numbers collide.
const MAX_ALLOCATION_ATTEMPTS: u32 = 3;

/// Request payload for creating a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBuildRequest {
    project_id: ProjectId,
    request_id: RequestId,
    commit_id: CommitId,
    config: Vec<(String, Value)>,
}

impl CreateBuildRequest {
    /// Creates a request with an empty configuration.
    #[must_use]
    pub const fn new(project_id: ProjectId, request_id: RequestId, commit_id: CommitId) -> Self {
        Self {
            project_id,
            request_id,
            commit_id,
            config: Vec::new(),
        }
    }

    /// Sets the raw configuration entries.
    #[must_use]
    pub fn with_config(mut self, entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        self.config = entries.into_iter().collect();
        self
    }
}

/// Service-level errors for build creation.
#[derive(Debug, Error)]
pub enum BuildCreationError {
    /// Configuration validation failed.
    #[error(transparent)]
    Domain(#[from] BuildDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] BuildRepositoryError),
    /// Repeated number collisions exhausted the retry budget.
    #[error("gave up allocating a build number for project {project_id} after {attempts} attempts")]
    AllocationConflict {
        /// Project whose sequence kept colliding.
        project_id: ProjectId,
        /// Attempts made before giving up.
        attempts: u32,
    },
}

/// Result type for build creation operations.
pub type BuildCreationResult<T> = Result<T, BuildCreationError>;

/// Build creation orchestration service.
///
/// Creation normalises the configuration, reserves the next number in the
/// project's sequence, expands the matrix, and stores the build and its
/// jobs as one record.
#[derive(Clone)]
pub struct BuildCreationService<R, C>
where
    R: BuildRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    allocator: NumberAllocator<R>,
    clock: Arc<C>,
}

impl<R, C> BuildCreationService<R, C>
where
    R: BuildRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new build creation service.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        let allocator = NumberAllocator::new(Arc::clone(&repository));
        Self {
            repository,
            allocator,
            clock,
        }
    }

    /// Creates a build with its expanded matrix and stores it.
    ///
    /// The reserved number stays exclusive until the store completes, so
    /// concurrent creations within one project receive distinct, increasing
    /// numbers. A collision with a competing writer is retried under a
    /// fresh reservation a bounded number of times.
    ///
    /// # Errors
    ///
    /// Returns [`BuildCreationError::Domain`] when the configuration is
    /// invalid, [`BuildCreationError::AllocationConflict`] when collisions
    /// exhaust the retry budget, and [`BuildCreationError::Repository`] for
    /// any other persistence failure.
    pub async fn create(&self, request: CreateBuildRequest) -> BuildCreationResult<Build> {
        let config = BuildConfig::new(request.config)?;
        let mut attempts = 0;
        loop {
            attempts += 1;
            let reservation = self.allocator.reserve(request.project_id).await?;
            let specs = MatrixExpander::expand(&config);
            let build = Build::new(
                NewBuildParams {
                    project_id: request.project_id,
                    request_id: request.request_id,
                    commit_id: request.commit_id,
                    number: reservation.number(),
                    config: config.clone(),
                    specs,
                },
                &*self.clock,
            );
            match self.repository.store(&build).await {
                Ok(()) => return Ok(build),
                Err(BuildRepositoryError::DuplicateNumber { .. })
                    if attempts < MAX_ALLOCATION_ATTEMPTS => {}
                Err(BuildRepositoryError::DuplicateNumber { .. }) => {
                    return Err(BuildCreationError::AllocationConflict {
                        project_id: request.project_id,
                        attempts,
                    });
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
