//! Repository port for build persistence and lookup.

use crate::build::domain::{Build, BuildId, BuildNumber, JobId, ProjectId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for build repository operations.
pub type BuildRepositoryResult<T> = Result<T, BuildRepositoryError>;

/// Build persistence contract.
///
/// A build and its matrix jobs form one record: implementations persist and
/// return them together, never a job on its own.
#[async_trait]
pub trait BuildRepository: Send + Sync {
    /// Stores a new build together with its matrix.
    ///
    /// # Errors
    ///
    /// Returns [`BuildRepositoryError::DuplicateBuild`] when the build ID
    /// already exists or [`BuildRepositoryError::DuplicateNumber`] when the
    /// build's number is already taken within its project.
    async fn store(&self, build: &Build) -> BuildRepositoryResult<()>;

    /// Persists changes to an existing build (state, status, timestamps, and
    /// job progress).
    ///
    /// # Errors
    ///
    /// Returns [`BuildRepositoryError::NotFound`] when the build does not
    /// exist.
    async fn update(&self, build: &Build) -> BuildRepositoryResult<()>;

    /// Finds a build by identifier.
    ///
    /// Returns `None` when the build does not exist.
    async fn find_by_id(&self, id: BuildId) -> BuildRepositoryResult<Option<Build>>;

    /// Finds the build whose matrix contains the given job.
    ///
    /// Returns `None` when no build owns the job.
    async fn find_by_job(&self, job_id: JobId) -> BuildRepositoryResult<Option<Build>>;

    /// Returns the highest build number recorded for a project.
    ///
    /// Returns `None` when the project has no builds.
    async fn max_number(
        &self,
        project_id: ProjectId,
    ) -> BuildRepositoryResult<Option<BuildNumber>>;

    /// Returns every stored build in creation order, oldest first.
    async fn list_all(&self) -> BuildRepositoryResult<Vec<Build>>;
}

/// Errors returned by build repository implementations.
#[derive(Debug, Clone, Error)]
pub enum BuildRepositoryError {
    /// A build with the same identifier already exists.
    #[error("duplicate build identifier: {0}")]
    DuplicateBuild(BuildId),

    /// The build's number is already taken within its project.
    #[error("build number {number} already taken in project {project_id}")]
    DuplicateNumber {
        /// Project whose sequence rejected the number.
        project_id: ProjectId,
        /// Number that was already taken.
        number: BuildNumber,
    },

    /// The build was not found.
    #[error("build not found: {0}")]
    NotFound(BuildId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl BuildRepositoryError {
    /// Wraps a persistence error.
    #[must_use]
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
