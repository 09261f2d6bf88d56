//! Project directory port for summary propagation and lookup.

use crate::build::domain::{ProjectId, ProjectSummary, PropagationOutcome, SummaryPatch};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for project directory operations.
pub type ProjectDirectoryResult<T> = Result<T, ProjectDirectoryError>;

/// Contract for propagating build summaries onto owning projects.
#[async_trait]
pub trait ProjectDirectory: Send + Sync {
    /// Applies a summary patch to the project it names.
    ///
    /// Implementations decide whether the patch is stale and report the
    /// outcome; a skipped patch is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDirectoryError::Rejected`] when the project refuses
    /// the update.
    async fn apply(
        &self,
        patch: &SummaryPatch,
    ) -> ProjectDirectoryResult<PropagationOutcome>;

    /// Returns the project's current summary.
    ///
    /// Returns `None` when no build has propagated to the project yet.
    async fn summary_of(
        &self,
        project_id: ProjectId,
    ) -> ProjectDirectoryResult<Option<ProjectSummary>>;
}

/// Errors returned by project directory implementations.
#[derive(Debug, Clone, Error)]
pub enum ProjectDirectoryError {
    /// The project refused the summary update.
    #[error("project {project_id} rejected summary update: {reason}")]
    Rejected {
        /// Project that refused the update.
        project_id: ProjectId,
        /// Why the update was refused.
        reason: String,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ProjectDirectoryError {
    /// Wraps a persistence error.
    #[must_use]
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Describes a refused update.
    #[must_use]
    pub fn rejected(project_id: ProjectId, reason: impl Into<String>) -> Self {
        Self::Rejected {
            project_id,
            reason: reason.into(),
        }
    }
}
