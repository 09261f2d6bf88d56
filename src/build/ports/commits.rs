//! Commit directory port for branch lookups.

use crate::build::domain::{BranchName, CommitId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for commit directory operations.
pub type CommitDirectoryResult<T> = Result<T, CommitDirectoryError>;

/// Contract for resolving the branch a commit belongs to.
#[async_trait]
pub trait CommitDirectory: Send + Sync {
    /// Returns the branch recorded for a commit.
    ///
    /// Returns `None` when the commit is unknown or carries no branch.
    async fn branch_of(&self, commit_id: CommitId)
    -> CommitDirectoryResult<Option<BranchName>>;
}

/// Errors returned by commit directory implementations.
#[derive(Debug, Clone, Error)]
pub enum CommitDirectoryError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl CommitDirectoryError {
    /// Wraps a persistence error.
    #[must_use]
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
