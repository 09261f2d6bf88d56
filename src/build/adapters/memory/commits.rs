//! In-memory commit directory for query tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::build::{
    domain::{BranchName, CommitId},
    ports::{CommitDirectory, CommitDirectoryError, CommitDirectoryResult},
};

/// Thread-safe in-memory commit directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCommitDirectory {
    state: Arc<RwLock<HashMap<CommitId, BranchName>>>,
}

impl InMemoryCommitDirectory {
    /// Creates an empty in-memory directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the branch a commit belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`CommitDirectoryError::Persistence`] when the directory's
    /// lock is poisoned.
    pub fn record(&self, commit_id: CommitId, branch: BranchName) -> CommitDirectoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            CommitDirectoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        state.insert(commit_id, branch);
        Ok(())
    }
}

#[async_trait]
impl CommitDirectory for InMemoryCommitDirectory {
    async fn branch_of(
        &self,
        commit_id: CommitId,
    ) -> CommitDirectoryResult<Option<BranchName>> {
        let state = self.state.read().map_err(|err| {
            CommitDirectoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.get(&commit_id).cloned())
    }
}
