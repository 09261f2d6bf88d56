//! In-memory project directory for propagation tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::build::{
    domain::{ProjectId, ProjectSummary, PropagationOutcome, SummaryPatch},
    ports::{ProjectDirectory, ProjectDirectoryError, ProjectDirectoryResult},
};

/// Thread-safe in-memory project directory.
///
/// Projects come into existence the first time a patch names them, so tests
/// need no separate project setup.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProjectDirectory {
    state: Arc<RwLock<HashMap<ProjectId, ProjectSummary>>>,
}

impl InMemoryProjectDirectory {
    /// Creates an empty in-memory directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectDirectory for InMemoryProjectDirectory {
    async fn apply(
        &self,
        patch: &SummaryPatch,
    ) -> ProjectDirectoryResult<PropagationOutcome> {
        let mut state = self.state.write().map_err(|err| {
            ProjectDirectoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let summary = state.entry(patch.project_id()).or_default();
        Ok(summary.apply(patch))
    }

    async fn summary_of(
        &self,
        project_id: ProjectId,
    ) -> ProjectDirectoryResult<Option<ProjectSummary>> {
        let state = self.state.read().map_err(|err| {
            ProjectDirectoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.get(&project_id).copied())
    }
}
