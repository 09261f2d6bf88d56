//! In-memory repository for build lifecycle tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::build::{
    domain::{Build, BuildId, BuildNumber, JobId, ProjectId},
    ports::{BuildRepository, BuildRepositoryError, BuildRepositoryResult},
};

/// Thread-safe in-memory build repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBuildRepository {
    state: Arc<RwLock<InMemoryBuildState>>,
}

#[derive(Debug, Default)]
struct InMemoryBuildState {
    builds: HashMap<BuildId, Build>,
    insertion_order: Vec<BuildId>,
    job_index: HashMap<JobId, BuildId>,
    numbers: HashSet<(ProjectId, BuildNumber)>,
}

impl InMemoryBuildRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BuildRepository for InMemoryBuildRepository {
    async fn store(&self, build: &Build) -> BuildRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            BuildRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if state.builds.contains_key(&build.id()) {
            return Err(BuildRepositoryError::DuplicateBuild(build.id()));
        }
        let slot = (build.project_id(), build.number());
        if state.numbers.contains(&slot) {
            return Err(BuildRepositoryError::DuplicateNumber {
                project_id: build.project_id(),
                number: build.number(),
            });
        }

        state.numbers.insert(slot);
        for job in build.matrix() {
            state.job_index.insert(job.id(), build.id());
        }
        state.insertion_order.push(build.id());
        state.builds.insert(build.id(), build.clone());
        Ok(())
    }

    async fn update(&self, build: &Build) -> BuildRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            BuildRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if !state.builds.contains_key(&build.id()) {
            return Err(BuildRepositoryError::NotFound(build.id()));
        }
        state.builds.insert(build.id(), build.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: BuildId) -> BuildRepositoryResult<Option<Build>> {
        let state = self.state.read().map_err(|err| {
            BuildRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.builds.get(&id).cloned())
    }

    async fn find_by_job(&self, job_id: JobId) -> BuildRepositoryResult<Option<Build>> {
        let state = self.state.read().map_err(|err| {
            BuildRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state
            .job_index
            .get(&job_id)
            .and_then(|build_id| state.builds.get(build_id))
            .cloned())
    }

    async fn max_number(
        &self,
        project_id: ProjectId,
    ) -> BuildRepositoryResult<Option<BuildNumber>> {
        let state = self.state.read().map_err(|err| {
            BuildRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state
            .builds
            .values()
            .filter(|build| build.project_id() == project_id)
            .map(Build::number)
            .max())
    }

    async fn list_all(&self) -> BuildRepositoryResult<Vec<Build>> {
        let state = self.state.read().map_err(|err| {
            BuildRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state
            .insertion_order
            .iter()
            .filter_map(|id| state.builds.get(id).cloned())
            .collect())
    }
}
