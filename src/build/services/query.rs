//! Read-side queries over stored builds.

use crate::build::{
    domain::{BranchName, Build, BuildState},
    ports::{BuildRepository, BuildRepositoryError, CommitDirectory, CommitDirectoryError},
};
use std::sync::Arc;
use thiserror::Error;

/// Number of builds each listing page adds.
const RECENT_PAGE_SIZE: usize = 10;

/// Service-level errors for build queries.
#[derive(Debug, Error)]
pub enum BuildQueryError {
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] BuildRepositoryError),
    /// Commit directory lookup failed.
    #[error(transparent)]
    Commits(#[from] CommitDirectoryError),
}

/// Result type for build query operations.
pub type BuildQueryResult<T> = Result<T, BuildQueryError>;

/// Read-side build listing service.
#[derive(Clone)]
pub struct BuildQueryService<R, D>
where
    R: BuildRepository,
    D: CommitDirectory,
{
    repository: Arc<R>,
    commits: Arc<D>,
}

impl<R, D> BuildQueryService<R, D>
where
    R: BuildRepository,
    D: CommitDirectory,
{
    /// Creates a new build query service.
    #[must_use]
    pub const fn new(repository: Arc<R>, commits: Arc<D>) -> Self {
        Self { repository, commits }
    }

    /// Returns builds that have started, newest first.
    ///
    /// Pages are cumulative: page `n` returns the newest `10 * n` started
    /// builds, so each page repeats everything the previous one showed.
    /// Builds that have never started are not listed, and page zero is
    /// empty.
    ///
    /// # Errors
    ///
    /// Returns [`BuildQueryError::Repository`] when the listing cannot be
    /// read.
    pub async fn recent(&self, page: usize) -> BuildQueryResult<Vec<Build>> {
        let limit = RECENT_PAGE_SIZE.saturating_mul(page);
        let mut builds = self.repository.list_all().await?;
        builds.reverse();
        Ok(builds
            .into_iter()
            .filter(|build| {
                matches!(build.state(), BuildState::Started | BuildState::Finished)
            })
            .take(limit)
            .collect())
    }

    /// Returns finished builds, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`BuildQueryError::Repository`] when the listing cannot be
    /// read.
    pub async fn finished(&self) -> BuildQueryResult<Vec<Build>> {
        let mut builds = self.repository.list_all().await?;
        builds.reverse();
        Ok(builds
            .into_iter()
            .filter(|build| matches!(build.state(), BuildState::Finished))
            .collect())
    }

    /// Returns builds whose commits sit on any of the given branches, in
    /// creation order.
    ///
    /// Builds whose commits carry no branch record are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`BuildQueryError::Repository`] when the listing cannot be
    /// read and [`BuildQueryError::Commits`] when a branch lookup fails.
    pub async fn on_branch(&self, branches: &[BranchName]) -> BuildQueryResult<Vec<Build>> {
        let builds = self.repository.list_all().await?;
        let mut matching = Vec::new();
        for build in builds {
            if self
                .commits
                .branch_of(build.commit_id())
                .await?
                .is_some_and(|branch| branches.contains(&branch))
            {
                matching.push(build);
            }
        }
        Ok(matching)
    }
}
