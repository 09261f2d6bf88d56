//! Service layer for build lifecycle transitions.

use crate::build::{
    domain::{
        Build, BuildEvent, BuildId, BuildState, JobId, JobProgress, JobProgressError,
        MatrixTracker, StatusCode, TransitionError,
    },
    ports::{
        BuildRepository, BuildRepositoryError, ProjectDirectory, ProjectDirectoryError,
        StatusPolicy,
    },
};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

use super::propagation::PropagationService;

/// An executor's progress report for one matrix job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobReport {
    job_id: JobId,
    progress: JobProgress,
}

impl JobReport {
    /// Describes an executor starting a job.
    #[must_use]
    pub const fn started(job_id: JobId) -> Self {
        Self {
            job_id,
            progress: JobProgress::Started,
        }
    }

    /// Describes an executor finishing a job with the given status.
    #[must_use]
    pub const fn finished(job_id: JobId, status: StatusCode) -> Self {
        Self {
            job_id,
            progress: JobProgress::Finished(status),
        }
    }

    /// Returns the job the report concerns.
    #[must_use]
    pub const fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Returns the reported progress.
    #[must_use]
    pub const fn progress(&self) -> JobProgress {
        self.progress
    }
}

/// Result of recording a job report against its build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobReportOutcome {
    /// The report was recorded; the matrix is still running.
    Recorded(Build),
    /// The report completed the matrix and the build finished.
    Finished(Build),
}

impl JobReportOutcome {
    /// Returns the build after the report was recorded.
    #[must_use]
    pub const fn build(&self) -> &Build {
        match self {
            Self::Recorded(build) | Self::Finished(build) => build,
        }
    }

    /// Returns `true` when the report completed the matrix.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Finished(_))
    }
}

/// Service-level errors for build transitions.
#[derive(Debug, Error)]
pub enum BuildTransitionError {
    /// The build rejected the lifecycle event.
    #[error(transparent)]
    Transition(#[from] TransitionError),
    /// A matrix job rejected the progress report.
    #[error(transparent)]
    Job(#[from] JobProgressError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] BuildRepositoryError),
    /// The owning project rejected or failed the summary update.
    #[error("summary propagation failed: {0}")]
    Propagation(#[source] ProjectDirectoryError),
    /// No build exists with the given identifier.
    #[error("unknown build: {0}")]
    UnknownBuild(BuildId),
    /// No build owns the given job.
    #[error("unknown job: {0}")]
    UnknownJob(JobId),
}

/// Result type for build transition operations.
pub type BuildTransitionResult<T> = Result<T, BuildTransitionError>;

/// Build lifecycle transition service.
///
/// Every transition runs inside a per-build critical section: the build is
/// loaded, mutated, propagated, and committed while holding the build's
/// async lock, so concurrent reports and lifecycle events serialise and the
/// finish transition fires exactly once. Propagation happens before the
/// commit; a rejected summary update leaves the build unchanged in the
/// store, and the event can be replayed. A build's lock entry is retired
/// from the registry once the build reaches a terminal state.
#[derive(Clone)]
pub struct BuildTransitionService<R, P, S, C>
where
    R: BuildRepository,
    P: ProjectDirectory,
    S: StatusPolicy,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    propagation: PropagationService<P>,
    policy: Arc<S>,
    clock: Arc<C>,
    locks: Arc<Mutex<HashMap<BuildId, Arc<tokio::sync::Mutex<()>>>>>,
}

impl<R, P, S, C> BuildTransitionService<R, P, S, C>
where
    R: BuildRepository,
    P: ProjectDirectory,
    S: StatusPolicy,
    C: Clock + Send + Sync,
{
    /// Creates a new build transition service.
    #[must_use]
    pub fn new(repository: Arc<R>, projects: Arc<P>, policy: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            repository,
            propagation: PropagationService::new(projects),
            policy,
            clock,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Marks a build as started and propagates its summary.
    ///
    /// # Errors
    ///
    /// Returns [`BuildTransitionError::UnknownBuild`] when the build does
    /// not exist, [`BuildTransitionError::Transition`] when the build is
    /// not in a startable state, and [`BuildTransitionError::Propagation`]
    /// when the owning project refuses the update, in which case the build
    /// is left unchanged.
    pub async fn start(&self, build_id: BuildId) -> BuildTransitionResult<Build> {
        self.transition(build_id, BuildEvent::Start).await
    }

    /// Marks a build as finished with the given status and propagates its
    /// summary.
    ///
    /// The finish is only accepted once every matrix job has recorded an
    /// outcome; a build with an empty matrix may finish as soon as it has
    /// started.
    ///
    /// # Errors
    ///
    /// Returns [`BuildTransitionError::UnknownBuild`] when the build does
    /// not exist, [`BuildTransitionError::Transition`] when the build is
    /// not started or jobs are still outstanding, and
    /// [`BuildTransitionError::Propagation`] when the owning project
    /// refuses the update, in which case the build is left unchanged.
    pub async fn finish(
        &self,
        build_id: BuildId,
        status: StatusCode,
    ) -> BuildTransitionResult<Build> {
        self.transition(build_id, BuildEvent::Finish(status)).await
    }

    /// Records an executor's progress report against its build.
    ///
    /// When the report completes the matrix of a started build, the build
    /// finishes in the same step: the aggregate status is folded from the
    /// job outcomes, the summary propagates, and the job progress and the
    /// finish commit as one update. A rejected propagation therefore leaves
    /// the store untouched and the report can be retried.
    ///
    /// # Errors
    ///
    /// Returns [`BuildTransitionError::UnknownJob`] when no build owns the
    /// job, [`BuildTransitionError::Job`] when the job rejects the report,
    /// and [`BuildTransitionError::Propagation`] when the finish could not
    /// propagate.
    pub async fn report_job(&self, report: JobReport) -> BuildTransitionResult<JobReportOutcome> {
        // Jobs never move between builds, so the owner can be resolved
        // before entering the build's critical section.
        let owner = self
            .repository
            .find_by_job(report.job_id())
            .await?
            .ok_or(BuildTransitionError::UnknownJob(report.job_id()))?;
        let build_id = owner.id();

        let lock = self.lock_for(build_id);
        let _guard = lock.lock().await;
        let mut build = self.load(build_id).await?;
        if build.state().is_terminal() {
            self.retire_lock(build_id);
        }
        build.record_job_progress(report.job_id(), report.progress(), &*self.clock)?;

        if build.state() == BuildState::Started && MatrixTracker::is_complete(&build) {
            let outcomes = MatrixTracker::outcomes(&build);
            let status = self.policy.aggregate(&outcomes);
            let patch = build.apply(BuildEvent::Finish(status), &*self.clock)?;
            self.propagation
                .propagate(&patch)
                .await
                .map_err(BuildTransitionError::Propagation)?;
            self.repository.update(&build).await?;
            self.retire_lock(build_id);
            return Ok(JobReportOutcome::Finished(build));
        }

        self.repository.update(&build).await?;
        Ok(JobReportOutcome::Recorded(build))
    }

    async fn transition(
        &self,
        build_id: BuildId,
        event: BuildEvent,
    ) -> BuildTransitionResult<Build> {
        let lock = self.lock_for(build_id);
        let _guard = lock.lock().await;
        let mut build = self.load(build_id).await?;
        if build.state().is_terminal() {
            self.retire_lock(build_id);
        }
        let patch = build.apply(event, &*self.clock)?;
        self.propagation
            .propagate(&patch)
            .await
            .map_err(BuildTransitionError::Propagation)?;
        self.repository.update(&build).await?;
        if build.state().is_terminal() {
            self.retire_lock(build_id);
        }
        Ok(build)
    }

    async fn load(&self, build_id: BuildId) -> BuildTransitionResult<Build> {
        self.repository
            .find_by_id(build_id)
            .await?
            .ok_or(BuildTransitionError::UnknownBuild(build_id))
    }

    fn lock_for(&self, build_id: BuildId) -> Arc<tokio::sync::Mutex<()>> {
        let mut registry = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        registry.entry(build_id).or_default().clone()
    }

    fn retire_lock(&self, build_id: BuildId) {
        // Terminal builds reject every event before any write, so callers
        // arriving after the removal cannot mutate behind a fresh lock.
        let mut registry = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        registry.remove(&build_id);
    }

    #[cfg(test)]
    pub(crate) fn lock_count(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
