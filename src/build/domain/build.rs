//! The build aggregate and its state machine.

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

use super::config::BuildConfig;
use super::error::{JobProgressError, TransitionError};
use super::expander::JobSpec;
use super::ids::{BuildId, BuildNumber, CommitId, JobId, ProjectId, RequestId, StatusCode};
use super::job::{JobProgress, MatrixJob};
use super::state::{BuildEvent, BuildState};
use super::summary::{SummaryFields, SummaryPatch};
use super::tracker::MatrixTracker;

/// Inputs for constructing a new build.
#[derive(Debug, Clone)]
pub struct NewBuildParams {
    /// Project that owns the build.
    pub project_id: ProjectId,
    /// Request that triggered the build.
    pub request_id: RequestId,
    /// Commit the build tests.
    pub commit_id: CommitId,
    /// Sequence number reserved for the build.
    pub number: BuildNumber,
    /// Normalised build configuration.
    pub config: BuildConfig,
    /// Resolved specification for each matrix job, in matrix order.
    pub specs: Vec<JobSpec>,
}

/// A single run of a project's test suite against one commit.
///
/// A build owns its matrix of jobs and enforces the forward-only lifecycle:
/// a start event is accepted once from [`BuildState::Created`], and a finish
/// event is accepted once from [`BuildState::Started`] provided every matrix
/// job has recorded an outcome. Everything else is rejected, so replayed or
/// out-of-order events cannot corrupt a build's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    id: BuildId,
    project_id: ProjectId,
    request_id: RequestId,
    commit_id: CommitId,
    number: BuildNumber,
    state: BuildState,
    status: Option<StatusCode>,
    config: BuildConfig,
    matrix: Vec<MatrixJob>,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl Build {
    /// Creates a build with one matrix job per specification.
    ///
    /// Jobs take their one-based positions from the order of the supplied
    /// specifications.
    #[must_use]
    pub fn new(params: NewBuildParams, clock: &impl Clock) -> Self {
        let id = BuildId::new();
        let matrix = params
            .specs
            .into_iter()
            .zip(1..)
            .map(|(spec, position)| MatrixJob::new(id, position, spec))
            .collect();
        Self {
            id,
            project_id: params.project_id,
            request_id: params.request_id,
            commit_id: params.commit_id,
            number: params.number,
            state: BuildState::Created,
            status: None,
            config: params.config,
            matrix,
            created_at: clock.utc(),
            started_at: None,
            finished_at: None,
        }
    }

    /// Returns the build's identifier.
    #[must_use]
    pub const fn id(&self) -> BuildId {
        self.id
    }

    /// Returns the identifier of the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the identifier of the triggering request.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the identifier of the commit under test.
    #[must_use]
    pub const fn commit_id(&self) -> CommitId {
        self.commit_id
    }

    /// Returns the build's sequence number within its project.
    #[must_use]
    pub const fn number(&self) -> BuildNumber {
        self.number
    }

    /// Returns the build's current state.
    #[must_use]
    pub const fn state(&self) -> BuildState {
        self.state
    }

    /// Returns the build's aggregate outcome, if it has finished.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Returns the build's normalised configuration.
    #[must_use]
    pub const fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Returns the build's matrix jobs in position order.
    #[must_use]
    pub const fn matrix(&self) -> &[MatrixJob] {
        self.matrix.as_slice()
    }

    /// Returns the matrix job with the given identifier, if any.
    #[must_use]
    pub fn job(&self, job_id: JobId) -> Option<&MatrixJob> {
        self.matrix.iter().find(|candidate| candidate.id() == job_id)
    }

    /// Returns when the build was created.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the build started, if it has.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Returns when the build finished, if it has.
    #[must_use]
    pub const fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Returns `true` until the build records its outcome.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        !matches!(self.state, BuildState::Finished)
    }

    /// Returns `true` when the recorded outcome is a pass.
    #[must_use]
    pub const fn passed(&self) -> bool {
        match self.status {
            Some(status) => status.is_passed(),
            None => false,
        }
    }

    /// Returns a human-readable outcome label.
    #[must_use]
    pub const fn status_message(&self) -> &'static str {
        if self.passed() { "Passed" } else { "Failed" }
    }

    /// Returns the display colour for the build's outcome, or an empty
    /// string while the outcome is pending.
    #[must_use]
    pub const fn color(&self) -> &'static str {
        if self.is_pending() {
            ""
        } else if self.passed() {
            "green"
        } else {
            "red"
        }
    }

    /// Applies a lifecycle event to the build.
    ///
    /// An accepted event returns the summary patch it projects onto the
    /// owning project, carrying exactly the fields that event denormalises.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::InvalidTransition`] when the event is not
    /// accepted from the current state, and
    /// [`TransitionError::GuardNotSatisfied`] when a finish event arrives
    /// while matrix jobs are still outstanding.
    pub fn apply(
        &mut self,
        event: BuildEvent,
        clock: &impl Clock,
    ) -> Result<SummaryPatch, TransitionError> {
        match (self.state, event) {
            (BuildState::Created, BuildEvent::Start) => {
                let at = clock.utc();
                self.state = BuildState::Started;
                self.started_at = Some(at);
                Ok(SummaryPatch::new(
                    self.project_id,
                    self.number,
                    SummaryFields::Started {
                        last_build_id: self.id,
                        last_build_number: self.number,
                        last_build_started_at: at,
                    },
                ))
            }
            (BuildState::Started, BuildEvent::Finish(status)) => {
                let unfinished = MatrixTracker::unfinished(self);
                if unfinished > 0 {
                    return Err(TransitionError::GuardNotSatisfied {
                        build_id: self.id,
                        unfinished,
                    });
                }
                let at = clock.utc();
                self.state = BuildState::Finished;
                self.status = Some(status);
                self.finished_at = Some(at);
                Ok(SummaryPatch::new(
                    self.project_id,
                    self.number,
                    SummaryFields::Finished {
                        last_build_status: self.status,
                        last_build_finished_at: at,
                    },
                ))
            }
            (from, rejected) => Err(TransitionError::InvalidTransition {
                build_id: self.id,
                from,
                event: rejected.kind(),
            }),
        }
    }

    /// Applies an executor's progress report to one matrix job.
    ///
    /// # Errors
    ///
    /// Returns [`JobProgressError::UnknownJob`] when the job does not belong
    /// to this build, and [`JobProgressError::InvalidTransition`] when the
    /// job rejects the report.
    pub fn record_job_progress(
        &mut self,
        job_id: JobId,
        progress: JobProgress,
        clock: &impl Clock,
    ) -> Result<(), JobProgressError> {
        let build_id = self.id;
        let job = self
            .matrix
            .iter_mut()
            .find(|candidate| candidate.id() == job_id)
            .ok_or(JobProgressError::UnknownJob { build_id, job_id })?;
        job.record(progress, clock)
    }
}
