//! Matrix jobs and their progress reports.

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

use super::error::JobProgressError;
use super::expander::JobSpec;
use super::ids::{BuildId, JobId, StatusCode};

/// Lifecycle states a matrix job moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// The job exists but no progress has been reported.
    Created,
    /// An executor has reported starting the job.
    Started,
    /// An executor has reported the job's outcome.
    Finished,
}

impl JobState {
    /// Returns the canonical name of the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Started => "started",
            Self::Finished => "finished",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress reported for a matrix job by an external executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobProgress {
    /// The executor has begun running the job.
    Started,
    /// The executor finished the job with the given status.
    Finished(StatusCode),
}

/// One parallel unit of work within a build's matrix.
///
/// Jobs are created alongside their build and only ever move forward.
/// A finish report is accepted from either earlier state, since the start
/// report may be lost or arrive out of order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixJob {
    id: JobId,
    build_id: BuildId,
    position: usize,
    spec: JobSpec,
    state: JobState,
    status: Option<StatusCode>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl MatrixJob {
    /// Creates a job at the given one-based matrix position.
    #[must_use]
    pub fn new(build_id: BuildId, position: usize, spec: JobSpec) -> Self {
        Self {
            id: JobId::new(),
            build_id,
            position,
            spec,
            state: JobState::Created,
            status: None,
            started_at: None,
            finished_at: None,
        }
    }

    /// Returns the job's identifier.
    #[must_use]
    pub const fn id(&self) -> JobId {
        self.id
    }

    /// Returns the identifier of the owning build.
    #[must_use]
    pub const fn build_id(&self) -> BuildId {
        self.build_id
    }

    /// Returns the job's one-based position within the matrix.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Returns the job's resolved specification.
    #[must_use]
    pub const fn spec(&self) -> &JobSpec {
        &self.spec
    }

    /// Returns the job's current state.
    #[must_use]
    pub const fn state(&self) -> JobState {
        self.state
    }

    /// Returns the job's recorded outcome, if it has finished.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Returns when the job's start report was recorded.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Returns when the job's finish report was recorded.
    #[must_use]
    pub const fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Returns `true` once the job has recorded its outcome.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self.state, JobState::Finished)
    }

    /// Applies a progress report to the job.
    ///
    /// # Errors
    ///
    /// Returns [`JobProgressError::InvalidTransition`] when the report
    /// would move the job backwards or repeat a finish.
    pub fn record(
        &mut self,
        progress: JobProgress,
        clock: &impl Clock,
    ) -> Result<(), JobProgressError> {
        match progress {
            JobProgress::Started => self.record_started(clock),
            JobProgress::Finished(status) => self.record_finished(status, clock),
        }
    }

    fn record_started(&mut self, clock: &impl Clock) -> Result<(), JobProgressError> {
        if self.state != JobState::Created {
            return Err(JobProgressError::InvalidTransition {
                job_id: self.id,
                from: self.state,
                to: JobState::Started,
            });
        }
        self.state = JobState::Started;
        self.started_at = Some(clock.utc());
        Ok(())
    }

    fn record_finished(
        &mut self,
        status: StatusCode,
        clock: &impl Clock,
    ) -> Result<(), JobProgressError> {
        if self.state == JobState::Finished {
            return Err(JobProgressError::InvalidTransition {
                job_id: self.id,
                from: self.state,
                to: JobState::Finished,
            });
        }
        self.state = JobState::Finished;
        self.status = Some(status);
        self.finished_at = Some(clock.utc());
        Ok(())
    }
}
