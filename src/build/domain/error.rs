//! Error types for build domain operations.

use thiserror::Error;

use super::ids::{BuildId, JobId};
use super::job::JobState;
use super::state::{BuildEventKind, BuildState};

/// Errors raised while validating build domain values.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BuildDomainError {
    /// A configuration key was empty after trimming whitespace.
    #[error("configuration keys must not be empty")]
    EmptyConfigKey,
    /// A branch name was empty after trimming whitespace.
    #[error("branch names must not be empty")]
    EmptyBranchName,
}

/// Errors raised when a build rejects a lifecycle event.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    /// The event is not accepted from the build's current state.
    #[error("build {build_id} cannot accept {event} while {from}")]
    InvalidTransition {
        /// Build that rejected the event.
        build_id: BuildId,
        /// State the build was in.
        from: BuildState,
        /// Event that was rejected.
        event: BuildEventKind,
    },
    /// A finish event arrived while matrix jobs were still outstanding.
    #[error("build {build_id} cannot finish with {unfinished} unfinished jobs")]
    GuardNotSatisfied {
        /// Build that rejected the event.
        build_id: BuildId,
        /// Number of matrix jobs not yet finished.
        unfinished: usize,
    },
}

/// Errors raised when recording progress against a matrix job.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum JobProgressError {
    /// The job does not belong to the build's matrix.
    #[error("build {build_id} has no job {job_id}")]
    UnknownJob {
        /// Build whose matrix was searched.
        build_id: BuildId,
        /// Job that was not found.
        job_id: JobId,
    },
    /// The job is not in a state that accepts the reported progress.
    #[error("job {job_id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Job that rejected the report.
        job_id: JobId,
        /// State the job was in.
        from: JobState,
        /// State the report would have moved it to.
        to: JobState,
    },
}
