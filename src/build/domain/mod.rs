//! Domain model for build lifecycle tracking.
//!
//! The build domain models per-project sequence numbering, matrix expansion,
//! the forward-only build state machine, aggregate completion tracking, and
//! the summary projection propagated onto the owning project, while keeping
//! all infrastructure concerns outside of the domain boundary.

mod build;
mod config;
mod error;
mod expander;
mod ids;
mod job;
mod state;
mod summary;
mod tracker;

pub use build::{Build, NewBuildParams};
pub use config::BuildConfig;
pub use error::{BuildDomainError, JobProgressError, TransitionError};
pub use expander::{JobSpec, MatrixExpander};
pub use ids::{
    BranchName, BuildId, BuildNumber, CommitId, JobId, ProjectId, RequestId, StatusCode,
};
pub use job::{JobProgress, JobState, MatrixJob};
pub use state::{BuildEvent, BuildEventKind, BuildState};
pub use summary::{ProjectSummary, PropagationOutcome, SummaryFields, SummaryPatch};
pub use tracker::MatrixTracker;
