//! Port contracts for build lifecycle tracking.
//!
//! Ports define infrastructure-agnostic interfaces used by build services.

pub mod commits;
pub mod policy;
pub mod project;
pub mod repository;

pub use commits::{CommitDirectory, CommitDirectoryError, CommitDirectoryResult};
pub use policy::{StatusPolicy, WorstOutcome};
pub use project::{ProjectDirectory, ProjectDirectoryError, ProjectDirectoryResult};
pub use repository::{BuildRepository, BuildRepositoryError, BuildRepositoryResult};
