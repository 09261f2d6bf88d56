//! Thread-safe in-memory implementations of the build ports.

pub mod build;
pub mod commits;
pub mod project;

pub use build::InMemoryBuildRepository;
pub use commits::InMemoryCommitDirectory;
pub use project::InMemoryProjectDirectory;
