//! Aggregate completion tracking over a build's matrix.

use super::build::Build;
use super::ids::StatusCode;
use super::job::MatrixJob;

/// Inspects a build's matrix for aggregate completion.
///
/// The tracker is the single authority on when a matrix counts as complete:
/// every job must have recorded an outcome. An empty matrix is vacuously
/// complete.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatrixTracker;

impl MatrixTracker {
    /// Returns `true` once every matrix job has recorded an outcome.
    #[must_use]
    pub fn is_complete(build: &Build) -> bool {
        build.matrix().iter().all(MatrixJob::is_finished)
    }

    /// Returns the number of matrix jobs still awaiting an outcome.
    #[must_use]
    pub fn unfinished(build: &Build) -> usize {
        build
            .matrix()
            .iter()
            .filter(|job| !job.is_finished())
            .count()
    }

    /// Returns the recorded outcomes of finished jobs, in matrix order.
    #[must_use]
    pub fn outcomes(build: &Build) -> Vec<StatusCode> {
        build
            .matrix()
            .iter()
            .filter_map(MatrixJob::status)
            .collect()
    }
}
