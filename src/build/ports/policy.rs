//! Status aggregation policy for finished matrices.

use crate::build::domain::StatusCode;

/// Folds per-job outcomes into a build's aggregate status.
pub trait StatusPolicy: Send + Sync {
    /// Aggregates the outcomes of a finished matrix.
    fn aggregate(&self, outcomes: &[StatusCode]) -> StatusCode;
}

/// Policy that reports the worst outcome across the matrix.
///
/// Outcomes are compared numerically, so any failing job fails the build
/// and the largest failure code wins. An empty matrix passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorstOutcome;

impl StatusPolicy for WorstOutcome {
    fn aggregate(&self, outcomes: &[StatusCode]) -> StatusCode {
        outcomes.iter().copied().max().unwrap_or(StatusCode::PASSED)
    }
}
