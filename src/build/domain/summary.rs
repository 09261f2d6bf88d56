//! Denormalised build summaries propagated onto projects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{BuildId, BuildNumber, ProjectId, StatusCode};

/// Summary fields written by one lifecycle event.
///
/// Each event overwrites only its own fields: a start leaves the previous
/// build's outcome in place until the new build finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummaryFields {
    /// Fields written when a build starts.
    Started {
        /// Identifier of the build that started.
        last_build_id: BuildId,
        /// Sequence number of the build that started.
        last_build_number: BuildNumber,
        /// When the build started.
        last_build_started_at: DateTime<Utc>,
    },
    /// Fields written when a build finishes.
    Finished {
        /// Aggregate outcome of the finished build.
        last_build_status: Option<StatusCode>,
        /// When the build finished.
        last_build_finished_at: DateTime<Utc>,
    },
}

/// One summary update destined for a build's owning project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryPatch {
    project_id: ProjectId,
    build_number: BuildNumber,
    fields: SummaryFields,
}

impl SummaryPatch {
    /// Creates a patch carrying the given fields.
    #[must_use]
    pub const fn new(
        project_id: ProjectId,
        build_number: BuildNumber,
        fields: SummaryFields,
    ) -> Self {
        Self {
            project_id,
            build_number,
            fields,
        }
    }

    /// Returns the project the patch applies to.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the sequence number of the build that produced the patch.
    #[must_use]
    pub const fn build_number(&self) -> BuildNumber {
        self.build_number
    }

    /// Returns the fields the patch writes.
    #[must_use]
    pub const fn fields(&self) -> SummaryFields {
        self.fields
    }
}

/// Result of applying a summary patch to a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationOutcome {
    /// The patch was written to the project's summary.
    Applied,
    /// The patch came from an older build than the summary already shows
    /// and was skipped.
    StaleSkipped,
}

/// Denormalised view of a project's most recent build.
///
/// Patches from builds numbered below the one the summary already shows are
/// skipped, so a late event from an old build cannot roll the summary back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    last_build_id: Option<BuildId>,
    last_build_number: Option<BuildNumber>,
    last_build_started_at: Option<DateTime<Utc>>,
    last_build_status: Option<StatusCode>,
    last_build_finished_at: Option<DateTime<Utc>>,
}

impl ProjectSummary {
    /// Returns the identifier of the most recent build to start.
    #[must_use]
    pub const fn last_build_id(&self) -> Option<BuildId> {
        self.last_build_id
    }

    /// Returns the sequence number of the most recent build to start.
    #[must_use]
    pub const fn last_build_number(&self) -> Option<BuildNumber> {
        self.last_build_number
    }

    /// Returns when the most recent build started.
    #[must_use]
    pub const fn last_build_started_at(&self) -> Option<DateTime<Utc>> {
        self.last_build_started_at
    }

    /// Returns the outcome of the most recent build to finish.
    #[must_use]
    pub const fn last_build_status(&self) -> Option<StatusCode> {
        self.last_build_status
    }

    /// Returns when the most recent build finished.
    #[must_use]
    pub const fn last_build_finished_at(&self) -> Option<DateTime<Utc>> {
        self.last_build_finished_at
    }

    /// Applies a patch, skipping it when it is stale.
    #[must_use]
    pub fn apply(&mut self, patch: &SummaryPatch) -> PropagationOutcome {
        if self
            .last_build_number
            .is_some_and(|recorded| patch.build_number() < recorded)
        {
            return PropagationOutcome::StaleSkipped;
        }
        match patch.fields() {
            SummaryFields::Started {
                last_build_id,
                last_build_number,
                last_build_started_at,
            } => {
                self.last_build_id = Some(last_build_id);
                self.last_build_number = Some(last_build_number);
                self.last_build_started_at = Some(last_build_started_at);
            }
            SummaryFields::Finished {
                last_build_status,
                last_build_finished_at,
            } => {
                self.last_build_status = last_build_status;
                self.last_build_finished_at = Some(last_build_finished_at);
            }
        }
        PropagationOutcome::Applied
    }
}
