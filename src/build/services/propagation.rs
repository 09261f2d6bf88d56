//! Delivery of summary patches to owning projects.

use crate::build::{
    domain::{PropagationOutcome, SummaryPatch},
    ports::{ProjectDirectory, ProjectDirectoryResult},
};
use std::sync::Arc;

/// Delivers summary patches to the project directory.
///
/// The service is the single seam between build transitions and project
/// state. Patches are produced by the build state machine; the directory
/// decides whether each one still applies.
#[derive(Clone)]
pub struct PropagationService<P>
where
    P: ProjectDirectory,
{
    projects: Arc<P>,
}

impl<P> PropagationService<P>
where
    P: ProjectDirectory,
{
    /// Creates a propagation service backed by the given directory.
    #[must_use]
    pub const fn new(projects: Arc<P>) -> Self {
        Self { projects }
    }

    /// Applies a patch to the project it names.
    ///
    /// A stale patch that the directory skips is a success, not an error;
    /// the returned outcome says which of the two happened.
    ///
    /// # Errors
    ///
    /// Returns [`crate::build::ports::ProjectDirectoryError`] when the
    /// directory refuses or fails to record the update.
    pub async fn propagate(
        &self,
        patch: &SummaryPatch,
    ) -> ProjectDirectoryResult<PropagationOutcome> {
        self.projects.apply(patch).await
    }
}
