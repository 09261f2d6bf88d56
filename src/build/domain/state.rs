//! Build lifecycle states and events.

use serde::{Deserialize, Serialize};

use super::ids::StatusCode;

/// Lifecycle states a build moves through.
///
/// Builds only ever move forward: created, then started, then finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildState {
    /// The build exists and has a number, but no work has begun.
    Created,
    /// Work on the build's matrix is under way.
    Started,
    /// Every matrix job has completed and the outcome is recorded.
    Finished,
}

impl BuildState {
    /// Returns the canonical name of the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Started => "started",
            Self::Finished => "finished",
        }
    }

    /// Returns `true` when the state accepts no further events.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl std::fmt::Display for BuildState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle events a build can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildEvent {
    /// Work on the build has begun.
    Start,
    /// The build has completed with the given aggregate status.
    Finish(StatusCode),
}

impl BuildEvent {
    /// Returns the event's kind, independent of any payload.
    #[must_use]
    pub const fn kind(self) -> BuildEventKind {
        match self {
            Self::Start => BuildEventKind::Start,
            Self::Finish(_) => BuildEventKind::Finish,
        }
    }
}

/// Discriminant of a [`BuildEvent`], used in error reporting and when
/// projecting summary updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildEventKind {
    /// A start event.
    Start,
    /// A finish event.
    Finish,
}

impl BuildEventKind {
    /// Returns the canonical name of the event kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Finish => "finish",
        }
    }
}

impl std::fmt::Display for BuildEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
