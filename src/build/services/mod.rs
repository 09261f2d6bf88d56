//! Application services for build lifecycle orchestration.

mod allocator;
mod creation;
mod propagation;
mod query;
mod transition;

pub use allocator::{NumberAllocator, NumberReservation};
pub use creation::{
    BuildCreationError, BuildCreationResult, BuildCreationService, CreateBuildRequest,
};
pub use propagation::PropagationService;
pub use query::{BuildQueryError, BuildQueryResult, BuildQueryService};
pub use transition::{
    BuildTransitionError, BuildTransitionResult, BuildTransitionService, JobReport,
    JobReportOutcome,
};
