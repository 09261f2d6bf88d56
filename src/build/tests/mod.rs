//! Unit tests for the build module.
//!
//! Tests are organised by concern:
//! - `state_machine_tests`: Build lifecycle transitions and guards
//! - `config_tests`: Configuration normalisation
//! - `expander_tests`: Matrix expansion
//! - `job_tests`: Matrix job progress recording
//! - `tracker_tests`: Aggregate completion tracking
//! - `policy_tests`: Status aggregation policies
//! - `summary_tests`: Summary patches and stale protection
//! - `allocator_tests`: Build number reservation bookkeeping
//! - `creation_tests`: Build creation orchestration
//! - `transition_tests`: Transition orchestration and propagation
//! - `query_tests`: Read-side listings

#![expect(
    clippy::expect_used,
    reason = "tests construct known-good fixtures and assert on their results"
)]
