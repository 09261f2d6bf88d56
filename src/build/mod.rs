//! Build lifecycle bounded context.
//!
//! This module owns everything a build does between request and completion:
//! sequence number allocation within a project, expansion of the build
//! configuration into a matrix of jobs, the created/started/finished state
//! machine, and the denormalised summary pushed onto the owning project
//! whenever a build starts or finishes.
//!
//! The module follows hexagonal architecture:
//!
//! - [`domain`]: Pure build logic (state machine, matrix expansion,
//!   completion tracking, summary projection)
//! - [`ports`]: Abstract interfaces for persistence and project lookups
//! - [`adapters`]: Concrete port implementations
//! - [`services`]: Orchestration of creation, transitions, and queries

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
