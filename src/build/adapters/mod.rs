//! Persistence adapters for the build module.
//!
//! This module provides concrete implementations of the build ports,
//! following hexagonal architecture principles. Adapters handle all
//! infrastructure concerns while the domain remains pure.
//!
//! # Available Adapters
//!
//! - [`memory::InMemoryBuildRepository`]: Thread-safe in-memory build storage
//! - [`memory::InMemoryProjectDirectory`]: Thread-safe in-memory project
//!   summaries
//! - [`memory::InMemoryCommitDirectory`]: Thread-safe in-memory commit branch
//!   records

pub mod memory;
