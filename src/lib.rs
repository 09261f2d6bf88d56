//! Brunel: CI build lifecycle tracking.
//!
//! This crate provides the core bookkeeping for continuous-integration
//! builds: per-project sequence numbering, matrix expansion into parallel
//! jobs, aggregate completion detection, and propagation of a denormalised
//! build summary onto the owning project.
//!
//! # Architecture
//!
//! Brunel follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports
//!
//! # Modules
//!
//! - [`build`]: Build creation, matrix tracking, lifecycle transitions, and
//!   project summary propagation

pub mod build;
