//! Infrastructure layer.
//!
//! Provides technical concerns that support the application without containing
//! business logic. This layer handles configuration, component wiring and
//! the pipeline schedule.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for runtime wiring
//! - [`config`] - Configuration loading and validation
//! - [`factory`] - Component factory functions
//! - [`scheduler`] - Periodic generation and resolution passes

pub mod bootstrap;
pub mod config;
pub mod factory;
pub mod scheduler;
