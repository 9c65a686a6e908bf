//! Factory modules for building infrastructure components.
//!
//! Provides factory functions that construct fully-configured infrastructure
//! components from application configuration. These factories handle
//! dependency injection and wiring.
//!
//! # Submodules
//!
//! - [`contract`] - Market contract construction
//! - [`llm`] - LLM client construction
//! - [`persistence`] - Database and store construction
//! - [`source`] - Signal sources, sentiment scorer and web search

pub mod contract;
pub mod llm;
pub mod persistence;
pub mod source;

#[cfg(test)]
mod tests;
