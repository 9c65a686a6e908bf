//! Trendsmith - trend-driven prediction market proposals.
//!
//! Collects trending topics from social, news and market-data sources,
//! turns them into prediction market proposals with an LLM (or
//! deterministic templates), guides users through a step-by-step market
//! creation workflow and settles expired markets from web evidence.
//!
//! # Architecture
//!
//! - [`domain`] - Topics, proposals, sessions, scoring and text rules
//! - [`port`] - Traits for sources, LLMs, search, prediction, contract and storage
//! - [`adapter`] - Implementations of those traits plus the CLI and HTTP surface
//! - [`application`] - Aggregation, generation, workflow, resolution and the pipeline
//! - [`infrastructure`] - Configuration, wiring and the scheduler
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use trendsmith::infrastructure::bootstrap;
//! use trendsmith::infrastructure::config::settings::Config;
//!
//! # async fn run() -> trendsmith::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! let ctx = bootstrap::build(&config, false)?;
//! let proposals = ctx.generator.generate_for_query("bitcoin", Some(2)).await;
//! println!("{} proposals", proposals.len());
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
