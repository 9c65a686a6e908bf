//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`stub`] — Port implementations with scripted behavior: `StubLlm`,
//!   `StubSource`, `StubTrends`, `StubSearch`, `FixedScorer`, `FailingContract`.
//! - [`domain`] — Builders for posts, articles, quotes, proposals and markets.
//! - [`config`] — Canonical test configurations (no backoff, no pacing, dry run).

pub mod config;
pub mod domain;
pub mod stub;
