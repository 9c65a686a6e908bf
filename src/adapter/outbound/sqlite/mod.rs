//! SQLite persistence adapter.
//!
//! Stores topics, proposals and workflow session snapshots using Diesel.
//! Each row keeps a few indexed columns next to the full JSON payload.

pub mod database;
pub mod store;

pub use store::SqliteStore;
