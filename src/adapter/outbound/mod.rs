//! Outbound adapters (driven side).

pub mod contract;
pub mod http;
pub mod llm;
pub mod memory;
pub mod predictor;
pub mod search;
pub mod sentiment;
pub mod source;
pub mod sqlite;
