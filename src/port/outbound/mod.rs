//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe infrastructure dependencies such as signal
//! sources, text generation, search, the market contract and storage.

pub mod contract;
pub mod llm;
pub mod predictor;
pub mod search;
pub mod sentiment;
pub mod source;
pub mod store;
