//! Infrastructure configuration modules.

pub mod llm;
pub mod logging;
pub mod service;
pub mod settings;
