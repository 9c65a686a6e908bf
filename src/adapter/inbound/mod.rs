//! Inbound adapters (driving side): the CLI and the HTTP surface.

pub mod cli;
pub mod http;
