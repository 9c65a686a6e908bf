//! Web search adapters.

pub mod serpapi;

pub use serpapi::SerpApiSearch;
