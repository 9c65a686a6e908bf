//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points in the hexagonal architecture.
//! They are traits that adapters implement to integrate with external
//! systems (trend sources, language models, the market contract, storage).
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │                         │
//!     ┌──────────────┤  Domain + Port          ├──────────────┐
//!     │              │                         │              │
//!     │              └─────────────────────────┘              │
//!     │                         │                             │
//!     ▼                         ▼                             ▼
//! ┌─────────┐            ┌─────────────┐              ┌───────────┐
//! │ Source  │            │   Store     │              │ Contract  │
//! │ Adapter │            │   Adapter   │              │  Adapter  │
//! └─────────┘            └─────────────┘              └───────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`SignalSource`], [`TrendInterestSource`] - Trend signal collection
//! - [`SentimentScorer`] - Text polarity
//! - [`Llm`] - Text generation
//! - [`WebSearch`] - Evidence for market resolution
//! - [`Predictor`] - Probability estimation
//! - [`MarketContract`] - On-chain market reads and writes
//! - [`Store`] - Persistence for topics, proposals and sessions

pub mod outbound;

pub use outbound::contract::MarketContract;
pub use outbound::llm::{GenerationOptions, Llm};
pub use outbound::predictor::Predictor;
pub use outbound::search::{SearchResult, WebSearch};
pub use outbound::sentiment::SentimentScorer;
pub use outbound::source::{SignalSource, TrendInterestSource};
pub use outbound::store::Store;
