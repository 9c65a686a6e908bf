//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters
//! to implement the application's use cases.

pub mod aggregator;
pub mod cycle;
pub mod generator;
pub mod resolver;
pub mod workflow;

pub use aggregator::{AggregatorConfig, TrendAggregator};
pub use cycle::{GenerationReport, Pipeline};
pub use generator::{GeneratorConfig, ProposalGenerator};
pub use resolver::{MarketResolver, ResolutionReport, ResolverConfig};
pub use workflow::{StartOutcome, StepReply, WorkflowConfig, WorkflowService};
