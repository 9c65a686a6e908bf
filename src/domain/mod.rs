//! Source-agnostic domain logic: topics, proposals, the creation workflow
//! and the scoring rules that tie them together.

pub mod date;
pub mod error;
pub mod id;
pub mod market;
pub mod prediction;
pub mod proposal;
pub mod score;
pub mod sentiment;
pub mod signal;
pub mod text;
pub mod topic;
pub mod workflow;

pub use error::DomainError;
pub use id::{MarketId, ProposalId, SessionId, TopicId};
pub use market::{Market, Outcome};
pub use prediction::{Prediction, PredictionRequest};
pub use proposal::{MarketProposal, ProposalDraft, ProposalStatus, RealtimeContext};
pub use score::{confidence_score, ScoreInputs};
pub use sentiment::Sentiment;
pub use signal::{AssetClass, FetchParams, NewsArticle, Quote, RawItem, SocialPost};
pub use topic::{Category, SourceKind, TopicAnalysis, TrendingTopic};
pub use workflow::{
    Intent, MarketCreationStep, SessionStatus, StepName, StepRules, Submission, ValidationResult,
    WorkflowSession,
};
