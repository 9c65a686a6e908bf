//! Market proposals and the context they were generated from.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{ProposalId, TopicId};
use super::prediction::Prediction;
use super::sentiment::Sentiment;
use super::signal::{NewsArticle, Quote, SocialPost};
use super::topic::{Category, SourceKind};

pub const MIN_PROBABILITY: f64 = 0.05;
pub const MAX_PROBABILITY: f64 = 0.95;
pub const MIN_CONFIDENCE: f64 = 0.3;
pub const MAX_CONFIDENCE: f64 = 0.9;
pub const MIN_KEY_FACTORS: usize = 2;
pub const MAX_KEY_FACTORS: usize = 5;

const FILLER_FACTORS: &[&str] = &[
    "Official announcements before the end date",
    "Shifts in public sentiment and media coverage",
];

/// Lifecycle of a proposal: `draft -> ready -> created`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    #[default]
    Draft,
    Ready,
    Created,
}

impl ProposalStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ProposalStatus::Draft => "draft",
            ProposalStatus::Ready => "ready",
            ProposalStatus::Created => "created",
        }
    }

    /// Whether the lifecycle allows moving from `self` to `to`.
    #[must_use]
    pub const fn can_transition_to(self, to: ProposalStatus) -> bool {
        matches!(
            (self, to),
            (ProposalStatus::Draft, ProposalStatus::Ready)
                | (ProposalStatus::Draft, ProposalStatus::Created)
                | (ProposalStatus::Ready, ProposalStatus::Created)
        )
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of live data gathered for one generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeContext {
    pub quotes: Vec<Quote>,
    pub posts: Vec<SocialPost>,
    pub headlines: Vec<NewsArticle>,
    /// Source kinds consulted, in the order they were queried.
    pub sources: Vec<SourceKind>,
    /// Prompt lines derived from an aggregated topic, kept verbatim.
    #[serde(default)]
    pub notes: Vec<String>,
    pub captured_at: DateTime<Utc>,
}

impl RealtimeContext {
    /// An empty snapshot captured now.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            quotes: Vec::new(),
            posts: Vec::new(),
            headlines: Vec::new(),
            sources: Vec::new(),
            notes: Vec::new(),
            captured_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty() && self.posts.is_empty() && self.headlines.is_empty()
    }
}

impl Default for RealtimeContext {
    fn default() -> Self {
        Self::empty()
    }
}

/// Unvalidated proposal content, as produced by generation or the workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposalDraft {
    pub title: String,
    pub question: String,
    pub description: String,
    pub background: String,
    pub resolution_criteria: String,
    pub sources: Vec<String>,
    pub end_date: DateTime<Utc>,
    pub category: Category,
    pub probability: f64,
    pub confidence: f64,
    pub sentiment: Sentiment,
    pub key_factors: Vec<String>,
    /// Instant the end date was validated against.
    pub created_at: DateTime<Utc>,
}

impl ProposalDraft {
    /// A draft with neutral estimates around `question`.
    pub fn new(question: impl Into<String>, end_date: DateTime<Utc>) -> Self {
        let question = question.into();
        Self {
            title: question.clone(),
            description: question.clone(),
            question,
            background: String::new(),
            resolution_criteria: String::new(),
            sources: Vec::new(),
            end_date,
            category: Category::General,
            probability: 0.5,
            confidence: MIN_CONFIDENCE,
            sentiment: Sentiment::NEUTRAL,
            key_factors: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

fn normalize_factors(factors: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = factors
        .into_iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .take(MAX_KEY_FACTORS)
        .collect();
    for filler in FILLER_FACTORS {
        if out.len() >= MIN_KEY_FACTORS {
            break;
        }
        if !out.iter().any(|f| f == filler) {
            out.push((*filler).to_string());
        }
    }
    out
}

/// A candidate prediction market.
///
/// Estimates are clamped on every write. Once the status reaches
/// `created`, every mutator returns [`DomainError::Frozen`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketProposal {
    id: ProposalId,
    title: String,
    question: String,
    description: String,
    background: String,
    resolution_criteria: String,
    sources: Vec<String>,
    end_date: DateTime<Utc>,
    category: Category,
    ai_probability: f64,
    ai_confidence: f64,
    sentiment: f64,
    key_factors: Vec<String>,
    risk_factors: Vec<String>,
    data_quality_score: f64,
    status: ProposalStatus,
    created_at: DateTime<Utc>,
    topic_id: Option<TopicId>,
    context: RealtimeContext,
}

impl MarketProposal {
    /// Build a `draft` proposal from unvalidated content.
    #[must_use]
    pub fn new(draft: ProposalDraft, context: RealtimeContext) -> Self {
        Self {
            id: ProposalId::new(),
            title: draft.title,
            question: draft.question,
            description: draft.description,
            background: draft.background,
            resolution_criteria: draft.resolution_criteria,
            sources: draft.sources,
            end_date: draft.end_date,
            category: draft.category,
            ai_probability: clamp_or(draft.probability, MIN_PROBABILITY, MAX_PROBABILITY, 0.5),
            ai_confidence: clamp_or(draft.confidence, MIN_CONFIDENCE, MAX_CONFIDENCE, MIN_CONFIDENCE),
            sentiment: draft.sentiment.unit(),
            key_factors: normalize_factors(draft.key_factors),
            risk_factors: Vec::new(),
            data_quality_score: 0.0,
            status: ProposalStatus::Draft,
            created_at: draft.created_at,
            topic_id: None,
            context,
        }
    }

    #[must_use]
    pub fn with_topic(mut self, topic_id: TopicId) -> Self {
        self.topic_id = Some(topic_id);
        self
    }

    pub fn id(&self) -> &ProposalId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn background(&self) -> &str {
        &self.background
    }

    pub fn resolution_criteria(&self) -> &str {
        &self.resolution_criteria
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn end_date(&self) -> DateTime<Utc> {
        self.end_date
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn ai_probability(&self) -> f64 {
        self.ai_probability
    }

    pub fn ai_confidence(&self) -> f64 {
        self.ai_confidence
    }

    /// Sentiment on the `[0, 1]` scale, 0.5 neutral.
    pub fn sentiment(&self) -> f64 {
        self.sentiment
    }

    pub fn key_factors(&self) -> &[String] {
        &self.key_factors
    }

    pub fn risk_factors(&self) -> &[String] {
        &self.risk_factors
    }

    pub fn data_quality_score(&self) -> f64 {
        self.data_quality_score
    }

    pub fn status(&self) -> ProposalStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn topic_id(&self) -> Option<&TopicId> {
        self.topic_id.as_ref()
    }

    pub fn context(&self) -> &RealtimeContext {
        &self.context
    }

    fn ensure_editable(&self) -> Result<(), DomainError> {
        if self.status == ProposalStatus::Created {
            Err(DomainError::Frozen(self.id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Replace the question; the title follows when it mirrored the question.
    pub fn set_question(&mut self, question: impl Into<String>) -> Result<(), DomainError> {
        self.ensure_editable()?;
        let question = question.into();
        if self.title == self.question {
            self.title = question.clone();
        }
        if self.description == self.question {
            self.description = question.clone();
        }
        self.question = question;
        Ok(())
    }

    pub fn set_end_date(&mut self, end_date: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_editable()?;
        self.end_date = end_date;
        Ok(())
    }

    pub fn set_resolution_criteria(&mut self, criteria: impl Into<String>) -> Result<(), DomainError> {
        self.ensure_editable()?;
        self.resolution_criteria = criteria.into();
        Ok(())
    }

    pub fn set_category(&mut self, category: Category) -> Result<(), DomainError> {
        self.ensure_editable()?;
        self.category = category;
        Ok(())
    }

    /// Fill estimates from a predictor, clamping into range.
    pub fn apply_prediction(&mut self, prediction: Prediction) -> Result<(), DomainError> {
        self.ensure_editable()?;
        self.ai_probability = clamp_or(prediction.probability, MIN_PROBABILITY, MAX_PROBABILITY, 0.5);
        self.ai_confidence = clamp_or(
            prediction.confidence,
            MIN_CONFIDENCE,
            MAX_CONFIDENCE,
            MIN_CONFIDENCE,
        );
        self.key_factors = normalize_factors(prediction.key_factors);
        self.risk_factors = prediction.risk_factors;
        self.data_quality_score = clamp_or(prediction.data_quality_score, 0.0, 1.0, 0.0);
        Ok(())
    }

    /// Move to `to` if the lifecycle allows it.
    pub fn transition(&mut self, to: ProposalStatus) -> Result<(), DomainError> {
        self.ensure_editable()?;
        if !self.status.can_transition_to(to) {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    pub fn mark_ready(&mut self) -> Result<(), DomainError> {
        self.transition(ProposalStatus::Ready)
    }

    pub fn mark_created(&mut self) -> Result<(), DomainError> {
        self.transition(ProposalStatus::Created)
    }
}
