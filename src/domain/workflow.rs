//! Guided market-creation workflow.
//!
//! A session walks through four fixed steps:
//!
//! 1. `question_clarification` - a yes/no question ending in `?`
//! 2. `timeframe` - a relative duration or an absolute date past the horizon
//! 3. `resolution_criteria` - a sufficiently detailed rule
//! 4. `final_review` - confirm, or hold the proposal for edits
//!
//! Invalid input never moves the session: the current step is re-prompted
//! and no step is appended. A valid answer is recorded exactly once.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::date;
use super::error::DomainError;
use super::id::SessionId;
use super::prediction::Prediction;
use super::proposal::{MarketProposal, ProposalDraft, RealtimeContext};
use super::topic::Category;

/// Name of a workflow step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepName {
    QuestionClarification,
    Timeframe,
    ResolutionCriteria,
    FinalReview,
}

impl StepName {
    /// Fixed step number, 1 through 4.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            StepName::QuestionClarification => 1,
            StepName::Timeframe => 2,
            StepName::ResolutionCriteria => 3,
            StepName::FinalReview => 4,
        }
    }

    #[must_use]
    pub const fn next(self) -> Option<StepName> {
        match self {
            StepName::QuestionClarification => Some(StepName::Timeframe),
            StepName::Timeframe => Some(StepName::ResolutionCriteria),
            StepName::ResolutionCriteria => Some(StepName::FinalReview),
            StepName::FinalReview => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            StepName::QuestionClarification => "question_clarification",
            StepName::Timeframe => "timeframe",
            StepName::ResolutionCriteria => "resolution_criteria",
            StepName::FinalReview => "final_review",
        }
    }

    fn prompt(self, rules: &StepRules) -> String {
        match self {
            StepName::QuestionClarification => {
                "What exactly should the market ask? Phrase it as a yes/no question ending with '?'."
                    .to_string()
            }
            StepName::Timeframe => format!(
                "When should the market close? {}",
                date::FORMAT_HINT
            ),
            StepName::ResolutionCriteria => format!(
                "How will the outcome be decided? Name the source and the rule \
                 (at least {} characters).",
                rules.min_criteria_chars
            ),
            StepName::FinalReview => {
                "Review the proposal. Reply \"confirm\" to create it, or anything else to hold it for edits."
                    .to_string()
            }
        }
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of validating one user response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub message: String,
}

impl ValidationResult {
    pub fn accept(message: impl Into<String>) -> Self {
        Self {
            valid: true,
            message: message.into(),
        }
    }

    pub fn reject(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

/// One turn of the workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketCreationStep {
    pub number: u8,
    pub name: StepName,
    pub prompt: String,
    pub user_input: Option<String>,
    pub suggestion: Option<String>,
    pub validation: Option<ValidationResult>,
}

impl MarketCreationStep {
    fn open(name: StepName, rules: &StepRules, suggestion: Option<String>) -> Self {
        Self {
            number: name.number(),
            name,
            prompt: name.prompt(rules),
            user_input: None,
            suggestion,
            validation: None,
        }
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.user_input.is_some()
    }

    fn answer(&mut self, input: &str, result: ValidationResult) -> Result<(), DomainError> {
        if self.is_answered() {
            return Err(DomainError::StepAlreadyAnswered(self.name));
        }
        self.user_input = Some(input.to_string());
        self.validation = Some(result);
        Ok(())
    }
}

/// What the user wants, as classified from their opening message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    CreateMarket,
    AnalyzeOdds,
    GeneralInquiry,
    Unclear,
}

impl Intent {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Intent::CreateMarket => "create_market",
            Intent::AnalyzeOdds => "analyze_odds",
            Intent::GeneralInquiry => "general_inquiry",
            Intent::Unclear => "unclear",
        }
    }

    /// Read an intent label out of free-form model output. The earliest
    /// label mentioned wins; nothing recognizable is `Unclear`.
    #[must_use]
    pub fn from_reply(reply: &str) -> Self {
        let lower = reply.to_ascii_lowercase();
        [
            (Intent::CreateMarket, ["create_market", "create market"]),
            (Intent::AnalyzeOdds, ["analyze_odds", "analyze odds"]),
            (Intent::GeneralInquiry, ["general_inquiry", "general inquiry"]),
            (Intent::Unclear, ["unclear", "not sure"]),
        ]
        .into_iter()
        .filter_map(|(intent, labels)| {
            labels
                .iter()
                .filter_map(|label| lower.find(label))
                .min()
                .map(|pos| (pos, intent))
        })
        .min_by_key(|(pos, _)| *pos)
        .map_or(Intent::Unclear, |(_, intent)| intent)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunable validation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepRules {
    pub min_horizon: Duration,
    pub min_criteria_chars: usize,
}

impl Default for StepRules {
    fn default() -> Self {
        Self {
            min_horizon: Duration::hours(1),
            min_criteria_chars: 20,
        }
    }
}

/// Where a session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    /// Step 4 confirmed, estimates pending.
    Confirmed,
    Finalized,
    /// Step 4 declined; the proposal stays a draft.
    Held,
}

impl SessionStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Confirmed => "confirmed",
            SessionStatus::Finalized => "finalized",
            SessionStatus::Held => "held",
        }
    }

    /// True once no further input is accepted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Finalized | SessionStatus::Held)
    }
}

/// Result of submitting one response.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Input rejected; the same step is still current.
    Rejected {
        step: StepName,
        validation: ValidationResult,
    },
    /// Input accepted and `next` is now current.
    Advanced {
        validation: ValidationResult,
        next: StepName,
    },
    /// Final review confirmed; call [`WorkflowSession::finalize`].
    Confirmed,
    /// Final review declined.
    Held,
}

const CONFIRM_WORDS: &[&str] = &["confirm", "yes", "proceed", "create"];

/// One user's guided proposal-creation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSession {
    id: SessionId,
    status: SessionStatus,
    proposal: MarketProposal,
    steps: Vec<MarketCreationStep>,
    recommendation: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl WorkflowSession {
    /// Open a session seeded with the user's opening message. Step 1 is
    /// issued immediately.
    #[must_use]
    pub fn start(message: &str, now: DateTime<Utc>, rules: &StepRules) -> Self {
        let mut draft = ProposalDraft::new(message.trim(), date::default_end(now, rules.min_horizon));
        draft.category = Category::classify(message);
        draft.created_at = now;
        let proposal = MarketProposal::new(draft, RealtimeContext::empty());

        let first = StepName::QuestionClarification;
        let suggestion = suggest(first, &proposal, rules);
        Self {
            id: SessionId::new(),
            status: SessionStatus::InProgress,
            steps: vec![MarketCreationStep::open(first, rules, suggestion)],
            proposal,
            recommendation: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn proposal(&self) -> &MarketProposal {
        &self.proposal
    }

    pub fn steps(&self) -> &[MarketCreationStep] {
        &self.steps
    }

    pub fn recommendation(&self) -> Option<&str> {
        self.recommendation.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// The last issued step.
    pub fn current_step(&self) -> Option<&MarketCreationStep> {
        self.steps.last()
    }

    /// Submit `input` for whichever step is current.
    pub fn submit(
        &mut self,
        input: &str,
        now: DateTime<Utc>,
        rules: &StepRules,
    ) -> Result<Submission, DomainError> {
        if self.status != SessionStatus::InProgress {
            return Err(DomainError::WorkflowFinished);
        }
        let Some(current) = self.steps.last() else {
            return Err(DomainError::WorkflowFinished);
        };
        let step = current.name;
        if current.is_answered() {
            return Err(DomainError::StepAlreadyAnswered(step));
        }
        self.updated_at = now;

        let input = input.trim();
        let (validation, update) = match validate(step, input, now, rules) {
            Checked::Invalid(validation) => {
                return Ok(Submission::Rejected { step, validation });
            }
            Checked::Valid(validation, update) => (validation, update),
        };

        self.apply(update)?;
        if let Some(current) = self.steps.last_mut() {
            current.answer(input, validation.clone())?;
        }

        match step.next() {
            Some(next) => {
                let suggestion = suggest(next, &self.proposal, rules);
                self.steps.push(MarketCreationStep::open(next, rules, suggestion));
                Ok(Submission::Advanced { validation, next })
            }
            None if is_confirmation(input) => {
                self.status = SessionStatus::Confirmed;
                Ok(Submission::Confirmed)
            }
            None => {
                self.status = SessionStatus::Held;
                Ok(Submission::Held)
            }
        }
    }

    /// Like [`submit`](Self::submit) but refuses input addressed to a
    /// step other than the current one.
    pub fn submit_for(
        &mut self,
        step: StepName,
        input: &str,
        now: DateTime<Utc>,
        rules: &StepRules,
    ) -> Result<Submission, DomainError> {
        match self.current_step() {
            Some(current) if current.name != step => Err(DomainError::StepOutOfOrder {
                expected: current.name,
                got: step,
            }),
            _ => self.submit(input, now, rules),
        }
    }

    fn apply(&mut self, update: Update) -> Result<(), DomainError> {
        match update {
            Update::Question(q) => {
                self.proposal.set_category(Category::classify(&q))?;
                self.proposal.set_question(q)
            }
            Update::EndDate(end) => self.proposal.set_end_date(end),
            Update::Criteria(c) => self.proposal.set_resolution_criteria(c),
            Update::None => Ok(()),
        }
    }

    /// Fill estimates after a confirmed review and mark the proposal ready.
    pub fn finalize(&mut self, prediction: Prediction, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status != SessionStatus::Confirmed {
            return Err(DomainError::WorkflowFinished);
        }
        self.proposal.apply_prediction(prediction)?;
        self.proposal.mark_ready()?;
        self.recommendation = Some(recommendation(
            self.proposal.ai_probability(),
            self.proposal.ai_confidence(),
        ));
        self.status = SessionStatus::Finalized;
        self.updated_at = now;
        Ok(())
    }
}

enum Update {
    Question(String),
    EndDate(DateTime<Utc>),
    Criteria(String),
    None,
}

enum Checked {
    Valid(ValidationResult, Update),
    Invalid(ValidationResult),
}

fn validate(step: StepName, input: &str, now: DateTime<Utc>, rules: &StepRules) -> Checked {
    match step {
        StepName::QuestionClarification => {
            if input.is_empty() {
                Checked::Invalid(ValidationResult::reject("Please enter a question."))
            } else if !input.contains('?') {
                Checked::Invalid(ValidationResult::reject(
                    "Phrase the market as a yes/no question ending with '?'.",
                ))
            } else {
                Checked::Valid(
                    ValidationResult::accept("Question accepted."),
                    Update::Question(input.to_string()),
                )
            }
        }
        StepName::Timeframe => {
            let earliest = date::earliest_end(now, rules.min_horizon);
            let end = date::parse_relative(input)
                .map(|d| now + d)
                .or_else(|| date::parse_datetime(input));
            match end {
                Some(end) if end > earliest => Checked::Valid(
                    ValidationResult::accept(format!(
                        "Market will close at {}.",
                        end.format("%Y-%m-%d %H:%M UTC")
                    )),
                    Update::EndDate(end),
                ),
                Some(_) => Checked::Invalid(ValidationResult::reject(format!(
                    "The end date must be after {}. {}",
                    earliest.format("%Y-%m-%d %H:%M UTC"),
                    date::FORMAT_HINT
                ))),
                None => Checked::Invalid(ValidationResult::reject(format!(
                    "Could not read a timeframe from \"{input}\". {}",
                    date::FORMAT_HINT
                ))),
            }
        }
        StepName::ResolutionCriteria => {
            if input.chars().count() >= rules.min_criteria_chars {
                Checked::Valid(
                    ValidationResult::accept("Resolution criteria accepted."),
                    Update::Criteria(input.to_string()),
                )
            } else {
                Checked::Invalid(ValidationResult::reject(format!(
                    "Please describe the resolution rule in more detail (at least {} characters).",
                    rules.min_criteria_chars
                )))
            }
        }
        StepName::FinalReview => {
            let message = if is_confirmation(input) {
                "Confirmed."
            } else {
                "Proposal held for edits."
            };
            Checked::Valid(ValidationResult::accept(message), Update::None)
        }
    }
}

fn is_confirmation(input: &str) -> bool {
    super::text::tokens(input)
        .next()
        .is_some_and(|first| CONFIRM_WORDS.contains(&first.as_str()))
}

/// Heuristic default for a step. Never blocks the step.
#[must_use]
pub fn suggest(step: StepName, proposal: &MarketProposal, rules: &StepRules) -> Option<String> {
    match step {
        StepName::QuestionClarification => {
            let q = proposal.question().trim().trim_end_matches(['?', '.', '!']).trim();
            if q.is_empty() {
                return None;
            }
            let lower = q.to_ascii_lowercase();
            let body = if lower.starts_with("will ") {
                q.to_string()
            } else {
                let mut chars = q.chars();
                let first = chars.next()?;
                format!("Will {}{}", first.to_lowercase(), chars.as_str())
            };
            Some(format!("{body}?"))
        }
        StepName::Timeframe => Some(match proposal.category() {
            Category::Sports => "2 weeks".to_string(),
            Category::Politics | Category::Economics => "3 months".to_string(),
            _ => "1 month".to_string(),
        }),
        StepName::ResolutionCriteria => Some(format!(
            "Resolves YES if reputable sources (official statements or at least two major news \
             outlets) confirm that the following happened before the end date: {} Otherwise NO.",
            proposal.question()
        ))
        .filter(|s| s.chars().count() >= rules.min_criteria_chars),
        StepName::FinalReview => Some(format!(
            "{} | closes {} | criteria: {}",
            proposal.question(),
            proposal.end_date().format("%Y-%m-%d"),
            proposal.resolution_criteria()
        )),
    }
}

/// Human-readable advice from thresholded probability and confidence.
#[must_use]
pub fn recommendation(probability: f64, confidence: f64) -> String {
    if confidence >= 0.7 && probability >= 0.6 {
        format!(
            "Bullish: high confidence ({:.0}%) that this resolves YES ({:.0}% probability).",
            confidence * 100.0,
            probability * 100.0
        )
    } else if confidence >= 0.7 && probability <= 0.4 {
        format!(
            "Bearish: high confidence ({:.0}%) that this resolves NO ({:.0}% probability of YES).",
            confidence * 100.0,
            probability * 100.0
        )
    } else if confidence < 0.5 {
        "Moderate confidence: do more research before trading this market.".to_string()
    } else {
        format!(
            "Balanced/uncertain: the outcome looks open ({:.0}% probability of YES).",
            probability * 100.0
        )
    }
}
