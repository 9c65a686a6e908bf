//! Market proposal generation.
//!
//! One generation request per call, parsed through [`repair`]. Failed
//! attempts are retried with exponential backoff; once the attempt budget
//! is spent the caller gets a single deterministic fallback proposal.

pub mod context;
pub mod prompt;
pub mod repair;

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Deserialize;
use tracing::{debug, info, warn};

pub use context::{ContextGatherer, ContextSources, Route};
pub use repair::RawProposal;

use crate::domain::date::{default_end, earliest_end, resolve_end_date};
use crate::domain::{
    Category, MarketProposal, ProposalDraft, RealtimeContext, Sentiment, TrendingTopic,
};
use crate::port::outbound::llm::{GenerationOptions, Llm};

/// Resolution criteria used when nothing better is known.
pub const FALLBACK_CRITERIA: &str = "Resolved based on major news reports confirming the outcome.";

/// Generation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    /// Generation attempts before falling back.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// First retry delay; doubles on every further attempt.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    /// Upper bound of the random jitter added to each delay.
    #[serde(default = "default_backoff_jitter_ms")]
    pub backoff_jitter_ms: u64,
    /// Context summary line cap.
    #[serde(default = "default_context_line_limit")]
    pub context_line_limit: usize,
    /// Items requested from each context source.
    #[serde(default = "default_context_item_limit")]
    pub context_item_limit: usize,
    /// Minimum time between creation and end date, in minutes.
    #[serde(default = "default_min_horizon_minutes")]
    pub min_horizon_minutes: i64,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: usize,
    /// Proposals per request when the caller does not say.
    #[serde(default = "default_count")]
    pub default_count: usize,
    /// Hard cap on proposals per request.
    #[serde(default = "default_max_count")]
    pub max_count: usize,
}

const fn default_max_attempts() -> u32 {
    5
}

const fn default_backoff_base_ms() -> u64 {
    500
}

const fn default_backoff_jitter_ms() -> u64 {
    250
}

const fn default_context_line_limit() -> usize {
    40
}

const fn default_context_item_limit() -> usize {
    10
}

const fn default_min_horizon_minutes() -> i64 {
    60
}

const fn default_temperature() -> f64 {
    0.7
}

const fn default_max_output_tokens() -> usize {
    2048
}

const fn default_count() -> usize {
    3
}

const fn default_max_count() -> usize {
    10
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_jitter_ms: default_backoff_jitter_ms(),
            context_line_limit: default_context_line_limit(),
            context_item_limit: default_context_item_limit(),
            min_horizon_minutes: default_min_horizon_minutes(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            default_count: default_count(),
            max_count: default_max_count(),
        }
    }
}

impl GeneratorConfig {
    #[must_use]
    pub fn min_horizon(&self) -> Duration {
        Duration::minutes(self.min_horizon_minutes.max(0))
    }

    /// Delay before retrying after `attempt` (1-based) failed.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> StdDuration {
        let exp = attempt.saturating_sub(1).min(16);
        let base = self.backoff_base_ms.saturating_mul(1u64 << exp);
        let jitter = if self.backoff_jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=self.backoff_jitter_ms)
        };
        StdDuration::from_millis(base.saturating_add(jitter))
    }
}

/// Question used by the fallback proposal.
#[must_use]
pub fn fallback_question(subject: &str) -> String {
    let subject = subject.trim();
    if subject.ends_with('?') {
        subject.to_string()
    } else {
        format!("Will the outcome related to '{subject}' be positive?")
    }
}

/// Defaults applied to fields the generated output left out.
struct Defaults<'a> {
    subject: &'a str,
    category: Option<Category>,
    sentiment: Sentiment,
}

/// Turns queries and topics into [`MarketProposal`]s.
pub struct ProposalGenerator {
    llm: Option<Arc<dyn Llm>>,
    gatherer: ContextGatherer,
    config: GeneratorConfig,
}

impl ProposalGenerator {
    pub fn new(llm: Option<Arc<dyn Llm>>, gatherer: ContextGatherer, config: GeneratorConfig) -> Self {
        Self {
            llm,
            gatherer,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Name of the configured provider, if any.
    #[must_use]
    pub fn provider(&self) -> Option<&'static str> {
        self.llm.as_ref().map(|llm| llm.name())
    }

    /// Gather a real-time snapshot routed by the query's keywords.
    pub async fn gather_context(&self, query: &str) -> RealtimeContext {
        self.gatherer.gather(query).await
    }

    /// Gather context for `query`, then generate.
    pub async fn generate_for_query(&self, query: &str, count: Option<usize>) -> Vec<MarketProposal> {
        let context = self.gather_context(query).await;
        self.generate(query, context, count.unwrap_or(self.config.default_count))
            .await
    }

    /// Generate up to `count` proposals for `query`. Never empty: exhausted
    /// retries yield one fallback proposal.
    pub async fn generate(
        &self,
        query: &str,
        context: RealtimeContext,
        count: usize,
    ) -> Vec<MarketProposal> {
        let count = count.clamp(1, self.config.max_count.max(1));
        let summary = context::summarize(&context, self.config.context_line_limit);
        let defaults = Defaults {
            subject: query,
            category: None,
            sentiment: Sentiment::NEUTRAL,
        };
        let now = Utc::now();
        let drafts = self.attempt(&summary, count, now, &defaults).await;
        let proposals: Vec<MarketProposal> = drafts
            .into_iter()
            .map(|draft| MarketProposal::new(draft, context.clone()))
            .collect();
        info!(query, proposals = proposals.len(), "Generated proposals");
        proposals
    }

    /// One proposal for an aggregated topic, using its summary and related
    /// items as context.
    pub async fn propose_from_topic(&self, topic: &TrendingTopic) -> MarketProposal {
        let summary = context::trim_lines(prompt::topic_lines(topic), self.config.context_line_limit);
        let defaults = Defaults {
            subject: &topic.title,
            category: Some(topic.category),
            sentiment: topic.sentiment,
        };
        let mut context = RealtimeContext::empty();
        context.sources = topic.source_kinds.iter().copied().collect();
        context.notes = summary.lines().map(str::to_string).collect();

        let draft = self
            .attempt(&summary, 1, Utc::now(), &defaults)
            .await
            .into_iter()
            .next()
            .unwrap_or_else(|| self.fallback(&defaults, Utc::now()));
        MarketProposal::new(draft, context).with_topic(topic.id.clone())
    }

    async fn attempt(
        &self,
        summary: &str,
        count: usize,
        now: DateTime<Utc>,
        defaults: &Defaults<'_>,
    ) -> Vec<ProposalDraft> {
        let Some(llm) = &self.llm else {
            debug!("No text generation configured, using fallback proposal");
            return vec![self.fallback(defaults, now)];
        };

        let horizon = self.config.min_horizon();
        let request = prompt::proposals(
            defaults.subject,
            summary,
            count,
            now,
            earliest_end(now, horizon),
        );
        let options = GenerationOptions::json(self.config.temperature, self.config.max_output_tokens);
        let max_attempts = self.config.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match llm.generate(&request, &options).await {
                Ok(text) => match repair::parse_proposals(&text) {
                    Ok(raw) if !raw.is_empty() => {
                        // Retries may have consumed part of the horizon.
                        let received = Utc::now();
                        return raw
                            .into_iter()
                            .take(count)
                            .map(|r| self.draft(r, defaults, received))
                            .collect();
                    }
                    Ok(_) => warn!(attempt, max_attempts, "Generation returned no usable proposals"),
                    Err(err) => warn!(attempt, max_attempts, error = %err, "Generation output unparsable"),
                },
                Err(err) => {
                    warn!(attempt, max_attempts, provider = llm.name(), error = %err, "Generation failed");
                }
            }
            if attempt < max_attempts {
                tokio::time::sleep(self.config.backoff(attempt)).await;
            }
        }

        warn!(subject = defaults.subject, "Generation attempts exhausted, using fallback proposal");
        vec![self.fallback(defaults, Utc::now())]
    }

    fn draft(&self, raw: RawProposal, defaults: &Defaults<'_>, now: DateTime<Utc>) -> ProposalDraft {
        let end = resolve_end_date(raw.end_date.as_deref(), now, self.config.min_horizon());
        if end.rewritten {
            debug!(question = %raw.question, raw = ?raw.end_date, "End date rewritten to default");
        }
        let category = match raw.category.as_deref() {
            Some(label) => label.parse::<Category>().unwrap_or_default(),
            None => defaults
                .category
                .unwrap_or_else(|| Category::classify(&raw.question)),
        };

        let mut draft = ProposalDraft::new(raw.question, end.end_date);
        draft.created_at = now;
        if !raw.title.is_empty() {
            draft.title = raw.title;
        }
        if !raw.description.is_empty() {
            draft.description = raw.description;
        }
        draft.background = raw.background;
        draft.resolution_criteria = if raw.resolution_criteria.is_empty() {
            FALLBACK_CRITERIA.to_string()
        } else {
            raw.resolution_criteria
        };
        draft.sources = raw.sources;
        draft.category = category;
        draft.probability = raw.probability.unwrap_or(0.5);
        draft.confidence = raw.confidence.unwrap_or(0.5);
        draft.sentiment = raw.sentiment.map_or(defaults.sentiment, Sentiment::from_unit);
        draft.key_factors = raw.key_factors;
        draft
    }

    fn fallback(&self, defaults: &Defaults<'_>, now: DateTime<Utc>) -> ProposalDraft {
        let question = fallback_question(defaults.subject);
        let mut draft = ProposalDraft::new(question, default_end(now, self.config.min_horizon()));
        draft.created_at = now;
        draft.description = format!("Fallback market generated for: {}", defaults.subject.trim());
        draft.resolution_criteria = FALLBACK_CRITERIA.to_string();
        draft.category = Category::General;
        draft.probability = 0.5;
        draft.confidence = 0.3;
        draft.sentiment = Sentiment::NEUTRAL;
        draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_without_jitter() {
        let config = GeneratorConfig {
            backoff_jitter_ms: 0,
            ..GeneratorConfig::default()
        };
        assert_eq!(config.backoff(1), StdDuration::from_millis(500));
        assert_eq!(config.backoff(2), StdDuration::from_millis(1000));
        assert_eq!(config.backoff(3), StdDuration::from_millis(2000));
    }

    #[test]
    fn backoff_jitter_is_bounded() {
        let config = GeneratorConfig::default();
        for _ in 0..50 {
            let delay = config.backoff(1).as_millis();
            assert!((500..=750).contains(&delay));
        }
    }

    #[test]
    fn fallback_question_keeps_questions() {
        assert_eq!(fallback_question(" Will Bitcoin reach $100k? "), "Will Bitcoin reach $100k?");
        assert_eq!(
            fallback_question("bitcoin"),
            "Will the outcome related to 'bitcoin' be positive?"
        );
    }

    #[tokio::test]
    async fn no_llm_yields_single_fallback() {
        let generator = ProposalGenerator::new(None, ContextGatherer::default(), GeneratorConfig::default());
        let proposals = generator.generate("Will Bitcoin reach $100k?", RealtimeContext::empty(), 3).await;

        assert_eq!(proposals.len(), 1);
        let p = &proposals[0];
        assert_eq!(p.ai_probability(), 0.5);
        assert_eq!(p.ai_confidence(), 0.3);
        assert_eq!(p.category(), Category::General);
        assert_eq!(p.resolution_criteria(), FALLBACK_CRITERIA);
    }
}
