//! Market resolution.
//!
//! Expired markets are checked against web search evidence. The outcome is
//! read from the language model when one is configured, otherwise from a
//! keyword vote over the snippets. Nothing is written unless the evidence
//! points clearly one way.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::{text, Market, Outcome};
use crate::error::Result;
use crate::port::outbound::contract::MarketContract;
use crate::port::outbound::llm::{GenerationOptions, Llm};
use crate::port::outbound::search::{SearchResult, WebSearch};

const YES_WORDS: &[&str] = &["yes", "won", "succeeded", "true"];
const NO_WORDS: &[&str] = &["no", "lost", "failed", "false"];

const OUTCOME_INSTRUCTION: &str = "Determine if the outcome of the prediction market question is \
Yes or No based on provided search results. Respond with 'Yes', 'No', or 'Unclear'.";

/// Resolver settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolverConfig {
    /// Search results consulted per market.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

const fn default_max_results() -> usize {
    10
}

const fn default_max_tokens() -> usize {
    10
}

const fn default_temperature() -> f64 {
    0.3
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Counts from one resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionReport {
    /// Markets that were due.
    pub checked: usize,
    pub resolved: usize,
    pub unclear: usize,
    /// Search or contract errors.
    pub failed: usize,
}

/// Search query for a market description on `date`.
#[must_use]
pub fn resolution_query(description: &str, date: DateTime<Utc>) -> String {
    format!("{description} outcome resolution as of {}", date.format("%Y-%m-%d"))
}

/// Keyword vote over snippets. Each snippet counts at most once per side.
#[must_use]
pub fn keyword_outcome(snippets: &[String]) -> Outcome {
    let (mut yes, mut no) = (0usize, 0usize);
    for snippet in snippets {
        let tokens: Vec<String> = text::tokens(snippet).collect();
        if tokens.iter().any(|t| YES_WORDS.contains(&t.as_str())) {
            yes += 1;
        }
        if tokens.iter().any(|t| NO_WORDS.contains(&t.as_str())) {
            no += 1;
        }
    }
    match yes.cmp(&no) {
        std::cmp::Ordering::Greater => Outcome::Yes,
        std::cmp::Ordering::Less => Outcome::No,
        std::cmp::Ordering::Equal => Outcome::Unresolved,
    }
}

/// Outcome named by the leading word of a model reply.
#[must_use]
pub fn parse_reply(reply: &str) -> Outcome {
    let leading = reply
        .trim()
        .split(|c: char| !c.is_ascii_alphabetic())
        .find(|w| !w.is_empty())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match leading.as_str() {
        "yes" => Outcome::Yes,
        "no" => Outcome::No,
        _ => Outcome::Unresolved,
    }
}

fn snippet_texts(results: &[SearchResult]) -> Vec<String> {
    results
        .iter()
        .map(|r| format!("{} {}", r.title, r.snippet).trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Decides and records outcomes for expired markets.
pub struct MarketResolver {
    contract: Arc<dyn MarketContract>,
    search: Option<Arc<dyn WebSearch>>,
    llm: Option<Arc<dyn Llm>>,
    config: ResolverConfig,
}

impl MarketResolver {
    pub fn new(
        contract: Arc<dyn MarketContract>,
        search: Option<Arc<dyn WebSearch>>,
        llm: Option<Arc<dyn Llm>>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            contract,
            search,
            llm,
            config,
        }
    }

    /// Resolve every due market.
    ///
    /// # Errors
    /// Only when the open market list cannot be read. Per-market failures
    /// are counted in the report.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<ResolutionReport> {
        let markets = self.contract.get_open_markets().await?;
        let mut report = ResolutionReport::default();

        for market in markets.iter().filter(|m| m.is_due(now)) {
            report.checked += 1;
            let outcome = match self.decide(market, now).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(market = %market.id, error = %err, "Evidence search failed");
                    report.failed += 1;
                    continue;
                }
            };
            let Some(yes) = outcome.as_bool() else {
                info!(market = %market.id, "Outcome unclear, leaving unresolved");
                report.unclear += 1;
                continue;
            };
            match self.contract.resolve_market(market.id, yes).await {
                Ok(true) => {
                    info!(market = %market.id, %outcome, "Market resolved");
                    report.resolved += 1;
                }
                Ok(false) => {
                    warn!(market = %market.id, "Resolution not accepted by contract");
                    report.failed += 1;
                }
                Err(err) => {
                    warn!(market = %market.id, error = %err, "Resolution write failed");
                    report.failed += 1;
                }
            }
        }

        info!(
            checked = report.checked,
            resolved = report.resolved,
            unclear = report.unclear,
            failed = report.failed,
            "Resolution pass complete"
        );
        Ok(report)
    }

    /// Outcome for one market from search evidence.
    ///
    /// # Errors
    /// When the search itself fails.
    pub async fn decide(&self, market: &Market, now: DateTime<Utc>) -> Result<Outcome> {
        let Some(search) = &self.search else {
            debug!(market = %market.id, "No search backend configured");
            return Ok(Outcome::Unresolved);
        };
        let query = resolution_query(&market.description, now);
        let results = search.search(&query, self.config.max_results).await?;
        let mut snippets = snippet_texts(&results);
        snippets.truncate(self.config.max_results);
        if snippets.is_empty() {
            return Ok(Outcome::Unresolved);
        }

        if let Some(llm) = &self.llm {
            let prompt = format!(
                "{OUTCOME_INSTRUCTION}\n\nQuestion: {}\nSearch results: {}\nOutcome:",
                market.description,
                snippets.join("; ")
            );
            let options = GenerationOptions::text(self.config.temperature, self.config.max_tokens);
            match llm.generate(&prompt, &options).await {
                Ok(reply) => return Ok(parse_reply(&reply)),
                Err(err) => {
                    warn!(market = %market.id, provider = llm.name(), error = %err, "Outcome generation failed, using keywords");
                }
            }
        }
        Ok(keyword_outcome(&snippets))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn snippets(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn query_carries_date() {
        let date = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(
            resolution_query("Will BTC close above 100k?", date),
            "Will BTC close above 100k? outcome resolution as of 2026-03-01"
        );
    }

    #[test]
    fn keyword_vote_counts_snippets_once() {
        let outcome = keyword_outcome(&snippets(&[
            "Team won, yes they won",
            "Bill failed",
            "Measure succeeded",
        ]));
        assert_eq!(outcome, Outcome::Yes);
    }

    #[test]
    fn keyword_vote_needs_whole_words() {
        assert_eq!(keyword_outcome(&snippets(&["Nobody knows", "yesterday"])), Outcome::Unresolved);
        assert_eq!(keyword_outcome(&snippets(&["yes", "no"])), Outcome::Unresolved);
        assert_eq!(keyword_outcome(&[]), Outcome::Unresolved);
    }

    #[test]
    fn reply_uses_leading_word() {
        assert_eq!(parse_reply("Yes."), Outcome::Yes);
        assert_eq!(parse_reply("  no, it did not"), Outcome::No);
        assert_eq!(parse_reply("Unclear"), Outcome::Unresolved);
        assert_eq!(parse_reply("Probably yes"), Outcome::Unresolved);
        assert_eq!(parse_reply(""), Outcome::Unresolved);
    }
}
