//! Prompt text for proposal generation.

use chrono::{DateTime, Utc};

use crate::domain::TrendingTopic;

/// Exact key set every generated object must carry.
pub const PROPOSAL_KEYS: [&str; 12] = [
    "title",
    "question",
    "description",
    "background",
    "resolution_criteria",
    "sources",
    "end_date",
    "category",
    "probability",
    "confidence",
    "sentiment",
    "key_factors",
];

/// Ask for `count` proposals about `subject`, grounded in `context`.
#[must_use]
pub fn proposals(
    subject: &str,
    context: &str,
    count: usize,
    now: DateTime<Utc>,
    earliest_end: DateTime<Utc>,
) -> String {
    let keys = PROPOSAL_KEYS.join(", ");
    format!(
        r#"You design binary (Yes/No) prediction markets.

## Request
{subject}

## Real-time context (captured {now})
{context}

## Output
Return ONLY a JSON array of exactly {count} object(s). Each object must have exactly these keys:
{keys}

Field rules:
- question: a single Yes/No question ending with "?", under 120 characters
- end_date: ISO 8601 UTC timestamp strictly after {earliest}
- resolution_criteria: the specific public source and condition that decides the outcome
- category: one of crypto, tech, politics, sports, economics, general
- probability: your estimate that the answer is Yes, between 0.05 and 0.95
- confidence: how sure you are of that estimate, between 0.3 and 0.9
- sentiment: public sentiment between 0 and 1, 0.5 is neutral
- key_factors: 2 to 5 short strings
- sources: URLs or outlet names supporting the background

No commentary, no code fences."#,
        now = now.format("%Y-%m-%d %H:%M UTC"),
        earliest = earliest_end.to_rfc3339(),
    )
}

/// Context lines describing an aggregated topic.
#[must_use]
pub fn topic_lines(topic: &TrendingTopic) -> Vec<String> {
    let mut lines = vec![
        format!("Topic: {}", topic.title),
        format!("Category: {}", topic.category),
        format!("Source: {}", topic.source),
        format!(
            "Sentiment polarity: {:+.2} over {} mentions",
            topic.sentiment.polarity(),
            topic.mention_count
        ),
        format!("Search interest: {:.0}/100", topic.trend_score),
    ];
    if !topic.summary.is_empty() {
        lines.push(format!("Summary: {}", topic.summary));
    }
    lines.push("Sample content:".to_string());
    lines.extend(topic.related_items.iter().map(|item| format!("- {item}")));
    lines
}
