//! Composite confidence score for trend candidates.
//!
//! A topic's confidence is a weighted sum of four signals, each normalized
//! to `0.0..=1.0` before weighting:
//!
//! - **Sentiment**: absolute polarity (weight 0.4)
//! - **Mentions**: corpus size over 100 (weight 0.25)
//! - **Trend**: external search interest over 100 (weight 0.2)
//! - **Diversity**: distinct contributing sources over 4 (weight 0.15)
//!
//! # Examples
//!
//! ```
//! use trendsmith::domain::score::{confidence_score, ScoreInputs};
//!
//! let inputs = ScoreInputs::new(0.8, 50.0, 0.0, 1);
//! let score = confidence_score(&inputs);
//! assert!(score > 0.4 && score < 0.5);
//! ```

/// Raw inputs to [`confidence_score`]. Values may be out of range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInputs {
    /// Sentiment polarity; only its magnitude counts.
    pub sentiment: f64,
    /// Size of the text corpus backing the topic.
    pub mention_count: f64,
    /// External interest, nominally 0..100.
    pub trend_score: f64,
    /// Number of distinct source kinds that contributed.
    pub distinct_sources: usize,
}

impl ScoreInputs {
    /// Bundle the four inputs.
    #[must_use]
    pub const fn new(
        sentiment: f64,
        mention_count: f64,
        trend_score: f64,
        distinct_sources: usize,
    ) -> Self {
        Self {
            sentiment,
            mention_count,
            trend_score,
            distinct_sources,
        }
    }
}

const SENTIMENT_WEIGHT: f64 = 0.4;
const MENTION_WEIGHT: f64 = 0.25;
const TREND_WEIGHT: f64 = 0.2;
const DIVERSITY_WEIGHT: f64 = 0.15;

/// Source count that saturates the diversity term.
pub const MAX_SOURCE_KINDS: usize = 4;

fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Weighted market-worthiness of a topic, always in `0.0..=1.0`.
///
/// Pure and monotonically non-decreasing in each input (sentiment by
/// magnitude).
#[must_use]
pub fn confidence_score(inputs: &ScoreInputs) -> f64 {
    let sentiment = unit(inputs.sentiment.abs());
    let mentions = unit(inputs.mention_count / 100.0);
    let trend = unit(inputs.trend_score / 100.0);
    let diversity = unit(inputs.distinct_sources as f64 / MAX_SOURCE_KINDS as f64);

    unit(
        SENTIMENT_WEIGHT * sentiment
            + MENTION_WEIGHT * mentions
            + TREND_WEIGHT * trend
            + DIVERSITY_WEIGHT * diversity,
    )
}
