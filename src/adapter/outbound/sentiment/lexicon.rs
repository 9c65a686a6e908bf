//! Offline word-list sentiment scorer.

use async_trait::async_trait;

use super::prepare_texts;
use crate::domain::{text, Sentiment};
use crate::port::outbound::sentiment::SentimentScorer;

const POSITIVE: &[&str] = &[
    "amazing", "approve", "approved", "beat", "beats", "best", "boom", "breakthrough", "bull",
    "bullish", "celebrate", "confident", "excellent", "excited", "gain", "gains", "good", "great",
    "growth", "happy", "hope", "improve", "improved", "incredible", "love", "moon", "optimistic",
    "outperform", "pass", "passed", "positive", "profit", "rally", "record", "recover", "rise",
    "rising", "soar", "soars", "strong", "success", "surge", "surges", "win", "winning", "wins",
    "won",
];

const NEGATIVE: &[&str] = &[
    "angry", "awful", "bad", "ban", "banned", "bear", "bearish", "collapse", "crash", "crisis",
    "decline", "disaster", "drop", "drops", "fail", "failed", "fails", "fear", "fraud", "hack",
    "hacked", "hate", "lawsuit", "lose", "loses", "loss", "lost", "negative", "panic", "plunge",
    "plunges", "reject", "rejected", "scam", "scandal", "sell-off", "selloff", "slump", "terrible",
    "threat", "tumble", "weak", "worse", "worst",
];

const NEGATIONS: &[&str] = &["not", "no", "never", "isn't", "wasn't", "don't", "didn't", "won't", "can't"];

/// Polarity of one text: `(pos - neg) / (pos + neg)`, zero without hits.
/// A negation directly before a sentiment word flips it.
fn text_polarity(input: &str) -> f64 {
    let tokens: Vec<String> = text::tokens(input).collect();
    let (mut pos, mut neg) = (0u32, 0u32);
    for (i, token) in tokens.iter().enumerate() {
        let negated = i > 0 && NEGATIONS.contains(&tokens[i - 1].as_str());
        let word = token.as_str();
        let hit = if POSITIVE.contains(&word) {
            Some(true)
        } else if NEGATIVE.contains(&word) {
            Some(false)
        } else {
            None
        };
        match hit.map(|positive| positive != negated) {
            Some(true) => pos += 1,
            Some(false) => neg += 1,
            None => {}
        }
    }
    let total = pos + neg;
    if total == 0 {
        0.0
    } else {
        (f64::from(pos) - f64::from(neg)) / f64::from(total)
    }
}

/// Dependency-free scorer used when no hosted model is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconScorer;

impl LexiconScorer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Synchronous scoring over the shared preprocessing.
    #[must_use]
    pub fn score_texts(texts: &[String]) -> Sentiment {
        let scores: Vec<f64> = prepare_texts(texts).iter().map(|t| text_polarity(t)).collect();
        Sentiment::mean(&scores)
    }
}

#[async_trait]
impl SentimentScorer for LexiconScorer {
    fn name(&self) -> &'static str {
        "lexicon"
    }

    async fn score(&self, texts: &[String]) -> Sentiment {
        Self::score_texts(texts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_positive_and_negative_texts() {
        assert_eq!(text_polarity("Bitcoin rally hits a record high"), 1.0);
        assert_eq!(text_polarity("Exchange hacked, users panic"), -1.0);
        assert_eq!(text_polarity("The committee meets on Tuesday"), 0.0);
    }

    #[test]
    fn negation_flips_polarity() {
        assert_eq!(text_polarity("This is not good for anyone"), -1.0);
    }

    #[test]
    fn mixed_text_is_balanced() {
        assert_eq!(text_polarity("Big gains today but a crash tomorrow"), 0.0);
    }

    #[tokio::test]
    async fn scorer_averages_and_ignores_short_texts() {
        let scorer = LexiconScorer::new();
        let texts = vec![
            "Team won the championship in style".to_string(),
            "Fans celebrate a great season".to_string(),
            "ok".to_string(),
        ];
        assert_eq!(scorer.score(&texts).await.polarity(), 1.0);
        assert_eq!(scorer.score(&[]).await, Sentiment::NEUTRAL);
    }
}
