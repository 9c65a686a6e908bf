//! Sentiment scoring port.

use async_trait::async_trait;

use crate::domain::Sentiment;

/// Turns a batch of texts into one polarity in `[-1, 1]`.
///
/// Never fails: empty input, texts that clean down to nothing, and
/// upstream failures all yield [`Sentiment::NEUTRAL`].
#[async_trait]
pub trait SentimentScorer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn score(&self, texts: &[String]) -> Sentiment;
}
