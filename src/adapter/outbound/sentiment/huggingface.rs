//! Hugging Face Inference API sentiment scorer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{prepare_texts, BATCH_SIZE};
use crate::adapter::outbound::http::HttpFetcher;
use crate::domain::Sentiment;
use crate::error::{ConfigError, Error, Result};
use crate::port::outbound::sentiment::SentimentScorer;

const API_BASE: &str = "https://api-inference.huggingface.co/models";

/// Default three-class sentiment model.
pub const DEFAULT_MODEL: &str = "cardiffnlp/twitter-roberta-base-sentiment-latest";

/// Scorer backed by a hosted text-classification model.
///
/// Per-text polarity is `P(positive) - P(negative)`; the batch score is
/// the mean. Any upstream failure makes the whole call neutral.
pub struct HuggingFaceScorer {
    fetcher: HttpFetcher,
    token: String,
    model: String,
}

impl HuggingFaceScorer {
    #[must_use]
    pub fn new(fetcher: HttpFetcher, token: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            fetcher,
            token: token.into(),
            model: model.into(),
        }
    }

    /// Read `HUGGINGFACE_API_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is not set.
    pub fn token_from_env() -> Result<String> {
        std::env::var("HUGGINGFACE_API_TOKEN").map_err(|_| {
            Error::Config(ConfigError::MissingField {
                field: "HUGGINGFACE_API_TOKEN",
            })
        })
    }

    async fn classify(&self, batch: &[String]) -> Result<Vec<f64>> {
        let url = format!("{API_BASE}/{}", self.model);
        let request = Request { inputs: batch };
        let response: Vec<Vec<LabelScore>> = self
            .fetcher
            .send_json(|http| http.post(&url).bearer_auth(&self.token).json(&request))
            .await?;
        if response.len() != batch.len() {
            return Err(Error::Parse(format!(
                "expected {} classifications, got {}",
                batch.len(),
                response.len()
            )));
        }
        Ok(response.iter().map(|labels| polarity(labels)).collect())
    }
}

#[derive(Serialize)]
struct Request<'a> {
    inputs: &'a [String],
}

#[derive(Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

/// `P(positive) - P(negative)` for one text. Accepts both named labels and
/// the `LABEL_0..2` (negative, neutral, positive) convention.
fn polarity(labels: &[LabelScore]) -> f64 {
    let mut positive = 0.0;
    let mut negative = 0.0;
    for l in labels {
        match l.label.to_ascii_lowercase().as_str() {
            "positive" | "label_2" => positive = l.score,
            "negative" | "label_0" => negative = l.score,
            _ => {}
        }
    }
    positive - negative
}

#[async_trait]
impl SentimentScorer for HuggingFaceScorer {
    fn name(&self) -> &'static str {
        "huggingface"
    }

    async fn score(&self, texts: &[String]) -> Sentiment {
        let prepared = prepare_texts(texts);
        if prepared.is_empty() {
            return Sentiment::NEUTRAL;
        }

        let mut scores = Vec::with_capacity(prepared.len());
        for batch in prepared.chunks(BATCH_SIZE) {
            match self.classify(batch).await {
                Ok(found) => scores.extend(found),
                Err(e) => {
                    warn!(model = %self.model, error = %e, "Sentiment scoring failed, using neutral");
                    return Sentiment::NEUTRAL;
                }
            }
        }
        let sentiment = Sentiment::mean(&scores);
        debug!(texts = scores.len(), polarity = sentiment.polarity(), "Scored sentiment");
        sentiment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polarity_from_named_labels() {
        let labels: Vec<LabelScore> = serde_json::from_str(
            r#"[{"label": "positive", "score": 0.85},
                {"label": "neutral", "score": 0.1},
                {"label": "negative", "score": 0.05}]"#,
        )
        .unwrap();
        assert!((polarity(&labels) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn polarity_from_indexed_labels() {
        let labels: Vec<LabelScore> = serde_json::from_str(
            r#"[{"label": "LABEL_0", "score": 0.7},
                {"label": "LABEL_1", "score": 0.2},
                {"label": "LABEL_2", "score": 0.1}]"#,
        )
        .unwrap();
        assert!((polarity(&labels) + 0.6).abs() < 1e-9);
    }

    #[tokio::test]
    async fn empty_input_is_neutral_without_network() {
        let scorer = HuggingFaceScorer::new(HttpFetcher::default(), "token", DEFAULT_MODEL);
        assert_eq!(scorer.score(&[]).await, Sentiment::NEUTRAL);
        assert_eq!(
            scorer.score(&["@a #b".to_string(), "tiny".to_string()]).await,
            Sentiment::NEUTRAL
        );
    }
}
