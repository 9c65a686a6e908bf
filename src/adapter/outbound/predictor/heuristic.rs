//! Rule-based probability estimator.
//!
//! Placeholder for a trained model: combines a category base rate with
//! sentiment and time-to-close features when they are supplied.

use async_trait::async_trait;

use crate::domain::{Category, Prediction, PredictionRequest};
use crate::error::Result;
use crate::port::outbound::predictor::Predictor;

/// Words that usually describe unlikely or extreme outcomes.
const LONG_SHOT_WORDS: &[&str] = &["record", "all-time", "ever", "first", "100k", "double", "triple"];

/// Rule-based [`Predictor`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPredictor;

impl HeuristicPredictor {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn base_rate(category: Category) -> f64 {
        match category {
            Category::Crypto => 0.45,
            Category::Politics => 0.5,
            Category::Sports => 0.5,
            Category::Economics => 0.5,
            Category::Tech => 0.55,
            Category::General => 0.5,
        }
    }

    fn estimate(request: &PredictionRequest) -> Prediction {
        let mut probability = Self::base_rate(request.category);
        let mut confidence: f64 = 0.45;
        let mut key_factors = vec![format!("Historical base rate for {} markets", request.category)];
        let mut risk_factors = Vec::new();
        let mut features_used = 0u32;

        if let Some(sentiment) = request.feature("sentiment").filter(|s| s.is_finite()) {
            // Polarity in [-1, 1] nudges at most 0.15 either way.
            probability += 0.15 * sentiment.clamp(-1.0, 1.0);
            confidence += 0.1 * sentiment.abs().min(1.0);
            key_factors.push("Prevailing public sentiment".to_string());
            features_used += 1;
        }

        if let Some(days) = request.feature("days_to_close").filter(|d| d.is_finite()) {
            if days < 7.0 {
                confidence += 0.1;
                key_factors.push("Short time to resolution".to_string());
            } else if days > 90.0 {
                confidence -= 0.1;
                risk_factors.push("Long horizon leaves room for surprises".to_string());
            }
            features_used += 1;
        }

        let lower = request.description.to_lowercase();
        if LONG_SHOT_WORDS.iter().any(|w| lower.contains(w)) {
            probability -= 0.1;
            risk_factors.push("Question targets an extreme or unprecedented outcome".to_string());
        }
        if request.description.chars().count() < 30 {
            confidence -= 0.05;
            risk_factors.push("Question wording is brief and may be ambiguous".to_string());
        }
        if risk_factors.is_empty() {
            risk_factors.push("Limited historical data for this exact question".to_string());
        }

        Prediction {
            probability: probability.clamp(0.05, 0.95),
            confidence: confidence.clamp(0.3, 0.9),
            key_factors,
            risk_factors,
            data_quality_score: (0.3 + 0.2 * f64::from(features_used)).min(1.0),
        }
    }
}

#[async_trait]
impl Predictor for HeuristicPredictor {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn predict(&self, request: &PredictionRequest) -> Result<Prediction> {
        Ok(Self::estimate(request))
    }
}
