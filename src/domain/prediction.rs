//! Probability estimates attached to proposals.

use serde::{Deserialize, Serialize};

use super::topic::Category;

/// Input to a probability estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub description: String,
    pub category: Category,
    /// Optional numeric features keyed by name (e.g. `sentiment`, `days_to_close`).
    #[serde(default)]
    pub features: Vec<(String, f64)>,
}

impl PredictionRequest {
    pub fn new(description: impl Into<String>, category: Category) -> Self {
        Self {
            description: description.into(),
            category,
            features: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_feature(mut self, name: impl Into<String>, value: f64) -> Self {
        self.features.push((name.into(), value));
        self
    }

    /// Look up a feature by name.
    #[must_use]
    pub fn feature(&self, name: &str) -> Option<f64> {
        self.features
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| *v)
    }
}

/// Output of a probability estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub probability: f64,
    pub confidence: f64,
    pub key_factors: Vec<String>,
    pub risk_factors: Vec<String>,
    pub data_quality_score: f64,
}
