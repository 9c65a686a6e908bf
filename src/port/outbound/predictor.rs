//! Probability estimation port.

use async_trait::async_trait;

use crate::domain::{Prediction, PredictionRequest};
use crate::error::Result;

/// Pluggable estimator of YES probability and confidence.
#[async_trait]
pub trait Predictor: Send + Sync {
    fn name(&self) -> &'static str;

    async fn predict(&self, request: &PredictionRequest) -> Result<Prediction>;
}
