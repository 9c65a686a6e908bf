//! Sentiment polarity.
//!
//! The whole crate measures sentiment as polarity in `[-1.0, 1.0]` with
//! `0.0` meaning neutral. Proposals expose sentiment on the `[0.0, 1.0]`
//! scale with `0.5` meaning neutral; [`Sentiment::unit`] is the only place
//! that mapping happens.

use serde::{Deserialize, Serialize};

/// Sentiment polarity in `[-1.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sentiment(f64);

impl Sentiment {
    /// Neutral sentiment.
    pub const NEUTRAL: Self = Self(0.0);

    /// Create a polarity, clamping into `[-1.0, 1.0]`.
    ///
    /// Non-finite input degrades to neutral.
    #[must_use]
    pub fn new(polarity: f64) -> Self {
        if polarity.is_finite() {
            Self(polarity.clamp(-1.0, 1.0))
        } else {
            Self::NEUTRAL
        }
    }

    /// Build from the `[0.0, 1.0]` scale (0.5 neutral).
    #[must_use]
    pub fn from_unit(value: f64) -> Self {
        if value.is_finite() {
            Self::new(value.clamp(0.0, 1.0) * 2.0 - 1.0)
        } else {
            Self::NEUTRAL
        }
    }

    /// Polarity in `[-1.0, 1.0]`.
    #[must_use]
    pub const fn polarity(self) -> f64 {
        self.0
    }

    /// Strength of the lean regardless of direction, in `[0.0, 1.0]`.
    #[must_use]
    pub fn magnitude(self) -> f64 {
        self.0.abs()
    }

    /// Value on the `[0.0, 1.0]` scale where `0.5` is neutral.
    #[must_use]
    pub fn unit(self) -> f64 {
        (self.0 + 1.0) / 2.0
    }

    /// Average of a set of per-text polarities, neutral when empty.
    #[must_use]
    pub fn mean(scores: &[f64]) -> Self {
        let finite: Vec<f64> = scores.iter().copied().filter(|s| s.is_finite()).collect();
        if finite.is_empty() {
            return Self::NEUTRAL;
        }
        Self::new(finite.iter().sum::<f64>() / finite.len() as f64)
    }
}
