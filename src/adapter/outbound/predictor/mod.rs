//! Probability estimators.

pub mod heuristic;

pub use heuristic::HeuristicPredictor;
