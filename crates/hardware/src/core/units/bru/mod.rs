//! Branch-related units: the bimodal predictor used by the Fetcher.

/// 2-bit saturating-counter bimodal predictor.
pub mod predictor;

pub use predictor::BimodalPredictor;
