//! Errors from the pure analysis stages (indicators, classification, risk).

use thiserror::Error;

/// Failures that make one symbol unanalysable. Never fatal to a scan.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("insufficient data: need {required} bars, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("invalid price {0}: must be positive and large enough for 2-decimal risk levels")]
    InvalidPrice(f64),
}
