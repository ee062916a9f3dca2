//! Error types for body-trend
//!
//! These describe why a section of a trend report is unavailable. The
//! analyzer stores them per section instead of returning early.

use thiserror::Error;

/// Reasons a statistic could not be computed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrendError {
    #[error("no data")]
    EmptySeries,

    #[error("insufficient data: need at least {required} samples, have {actual}")]
    InsufficientSamples { required: usize, actual: usize },

    #[error("model fit failed: {0}")]
    ModelFit(String),
}

impl TrendError {
    pub fn insufficient(required: usize, actual: usize) -> Self {
        Self::InsufficientSamples { required, actual }
    }

    pub fn model_fit(msg: impl Into<String>) -> Self {
        Self::ModelFit(msg.into())
    }

    /// Whether the series was simply too short for this section
    pub fn is_insufficient(&self) -> bool {
        matches!(self, Self::EmptySeries | Self::InsufficientSamples { .. })
    }
}

pub type Result<T> = std::result::Result<T, TrendError>;

/// Fail with `InsufficientSamples` when fewer than `required` samples exist
pub(crate) fn require_samples(actual: usize, required: usize) -> Result<()> {
    if actual == 0 {
        return Err(TrendError::EmptySeries);
    }
    if actual < required {
        return Err(TrendError::insufficient(required, actual));
    }
    Ok(())
}
