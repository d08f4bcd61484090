//! Error types for the aim prediction system.

use thiserror::Error;

use crate::types::DisplayMode;

/// Errors returned by prediction and display operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    /// The predictor was used before `init` resolved its body parameters.
    #[error("aim prediction used before initialization; call init() first")]
    NotInitialized,
    /// A configuration value would produce an empty or unbounded simulation.
    #[error("degenerate prediction configuration: {reason}")]
    DegenerateConfig {
        /// What was wrong with the configuration
        reason: String,
    },
    /// The visual pool cannot hold a full trajectory for its display mode.
    #[error("{mode:?} pool needs {expected} visuals, got {actual}")]
    PoolSizeMismatch {
        /// Display mode of the pool
        mode: DisplayMode,
        /// Number of visuals required
        expected: usize,
        /// Number of visuals supplied
        actual: usize,
    },
}

impl PredictionError {
    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateConfig {
            reason: reason.into(),
        }
    }
}
