//! Error types for quadcomp-stats

use thiserror::Error;

/// Errors that can occur while building or querying statistics
#[derive(Debug, Error)]
pub enum StatsError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] quadcomp_core::Error),

    /// Query rectangle is empty or extends past the indexed area
    #[error("invalid rect [{x_min}, {x_max}) x [{y_min}, {y_max}) for {width}x{height} index")]
    InvalidRect {
        x_min: u32,
        x_max: u32,
        y_min: u32,
        y_max: u32,
        width: u32,
        height: u32,
    },

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Result type for statistics operations
pub type StatsResult<T> = Result<T, StatsError>;
