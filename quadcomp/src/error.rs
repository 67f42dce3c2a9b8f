//! Error types for the compression pipeline

use thiserror::Error;

/// Errors that can occur while compressing or rendering a raster
#[derive(Debug, Error)]
pub enum CompressError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] quadcomp_core::Error),

    /// Statistics index error
    #[error("stats error: {0}")]
    Stats(#[from] quadcomp_stats::StatsError),

    /// Quadtree error
    #[error("tree error: {0}")]
    Tree(#[from] quadcomp_tree::TreeError),
}

/// Result type for compression operations
pub type CompressResult<T> = Result<T, CompressError>;
