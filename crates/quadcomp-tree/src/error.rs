//! Error types for quadcomp-tree

use thiserror::Error;

/// Errors that can occur during quadtree operations
#[derive(Debug, Error)]
pub enum TreeError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] quadcomp_core::Error),

    /// Raster dimensions disagree with the tree's declared size
    #[error("size mismatch: tree is {expected:?}, raster is {actual:?}")]
    SizeMismatch {
        /// Tree (width, height)
        expected: (u32, u32),
        /// Raster (width, height)
        actual: (u32, u32),
    },

    /// Coordinates outside the tree's square
    #[error("({x}, {y}) out of bounds for side {side}")]
    OutOfBounds { x: u32, y: u32, side: u32 },

    /// Invalid construction parameters
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type for quadtree operations
pub type TreeResult<T> = Result<T, TreeError>;
