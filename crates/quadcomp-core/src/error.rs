//! Error types for quadcomp-core
//!
//! Provides a unified error type for raster construction and access.
//! Each variant captures enough context for diagnostics without exposing
//! internal implementation details.

use thiserror::Error;

/// quadcomp-core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid raster dimensions
    #[error("invalid raster dimensions: {width}x{height}x{channels}")]
    InvalidDimension {
        width: u32,
        height: u32,
        channels: u32,
    },

    /// Index out of bounds
    #[error("index out of bounds: ({x}, {y}) outside {width}x{height}")]
    IndexOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// Raster or pixel dimension mismatch
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for quadcomp-core operations
pub type Result<T> = std::result::Result<T, Error>;
