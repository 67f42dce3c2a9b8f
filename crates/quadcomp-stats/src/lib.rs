//! quadcomp-stats - Windowed statistics for quadtree compression
//!
//! This crate provides O(1) rectangle statistics over a raster:
//!
//! - [`PrefixSum`] - Per-channel summed area tables
//! - [`local_mean`] - Clipped neighbourhood means of every pixel
//! - [`WindowedStats`] - Prefix sums plus a local-deviation index
//! - [`DeviationPredicate`] - A region predicate answering from the index

pub mod checker;
mod error;
pub mod prefix;
pub mod windowed;

pub use checker::{DEFAULT_RADIUS, DEFAULT_THRESHOLD, DeviationOptions, DeviationPredicate};
pub use error::{StatsError, StatsResult};
pub use prefix::PrefixSum;
pub use windowed::{WindowedStats, local_mean};
