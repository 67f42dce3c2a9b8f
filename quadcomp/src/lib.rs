//! quadcomp - Quadtree raster compression
//!
//! Compresses a raster into a quadtree whose leaves cover maximal
//! homogeneous squares.
//!
//! # Overview
//!
//! - [`Raster`] holds the input pixels
//! - A checker decides which squares are homogeneous: the simple range
//!   test, or the O(1) local-deviation test backed by [`stats`]
//! - [`QuadTree`] builds top-down from a raster, or is updated cell by cell
//!   with bottom-up re-merging
//! - [`render`] paints the leaves back into a raster
//!
//! # Example
//!
//! ```
//! use quadcomp::{Checker, CompressOptions, DeviationOptions, Raster, compress, render};
//!
//! let raster = Raster::from_fn(64, 64, 3, |x, _, c| (x / 16 * 60 + c * 10) as u8).unwrap();
//! let opts = CompressOptions::new()
//!     .with_checker(Checker::Deviation(DeviationOptions::new().with_radius(1).with_threshold(0)))
//!     .with_parallel(true);
//! let tree = compress(&raster, &opts).unwrap();
//! assert!(tree.leaf_count() < 64 * 64);
//!
//! let out = render(&tree, 3).unwrap();
//! assert_eq!(out.dimensions(), (64, 64));
//! ```

mod compress;
mod error;

// Re-export core types (primary data structures used everywhere)
pub use quadcomp_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use quadcomp_stats as stats;
pub use quadcomp_tree as tree;

pub use compress::{Checker, CompressOptions, compress, compress_recorded, render};
pub use error::{CompressError, CompressResult};
pub use quadcomp_stats::DeviationOptions;
pub use quadcomp_tree::{QuadTree, QuadTreeOptions};
