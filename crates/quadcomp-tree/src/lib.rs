//! quadcomp-tree - Region quadtrees over rasters
//!
//! This crate provides [`QuadTree`], which compresses a raster into maximal
//! homogeneous squares:
//!
//! - Bulk top-down [`build`](QuadTree::build) against a region predicate,
//!   optionally fanning the top level out over rayon
//! - Point [`update`](QuadTree::update) with bottom-up re-merge
//! - Point [`query`](QuadTree::query) and leaf enumeration

mod error;
mod parallel;
pub mod quadtree;
pub mod regions;

pub use error::{TreeError, TreeResult};
pub use quadtree::{DEFAULT_PARALLEL_MIN_SIDE, MAX_POWER_LIMIT, QuadTree, QuadTreeOptions};
pub use regions::Regions;
