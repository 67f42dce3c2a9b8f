//! quadcomp-core - Basic data structures for quadtree raster compression
//!
//! This crate provides the types shared by every other quadcomp crate:
//!
//! - [`Raster`] - The input pixel container, generic over its [`Sample`] type
//! - [`Rect`] / [`Quad`] - Half-open rectangles and the leaf regions a tree reports
//! - [`RegionPredicate`] / [`MergePredicate`] - The predicate contract a
//!   quadtree is built against, plus ready-made predicates
//! - [`Recorder`] - A predicate wrapper that records evaluations per level

pub mod error;
pub mod predicate;
pub mod raster;
pub mod record;
pub mod rect;

pub use error::{Error, Result};
pub use predicate::{
    DEFAULT_RANGE_LEVEL, EqualMerge, MergePredicate, RangeRegion, RegionPredicate,
    ToleranceMerge, UniformRegion, rounded_mean, to_sample,
};
pub use raster::{Raster, Sample};
pub use record::{Evaluation, Frame, Recorder};
pub use rect::{Quad, Rect};
