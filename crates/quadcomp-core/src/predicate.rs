//! Region and merge predicates
//!
//! A quadtree consumes two predicate shapes:
//!
//! - A [`RegionPredicate`] decides, during a bulk build, whether a whole
//!   rectangle of raw raster data is homogeneous enough to collapse into one
//!   leaf, and which value that leaf gets.
//! - A [`MergePredicate`] decides, during incremental updates, whether four
//!   sibling leaf values can collapse into their parent.
//!
//! Both must be deterministic and must not touch the tree. Returning `None`
//! means "cannot merge": the build subdivides, the update stops re-merging.
//!
//! Plain closures work as predicates through blanket impls:
//!
//! ```
//! use quadcomp_core::{MergePredicate, Raster, Rect, RegionPredicate};
//!
//! let first_pixel = |raster: &Raster<u8>, rect: Rect| raster.get(rect.x_min, rect.y_min, 0).ok();
//! let raster = Raster::from_rows(&[[4u8, 5], [6, 7]]).unwrap();
//! assert_eq!(first_pixel.evaluate(&raster, Rect::square(1, 0, 1)), Some(5));
//!
//! let sum = |children: [Option<&u32>; 4]| -> Option<u32> {
//!     children.iter().map(|c| c.copied()).sum()
//! };
//! assert_eq!(sum.merge([Some(&1), Some(&2), Some(&3), Some(&4)]), Some(10));
//! assert_eq!(sum.merge([Some(&1), None, Some(&3), Some(&4)]), None);
//! ```

use crate::raster::{Raster, Sample};
use crate::rect::Rect;

/// Default level for [`RangeRegion`]
pub const DEFAULT_RANGE_LEVEL: u32 = 16;

/// Decides whether a raster rectangle collapses into a single leaf
pub trait RegionPredicate<T: Sample, V> {
    /// Representative value of `rect`, or `None` to force subdivision
    fn evaluate(&self, raster: &Raster<T>, rect: Rect) -> Option<V>;

    /// Value of a single cell the predicate declined to merge
    ///
    /// Called for 1×1 squares after [`evaluate`](Self::evaluate) returned
    /// `None`. The built-in predicates return the raw pixel; the default
    /// leaves the cell absent.
    fn cell_value(&self, raster: &Raster<T>, x: u32, y: u32) -> Option<V> {
        let _ = (raster, x, y);
        None
    }

    /// Value that stands for `rect` whether or not it merges
    ///
    /// Used to paint evaluated squares when replaying a build. The default
    /// has none.
    fn representative(&self, raster: &Raster<T>, rect: Rect) -> Option<V> {
        let _ = (raster, rect);
        None
    }
}

impl<T, V, F> RegionPredicate<T, V> for F
where
    T: Sample,
    F: Fn(&Raster<T>, Rect) -> Option<V>,
{
    fn evaluate(&self, raster: &Raster<T>, rect: Rect) -> Option<V> {
        self(raster, rect)
    }
}

/// Decides whether four sibling leaves collapse into their parent
///
/// Children are passed in quadrant order (top-left, top-right, bottom-left,
/// bottom-right); `None` marks a leaf with no value yet.
pub trait MergePredicate<V> {
    /// Merged value, or `None` to keep the four children
    fn merge(&self, children: [Option<&V>; 4]) -> Option<V>;
}

impl<V, F> MergePredicate<V> for F
where
    F: Fn([Option<&V>; 4]) -> Option<V>,
{
    fn merge(&self, children: [Option<&V>; 4]) -> Option<V> {
        self(children)
    }
}

/// Mean rounded half to even, exact for negative sums as well
#[inline]
pub fn rounded_mean(sum: i64, count: i64) -> i64 {
    let quotient = sum.div_euclid(count);
    let twice_rem = 2 * sum.rem_euclid(count);
    if twice_rem > count || (twice_rem == count && quotient.rem_euclid(2) == 1) {
        quotient + 1
    } else {
        quotient
    }
}

/// Convert an accumulator value back into a sample
#[inline]
pub fn to_sample<T: Sample>(value: i64) -> Option<T> {
    T::try_from(value).ok()
}

fn raw_pixel<T: Sample>(raster: &Raster<T>, x: u32, y: u32) -> Option<Vec<T>> {
    raster.pixel(x, y).ok().map(<[T]>::to_vec)
}

/// Per-channel rounded mean over the part of `rect` inside the raster
fn region_mean<T: Sample>(raster: &Raster<T>, rect: Rect) -> Option<Vec<T>> {
    let count = rect.clip(raster.width(), raster.height())?.area() as i64;
    raster
        .region_sum(rect)
        .ok()?
        .into_iter()
        .map(|sum| to_sample(rounded_mean(sum, count)))
        .collect()
}

/// Accepts a rectangle only if every channel is constant over it
///
/// The leaf value is the (shared) pixel. Together with [`EqualMerge`] this
/// forms a compatible pair: a bulk build and a cell-by-cell update sequence
/// over the same raster produce the same leaves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UniformRegion;

impl<T: Sample> RegionPredicate<T, Vec<T>> for UniformRegion {
    fn evaluate(&self, raster: &Raster<T>, rect: Rect) -> Option<Vec<T>> {
        let extrema = raster.region_extrema(rect).ok()?;
        if extrema.iter().all(|(lo, hi)| lo == hi) {
            Some(extrema.into_iter().map(|(lo, _)| lo).collect())
        } else {
            None
        }
    }

    fn cell_value(&self, raster: &Raster<T>, x: u32, y: u32) -> Option<Vec<T>> {
        raw_pixel(raster, x, y)
    }

    fn representative(&self, raster: &Raster<T>, rect: Rect) -> Option<Vec<T>> {
        region_mean(raster, rect)
    }
}

/// Accepts a rectangle whose widest channel range stays below `level`
///
/// The leaf value is the per-channel mean, rounded half to even (a mean of
/// 2.5 becomes 2). A level of 0 never merges anything larger than a single
/// cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRegion {
    /// Exclusive upper bound on `max - min` over every channel
    pub level: u32,
}

impl Default for RangeRegion {
    fn default() -> Self {
        Self {
            level: DEFAULT_RANGE_LEVEL,
        }
    }
}

impl RangeRegion {
    /// Create a range predicate with the given level
    pub fn new(level: u32) -> Self {
        Self { level }
    }
}

impl<T: Sample> RegionPredicate<T, Vec<T>> for RangeRegion {
    fn evaluate(&self, raster: &Raster<T>, rect: Rect) -> Option<Vec<T>> {
        let extrema = raster.region_extrema(rect).ok()?;
        let widest = extrema
            .iter()
            .map(|&(lo, hi)| hi.widen() - lo.widen())
            .max()
            .unwrap_or(0);
        if widest >= self.level as i64 {
            return None;
        }
        region_mean(raster, rect)
    }

    fn cell_value(&self, raster: &Raster<T>, x: u32, y: u32) -> Option<Vec<T>> {
        raw_pixel(raster, x, y)
    }

    fn representative(&self, raster: &Raster<T>, rect: Rect) -> Option<Vec<T>> {
        region_mean(raster, rect)
    }
}

/// Merges four siblings only when all are present and equal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EqualMerge;

impl<V: Clone + PartialEq> MergePredicate<V> for EqualMerge {
    fn merge(&self, children: [Option<&V>; 4]) -> Option<V> {
        let first = children[0]?;
        if children[1..].iter().all(|child| *child == Some(first)) {
            Some(first.clone())
        } else {
            None
        }
    }
}

/// Merges four present pixels whose per-channel spread is within `tolerance`
///
/// The merged pixel is the per-channel mean, rounded half to even.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToleranceMerge {
    /// Inclusive upper bound on `max - min` over every channel
    pub tolerance: u32,
}

impl ToleranceMerge {
    /// Create a tolerance merge predicate
    pub fn new(tolerance: u32) -> Self {
        Self { tolerance }
    }
}

impl<T: Sample> MergePredicate<Vec<T>> for ToleranceMerge {
    fn merge(&self, children: [Option<&Vec<T>>; 4]) -> Option<Vec<T>> {
        let pixels = [children[0]?, children[1]?, children[2]?, children[3]?];
        let channels = pixels[0].len();
        if pixels.iter().any(|p| p.len() != channels) {
            return None;
        }

        let mut merged = Vec::with_capacity(channels);
        for c in 0..channels {
            let values = pixels.map(|p| p[c].widen());
            let lo = values.iter().copied().min().unwrap_or(0);
            let hi = values.iter().copied().max().unwrap_or(0);
            if hi - lo > self.tolerance as i64 {
                return None;
            }
            merged.push(to_sample(rounded_mean(values.iter().sum(), 4))?);
        }
        Some(merged)
    }
}
