//! Local-deviation region predicate
//!
//! A rectangle is homogeneous when its mean local deviation (see
//! [`WindowedStats`]) is at most a threshold. The leaf value is the
//! per-channel floor mean of the rectangle. Both tests are O(1) per call,
//! which is what makes bulk builds over large rasters tractable.

use crate::windowed::WindowedStats;
use crate::StatsResult;
use quadcomp_core::{Raster, Rect, RegionPredicate, Sample, to_sample};
use tracing::trace;

/// Default neighbourhood radius
pub const DEFAULT_RADIUS: u32 = 15;

/// Default mean-deviation threshold
pub const DEFAULT_THRESHOLD: u32 = 100;

/// Options for [`DeviationPredicate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviationOptions {
    /// Local-mean neighbourhood radius (0 is treated as 1)
    pub radius: u32,
    /// Inclusive upper bound on the mean deviation of a mergeable rect
    pub threshold: u32,
}

impl Default for DeviationOptions {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl DeviationOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the neighbourhood radius
    pub fn with_radius(mut self, radius: u32) -> Self {
        self.radius = radius;
        self
    }

    /// Set the deviation threshold
    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }
}

/// Region predicate backed by a [`WindowedStats`] index
///
/// The index is built from one raster and answers for that raster only.
/// [`evaluate`](RegionPredicate::evaluate) must be given the same raster:
/// a raster with different dimensions is refused (every square rejected,
/// so a build keeps raw pixels), while a different raster of the same size
/// cannot be detected and gets the indexed raster's statistics.
#[derive(Debug, Clone)]
pub struct DeviationPredicate {
    stats: WindowedStats,
    threshold: u32,
}

impl DeviationPredicate {
    /// Build the index for `raster`
    pub fn new<T: Sample>(raster: &Raster<T>, options: &DeviationOptions) -> StatsResult<Self> {
        Ok(Self {
            stats: WindowedStats::new(raster, options.radius)?,
            threshold: options.threshold,
        })
    }

    /// Get the underlying index
    pub fn stats(&self) -> &WindowedStats {
        &self.stats
    }

    /// Get the deviation threshold
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    fn indexes<T: Sample>(&self, raster: &Raster<T>) -> bool {
        raster.dimensions() == (self.stats.width(), self.stats.height())
    }

    fn clipped_mean<T: Sample>(&self, rect: Rect) -> Option<Vec<T>> {
        self.stats
            .rect_mean(rect)
            .ok()?
            .into_iter()
            .map(to_sample)
            .collect()
    }
}

impl<T: Sample> RegionPredicate<T, Vec<T>> for DeviationPredicate {
    fn evaluate(&self, raster: &Raster<T>, rect: Rect) -> Option<Vec<T>> {
        if !self.indexes(raster) {
            trace!(dims = ?raster.dimensions(), "raster does not match the deviation index");
            return None;
        }
        let rect = rect.clip(self.stats.width(), self.stats.height())?;
        if self.stats.mean_deviation(rect).ok()? > self.threshold as i64 {
            return None;
        }
        self.clipped_mean(rect)
    }

    fn cell_value(&self, raster: &Raster<T>, x: u32, y: u32) -> Option<Vec<T>> {
        raster.pixel(x, y).ok().map(<[T]>::to_vec)
    }

    fn representative(&self, raster: &Raster<T>, rect: Rect) -> Option<Vec<T>> {
        if !self.indexes(raster) {
            return None;
        }
        self.clipped_mean(rect.clip(self.stats.width(), self.stats.height())?)
    }
}
