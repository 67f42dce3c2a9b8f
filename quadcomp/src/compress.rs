//! Compression pipeline
//!
//! Wires a checker, the optional statistics index and a [`QuadTree`]
//! together: pick a checker, build the index if the checker needs one,
//! build the tree, drop the index.

use crate::CompressResult;
use quadcomp_core::{
    DEFAULT_RANGE_LEVEL, Frame, RangeRegion, Raster, Recorder, RegionPredicate, Sample,
};
use quadcomp_stats::{DeviationOptions, DeviationPredicate};
use quadcomp_tree::{QuadTree, QuadTreeOptions};
use tracing::debug;

/// Homogeneity test used to decide whether a square becomes one leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checker {
    /// Widest channel range below `level`, answered by scanning the square
    Range {
        /// Exclusive upper bound on `max - min`
        level: u32,
    },
    /// Mean local deviation within a threshold, answered from a
    /// precomputed index in O(1)
    Deviation(DeviationOptions),
}

impl Default for Checker {
    fn default() -> Self {
        Checker::Range {
            level: DEFAULT_RANGE_LEVEL,
        }
    }
}

/// Options for [`compress`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompressOptions {
    /// Homogeneity test
    pub checker: Checker,
    /// Build the four top-level quadrants concurrently
    pub parallel: bool,
}

impl CompressOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the checker
    pub fn with_checker(mut self, checker: Checker) -> Self {
        self.checker = checker;
        self
    }

    /// Enable or disable the parallel top-level build
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

fn build_tree<T, P>(
    raster: &Raster<T>,
    options: &CompressOptions,
    predicate: &P,
) -> CompressResult<QuadTree<Vec<T>>>
where
    T: Sample,
    P: RegionPredicate<T, Vec<T>> + Sync,
{
    let mut tree = QuadTree::new(raster.width(), raster.height())?
        .with_options(QuadTreeOptions::new().with_parallel(options.parallel));
    tree.build(raster, predicate)?;
    debug!(
        width = raster.width(),
        height = raster.height(),
        checker = ?options.checker,
        leaves = tree.leaf_count(),
        "compressed raster"
    );
    Ok(tree)
}

/// Compress `raster` into a quadtree of per-channel pixel values
///
/// # Errors
///
/// Propagates index and tree construction errors.
///
/// # Examples
///
/// ```
/// use quadcomp::{Checker, CompressOptions, Raster, compress};
///
/// let raster = Raster::from_rows(&[[10u8, 11, 200, 200], [12, 10, 200, 200]]).unwrap();
/// let opts = CompressOptions::new().with_checker(Checker::Range { level: 4 });
/// let tree = compress(&raster, &opts).unwrap();
/// assert_eq!(tree.query(0, 0).unwrap(), Some(&vec![11]));
/// assert_eq!(tree.query(3, 1).unwrap(), Some(&vec![200]));
/// ```
pub fn compress<T: Sample>(
    raster: &Raster<T>,
    options: &CompressOptions,
) -> CompressResult<QuadTree<Vec<T>>> {
    match &options.checker {
        Checker::Range { level } => build_tree(raster, options, &RangeRegion::new(*level)),
        Checker::Deviation(opts) => {
            let predicate = DeviationPredicate::new(raster, opts)?;
            build_tree(raster, options, &predicate)
        }
    }
}

/// Like [`compress`], also returning every checker evaluation grouped by
/// square size, largest first
///
/// Each evaluation carries its square's mean, so rejected squares can be
/// painted too when replaying the build frame by frame.
pub fn compress_recorded<T: Sample>(
    raster: &Raster<T>,
    options: &CompressOptions,
) -> CompressResult<(QuadTree<Vec<T>>, Vec<Frame<Vec<T>>>)> {
    match &options.checker {
        Checker::Range { level } => {
            let recorder = Recorder::new(RangeRegion::new(*level));
            let tree = build_tree(raster, options, &recorder)?;
            Ok((tree, recorder.into_frames()))
        }
        Checker::Deviation(opts) => {
            let recorder = Recorder::new(DeviationPredicate::new(raster, opts)?);
            let tree = build_tree(raster, options, &recorder)?;
            Ok((tree, recorder.into_frames()))
        }
    }
}

/// Paint the visible leaves of `tree` into a new raster
///
/// Cells whose leaf has no value, or a value with the wrong number of
/// channels, keep `T::default()`.
///
/// # Errors
///
/// Returns `CompressError::Core` if `channels` is 0.
pub fn render<T: Sample>(tree: &QuadTree<Vec<T>>, channels: u32) -> CompressResult<Raster<T>> {
    let mut raster = Raster::new(tree.width(), tree.height(), channels)?;
    for quad in tree.visible_regions() {
        let Some(pixel) = quad.value else { continue };
        if pixel.len() != channels as usize {
            continue;
        }
        for y in quad.y_min..quad.y_max {
            for x in quad.x_min..quad.x_max {
                raster.set_pixel(x, y, pixel)?;
            }
        }
    }
    Ok(raster)
}
