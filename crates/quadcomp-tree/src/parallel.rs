//! Parallel top-level build
//!
//! Only the four quadrants of the full square are built concurrently; every
//! deeper level is sequential. Each task reads the shared raster and
//! predicate and returns its own subtree, so the result is identical to a
//! sequential build.

use crate::quadtree::{Node, QuadTreeOptions, build_node};
use quadcomp_core::{Raster, Rect, RegionPredicate, Sample};
use tracing::trace;

/// Whether a build over a `side × side` square should fan out
pub(crate) fn should_fan_out(options: &QuadTreeOptions, side: u32) -> bool {
    let fan_out = options.parallel && side >= 2 && side >= options.parallel_min_side;
    trace!(side, fan_out, "parallel build decision");
    fan_out
}

/// Build the four quadrants of `rect` as four rayon tasks
pub(crate) fn build_quadrants<T, V, P>(raster: &Raster<T>, predicate: &P, rect: Rect) -> Node<V>
where
    T: Sample,
    V: Send,
    P: RegionPredicate<T, V> + Sync,
{
    let [tl, tr, bl, br] = rect.quadrants();
    let ((tl, tr), (bl, br)) = rayon::join(
        || {
            rayon::join(
                || build_node(raster, predicate, tl, false),
                || build_node(raster, predicate, tr, false),
            )
        },
        || {
            rayon::join(
                || build_node(raster, predicate, bl, false),
                || build_node(raster, predicate, br, false),
            )
        },
    );
    Node::Internal(Box::new([tl, tr, bl, br]))
}
