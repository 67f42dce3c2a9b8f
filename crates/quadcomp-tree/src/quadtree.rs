//! QuadTree - Hierarchical raster compression
//!
//! A quadtree covers a `2^max_power × 2^max_power` square. Every node is
//! either a leaf holding an optional value or an internal node owning
//! exactly four children, in quadrant order top-left, top-right,
//! bottom-left, bottom-right. The leaves always partition the square.
//!
//! Two construction modes are supported:
//!
//! - [`QuadTree::build`] subdivides top-down from a full raster, asking a
//!   [`RegionPredicate`] whether each square collapses into one leaf.
//! - [`QuadTree::update`] writes a single cell and re-merges ancestors
//!   bottom-up with a [`MergePredicate`], so the tree stays maximally merged.
//!
//! Coordinates outside `[0, width) × [0, height)` are padding. They are
//! kept in the tree (so the square stays a power of two) and dropped by
//! [`QuadTree::visible_regions`].
//!
//! # Examples
//!
//! ```
//! use quadcomp_core::{EqualMerge, Raster, UniformRegion};
//! use quadcomp_tree::QuadTree;
//!
//! let raster = Raster::from_rows(&[[7u8, 7], [7, 7]]).unwrap();
//! let mut tree = QuadTree::new(2, 2).unwrap();
//! tree.build(&raster, &UniformRegion).unwrap();
//! assert_eq!(tree.leaf_count(), 1);
//!
//! tree.update(1, 1, vec![9], &EqualMerge).unwrap();
//! assert_eq!(tree.leaf_count(), 4);
//! assert_eq!(tree.query(0, 0).unwrap(), Some(&vec![7]));
//! ```

use crate::parallel;
use crate::regions::Regions;
use crate::{TreeError, TreeResult};
use quadcomp_core::{MergePredicate, Quad, Raster, Rect, RegionPredicate, Sample};
use tracing::{debug, trace};

/// Largest supported `max_power`
pub const MAX_POWER_LIMIT: u32 = 31;

/// Default smallest side at which [`QuadTreeOptions::parallel`] fans out
pub const DEFAULT_PARALLEL_MIN_SIDE: u32 = 64;

/// Options for quadtree construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadTreeOptions {
    /// Build the four top-level quadrants concurrently
    pub parallel: bool,
    /// Trees with a smaller side are always built sequentially
    pub parallel_min_side: u32,
}

impl Default for QuadTreeOptions {
    fn default() -> Self {
        Self {
            parallel: false,
            parallel_min_side: DEFAULT_PARALLEL_MIN_SIDE,
        }
    }
}

impl QuadTreeOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the parallel top-level fan-out
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the smallest side that is built in parallel
    pub fn with_parallel_min_side(mut self, side: u32) -> Self {
        self.parallel_min_side = side;
        self
    }
}

/// A quadtree node
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node<V> {
    /// Leaf covering its whole square; `None` until something is written
    Leaf(Option<V>),
    /// Four children in quadrant order
    Internal(Box<[Node<V>; 4]>),
}

impl<V> Node<V> {
    /// Value of a leaf, `None` for an internal node
    fn leaf_value(&self) -> Option<Option<&V>> {
        match self {
            Node::Leaf(value) => Some(value.as_ref()),
            Node::Internal(_) => None,
        }
    }

    fn depth(&self) -> u32 {
        match self {
            Node::Leaf(_) => 0,
            Node::Internal(children) => 1 + children.iter().map(Node::depth).max().unwrap_or(0),
        }
    }

    /// Merge candidate of an internal node whose children are all leaves
    fn merge_children<M: MergePredicate<V>>(children: &[Node<V>; 4], merge: &M) -> Option<V> {
        let values = [
            children[0].leaf_value()?,
            children[1].leaf_value()?,
            children[2].leaf_value()?,
            children[3].leaf_value()?,
        ];
        merge.merge(values)
    }

    fn is_fully_merged<M: MergePredicate<V>>(&self, merge: &M) -> bool {
        match self {
            Node::Leaf(_) => true,
            Node::Internal(children) => {
                Self::merge_children(children, merge).is_none()
                    && children.iter().all(|c| c.is_fully_merged(merge))
            }
        }
    }
}

impl<V: Clone> Node<V> {
    /// Children of this node, splitting a leaf into four copies of itself
    fn children_mut(&mut self) -> &mut [Node<V>; 4] {
        if let Node::Leaf(value) = self {
            let value = value.take();
            *self = Node::Internal(Box::new([
                Node::Leaf(value.clone()),
                Node::Leaf(value.clone()),
                Node::Leaf(value.clone()),
                Node::Leaf(value),
            ]));
        }
        match self {
            Node::Internal(children) => &mut **children,
            Node::Leaf(_) => unreachable!("leaf was split above"),
        }
    }
}

/// Quadrant of `(x, y)` inside the square at `(x_min, y_min)`
///
/// Returns the child index and the child's origin.
#[inline]
fn quadrant(x: u32, y: u32, x_min: u32, y_min: u32, half: u32) -> (usize, u32, u32) {
    let right = x >= x_min + half;
    let bottom = y >= y_min + half;
    let index = (bottom as usize) * 2 + right as usize;
    (
        index,
        if right { x_min + half } else { x_min },
        if bottom { y_min + half } else { y_min },
    )
}

/// Build the subtree for `rect`
///
/// With `fan_out` set and a subdivision needed, the four children are built
/// concurrently.
pub(crate) fn build_node<T, V, P>(
    raster: &Raster<T>,
    predicate: &P,
    rect: Rect,
    fan_out: bool,
) -> Node<V>
where
    T: Sample,
    V: Send,
    P: RegionPredicate<T, V> + Sync,
{
    let (width, height) = raster.dimensions();
    let size = rect.width();

    if rect.x_min >= width && rect.y_min >= height {
        return Node::Leaf(None);
    }

    // Partially outside: the predicate would see padding
    if rect.x_max > width || rect.y_max > height {
        if size == 1 {
            return Node::Leaf(None);
        }
        return subdivide(raster, predicate, rect, fan_out);
    }

    if let Some(value) = predicate.evaluate(raster, rect) {
        return Node::Leaf(Some(value));
    }
    if size == 1 {
        return Node::Leaf(predicate.cell_value(raster, rect.x_min, rect.y_min));
    }
    subdivide(raster, predicate, rect, fan_out)
}

fn subdivide<T, V, P>(raster: &Raster<T>, predicate: &P, rect: Rect, fan_out: bool) -> Node<V>
where
    T: Sample,
    V: Send,
    P: RegionPredicate<T, V> + Sync,
{
    if fan_out {
        return parallel::build_quadrants(raster, predicate, rect);
    }
    let [tl, tr, bl, br] = rect.quadrants();
    Node::Internal(Box::new([
        build_node(raster, predicate, tl, false),
        build_node(raster, predicate, tr, false),
        build_node(raster, predicate, bl, false),
        build_node(raster, predicate, br, false),
    ]))
}

/// A region quadtree over a `width × height` raster
#[derive(Debug, Clone, PartialEq)]
pub struct QuadTree<V> {
    root: Node<V>,
    width: u32,
    height: u32,
    max_power: u32,
    options: QuadTreeOptions,
}

impl<V> QuadTree<V> {
    /// Create an empty tree for a `width × height` raster
    ///
    /// The tree covers the smallest power-of-two square containing the
    /// raster.
    ///
    /// # Errors
    ///
    /// Returns `TreeError::InvalidConfiguration` if either dimension is 0 or
    /// the square would exceed `2^31`.
    pub fn new(width: u32, height: u32) -> TreeResult<Self> {
        if width == 0 || height == 0 {
            return Err(TreeError::InvalidConfiguration(format!(
                "dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        let side = width.max(height).checked_next_power_of_two().ok_or_else(|| {
            TreeError::InvalidConfiguration(format!("{}x{} is too large", width, height))
        })?;
        Ok(Self {
            root: Node::Leaf(None),
            width,
            height,
            max_power: side.trailing_zeros(),
            options: QuadTreeOptions::default(),
        })
    }

    /// Create an empty tree covering a `2^max_power` square with no padding
    ///
    /// # Errors
    ///
    /// Returns `TreeError::InvalidConfiguration` unless `1 <= max_power <= 31`.
    pub fn with_max_power(max_power: u32) -> TreeResult<Self> {
        if max_power == 0 || max_power > MAX_POWER_LIMIT {
            return Err(TreeError::InvalidConfiguration(format!(
                "max_power must be in 1..={}, got {}",
                MAX_POWER_LIMIT, max_power
            )));
        }
        let side = 1u32 << max_power;
        Ok(Self {
            root: Node::Leaf(None),
            width: side,
            height: side,
            max_power,
            options: QuadTreeOptions::default(),
        })
    }

    /// Replace the construction options
    pub fn with_options(mut self, options: QuadTreeOptions) -> Self {
        self.options = options;
        self
    }

    /// Get the raster width
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the raster height
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the tree's power: the square has side `2^max_power`
    pub fn max_power(&self) -> u32 {
        self.max_power
    }

    /// Get the side of the covered square
    #[inline]
    pub fn side(&self) -> u32 {
        1 << self.max_power
    }

    /// Get the construction options
    pub fn options(&self) -> &QuadTreeOptions {
        &self.options
    }

    fn check_bounds(&self, x: u32, y: u32) -> TreeResult<()> {
        let side = self.side();
        if x >= side || y >= side {
            return Err(TreeError::OutOfBounds { x, y, side });
        }
        Ok(())
    }

    /// Value of the leaf containing (x, y)
    ///
    /// `None` means nothing has been written there.
    ///
    /// # Errors
    ///
    /// Returns `TreeError::OutOfBounds` if (x, y) is outside the square.
    pub fn query(&self, x: u32, y: u32) -> TreeResult<Option<&V>> {
        self.check_bounds(x, y)?;
        let mut node = &self.root;
        let (mut x_min, mut y_min, mut size) = (0, 0, self.side());
        loop {
            match node {
                Node::Leaf(value) => return Ok(value.as_ref()),
                Node::Internal(children) => {
                    size /= 2;
                    let (index, cx, cy) = quadrant(x, y, x_min, y_min, size);
                    (x_min, y_min) = (cx, cy);
                    node = &children[index];
                }
            }
        }
    }

    /// Iterate over every leaf in depth-first quadrant order
    ///
    /// Leaf areas sum to `side²`, padding included.
    pub fn regions(&self) -> Regions<'_, V> {
        Regions::new(&self.root, Rect::square(0, 0, self.side()))
    }

    /// Iterate over leaves clipped to the raster, skipping pure padding
    pub fn visible_regions(&self) -> impl Iterator<Item = Quad<&V>> + '_ {
        let (width, height) = (self.width, self.height);
        self.regions()
            .filter_map(move |q| q.rect().clip(width, height).map(|r| Quad::new(r, q.value)))
    }

    /// Collect every leaf as an owned quad
    pub fn quads(&self) -> Vec<Quad<V>>
    where
        V: Clone,
    {
        self.regions().map(Quad::cloned).collect()
    }

    /// Number of leaves
    pub fn leaf_count(&self) -> usize {
        self.regions().count()
    }

    /// Length of the longest root-to-leaf path
    pub fn depth(&self) -> u32 {
        self.root.depth()
    }

    /// Reset to a single leaf with no value
    pub fn clear(&mut self) {
        self.root = Node::Leaf(None);
    }

    /// Check that no four sibling leaves would merge under `merge`
    pub fn is_fully_merged<M: MergePredicate<V>>(&self, merge: &M) -> bool {
        self.root.is_fully_merged(merge)
    }

    /// Build the tree top-down from `raster`
    ///
    /// Squares the predicate accepts become leaves; rejected squares are
    /// subdivided down to single cells, which take the predicate's
    /// [`cell_value`](RegionPredicate::cell_value). Squares reaching into
    /// the padding are always subdivided. Any previous content is replaced.
    ///
    /// # Errors
    ///
    /// Returns `TreeError::SizeMismatch` if the raster dimensions differ from
    /// the tree's; the tree is left unchanged.
    pub fn build<T, P>(&mut self, raster: &Raster<T>, predicate: &P) -> TreeResult<()>
    where
        T: Sample,
        V: Send,
        P: RegionPredicate<T, V> + Sync,
    {
        if raster.dimensions() != (self.width, self.height) {
            return Err(TreeError::SizeMismatch {
                expected: (self.width, self.height),
                actual: raster.dimensions(),
            });
        }

        let side = self.side();
        let fan_out = parallel::should_fan_out(&self.options, side);
        debug!(
            width = self.width,
            height = self.height,
            side,
            parallel = fan_out,
            "building quadtree"
        );

        self.root = build_node(raster, predicate, Rect::square(0, 0, side), fan_out);

        debug!(leaves = self.leaf_count(), depth = self.depth(), "quadtree built");
        Ok(())
    }

    /// Write `value` at (x, y) and re-merge ancestors bottom-up
    ///
    /// A leaf on the way down is split into four leaves that keep its value.
    /// Walking back up, each ancestor whose four children are leaves is
    /// collapsed if `merge` returns a value; the walk stops at the first
    /// ancestor that does not merge.
    ///
    /// # Errors
    ///
    /// Returns `TreeError::OutOfBounds` if (x, y) is outside the square;
    /// the tree is left unchanged.
    pub fn update<M>(&mut self, x: u32, y: u32, value: V, merge: &M) -> TreeResult<()>
    where
        V: Clone,
        M: MergePredicate<V>,
    {
        self.check_bounds(x, y)?;
        trace!(x, y, "quadtree update");
        let side = self.side();
        update_node(&mut self.root, x, y, 0, 0, side, value, merge);
        Ok(())
    }
}

/// Returns `true` if `node` ended up a leaf and the caller may try to merge
#[allow(clippy::too_many_arguments)]
fn update_node<V, M>(
    node: &mut Node<V>,
    x: u32,
    y: u32,
    x_min: u32,
    y_min: u32,
    size: u32,
    value: V,
    merge: &M,
) -> bool
where
    V: Clone,
    M: MergePredicate<V>,
{
    if size == 1 {
        *node = Node::Leaf(Some(value));
        return true;
    }

    let half = size / 2;
    let (index, cx, cy) = quadrant(x, y, x_min, y_min, half);
    let children = node.children_mut();
    if !update_node(&mut children[index], x, y, cx, cy, half, value, merge) {
        return false;
    }

    match Node::merge_children(children, merge) {
        Some(merged) => {
            *node = Node::Leaf(Some(merged));
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadcomp_core::{EqualMerge, UniformRegion};

    fn scenario() -> Raster<u8> {
        Raster::from_rows(&[[0u8, 0, 1, 2], [0, 0, 3, 4], [1, 2, 1, 1], [3, 4, 1, 1]]).unwrap()
    }

    fn q(x_min: u32, x_max: u32, y_min: u32, y_max: u32, v: Option<u8>) -> Quad<Vec<u8>> {
        Quad::new(Rect::new_unchecked(x_min, x_max, y_min, y_max), v.map(|v| vec![v]))
    }

    #[test]
    fn test_new_power() {
        assert_eq!(QuadTree::<u8>::new(1, 1).unwrap().max_power(), 0);
        assert_eq!(QuadTree::<u8>::new(4, 4).unwrap().max_power(), 2);
        assert_eq!(QuadTree::<u8>::new(5, 3).unwrap().max_power(), 3);
        assert_eq!(QuadTree::<u8>::new(5, 3).unwrap().side(), 8);
        assert!(matches!(
            QuadTree::<u8>::new(0, 3),
            Err(TreeError::InvalidConfiguration(_))
        ));
        assert!(QuadTree::<u8>::new(u32::MAX, 1).is_err());
        assert_eq!(QuadTree::<u8>::new(1 << 31, 1).unwrap().max_power(), 31);
    }

    #[test]
    fn test_with_max_power() {
        let tree = QuadTree::<u8>::with_max_power(3).unwrap();
        assert_eq!((tree.width(), tree.height(), tree.side()), (8, 8, 8));
        assert!(QuadTree::<u8>::with_max_power(0).is_err());
        assert!(QuadTree::<u8>::with_max_power(32).is_err());
        assert!(QuadTree::<u8>::with_max_power(31).is_ok());
    }

    #[test]
    fn test_empty_tree() {
        let tree = QuadTree::<u8>::new(4, 4).unwrap();
        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.query(3, 3).unwrap(), None);
    }

    #[test]
    fn test_build_scenario() {
        let mut tree = QuadTree::new(4, 4).unwrap();
        tree.build(&scenario(), &UniformRegion).unwrap();
        assert_eq!(
            tree.quads(),
            vec![
                q(0, 2, 0, 2, Some(0)),
                q(2, 3, 0, 1, Some(1)),
                q(3, 4, 0, 1, Some(2)),
                q(2, 3, 1, 2, Some(3)),
                q(3, 4, 1, 2, Some(4)),
                q(0, 1, 2, 3, Some(1)),
                q(1, 2, 2, 3, Some(2)),
                q(0, 1, 3, 4, Some(3)),
                q(1, 2, 3, 4, Some(4)),
                q(2, 4, 2, 4, Some(1)),
            ]
        );
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.query(3, 1).unwrap(), Some(&vec![4]));
        assert_eq!(tree.query(3, 3).unwrap(), Some(&vec![1]));
    }

    #[test]
    fn test_build_edge_squares_not_evaluated() {
        let raster = Raster::new_with_value(3, 3, 1, 5u8).unwrap();
        let seen = std::sync::Mutex::new(Vec::new());
        let accept_all = |_: &Raster<u8>, rect: Rect| -> Option<Vec<u8>> {
            seen.lock().unwrap().push(rect);
            Some(vec![5])
        };
        let mut tree = QuadTree::new(3, 3).unwrap();
        tree.build(&raster, &accept_all).unwrap();

        let seen = seen.into_inner().unwrap();
        assert!(seen.iter().all(|r| r.x_max <= 3 && r.y_max <= 3));
        assert_eq!(seen.len(), 6);
        assert_eq!(
            tree.quads(),
            vec![
                q(0, 2, 0, 2, Some(5)),
                q(2, 3, 0, 1, Some(5)),
                q(3, 4, 0, 1, None),
                q(2, 3, 1, 2, Some(5)),
                q(3, 4, 1, 2, None),
                q(0, 1, 2, 3, Some(5)),
                q(1, 2, 2, 3, Some(5)),
                q(0, 1, 3, 4, None),
                q(1, 2, 3, 4, None),
                q(2, 3, 2, 3, Some(5)),
                q(3, 4, 2, 3, None),
                q(2, 3, 3, 4, None),
                q(3, 4, 3, 4, None),
            ]
        );
    }

    #[test]
    fn test_build_size_mismatch_leaves_tree() {
        let mut tree = QuadTree::new(4, 4).unwrap();
        tree.build(&scenario(), &UniformRegion).unwrap();
        let before = tree.clone();
        let other = Raster::<u8>::new(3, 4, 1).unwrap();
        assert!(matches!(
            tree.build(&other, &UniformRegion),
            Err(TreeError::SizeMismatch {
                expected: (4, 4),
                actual: (3, 4)
            })
        ));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_update_splits_and_merges() {
        let mut tree = QuadTree::<u8>::with_max_power(1).unwrap();
        for (x, y) in [(0, 0), (1, 0), (0, 1)] {
            tree.update(x, y, 5, &EqualMerge).unwrap();
            assert_eq!(tree.leaf_count(), 4);
        }
        tree.update(1, 1, 5, &EqualMerge).unwrap();
        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(tree.query(1, 1).unwrap(), Some(&5));

        // Splitting keeps the old value in the three untouched cells
        tree.update(1, 1, 6, &EqualMerge).unwrap();
        assert_eq!(tree.leaf_count(), 4);
        assert_eq!(tree.query(0, 1).unwrap(), Some(&5));
        assert_eq!(tree.query(1, 1).unwrap(), Some(&6));
        assert!(tree.is_fully_merged(&EqualMerge));
    }

    #[test]
    fn test_update_merge_cascades() {
        let mut tree = QuadTree::<u8>::with_max_power(2).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                tree.update(x, y, 1, &EqualMerge).unwrap();
            }
        }
        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn test_update_stops_at_unmerged_ancestor() {
        let mut tree = QuadTree::<u8>::with_max_power(2).unwrap();
        tree.update(0, 0, 1, &EqualMerge).unwrap();
        assert_eq!(tree.depth(), 2);
        // 4 cells in the top-left quadrant + 3 untouched quadrants
        assert_eq!(tree.leaf_count(), 7);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut tree = QuadTree::<u8>::new(3, 3).unwrap();
        assert!(tree.query(3, 3).is_ok());
        assert!(matches!(
            tree.query(4, 0),
            Err(TreeError::OutOfBounds { x: 4, y: 0, side: 4 })
        ));
        let before = tree.clone();
        assert!(tree.update(0, 4, 1, &EqualMerge).is_err());
        assert_eq!(tree, before);
    }

    #[test]
    fn test_clear() {
        let mut tree = QuadTree::new(4, 4).unwrap();
        tree.build(&scenario(), &UniformRegion).unwrap();
        tree.clear();
        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(tree.query(0, 0).unwrap(), None);
    }

    #[test]
    fn test_quadrant() {
        assert_eq!(quadrant(0, 0, 0, 0, 2), (0, 0, 0));
        assert_eq!(quadrant(3, 0, 0, 0, 2), (1, 2, 0));
        assert_eq!(quadrant(1, 2, 0, 0, 2), (2, 0, 2));
        assert_eq!(quadrant(5, 7, 4, 4, 2), (2, 4, 6));
        assert_eq!(quadrant(7, 7, 4, 4, 2), (3, 6, 6));
    }
}
