//! Leaf enumeration

use crate::quadtree::Node;
use quadcomp_core::{Quad, Rect};

/// Depth-first iterator over the leaves of a quadtree
///
/// Created by [`QuadTree::regions`](crate::QuadTree::regions). Leaves are
/// visited in quadrant order (top-left, top-right, bottom-left,
/// bottom-right) at every level.
#[derive(Debug, Clone)]
pub struct Regions<'a, V> {
    stack: Vec<(&'a Node<V>, Rect)>,
}

impl<'a, V> Regions<'a, V> {
    pub(crate) fn new(root: &'a Node<V>, rect: Rect) -> Self {
        Self {
            stack: vec![(root, rect)],
        }
    }
}

impl<'a, V> Iterator for Regions<'a, V> {
    type Item = Quad<&'a V>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, rect)) = self.stack.pop() {
            match node {
                Node::Leaf(value) => return Some(Quad::new(rect, value.as_ref())),
                Node::Internal(children) => {
                    // Reversed so the top-left child is popped first
                    for (child, quadrant) in children.iter().zip(rect.quadrants()).rev() {
                        self.stack.push((child, quadrant));
                    }
                }
            }
        }
        None
    }
}
