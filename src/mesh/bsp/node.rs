//! BSP tree node data structure

use crate::mesh::plane::Plane;
use crate::mesh::polygon::Polygon;
use std::fmt::Debug;

/// A BSP tree node, containing polygons plus optional front/back subtrees
#[derive(Debug, Clone)]
pub struct Node<S: Clone> {
    /// Splitting plane for this node *or* **None** for an empty tree
    pub plane: Option<Plane>,

    /// Subtree for the front half-space
    pub front: Option<Box<Node<S>>>,

    /// Subtree for the back half-space
    pub back: Option<Box<Node<S>>>,

    /// Polygons lying on `plane`
    pub polygons: Vec<Polygon<S>>,
}

impl<S: Clone + Send + Sync + Debug> Default for Node<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Clone + Send + Sync + Debug> Node<S> {
    /// Create a new empty BSP node
    pub const fn new() -> Self {
        Self {
            plane: None,
            front: None,
            back: None,
            polygons: Vec::new(),
        }
    }

    /// Number of polygons stored in the whole tree
    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
            + self.front.as_ref().map_or(0, |n| n.polygon_count())
            + self.back.as_ref().map_or(0, |n| n.polygon_count())
    }
}
