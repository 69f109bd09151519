//! Binary Space Partitioning (BSP) tree implementation
//!
//! Tree algorithms live behind [`BspOps`] so callers can pick the point
//! classification mode (see [`SerialBspOps::with_mode`]) without touching
//! the node structure.

pub mod node;
pub mod serial;
pub mod traits;

pub use node::Node;
pub use serial::SerialBspOps;
pub use traits::{BalancedSplittingStrategy, BspOps, SplittingPlaneStrategy};

use crate::mesh::plane::Plane;
use crate::mesh::polygon::Polygon;
use std::fmt::Debug;

impl<S: Clone + Send + Sync + Debug> Node<S> {
    fn ops() -> SerialBspOps<BalancedSplittingStrategy, S> {
        SerialBspOps::new()
    }

    /// Creates a new BSP node from polygons
    pub fn from_polygons(polygons: &[Polygon<S>]) -> Self {
        let mut node = Self::new();
        if !polygons.is_empty() {
            node.build(polygons);
        }
        node
    }

    /// Invert all polygons in the BSP tree
    pub fn invert(&mut self) {
        Self::ops().invert(self);
    }

    /// Pick the best splitting plane using the default strategy
    pub fn pick_best_splitting_plane(&self, polygons: &[Polygon<S>]) -> Plane {
        BalancedSplittingStrategy::default().pick_best_splitting_plane(polygons)
    }

    /// Recursively remove all polygons that are inside this BSP tree
    pub fn clip_polygons(&self, polygons: &[Polygon<S>]) -> Vec<Polygon<S>> {
        Self::ops().clip_polygons(self, polygons)
    }

    /// Remove all polygons in this BSP tree that are inside the other BSP tree
    pub fn clip_to(&mut self, bsp: &Node<S>) {
        Self::ops().clip_to(self, bsp);
    }

    /// Return all polygons in this BSP tree
    pub fn all_polygons(&self) -> Vec<Polygon<S>> {
        Self::ops().all_polygons(self)
    }

    /// Build a BSP tree from the given polygons
    pub fn build(&mut self, polygons: &[Polygon<S>]) {
        Self::ops().build(self, polygons);
    }
}
