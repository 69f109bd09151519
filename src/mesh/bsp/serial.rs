//! Serial implementation of BSP operations

use crate::kernel::SolverMode;
use crate::mesh::bsp::node::Node;
use crate::mesh::bsp::traits::{BalancedSplittingStrategy, BspOps, SplittingPlaneStrategy};
use crate::mesh::polygon::Polygon;
use std::fmt::Debug;

/// Serial implementation of BSP operations
pub struct SerialBspOps<SP: SplittingPlaneStrategy<S> = BalancedSplittingStrategy, S: Clone = ()> {
    splitting_strategy: SP,
    mode: SolverMode,
    _phantom: std::marker::PhantomData<S>,
}

impl<S: Clone> SerialBspOps<BalancedSplittingStrategy, S> {
    pub fn new() -> Self {
        Self::with_mode(SolverMode::default())
    }

    /// Classify points with the given solver mode while building and clipping.
    pub fn with_mode(mode: SolverMode) -> Self {
        Self {
            splitting_strategy: BalancedSplittingStrategy::default(),
            mode,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<S: Clone> Default for SerialBspOps<BalancedSplittingStrategy, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<SP: SplittingPlaneStrategy<S>, S: Clone + Send + Sync + Debug> BspOps<S>
    for SerialBspOps<SP, S>
{
    fn invert(&self, node: &mut Node<S>) {
        let mut stack = vec![node];

        while let Some(current) = stack.pop() {
            current.polygons.iter_mut().for_each(|p| p.flip());
            if let Some(ref mut plane) = current.plane {
                plane.flip();
            }

            std::mem::swap(&mut current.front, &mut current.back);

            if let Some(ref mut front) = current.front {
                stack.push(front.as_mut());
            }
            if let Some(ref mut back) = current.back {
                stack.push(back.as_mut());
            }
        }
    }

    fn clip_polygons(&self, node: &Node<S>, polygons: &[Polygon<S>]) -> Vec<Polygon<S>> {
        let Some(plane) = node.plane.as_ref() else {
            return polygons.to_vec();
        };

        let mut front_polys = Vec::with_capacity(polygons.len());
        let mut back_polys = Vec::with_capacity(polygons.len());

        for polygon in polygons {
            let (coplanar_front, coplanar_back, front_parts, back_parts) =
                plane.split_polygon_with(polygon, self.mode);

            front_polys.extend(coplanar_front);
            front_polys.extend(front_parts);
            back_polys.extend(coplanar_back);
            back_polys.extend(back_parts);
        }

        let mut result = if let Some(front_node) = &node.front {
            self.clip_polygons(front_node, &front_polys)
        } else {
            front_polys
        };

        // without a back subtree everything behind the plane is inside the solid
        if let Some(back_node) = &node.back {
            result.extend(self.clip_polygons(back_node, &back_polys));
        }

        result
    }

    fn clip_to(&self, node: &mut Node<S>, bsp: &Node<S>) {
        node.polygons = self.clip_polygons(bsp, &node.polygons);

        if let Some(ref mut front) = node.front {
            self.clip_to(front, bsp);
        }

        if let Some(ref mut back) = node.back {
            self.clip_to(back, bsp);
        }
    }

    fn all_polygons(&self, node: &Node<S>) -> Vec<Polygon<S>> {
        let mut result = Vec::new();
        let mut stack = vec![node];

        while let Some(current) = stack.pop() {
            result.extend_from_slice(&current.polygons);

            stack.extend(
                [&current.front, &current.back]
                    .iter()
                    .filter_map(|child| child.as_ref().map(|boxed| boxed.as_ref())),
            );
        }
        result
    }

    fn build(&self, node: &mut Node<S>, polygons: &[Polygon<S>]) {
        if polygons.is_empty() {
            return;
        }

        let plane = node
            .plane
            .get_or_insert_with(|| self.splitting_strategy.pick_best_splitting_plane(polygons))
            .clone();

        let mut front = Vec::with_capacity(polygons.len() / 2);
        let mut back = Vec::with_capacity(polygons.len() / 2);

        for polygon in polygons {
            let (coplanar_front, coplanar_back, front_parts, back_parts) =
                plane.split_polygon_with(polygon, self.mode);

            node.polygons.extend(coplanar_front);
            node.polygons.extend(coplanar_back);
            front.extend(front_parts);
            back.extend(back_parts);
        }

        if !front.is_empty() {
            let child = node.front.get_or_insert_with(|| Box::new(Node::new()));
            self.build(child, &front);
        }

        if !back.is_empty() {
            let child = node.back.get_or_insert_with(|| Box::new(Node::new()));
            self.build(child, &back);
        }
    }
}
