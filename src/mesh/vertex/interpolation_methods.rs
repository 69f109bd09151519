use crate::{float_types::Real, mesh::vertex::Vertex};

impl Vertex {
    /// Linear interpolation between `self` (`t = 0`) and `other` (`t = 1`).
    ///
    /// - **Position**: p(t) = p₀ + t·(p₁ - p₀)
    /// - **Normal**: n(t) = n₀ + t·(n₁ - n₀)
    ///
    /// Used to create the intersection vertices when a BSP plane splits an edge.
    /// Normals are not renormalized.
    pub fn interpolate(&self, other: &Vertex, t: Real) -> Vertex {
        let new_pos = self.pos + (other.pos - self.pos) * t;
        let new_normal = self.normal + (other.normal - self.normal) * t;
        Vertex::new(new_pos, new_normal)
    }
}
