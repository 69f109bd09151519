//! Struct and functions for working with planar `Polygon`s without holes

use crate::float_types::{Real, parry3d::bounding_volume::Aabb, tolerance};
use crate::mesh::plane::Plane;
use crate::mesh::vertex::Vertex;
use geo::{Coord, LineString, Polygon as GeoPolygon, TriangulateEarcut};
use nalgebra::{Point3, Vector3};
use std::sync::OnceLock;

/// A polygon, defined by a list of vertices.
/// - `S` is the generic metadata type, stored as `Option<S>`.
#[derive(Debug, Clone)]
pub struct Polygon<S: Clone> {
    /// Vertices defining the polygon's shape, counter-clockwise when seen from the front
    pub vertices: Vec<Vertex>,

    /// The plane on which this polygon lies
    pub plane: Plane,

    /// Lazily-computed bounding box that spans `vertices`
    pub bounding_box: OnceLock<Aabb>,

    /// Generic metadata associated with the Polygon
    pub metadata: Option<S>,
}

impl<S: Clone + PartialEq> PartialEq for Polygon<S> {
    fn eq(&self, other: &Self) -> bool {
        self.vertices == other.vertices
            && self.plane == other.plane
            && self.metadata == other.metadata
    }
}

impl<S: Clone + Send + Sync> Polygon<S> {
    /// Create a polygon from vertices, fitting its plane to them.
    ///
    /// # Panics
    /// Panics when fewer than three vertices are given.
    pub fn new(vertices: Vec<Vertex>, metadata: Option<S>) -> Self {
        assert!(vertices.len() >= 3, "degenerate polygon");

        let plane = Plane::from_vertices(&vertices);

        Polygon {
            vertices,
            plane,
            bounding_box: OnceLock::new(),
            metadata,
        }
    }

    /// Create a polygon that reuses an already known supporting plane.
    ///
    /// Used for the pieces of a split polygon, which stay on their parent's plane.
    pub fn with_plane(vertices: Vec<Vertex>, plane: Plane, metadata: Option<S>) -> Self {
        Polygon {
            vertices,
            plane,
            bounding_box: OnceLock::new(),
            metadata,
        }
    }

    /// Axis aligned bounding box of this Polygon (cached after first call)
    pub fn bounding_box(&self) -> Aabb {
        *self.bounding_box.get_or_init(|| {
            let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
            let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);
            for v in &self.vertices {
                mins.x = mins.x.min(v.pos.x);
                mins.y = mins.y.min(v.pos.y);
                mins.z = mins.z.min(v.pos.z);
                maxs.x = maxs.x.max(v.pos.x);
                maxs.y = maxs.y.max(v.pos.y);
                maxs.z = maxs.z.max(v.pos.z);
            }
            Aabb::new(mins, maxs)
        })
    }

    /// Reverses winding order, flips vertices normals, and flips the plane normal
    pub fn flip(&mut self) {
        self.vertices.reverse();
        self.vertices.iter_mut().for_each(|v| v.flip());
        self.plane.flip();
    }

    /// Return an iterator over paired vertices each forming an edge of the polygon
    pub fn edges(&self) -> impl Iterator<Item = (&Vertex, &Vertex)> {
        self.vertices.iter().zip(self.vertices.iter().cycle().skip(1))
    }

    /// `true` when every vertex coordinate and normal component is finite
    pub fn is_finite(&self) -> bool {
        self.vertices.iter().all(Vertex::is_finite)
    }

    /// Triangulate this polygon into a list of triangles, each triangle is [v0, v1, v2].
    ///
    /// The polygon is rotated into the XY plane and ear-clipped there, so concave
    /// outlines come out right. If ear clipping yields nothing (collinear or
    /// self-overlapping input) a fan from the first vertex is returned instead.
    pub fn triangulate(&self) -> Vec<[Vertex; 3]> {
        if self.vertices.len() < 3 {
            return Vec::new();
        }
        if self.vertices.len() == 3 {
            return vec![[self.vertices[0], self.vertices[1], self.vertices[2]]];
        }

        let normal_3d = self.plane.normal();
        let (to_xy, from_xy) = self.plane.to_xy_transform();

        let outer: Vec<Coord<Real>> = self
            .vertices
            .iter()
            .map(|v| {
                let p = to_xy.transform_point(&v.pos);
                Coord { x: p.x, y: p.y }
            })
            .collect();

        let polygon_2d = GeoPolygon::new(LineString::new(outer), Vec::new());
        let raw = polygon_2d.earcut_triangles_raw();

        let triangles: Vec<[Vertex; 3]> = raw
            .triangle_indices
            .chunks_exact(3)
            .map(|tri| {
                let corner = |i: usize| {
                    let p2 = Point3::new(raw.vertices[2 * i], raw.vertices[2 * i + 1], 0.0);
                    Vertex::new(from_xy.transform_point(&p2), normal_3d)
                };
                let (a, b, c) = (corner(tri[0]), corner(tri[1]), corner(tri[2]));
                // keep the winding of the source polygon
                if (b.pos - a.pos).cross(&(c.pos - a.pos)).dot(&normal_3d) < 0.0 {
                    [a, c, b]
                } else {
                    [a, b, c]
                }
            })
            .collect();

        if triangles.is_empty() {
            return self.fan_triangles();
        }
        triangles
    }

    fn fan_triangles(&self) -> Vec<[Vertex; 3]> {
        let v0 = self.vertices[0];
        self.vertices
            .windows(2)
            .skip(1)
            .map(|pair| [v0, pair[0], pair[1]])
            .collect()
    }

    /// Area of the polygon, from its vector area.
    pub fn area(&self) -> Real {
        let sum = self
            .edges()
            .fold(Vector3::zeros(), |acc, (a, b)| acc + a.pos.coords.cross(&b.pos.coords));
        sum.norm() * 0.5
    }

    /// `true` when the polygon encloses no measurable area
    pub fn is_degenerate(&self) -> bool {
        let eps = tolerance();
        self.area() <= eps * eps
    }

    /// return a normal calculated from all polygon vertices
    pub fn calculate_new_normal(&self) -> Vector3<Real> {
        let n = self.vertices.len();
        if n < 3 {
            return Vector3::z();
        }

        let mut points = Vec::new();
        for vertex in &self.vertices {
            points.push(vertex.pos);
        }
        let mut normal = Vector3::zeros();

        // Newell's method
        for i in 0..n {
            let current = points[i];
            let next = points[(i + 1) % n];
            normal.x += (current.y - next.y) * (current.z + next.z);
            normal.y += (current.z - next.z) * (current.x + next.x);
            normal.z += (current.x - next.x) * (current.y + next.y);
        }

        let mut poly_normal = normal.normalize();

        // Ensure the computed normal is in the same direction as the given normal
        if poly_normal.dot(&self.plane.normal()) < 0.0 {
            poly_normal = -poly_normal;
        }

        poly_normal
    }

    /// Recompute this polygon's normal from all vertices, then set all vertices' normals to match (flat shading).
    pub fn set_new_normal(&mut self) {
        let new_normal = self.calculate_new_normal();
        if !new_normal.iter().all(|c| c.is_finite()) {
            return;
        }
        for v in &mut self.vertices {
            v.normal = new_normal;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn l_shape() -> Polygon<()> {
        let pts = [
            (0.0, 0.0),
            (2.0, 0.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 2.0),
            (0.0, 2.0),
        ];
        Polygon::new(
            pts.iter()
                .map(|&(x, y)| Vertex::new(Point3::new(x, y, 1.0), Vector3::z()))
                .collect(),
            None,
        )
    }

    #[test]
    fn concave_triangulation_preserves_area() {
        let poly = l_shape();
        let tris = poly.triangulate();
        assert_eq!(tris.len(), 4);
        let area: Real = tris
            .iter()
            .map(|t| (t[1].pos - t[0].pos).cross(&(t[2].pos - t[0].pos)).norm() * 0.5)
            .sum();
        assert_relative_eq!(area, 3.0, epsilon = 1e-9);
        assert_relative_eq!(poly.area(), 3.0, epsilon = 1e-9);
        for t in &tris {
            for v in t {
                assert_relative_eq!(v.pos.z, 1.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn flip_reverses_winding_and_normal() {
        let mut poly = l_shape();
        let before = poly.plane.normal();
        poly.flip();
        assert_relative_eq!(poly.plane.normal(), -before, epsilon = 1e-12);
        assert_eq!(poly.vertices[0].pos, Point3::new(0.0, 2.0, 1.0));
        assert!(poly.vertices.iter().all(|v| v.normal == -Vector3::z()));
    }

    #[test]
    fn bounding_box_spans_vertices() {
        let bb = l_shape().bounding_box();
        assert_eq!(bb.mins, Point3::new(0.0, 0.0, 1.0));
        assert_eq!(bb.maxs, Point3::new(2.0, 2.0, 1.0));
    }
}
