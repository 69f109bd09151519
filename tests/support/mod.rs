//! Test support library
//! Provides various helper functions & utilities for tests.
#![allow(dead_code)]

use csgsplit::{
    CSGOps,
    float_types::Real,
    mesh::{Mesh, polygon::Polygon, vertex::Vertex},
};
use nalgebra::{Point3, Vector3};

/// Returns the approximate bounding box `[min_x, min_y, min_z, max_x, max_y, max_z]`
/// for a set of polygons.
pub fn bounding_box(polygons: &[Polygon<()>]) -> [Real; 6] {
    let mut min_x = Real::MAX;
    let mut min_y = Real::MAX;
    let mut min_z = Real::MAX;
    let mut max_x = Real::MIN;
    let mut max_y = Real::MIN;
    let mut max_z = Real::MIN;

    for poly in polygons {
        for v in &poly.vertices {
            let p = v.pos;
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            min_z = min_z.min(p.z);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
            max_z = max_z.max(p.z);
        }
    }

    [min_x, min_y, min_z, max_x, max_y, max_z]
}

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Helper to make a simple Polygon in 3D with given vertices.
pub fn make_polygon_3d(points: &[[Real; 3]]) -> Polygon<()> {
    let verts = points
        .iter()
        .map(|p| Vertex::new(Point3::new(p[0], p[1], p[2]), Vector3::z()))
        .collect();
    Polygon::new(verts, None)
}

/// Unit cube centred on the origin.
pub fn unit_cube() -> Mesh<()> {
    Mesh::cube(1.0, None).translate(-0.5, -0.5, -0.5)
}

/// Exact copy of every vertex position and normal, in order, for
/// bit-for-bit comparisons.
pub fn snapshot(mesh: &Mesh<()>) -> Vec<(Point3<Real>, Vector3<Real>)> {
    mesh.polygons
        .iter()
        .flat_map(|p| p.vertices.iter().map(|v| (v.pos, v.normal)))
        .collect()
}
