//! Primitive solids used as split sources and cutting operands

use crate::errors::ValidationError;
use crate::float_types::Real;
use crate::mesh::Mesh;
use crate::mesh::polygon::Polygon;
use crate::mesh::vertex::Vertex;
use nalgebra::{Point3, Vector3};
use std::fmt::Debug;

impl<S: Clone + Debug + Send + Sync> Mesh<S> {
    /// Axis-aligned box spanning `[0, width] × [0, length] × [0, height]`.
    ///
    /// Faces are quads wound counter-clockwise when seen from outside.
    pub fn cuboid(width: Real, length: Real, height: Real, metadata: Option<S>) -> Mesh<S> {
        let corners = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(width, 0.0, 0.0),
            Point3::new(width, length, 0.0),
            Point3::new(0.0, length, 0.0),
            Point3::new(0.0, 0.0, height),
            Point3::new(width, 0.0, height),
            Point3::new(width, length, height),
            Point3::new(0.0, length, height),
        ];

        let faces: [([usize; 4], Vector3<Real>); 6] = [
            ([0, 3, 2, 1], -Vector3::z()),
            ([4, 5, 6, 7], Vector3::z()),
            ([0, 1, 5, 4], -Vector3::y()),
            ([3, 7, 6, 2], Vector3::y()),
            ([0, 4, 7, 3], -Vector3::x()),
            ([1, 2, 6, 5], Vector3::x()),
        ];

        let polygons = faces
            .iter()
            .map(|(indices, normal)| {
                let vertices = indices
                    .iter()
                    .map(|&i| Vertex::new(corners[i], *normal))
                    .collect();
                Polygon::new(vertices, metadata.clone())
            })
            .collect::<Vec<_>>();

        Mesh::from_polygons(&polygons, metadata)
    }

    /// Cube with one corner at the origin
    pub fn cube(width: Real, metadata: Option<S>) -> Mesh<S> {
        Self::cuboid(width, width, width, metadata)
    }

    /// Flat square of side `size` centred on the origin in the XY plane, facing +Z.
    pub fn square(size: Real, metadata: Option<S>) -> Mesh<S> {
        let h = size * 0.5;
        let vertices = [(-h, -h), (h, -h), (h, h), (-h, h)]
            .iter()
            .map(|&(x, y)| Vertex::new(Point3::new(x, y, 0.0), Vector3::z()))
            .collect();
        Mesh::from_polygons(&[Polygon::new(vertices, metadata.clone())], metadata)
    }

    /// Builds a mesh from a list of points and faces indexing into them.
    ///
    /// Faces should be wound counter-clockwise when seen from outside.
    /// Vertex normals are flat per face.
    pub fn polyhedron(
        points: &[[Real; 3]],
        faces: &[&[usize]],
        metadata: Option<S>,
    ) -> Result<Mesh<S>, ValidationError> {
        let mut polygons = Vec::with_capacity(faces.len());

        for face in faces {
            if let Some(&index) = face.iter().find(|&&idx| idx >= points.len()) {
                return Err(ValidationError::IndexOutOfRange {
                    index,
                    len: points.len(),
                });
            }

            let positions: Vec<Point3<Real>> = face
                .iter()
                .map(|&idx| {
                    let [x, y, z] = points[idx];
                    Point3::new(x, y, z)
                })
                .collect();

            if let Some(bad) = positions
                .iter()
                .find(|p| !p.coords.iter().all(|c| c.is_finite()))
            {
                return Err(ValidationError::InvalidCoordinate(*bad));
            }

            if positions.len() < 3 {
                let at = positions.first().copied().unwrap_or_else(Point3::origin);
                return Err(ValidationError::TooFewPoints(at));
            }

            let vertices: Vec<Vertex> = positions
                .iter()
                .map(|&p| Vertex::new(p, Vector3::zeros()))
                .collect();
            let mut poly = Polygon::new(vertices, metadata.clone());
            poly.set_new_normal();
            polygons.push(poly);
        }

        Ok(Mesh::from_polygons(&polygons, metadata))
    }
}
