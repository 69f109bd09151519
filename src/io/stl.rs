use crate::float_types::Real;
use crate::io::IoError;
use crate::mesh::Mesh;
use crate::mesh::polygon::Polygon;
use crate::mesh::vertex::Vertex;
use nalgebra::Point3;
use std::fmt::Debug;
use std::io::Cursor;

impl<S: Clone + Debug + Send + Sync> Mesh<S> {
    /// Convert this Mesh to an **ASCII STL** string with the given `name`.
    ///
    /// ```rust
    /// # use csgsplit::mesh::Mesh;
    /// let mesh = Mesh::<()>::cube(1.0, None);
    /// let text = mesh.to_stl_ascii("my_solid");
    /// assert!(text.starts_with("solid my_solid"));
    /// ```
    pub fn to_stl_ascii(&self, name: &str) -> String {
        let mut out = String::new();
        out.push_str(&format!("solid {name}\n"));

        for poly in &self.polygons {
            let n = poly.plane.normal();
            for tri in poly.triangulate() {
                out.push_str(&format!("  facet normal {:.6} {:.6} {:.6}\n", n.x, n.y, n.z));
                out.push_str("    outer loop\n");
                for v in &tri {
                    out.push_str(&format!(
                        "      vertex {:.6} {:.6} {:.6}\n",
                        v.pos.x, v.pos.y, v.pos.z
                    ));
                }
                out.push_str("    endloop\n");
                out.push_str("  endfacet\n");
            }
        }

        out.push_str(&format!("endsolid {name}\n"));
        out
    }

    /// Convert this Mesh to a **binary STL** byte vector.
    ///
    /// The STL header carries no name, `_name` is accepted for symmetry with
    /// [`Mesh::to_stl_ascii`].
    pub fn to_stl_binary(&self, _name: &str) -> Result<Vec<u8>, IoError> {
        use stl_io::{Normal, Triangle, write_stl};

        let mut triangles = Vec::new();
        for poly in &self.polygons {
            let n = poly.plane.normal();
            for tri in poly.triangulate() {
                #[allow(clippy::unnecessary_cast)]
                triangles.push(Triangle {
                    normal: Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                    vertices: tri.map(|v| {
                        stl_io::Vertex::new([v.pos.x as f32, v.pos.y as f32, v.pos.z as f32])
                    }),
                });
            }
        }

        let mut cursor = Cursor::new(Vec::new());
        write_stl(&mut cursor, triangles.iter())?;
        Ok(cursor.into_inner())
    }

    /// Build a Mesh from STL data (ASCII or binary).
    ///
    /// Every facet becomes a triangle with flat normals. Facet orientation is
    /// taken from the vertex winding; stored facet normals are ignored.
    pub fn from_stl(bytes: &[u8], metadata: Option<S>) -> Result<Mesh<S>, IoError> {
        let mut cursor = Cursor::new(bytes);
        let stl = stl_io::read_stl(&mut cursor)?;

        let mut polygons = Vec::with_capacity(stl.faces.len());
        for face in &stl.faces {
            let mut positions = [Point3::<Real>::origin(); 3];
            for (slot, &index) in positions.iter_mut().zip(face.vertices.iter()) {
                let v = stl.vertices.get(index).ok_or_else(|| {
                    IoError::MalformedInput(format!("facet refers to missing vertex {index}"))
                })?;
                #[allow(clippy::unnecessary_cast)]
                {
                    *slot = Point3::new(v[0] as Real, v[1] as Real, v[2] as Real);
                }
            }

            let normal = (positions[1] - positions[0]).cross(&(positions[2] - positions[0]));
            // zero-area facets carry no surface
            let Some(normal) = normal.try_normalize(Real::EPSILON) else {
                continue;
            };
            let vertices = positions.iter().map(|&p| Vertex::new(p, normal)).collect();
            polygons.push(Polygon::new(vertices, metadata.clone()));
        }

        Ok(Mesh::from_polygons(&polygons, metadata))
    }
}
