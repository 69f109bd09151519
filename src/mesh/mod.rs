//! `Mesh` struct and implementations of the `CSGOps` trait for `Mesh`

use crate::float_types::{
    Real,
    parry3d::{
        bounding_volume::Aabb,
        query::{Ray, RayCast},
        shape::{TriMesh, Triangle},
    },
    tolerance,
};
use crate::mesh::{
    bsp::{BspOps, Node, SerialBspOps},
    plane::Plane,
    polygon::Polygon,
    vertex::Vertex,
};
use crate::traits::CSGOps;
use nalgebra::{Isometry3, Matrix4, Point3, Vector3};
use std::{fmt::Debug, sync::OnceLock};

pub mod bsp;
pub mod manifold;
pub mod plane;
pub mod polygon;
pub mod shapes;
pub mod vertex;

/// A closed polygonal surface, optionally tagged with metadata `S`.
#[derive(Clone, Debug)]
pub struct Mesh<S: Clone + Send + Sync + Debug> {
    /// 3D polygons for volumetric shapes
    pub polygons: Vec<Polygon<S>>,

    /// Lazily calculated AABB that spans `polygons`.
    pub bounding_box: OnceLock<Aabb>,

    /// Metadata
    pub metadata: Option<S>,
}

impl<S: Clone + Send + Sync + Debug> Mesh<S> {
    /// Build a Mesh from an existing polygon list
    pub fn from_polygons(polygons: &[Polygon<S>], metadata: Option<S>) -> Self {
        Mesh {
            polygons: polygons.to_vec(),
            bounding_box: OnceLock::new(),
            metadata,
        }
    }

    /// `true` when the mesh holds no polygons
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Helper to collect all vertices from the mesh.
    pub fn vertices(&self) -> Vec<Vertex> {
        self.polygons
            .iter()
            .flat_map(|p| p.vertices.iter().copied())
            .collect()
    }

    /// `true` when every vertex position and normal is finite
    pub fn is_finite(&self) -> bool {
        self.polygons.iter().all(Polygon::is_finite)
    }

    /// Triangulate each polygon in the Mesh returning a Mesh containing triangles
    pub fn triangulate(&self) -> Mesh<S> {
        let triangles = self
            .polygons
            .iter()
            .flat_map(|poly| {
                poly.triangulate().into_iter().map(move |triangle| {
                    Polygon::with_plane(triangle.to_vec(), poly.plane.clone(), poly.metadata.clone())
                })
            })
            .collect::<Vec<_>>();

        Mesh::from_polygons(&triangles, self.metadata.clone())
    }

    /// Renormalize all polygons in this Mesh by re-computing each polygon’s plane
    /// and assigning that plane’s normal to all vertices.
    pub fn renormalize(&mut self) {
        for poly in &mut self.polygons {
            poly.set_new_normal();
        }
    }

    /// Drop polygons that enclose no area.
    pub fn without_degenerate_polygons(mut self) -> Self {
        self.polygons.retain(|p| !p.is_degenerate());
        self.bounding_box = OnceLock::new();
        self
    }

    /// Extracts vertices and indices from the Mesh's tessellated polygons.
    pub fn get_vertices_and_indices(&self) -> (Vec<Point3<Real>>, Vec<[u32; 3]>) {
        let tri_mesh = self.triangulate();
        let vertices = tri_mesh
            .polygons
            .iter()
            .flat_map(|p| [p.vertices[0].pos, p.vertices[1].pos, p.vertices[2].pos])
            .collect();

        let indices = (0..tri_mesh.polygons.len())
            .map(|i| {
                let offset = i as u32 * 3;
                [offset, offset + 1, offset + 2]
            })
            .collect();

        (vertices, indices)
    }

    /// Signed volume enclosed by the mesh (divergence theorem over its triangles).
    ///
    /// Positive for closed, outward-facing surfaces. Open surfaces give a value that
    /// depends on the reference point and is not meaningful as a volume.
    pub fn signed_volume(&self) -> Real {
        // tetrahedra are measured from the bbox centre, not the world origin,
        // so meshes far from the origin keep their precision
        let bb = self.bounding_box();
        let r = nalgebra::center(&bb.mins, &bb.maxs);
        self.polygons
            .iter()
            .flat_map(|poly| poly.triangulate())
            .map(|[a, b, c]| (a.pos - r).dot(&(b.pos - r).cross(&(c.pos - r))))
            .sum::<Real>()
            / 6.0
    }

    /// Absolute enclosed volume
    pub fn volume(&self) -> Real {
        self.signed_volume().abs()
    }

    /// Total surface area
    pub fn surface_area(&self) -> Real {
        self.polygons.iter().map(Polygon::area).sum()
    }

    /// Casts a ray defined by `origin` + t * `direction` against all triangles
    /// of this mesh and returns a list of (intersection_point, distance),
    /// sorted by ascending distance.
    pub fn ray_intersections(
        &self,
        origin: &Point3<Real>,
        direction: &Vector3<Real>,
    ) -> Vec<(Point3<Real>, Real)> {
        let ray = Ray::new(*origin, *direction);
        let iso = Isometry3::identity();

        let mut hits: Vec<(Point3<Real>, Real)> = self
            .polygons
            .iter()
            .flat_map(|poly| poly.triangulate())
            .filter_map(|tri| {
                let triangle = Triangle::new(tri[0].pos, tri[1].pos, tri[2].pos);
                triangle
                    .cast_ray_and_get_normal(&iso, &ray, Real::MAX, true)
                    .map(|hit| (ray.point_at(hit.time_of_impact), hit.time_of_impact))
            })
            .collect();

        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        // shared edges report the same hit twice
        let eps = tolerance();
        hits.dedup_by(|a, b| (a.1 - b.1).abs() < eps);

        hits
    }

    /// Ray-parity point containment test.
    pub fn contains_vertex(&self, point: &Point3<Real>) -> bool {
        self.ray_intersections(point, &Vector3::new(1.0, 1.0, 1.0))
            .len()
            % 2
            == 1
    }

    /// Convert the polygons in this mesh to a Parry `TriMesh`.
    ///
    /// Returns `None` for an empty mesh or when Parry rejects the triangles.
    pub fn to_trimesh(&self) -> Option<TriMesh> {
        let (vertices, indices) = self.get_vertices_and_indices();
        if indices.is_empty() {
            return None;
        }
        TriMesh::new(vertices, indices).ok()
    }

    /// Union computed with an explicit set of BSP operations.
    pub fn union_with(&self, other: &Mesh<S>, ops: &impl BspOps<S>) -> Mesh<S> {
        let mut a = Node::new();
        let mut b = Node::new();
        ops.build(&mut a, &self.polygons);
        ops.build(&mut b, &other.polygons);

        ops.clip_to(&mut a, &b);
        ops.clip_to(&mut b, &a);
        ops.invert(&mut b);
        ops.clip_to(&mut b, &a);
        ops.invert(&mut b);
        let b_polys = ops.all_polygons(&b);
        ops.build(&mut a, &b_polys);

        Mesh::from_polygons(&ops.all_polygons(&a), self.metadata.clone())
    }

    /// Difference computed with an explicit set of BSP operations.
    pub fn difference_with(&self, other: &Mesh<S>, ops: &impl BspOps<S>) -> Mesh<S> {
        let mut a = Node::new();
        let mut b = Node::new();
        ops.build(&mut a, &self.polygons);
        ops.build(&mut b, &other.polygons);

        ops.invert(&mut a);
        ops.clip_to(&mut a, &b);
        ops.clip_to(&mut b, &a);
        ops.invert(&mut b);
        ops.clip_to(&mut b, &a);
        ops.invert(&mut b);
        let b_polys = ops.all_polygons(&b);
        ops.build(&mut a, &b_polys);
        ops.invert(&mut a);

        Mesh::from_polygons(&ops.all_polygons(&a), self.metadata.clone())
    }

    /// Intersection computed with an explicit set of BSP operations.
    pub fn intersection_with(&self, other: &Mesh<S>, ops: &impl BspOps<S>) -> Mesh<S> {
        let mut a = Node::new();
        let mut b = Node::new();
        ops.build(&mut a, &self.polygons);
        ops.build(&mut b, &other.polygons);

        ops.invert(&mut a);
        ops.clip_to(&mut b, &a);
        ops.invert(&mut b);
        ops.clip_to(&mut a, &b);
        ops.clip_to(&mut b, &a);
        let b_polys = ops.all_polygons(&b);
        ops.build(&mut a, &b_polys);
        ops.invert(&mut a);

        Mesh::from_polygons(&ops.all_polygons(&a), self.metadata.clone())
    }
}

impl<S: Clone + Send + Sync + Debug> CSGOps for Mesh<S> {
    /// Returns a new empty Mesh
    fn new() -> Self {
        Mesh {
            polygons: Vec::new(),
            bounding_box: OnceLock::new(),
            metadata: None,
        }
    }

    /// Return a new Mesh representing union of the two Meshes.
    ///
    /// ```text
    /// let c = a.union(b);
    ///     +-------+            +-------+
    ///     |       |            |       |
    ///     |   a   |            |   c   |
    ///     |    +--+----+   =   |       +----+
    ///     +----+--+    |       +----+       |
    ///          |   b   |            |   c   |
    ///          |       |            |       |
    ///          +-------+            +-------+
    /// ```
    fn union(&self, other: &Mesh<S>) -> Mesh<S> {
        self.union_with(other, &SerialBspOps::new())
    }

    /// Return a new Mesh representing difference of the two Meshes.
    ///
    /// ```text
    /// let c = a.difference(b);
    ///     +-------+            +-------+
    ///     |       |            |       |
    ///     |   a   |            |   c   |
    ///     |    +--+----+   =   |    +--+
    ///     +----+--+    |       +----+
    ///          |   b   |
    ///          |       |
    ///          +-------+
    /// ```
    fn difference(&self, other: &Mesh<S>) -> Mesh<S> {
        self.difference_with(other, &SerialBspOps::new())
    }

    /// Return a new Mesh representing intersection of the two Meshes.
    ///
    /// ```text
    /// let c = a.intersection(b);
    ///     +-------+
    ///     |       |
    ///     |   a   |
    ///     |    +--+----+   =   +--+
    ///     +----+--+    |       +--+
    ///          |   b   |
    ///          |       |
    ///          +-------+
    /// ```
    fn intersection(&self, other: &Mesh<S>) -> Mesh<S> {
        self.intersection_with(other, &SerialBspOps::new())
    }

    /// Apply an arbitrary 3D transform (as a 4x4 matrix) to the mesh.
    ///
    /// Singular matrices keep vertex normals untransformed; projective results
    /// that cannot be dehomogenized keep the original position.
    fn transform(&self, mat: &Matrix4<Real>) -> Mesh<S> {
        let mat_inv_transpose = mat
            .try_inverse()
            .map(|inv| inv.transpose())
            .unwrap_or_else(Matrix4::identity);
        let mut mesh = self.clone();

        for poly in &mut mesh.polygons {
            for vert in &mut poly.vertices {
                let homog_pos = mat * vert.pos.to_homogeneous();
                vert.pos = Point3::from_homogeneous(homog_pos).unwrap_or(vert.pos);

                let n = mat_inv_transpose.transform_vector(&vert.normal);
                vert.normal = n.try_normalize(Real::EPSILON).unwrap_or(n);
            }

            // keep the cached plane consistent with the new vertex positions
            poly.plane = Plane::from_vertices(&poly.vertices);
            poly.bounding_box = OnceLock::new();
        }

        mesh.bounding_box = OnceLock::new();

        mesh
    }

    /// Returns a [`parry3d::bounding_volume::Aabb`] indicating the 3D bounds of all `polygons`.
    fn bounding_box(&self) -> Aabb {
        *self.bounding_box.get_or_init(|| {
            let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
            let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);

            for v in self.polygons.iter().flat_map(|p| p.vertices.iter()) {
                mins = mins.inf(&v.pos);
                maxs = maxs.sup(&v.pos);
            }

            // no polygons: trivial AABB at origin
            if mins.x > maxs.x {
                return Aabb::new(Point3::origin(), Point3::origin());
            }

            Aabb::new(mins, maxs)
        })
    }

    /// Invalidates object's cached bounding box.
    fn invalidate_bounding_box(&mut self) {
        self.bounding_box = OnceLock::new();
    }

    /// Invert this Mesh (flip inside vs. outside)
    fn inverse(&self) -> Mesh<S> {
        let mut mesh = self.clone();
        for p in &mut mesh.polygons {
            p.flip();
        }
        mesh
    }
}
