//! Struct and functions for working with planes used for BSP splitting and
//! point/polygon classification.

use crate::float_types::{Real, tolerance};
use crate::kernel::SolverMode;
use crate::mesh::polygon::Polygon;
use crate::mesh::vertex::Vertex;
use nalgebra::{Isometry3, Matrix4, Point3, Rotation3, Translation3, Vector3};

// Plane classification constants, combined as a bitmask over polygon vertices
pub const COPLANAR: i8 = 0;
pub const FRONT: i8 = 1;
pub const BACK: i8 = 2;
pub const SPANNING: i8 = 3;

/// A plane in 3D space defined by three points.
///
/// Keeping the defining points (rather than only a normal and offset) lets
/// [`SolverMode::Exact`] classification run `robust::orient3d` directly on the
/// input coordinates. The normal follows the right-hand rule
/// `(point_b - point_a) × (point_c - point_a)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    pub point_a: Point3<Real>,
    pub point_b: Point3<Real>,
    pub point_c: Point3<Real>,
}

impl Plane {
    /// Create a plane from three points.
    pub const fn from_points(a: Point3<Real>, b: Point3<Real>, c: Point3<Real>) -> Self {
        Plane {
            point_a: a,
            point_b: b,
            point_c: c,
        }
    }

    /// Create a plane from a (not necessarily unit) normal and the offset `w`
    /// such that `normal.normalize() · p = w` for points `p` on the plane.
    pub fn from_normal(normal: Vector3<Real>, offset: Real) -> Self {
        let n = normal.normalize();
        let origin = Point3::from(n * offset);
        let (u, v) = orthonormal_basis(&n);
        Plane {
            point_a: origin,
            point_b: origin + u,
            point_c: origin + v,
        }
    }

    /// Create a plane through `point` facing `normal`.
    pub fn from_point_and_normal(point: Point3<Real>, normal: Vector3<Real>) -> Self {
        let n = normal.normalize();
        let (u, v) = orthonormal_basis(&n);
        Plane {
            point_a: point,
            point_b: point + u,
            point_c: point + v,
        }
    }

    /// Fit a plane to a polygon's vertices.
    ///
    /// Picks the longest chord and the vertex farthest from it, which keeps the
    /// three defining points well separated, then orients the result to agree
    /// with the polygon winding (Newell's method).
    pub fn from_vertices(vertices: &[Vertex]) -> Self {
        let n = vertices.len();
        if n < 3 {
            return Plane::from_normal(Vector3::z(), 0.0);
        }

        let reference_plane = Plane::from_points(vertices[0].pos, vertices[1].pos, vertices[2].pos);
        if n == 3 {
            return reference_plane;
        }

        let Some((i0, i1, _)) = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .map(|(i, j)| {
                let d2 = (vertices[i].pos - vertices[j].pos).norm_squared();
                (i, j, d2)
            })
            .max_by(|a, b| a.2.total_cmp(&b.2))
        else {
            return reference_plane;
        };

        let p0 = vertices[i0].pos;
        let p1 = vertices[i1].pos;
        let dir = p1 - p0;
        let eps = tolerance();
        if dir.norm_squared() < eps * eps {
            return reference_plane;
        }

        let Some((i2, max_area2)) = vertices
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != i0 && *idx != i1)
            .map(|(idx, v)| (idx, (v.pos - p0).cross(&dir).norm_squared()))
            .max_by(|a, b| a.1.total_cmp(&b.1))
        else {
            return reference_plane;
        };

        // all vertices collinear
        if max_area2 <= eps * eps {
            return reference_plane;
        }

        let mut plane_hq = Plane::from_points(p0, p1, vertices[i2].pos);

        let reference_normal = vertices.iter().zip(vertices.iter().cycle().skip(1)).fold(
            Vector3::zeros(),
            |acc, (curr, next)| acc + curr.pos.coords.cross(&next.pos.coords),
        );

        if plane_hq.normal().dot(&reference_normal) < 0.0 {
            plane_hq.flip();
        }

        plane_hq
    }

    /// Unit normal of the plane (zero for degenerate point triples).
    pub fn normal(&self) -> Vector3<Real> {
        let n = (self.point_b - self.point_a).cross(&(self.point_c - self.point_a));
        let len = n.norm();
        if len < Real::EPSILON {
            Vector3::zeros()
        } else {
            n / len
        }
    }

    /// Offset `w` of the plane equation `normal · p = w`.
    pub fn offset(&self) -> Real {
        self.normal().dot(&self.point_a.coords)
    }

    /// Reverse the orientation of the plane in place.
    pub fn flip(&mut self) {
        std::mem::swap(&mut self.point_a, &mut self.point_b);
    }

    /// Signed distance of `point` from the plane, positive on the front side.
    ///
    /// [`SolverMode::Exact`] evaluates the orientation determinant with
    /// adaptive-precision arithmetic, so the sign is exact for the given input
    /// coordinates even for nearly coplanar points. [`SolverMode::Fast`] uses a
    /// plain floating-point dot product.
    pub fn signed_distance(&self, point: &Point3<Real>, mode: SolverMode) -> Real {
        match mode {
            SolverMode::Exact => {
                let scale = (self.point_b - self.point_a)
                    .cross(&(self.point_c - self.point_a))
                    .norm();
                if scale < Real::EPSILON {
                    return 0.0;
                }
                #[allow(clippy::unnecessary_cast)]
                let det = robust::orient3d(
                    coord(&self.point_a),
                    coord(&self.point_b),
                    coord(&self.point_c),
                    coord(point),
                ) as Real;
                // orient3d is positive when `point` lies behind the plane
                -det / scale
            },
            SolverMode::Fast => self.normal().dot(&point.coords) - self.offset(),
        }
    }

    /// Classify a point as [`FRONT`], [`BACK`] or [`COPLANAR`] using exact predicates.
    pub fn orient_point(&self, point: &Point3<Real>) -> i8 {
        self.orient_point_with(point, SolverMode::Exact)
    }

    /// Classify a point as [`FRONT`], [`BACK`] or [`COPLANAR`] within [`tolerance`].
    pub fn orient_point_with(&self, point: &Point3<Real>, mode: SolverMode) -> i8 {
        let distance = self.signed_distance(point, mode);
        let eps = tolerance();
        if distance > eps {
            FRONT
        } else if distance < -eps {
            BACK
        } else {
            COPLANAR
        }
    }

    /// Classify a polygon with respect to the plane.
    /// Returns a bitmask of [`COPLANAR`], [`FRONT`] and [`BACK`].
    pub fn classify_polygon<S: Clone>(&self, polygon: &Polygon<S>) -> i8 {
        polygon
            .vertices
            .iter()
            .fold(COPLANAR, |acc, v| acc | self.orient_point(&v.pos))
    }

    /// Splits a polygon by this plane using exact predicates, returning four buckets:
    /// `(coplanar_front, coplanar_back, front, back)`.
    #[allow(clippy::type_complexity)]
    pub fn split_polygon<S: Clone + Send + Sync>(
        &self,
        polygon: &Polygon<S>,
    ) -> (Vec<Polygon<S>>, Vec<Polygon<S>>, Vec<Polygon<S>>, Vec<Polygon<S>>) {
        self.split_polygon_with(polygon, SolverMode::Exact)
    }

    /// Splits a polygon by this plane in the given solver mode, returning four buckets:
    /// `(coplanar_front, coplanar_back, front, back)`.
    ///
    /// Spanning polygons are cut along the plane; both halves keep the parent's
    /// supporting plane so repeated splits do not drift.
    #[allow(clippy::type_complexity)]
    pub fn split_polygon_with<S: Clone + Send + Sync>(
        &self,
        polygon: &Polygon<S>,
        mode: SolverMode,
    ) -> (Vec<Polygon<S>>, Vec<Polygon<S>>, Vec<Polygon<S>>, Vec<Polygon<S>>) {
        let mut coplanar_front = Vec::new();
        let mut coplanar_back = Vec::new();
        let mut front = Vec::new();
        let mut back = Vec::new();

        let normal = self.normal();
        let offset = self.offset();

        let types: Vec<i8> = polygon
            .vertices
            .iter()
            .map(|v| self.orient_point_with(&v.pos, mode))
            .collect();
        let polygon_type = types.iter().fold(COPLANAR, |acc, &t| acc | t);

        match polygon_type {
            COPLANAR => {
                if normal.dot(&polygon.plane.normal()) > 0.0 {
                    coplanar_front.push(polygon.clone());
                } else {
                    coplanar_back.push(polygon.clone());
                }
            },
            FRONT => front.push(polygon.clone()),
            BACK => back.push(polygon.clone()),
            _ => {
                let vcount = polygon.vertices.len();
                let mut split_front = Vec::with_capacity(vcount + 1);
                let mut split_back = Vec::with_capacity(vcount + 1);

                for i in 0..vcount {
                    let j = (i + 1) % vcount;
                    let type_i = types[i];
                    let type_j = types[j];
                    let vertex_i = &polygon.vertices[i];
                    let vertex_j = &polygon.vertices[j];

                    if type_i != BACK {
                        split_front.push(*vertex_i);
                    }
                    if type_i != FRONT {
                        split_back.push(*vertex_i);
                    }

                    if (type_i | type_j) == SPANNING {
                        let denom = normal.dot(&(vertex_j.pos - vertex_i.pos));
                        if denom.abs() > Real::EPSILON {
                            let t = (offset - normal.dot(&vertex_i.pos.coords)) / denom;
                            let vertex_new = vertex_i.interpolate(vertex_j, t.clamp(0.0, 1.0));
                            split_front.push(vertex_new);
                            split_back.push(vertex_new);
                        }
                    }
                }

                if split_front.len() >= 3 {
                    front.push(Polygon::with_plane(
                        split_front,
                        polygon.plane.clone(),
                        polygon.metadata.clone(),
                    ));
                }
                if split_back.len() >= 3 {
                    back.push(Polygon::with_plane(
                        split_back,
                        polygon.plane.clone(),
                        polygon.metadata.clone(),
                    ));
                }
            },
        }

        (coplanar_front, coplanar_back, front, back)
    }

    /// Returns (T, T_inv), where:
    /// - `T` maps a point on this plane into the XY plane (z=0) with the plane's normal going to +Z
    /// - `T_inv` is the inverse transform, mapping back
    pub fn to_xy_transform(&self) -> (Matrix4<Real>, Matrix4<Real>) {
        let n = self.normal();
        if n.norm_squared() < Real::EPSILON {
            return (Matrix4::identity(), Matrix4::identity());
        }

        let rot = Rotation3::rotation_between(&n, &Vector3::z()).unwrap_or_else(|| {
            // n is -Z: any half turn about an in-plane axis maps it to +Z
            Rotation3::from_axis_angle(&Vector3::x_axis(), crate::float_types::PI)
        });
        let iso_rot = Isometry3::from_parts(Translation3::identity(), rot.into());

        let p0_rot = iso_rot.transform_point(&self.point_a);
        let iso_trans = Translation3::new(0.0, 0.0, -p0_rot.z);

        let transform_to_xy = iso_trans.to_homogeneous() * iso_rot.to_homogeneous();
        let transform_from_xy = transform_to_xy
            .try_inverse()
            .unwrap_or_else(Matrix4::identity);

        (transform_to_xy, transform_from_xy)
    }
}

/// Two unit vectors `(u, v)` spanning the plane orthogonal to unit `n`, with `u × v = n`.
pub fn orthonormal_basis(n: &Vector3<Real>) -> (Vector3<Real>, Vector3<Real>) {
    let helper = if n.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let u = helper.cross(n).normalize();
    let v = n.cross(&u);
    (u, v)
}

#[allow(clippy::unnecessary_cast)]
fn coord(p: &Point3<Real>) -> robust::Coord3D<f64> {
    robust::Coord3D {
        x: p.x as f64,
        y: p.y as f64,
        z: p.z as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_normal_round_trips_normal_and_offset() {
        let plane = Plane::from_normal(Vector3::new(0.0, 0.0, 2.0), 3.0);
        approx::assert_relative_eq!(plane.normal(), Vector3::z(), epsilon = 1e-12);
        approx::assert_relative_eq!(plane.offset(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn exact_and_fast_agree_on_clear_cases() {
        let plane = Plane::from_point_and_normal(Point3::new(1.0, 2.0, 3.0), Vector3::new(1.0, 1.0, 0.0));
        for mode in [SolverMode::Exact, SolverMode::Fast] {
            assert_eq!(plane.orient_point_with(&Point3::new(5.0, 5.0, 0.0), mode), FRONT);
            assert_eq!(plane.orient_point_with(&Point3::new(-5.0, -5.0, 0.0), mode), BACK);
            assert_eq!(plane.orient_point_with(&Point3::new(1.0, 2.0, -7.0), mode), COPLANAR);
        }
    }

    #[test]
    fn signed_distance_matches_geometry() {
        let plane = Plane::from_point_and_normal(Point3::origin(), Vector3::z());
        let d = plane.signed_distance(&Point3::new(3.0, -4.0, 2.5), SolverMode::Exact);
        approx::assert_relative_eq!(d, 2.5, epsilon = 1e-12);
        let mut flipped = plane.clone();
        flipped.flip();
        let d = flipped.signed_distance(&Point3::new(3.0, -4.0, 2.5), SolverMode::Exact);
        approx::assert_relative_eq!(d, -2.5, epsilon = 1e-12);
    }

    #[test]
    fn basis_is_right_handed() {
        for n in [Vector3::x(), Vector3::y(), Vector3::z(), Vector3::new(1.0, -2.0, 0.5).normalize()] {
            let (u, v) = orthonormal_basis(&n);
            approx::assert_relative_eq!(u.cross(&v), n, epsilon = 1e-12);
            approx::assert_relative_eq!(u.dot(&n), 0.0, epsilon = 1e-12);
        }
    }
}
