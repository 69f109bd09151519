//! Finite stand-ins for an infinite cutting plane.
//!
//! The boolean kernel works on closed solids, so the plane is materialized as
//! a square quad (the cutting surface) and then as that quad extruded along
//! the normal into a box (the cutting operand). Intersecting with the operand
//! keeps the positive side, subtracting it keeps the negative side, as long as
//! the operand is large enough to cover the source; see [`ExtentPolicy`].

use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use crate::mesh::Mesh;
use crate::split::plane::PlaneDefinition;
use crate::traits::CSGOps;
use nalgebra::{Isometry3, Matrix4, Point3, Translation3, Vector3};
use std::fmt::Debug;

/// Side length of the classic fixed cutting plane: a size-10 quad scaled 100 times.
pub const LEGACY_FIXED_EXTENT: Real = 1000.0;

/// Default safety factor applied to bounds-derived extents.
pub const DEFAULT_MARGIN: Real = 1.5;

/// How large the cutting surface is made for a given source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExtentPolicy {
    /// Twice the largest distance from the plane origin to a corner of the
    /// source bounding box, times `margin` (clamped to at least 1). Always
    /// covers the source.
    FromBounds { margin: Real },
    /// A constant side length. Sources reaching past it are only partially cut.
    Fixed(Real),
}

impl Default for ExtentPolicy {
    fn default() -> Self {
        ExtentPolicy::FromBounds {
            margin: DEFAULT_MARGIN,
        }
    }
}

impl ExtentPolicy {
    /// The classic fixed-size cutting plane, [`LEGACY_FIXED_EXTENT`].
    pub const fn legacy() -> Self {
        ExtentPolicy::Fixed(LEGACY_FIXED_EXTENT)
    }

    /// Side length (and extrusion depth) of the cutting surface for `bounds`.
    pub fn resolve(&self, plane: &PlaneDefinition, bounds: &Aabb) -> Real {
        match *self {
            ExtentPolicy::Fixed(extent) => extent,
            ExtentPolicy::FromBounds { margin } => {
                let radius = bounds
                    .vertices()
                    .iter()
                    .map(|corner| (corner - plane.origin).norm())
                    .fold(0.0, Real::max);
                let extent = 2.0 * radius * margin.max(1.0);
                if extent > Real::EPSILON { extent } else { 1.0 }
            },
        }
    }
}

/// Right-handed frame `(u, v, n)` of the plane, with `n` the unit normal and
/// `u`, `v` the rotated local X and Y axes.
pub fn plane_frame(plane: &PlaneDefinition) -> (Vector3<Real>, Vector3<Real>, Vector3<Real>) {
    let rotation = plane.rotation();
    (
        rotation * Vector3::x(),
        rotation * Vector3::y(),
        rotation * Vector3::z(),
    )
}

/// Extent of `bounds` projected onto the plane frame: `(min_u, max_u, min_v, max_v, max_n)`
/// measured from the plane origin.
fn projected_bounds(plane: &PlaneDefinition, bounds: &Aabb) -> (Real, Real, Real, Real, Real) {
    let (u, v, n) = plane_frame(plane);
    bounds.vertices().iter().fold(
        (Real::MAX, -Real::MAX, Real::MAX, -Real::MAX, -Real::MAX),
        |(min_u, max_u, min_v, max_v, max_n), corner| {
            let d = corner - plane.origin;
            let (du, dv, dn) = (d.dot(&u), d.dot(&v), d.dot(&n));
            (min_u.min(du), max_u.max(du), min_v.min(dv), max_v.max(dv), max_n.max(dn))
        },
    )
}

/// `true` when the square cutting surface of side `extent` overlaps the
/// projection of `bounds` onto the plane, i.e. the cut can touch the source.
pub fn reaches(plane: &PlaneDefinition, extent: Real, bounds: &Aabb) -> bool {
    let half = extent * 0.5;
    let (min_u, max_u, min_v, max_v, _) = projected_bounds(plane, bounds);
    min_u <= half && max_u >= -half && min_v <= half && max_v >= -half
}

/// `true` when the cutting operand of side `extent` encloses every part of
/// `bounds` on the positive side of the plane, so the cut is complete.
pub fn covers(plane: &PlaneDefinition, extent: Real, bounds: &Aabb) -> bool {
    let half = extent * 0.5;
    let (min_u, max_u, min_v, max_v, max_n) = projected_bounds(plane, bounds);
    min_u >= -half && max_u <= half && min_v >= -half && max_v <= half && max_n <= extent
}

/// Square quad of side `extent`, centred on `plane.origin` and facing `plane.normal`.
pub fn to_cutting_surface<S: Clone + Send + Sync + Debug>(
    plane: &PlaneDefinition,
    extent: Real,
) -> Mesh<S> {
    let iso = Isometry3::from_parts(Translation3::from(plane.origin.coords), plane.rotation());
    Mesh::square(extent, None).transform(&iso.to_homogeneous())
}

/// The cutting surface extruded by `extent` along the normal: a closed box
/// whose bottom face is the cutting surface.
pub fn to_cutting_operand<S: Clone + Send + Sync + Debug>(
    plane: &PlaneDefinition,
    extent: Real,
) -> Mesh<S> {
    let (u, v, n) = plane_frame(plane);
    let corner: Point3<Real> = plane.origin - u * (extent * 0.5) - v * (extent * 0.5);

    // maps the unit cube onto the box; columns are the scaled frame axes
    let mut mat = Matrix4::identity();
    mat.fixed_view_mut::<3, 1>(0, 0).copy_from(&(u * extent));
    mat.fixed_view_mut::<3, 1>(0, 1).copy_from(&(v * extent));
    mat.fixed_view_mut::<3, 1>(0, 2).copy_from(&(n * extent));
    mat.fixed_view_mut::<3, 1>(0, 3).copy_from(&corner.coords);

    Mesh::cube(1.0, None).transform(&mat)
}
