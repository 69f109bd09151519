//! Oriented cutting planes and the axis choices offered by the host.

use crate::errors::SplitError;
use crate::float_types::{FRAC_PI_2, PI, Real};
use crate::mesh::plane::Plane;
use crate::split::guide::Guide;
use nalgebra::{Point3, UnitQuaternion, Vector3};
use std::fmt;
use std::str::FromStr;

/// World axis used for bisection splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Axis {
    X,
    Y,
    #[default]
    Z,
}

impl Axis {
    /// Unit world vector along this axis.
    pub fn unit_vector(self) -> Vector3<Real> {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }

    /// Rotation taking the default +Z plane normal onto this axis.
    ///
    /// X turns a quarter about Y, Y turns a quarter about X (negative sense, so
    /// the normal ends up on +Y), Z is the identity.
    pub fn rotation(self) -> UnitQuaternion<Real> {
        match self {
            Axis::X => UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2),
            Axis::Y => UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -FRAC_PI_2),
            Axis::Z => UnitQuaternion::identity(),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        };
        f.write_str(s)
    }
}

impl FromStr for Axis {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            other => Err(SplitError::InvalidInput(format!(
                "unknown axis '{other}', expected X, Y or Z"
            ))),
        }
    }
}

/// An oriented infinite plane: every point `p` with `normal · (p - origin) = 0`.
///
/// `normal` need not be unit length but must be finite and non-zero for the
/// plane to be usable; see [`PlaneDefinition::validate`]. The positive side is
/// the half-space `normal` points into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneDefinition {
    pub origin: Point3<Real>,
    pub normal: Vector3<Real>,
}

impl PlaneDefinition {
    pub const fn new(origin: Point3<Real>, normal: Vector3<Real>) -> Self {
        PlaneDefinition { origin, normal }
    }

    /// Plane through `center` whose normal is the world `axis`.
    pub fn axis_bisection(center: Point3<Real>, axis: Axis) -> Self {
        PlaneDefinition::new(center, axis.unit_vector())
    }

    /// The guide's current transform, taken verbatim.
    pub fn from_guide(guide: &Guide) -> Self {
        guide.plane()
    }

    /// Plane through `origin` whose normal is the rotated local +Z axis.
    pub fn from_rotation(origin: Point3<Real>, rotation: UnitQuaternion<Real>) -> Self {
        PlaneDefinition::new(origin, rotation * Vector3::z())
    }

    /// Plane from XYZ Euler angles in radians (rotate about X, then Y, then Z).
    pub fn from_euler(origin: Point3<Real>, rx: Real, ry: Real, rz: Real) -> Self {
        Self::from_rotation(origin, UnitQuaternion::from_euler_angles(rx, ry, rz))
    }

    /// Shortest-arc rotation taking +Z onto the normal.
    ///
    /// Only the normal direction is recoverable: `from_rotation(origin,
    /// plane.rotation())` gives back the same plane with a unit normal. A
    /// degenerate normal yields the identity.
    pub fn rotation(&self) -> UnitQuaternion<Real> {
        let Some(n) = self.unit_normal() else {
            return UnitQuaternion::identity();
        };
        UnitQuaternion::rotation_between(&Vector3::z(), &n)
            .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI))
    }

    /// Unit normal, or `None` when the normal is zero or non-finite.
    ///
    /// Any finite non-zero length works: the normal is first divided by its
    /// largest component so the norm can neither overflow nor underflow.
    pub fn unit_normal(&self) -> Option<Vector3<Real>> {
        if !self.normal.iter().all(|c| c.is_finite()) {
            return None;
        }
        let largest = self.normal.amax();
        if largest <= 0.0 {
            return None;
        }
        (self.normal / largest).try_normalize(0.0)
    }

    /// Check the plane invariants: finite origin, finite non-zero normal.
    pub fn validate(&self) -> Result<(), SplitError> {
        if !self.origin.coords.iter().all(|c| c.is_finite()) {
            return Err(SplitError::InvalidInput(format!(
                "plane origin {} is not finite",
                self.origin
            )));
        }
        if self.unit_normal().is_none() {
            return Err(SplitError::InvalidInput(format!(
                "plane normal {} is zero or not finite",
                self.normal
            )));
        }
        Ok(())
    }

    /// Signed distance from the plane, positive on the normal side.
    /// Zero for a degenerate plane.
    pub fn signed_distance(&self, point: &Point3<Real>) -> Real {
        self.unit_normal()
            .map_or(0.0, |n| n.dot(&(point - self.origin)))
    }

    /// Same plane as a three-point BSP [`Plane`].
    pub fn to_bsp_plane(&self) -> Plane {
        Plane::from_point_and_normal(self.origin, self.unit_normal().unwrap_or_else(Vector3::z))
    }
}

impl From<Axis> for PlaneDefinition {
    /// Bisection plane through the world origin.
    fn from(axis: Axis) -> Self {
        PlaneDefinition::axis_bisection(Point3::origin(), axis)
    }
}
