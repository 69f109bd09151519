//! User-placed guide planes.

use crate::float_types::Real;
use crate::mesh::Mesh;
use crate::split::plane::PlaneDefinition;
use crate::traits::CSGOps;
use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion};
use std::fmt::{self, Debug};

/// Opaque identity of a host object, used to tell the guide apart from the
/// object being cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A unit-size planar proxy the user moves and rotates to define a cut.
///
/// The guide plane passes through `origin` and its normal is the rotated local +Z.
#[derive(Debug, Clone, PartialEq)]
pub struct Guide {
    id: ObjectId,
    origin: Point3<Real>,
    rotation: UnitQuaternion<Real>,
}

impl Guide {
    /// Side length of the guide proxy.
    pub const SIZE: Real = 1.0;

    /// Create a guide at `location`, facing +Z.
    pub fn create(id: ObjectId, location: Point3<Real>) -> Self {
        Guide {
            id,
            origin: location,
            rotation: UnitQuaternion::identity(),
        }
    }

    pub const fn id(&self) -> ObjectId {
        self.id
    }

    pub const fn origin(&self) -> Point3<Real> {
        self.origin
    }

    pub const fn rotation(&self) -> UnitQuaternion<Real> {
        self.rotation
    }

    /// Move and rotate the guide.
    pub fn set_transform(&mut self, origin: Point3<Real>, rotation: UnitQuaternion<Real>) {
        self.origin = origin;
        self.rotation = rotation;
    }

    /// Rotate the guide with XYZ Euler angles in radians, keeping its location.
    pub fn set_rotation_euler(&mut self, rx: Real, ry: Real, rz: Real) {
        self.rotation = UnitQuaternion::from_euler_angles(rx, ry, rz);
    }

    /// The cutting plane the guide currently defines.
    pub fn plane(&self) -> PlaneDefinition {
        PlaneDefinition::from_rotation(self.origin, self.rotation)
    }

    /// The guide's own proxy geometry: a [`Guide::SIZE`] square at its transform.
    pub fn to_mesh<S: Clone + Send + Sync + Debug>(&self) -> Mesh<S> {
        let iso = Isometry3::from_parts(Translation3::from(self.origin.coords), self.rotation);
        Mesh::square(Self::SIZE, None).transform(&iso.to_homogeneous())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::float_types::FRAC_PI_2;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn new_guide_faces_up_at_location() {
        let guide = Guide::create(ObjectId(7), Point3::new(1.0, 2.0, 3.0));
        let plane = guide.plane();
        assert_eq!(plane.origin, Point3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(plane.normal, Vector3::z(), epsilon = 1e-12);
        assert_eq!(guide.id(), ObjectId(7));
    }

    #[test]
    fn rotated_guide_mesh_lies_on_its_plane() {
        let mut guide = Guide::create(ObjectId(1), Point3::new(0.0, 0.0, 1.0));
        guide.set_rotation_euler(FRAC_PI_2 / 2.0, 0.0, 0.0);
        let plane = guide.plane();
        let mesh: Mesh<()> = guide.to_mesh();
        for v in mesh.vertices() {
            assert_relative_eq!(plane.signed_distance(&v.pos), 0.0, epsilon = 1e-9);
        }
        assert_relative_eq!(mesh.surface_area(), 1.0, epsilon = 1e-9);
    }
}
