//! What to cut, where, and which pieces to keep.

use crate::mesh::Mesh;
use crate::split::guide::{Guide, ObjectId};
use crate::split::plane::{Axis, PlaneDefinition};
use crate::traits::CSGOps;
use std::fmt::{self, Debug};

/// One side of a cutting plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The half-space the plane normal points into.
    Positive,
    Negative,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Positive => f.write_str("positive"),
            Side::Negative => f.write_str("negative"),
        }
    }
}

/// Which pieces a split should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SideSelector {
    PositiveOnly,
    NegativeOnly,
    #[default]
    Both,
}

impl SideSelector {
    pub const fn includes(self, side: Side) -> bool {
        matches!(
            (self, side),
            (SideSelector::Both, _)
                | (SideSelector::PositiveOnly, Side::Positive)
                | (SideSelector::NegativeOnly, Side::Negative)
        )
    }
}

/// Where to cut.
#[derive(Debug, Clone, PartialEq)]
pub enum Cut {
    /// An explicit plane, e.g. an axis bisection.
    Plane(PlaneDefinition),
    /// The current transform of a guide. `guide` is `None` when the host has no
    /// guide; `source_id` identifies the object being cut so a guide cannot be
    /// used to cut itself.
    Guide {
        guide: Option<Guide>,
        source_id: ObjectId,
    },
}

/// A single split call: a borrowed source mesh, a cut and the sides to keep.
#[derive(Debug, Clone)]
pub struct SplitRequest<'a, S: Clone + Send + Sync + Debug> {
    pub source: &'a Mesh<S>,
    pub cut: Cut,
    pub sides: SideSelector,
}

impl<'a, S: Clone + Send + Sync + Debug> SplitRequest<'a, S> {
    pub const fn new(source: &'a Mesh<S>, plane: PlaneDefinition, sides: SideSelector) -> Self {
        SplitRequest {
            source,
            cut: Cut::Plane(plane),
            sides,
        }
    }

    /// Bisect along a world axis through `center`.
    pub fn axis(
        source: &'a Mesh<S>,
        center: nalgebra::Point3<crate::float_types::Real>,
        axis: Axis,
        sides: SideSelector,
    ) -> Self {
        Self::new(source, PlaneDefinition::axis_bisection(center, axis), sides)
    }

    /// Bisect along a world axis through the centre of the source's bounding box.
    pub fn in_half(source: &'a Mesh<S>, axis: Axis, sides: SideSelector) -> Self {
        let bb = source.bounding_box();
        let center = nalgebra::center(&bb.mins, &bb.maxs);
        Self::axis(source, center, axis, sides)
    }

    /// Cut with a guide's plane. The guide is consumed: it does not outlive the split.
    pub const fn by_guide(
        source: &'a Mesh<S>,
        source_id: ObjectId,
        guide: Option<Guide>,
        sides: SideSelector,
    ) -> Self {
        SplitRequest {
            source,
            cut: Cut::Guide { guide, source_id },
            sides,
        }
    }
}
