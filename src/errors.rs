//! Validation and split errors

use crate::float_types::Real;
use crate::split::Side;
use nalgebra::Point3;

/// Geometry validation issues found while building or checking meshes
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// (InvalidCoordinate) The coordinate has a NaN or infinite
    #[error("(InvalidCoordinate) The coordinate ({0}) has a NaN or infinite")]
    InvalidCoordinate(Point3<Real>),
    /// (TooFewPoints) A face has fewer than three vertices
    #[error("(TooFewPoints) A face has fewer than the minimal 3 points at: {0}")]
    TooFewPoints(Point3<Real>),
    /// (IndexOutOfRange) A face refers to a point that does not exist
    #[error("(IndexOutOfRange) Face index {index} is out of range (points.len = {len})")]
    IndexOutOfRange { index: usize, len: usize },
    /// In general, anything else
    #[error("{0}")]
    Other(String),
}

/// Why a split request could not be carried out.
///
/// Empty sides and planes that never reach the source are reported through
/// [`crate::split::SideStatus`] and [`crate::split::Outcome`] instead, as they
/// are legitimate results rather than failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SplitError {
    /// Malformed request: empty source mesh, degenerate plane.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Guide mode was requested but there is no guide.
    #[error("no cut guide found, create a guide plane before splitting by guide")]
    MissingGuide,
    /// Guide mode was requested with the guide itself selected as the source.
    #[error("the cut guide cannot split itself, select the object to cut instead")]
    InvalidSelection,
    /// The geometry kernel could not evaluate the boolean for one side.
    #[error("boolean evaluation failed for the {side} side: {reason}")]
    BooleanSolverFailure { side: Side, reason: String },
}
