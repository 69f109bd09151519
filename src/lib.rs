//! Split polygon meshes in two along a plane using BSP-tree **Constructive
//! Solid Geometry (CSG)** booleans.
//!
//! A split intersects the source with a closed cutting operand built from the
//! plane (keeping the positive side) and subtracts the same operand (keeping
//! the negative side). Planes come from a world-axis bisection or from a
//! user-placed [`Guide`](split::Guide).
//!
//! ```
//! use csgsplit::mesh::Mesh;
//! use csgsplit::split::{PlaneDefinition, SideSelector, SplitRequest};
//! use nalgebra::{Point3, Vector3};
//!
//! let cube: Mesh<()> = Mesh::cube(1.0, None);
//! let plane = PlaneDefinition::new(Point3::new(0.0, 0.0, 0.25), Vector3::z());
//! let result = csgsplit::split(SplitRequest::new(&cube, plane, SideSelector::Both));
//! let pieces = result.into_result().expect("split");
//! assert!((pieces.negative.expect("bottom").volume() - 0.25).abs() < 1e-9);
//! ```
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//! - [**stl-io**](https://en.wikipedia.org/wiki/STL_(file_format)): `.stl` import/export
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64
//! - **parallel**: use rayon to evaluate both sides of a split concurrently

#![forbid(unsafe_code)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod errors;
pub mod float_types;
pub mod kernel;
pub mod mesh;
pub mod split;
pub mod traits;

#[cfg(feature = "stl-io")]
pub mod io;

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use errors::{SplitError, ValidationError};
pub use kernel::{BooleanKernel, BspKernel, KernelError, SolverMode};
pub use mesh::{Mesh, vertex::Vertex};
pub use split::{
    Axis, Guide, ObjectId, Outcome, PlaneDefinition, SideSelector, SideStatus, SplitEngine,
    SplitOptions, SplitRequest, SplitResult,
};
pub use traits::CSGOps;

use std::fmt::Debug;

/// Split with the default engine: [`BspKernel`], exact predicates and a
/// bounds-derived cutting extent.
pub fn split<S: Clone + Send + Sync + Debug>(request: SplitRequest<'_, S>) -> SplitResult<S> {
    SplitEngine::new().split(request)
}
