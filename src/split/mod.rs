//! Splitting meshes along a plane.
//!
//! A split cuts a source mesh with a [`PlaneDefinition`] (an axis bisection or
//! a user-placed [`Guide`]) and returns the part on the positive side of the
//! plane, the part on the negative side, or both:
//!
//! ```
//! use csgsplit::mesh::Mesh;
//! use csgsplit::split::{Axis, SideSelector, SplitEngine};
//! use csgsplit::traits::CSGOps;
//!
//! let cube: Mesh<()> = Mesh::cube(2.0, None).center();
//! let result = SplitEngine::new().split_in_half(&cube, Axis::Z, SideSelector::Both);
//! assert!(result.is_success());
//! let top = result.positive.expect("top half");
//! assert!((top.volume() - 4.0).abs() < 1e-9);
//! ```

pub mod engine;
pub mod guide;
pub mod plane;
pub mod request;
pub mod result;
pub mod surface;

pub use engine::{SplitEngine, SplitOptions, SplitPhase};
pub use guide::{Guide, ObjectId};
pub use plane::{Axis, PlaneDefinition};
pub use request::{Cut, Side, SideSelector, SplitRequest};
pub use result::{Outcome, SideStatus, SplitPieces, SplitResult};
pub use surface::{ExtentPolicy, LEGACY_FIXED_EXTENT, to_cutting_operand, to_cutting_surface};
