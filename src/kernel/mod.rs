//! Boolean kernels used to evaluate each side of a split.
//!
//! A kernel only has to provide intersection and difference of two closed
//! meshes. [`BspKernel`] is the default, built on the crate's BSP trees.

use crate::errors::ValidationError;
use crate::mesh::Mesh;
use crate::mesh::bsp::SerialBspOps;
use std::fmt::{self, Debug};
use tracing::{debug, instrument};

/// How point/plane classification is evaluated inside a kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SolverMode {
    /// Adaptive-precision orientation predicates: the sign of every
    /// classification is exact for the input coordinates.
    #[default]
    Exact,
    /// Plain floating-point plane distances. Faster, but nearly coplanar
    /// input may be classified inconsistently.
    Fast,
}

impl fmt::Display for SolverMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverMode::Exact => f.write_str("exact"),
            SolverMode::Fast => f.write_str("fast"),
        }
    }
}

/// Failure reported by a [`BooleanKernel`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KernelError {
    /// An operand failed validation before evaluation started
    #[error("operand rejected: {0}")]
    Validation(#[from] ValidationError),
    /// Evaluation produced coordinates that are NaN or infinite
    #[error("boolean result has non-finite coordinates in polygon {polygon}")]
    NonFiniteResult { polygon: usize },
}

/// A solid-modelling backend able to evaluate the two booleans a split needs.
///
/// Implementations must be shareable across threads: the two sides of a
/// split may be evaluated concurrently.
pub trait BooleanKernel<S: Clone + Send + Sync + Debug>: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Part of `a` inside `b`.
    fn intersection(&self, a: &Mesh<S>, b: &Mesh<S>, mode: SolverMode)
    -> Result<Mesh<S>, KernelError>;

    /// Part of `a` outside `b`.
    fn difference(&self, a: &Mesh<S>, b: &Mesh<S>, mode: SolverMode)
    -> Result<Mesh<S>, KernelError>;
}

/// Boolean kernel backed by BSP trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct BspKernel;

impl BspKernel {
    fn check_operand<S: Clone + Send + Sync + Debug>(mesh: &Mesh<S>) -> Result<(), KernelError> {
        match mesh
            .polygons
            .iter()
            .flat_map(|p| p.vertices.iter())
            .find(|v| !v.is_finite())
        {
            Some(v) => Err(ValidationError::InvalidCoordinate(v.pos).into()),
            None => Ok(()),
        }
    }

    fn check_result<S: Clone + Send + Sync + Debug>(mesh: Mesh<S>) -> Result<Mesh<S>, KernelError> {
        if let Some(polygon) = mesh.polygons.iter().position(|p| !p.is_finite()) {
            return Err(KernelError::NonFiniteResult { polygon });
        }
        Ok(mesh.without_degenerate_polygons())
    }
}

impl<S: Clone + Send + Sync + Debug> BooleanKernel<S> for BspKernel {
    fn name(&self) -> &'static str {
        "bsp"
    }

    #[instrument(skip_all, fields(mode = %mode))]
    fn intersection(
        &self,
        a: &Mesh<S>,
        b: &Mesh<S>,
        mode: SolverMode,
    ) -> Result<Mesh<S>, KernelError> {
        Self::check_operand(a)?;
        Self::check_operand(b)?;
        let result = a.intersection_with(b, &SerialBspOps::with_mode(mode));
        debug!(polygons = result.polygons.len(), "intersection evaluated");
        Self::check_result(result)
    }

    #[instrument(skip_all, fields(mode = %mode))]
    fn difference(
        &self,
        a: &Mesh<S>,
        b: &Mesh<S>,
        mode: SolverMode,
    ) -> Result<Mesh<S>, KernelError> {
        Self::check_operand(a)?;
        Self::check_operand(b)?;
        let result = a.difference_with(b, &SerialBspOps::with_mode(mode));
        debug!(polygons = result.polygons.len(), "difference evaluated");
        Self::check_result(result)
    }
}
