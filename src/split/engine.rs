//! The split engine: validates a request, prepares the cutting operand and
//! evaluates one boolean per requested side.

use crate::errors::SplitError;
use crate::float_types::{Real, tolerance};
use crate::kernel::{BooleanKernel, BspKernel, SolverMode};
use crate::mesh::Mesh;
use crate::mesh::plane::{BACK, FRONT};
use crate::split::guide::{Guide, ObjectId};
use crate::split::plane::{Axis, PlaneDefinition};
use crate::split::request::{Cut, Side, SideSelector, SplitRequest};
use crate::split::result::{Outcome, SideStatus, SplitResult};
use crate::split::surface::{self, ExtentPolicy};
use std::fmt::{self, Debug};
use tracing::{debug, instrument, warn};

/// Per-engine configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitOptions {
    /// Point classification mode handed to the kernel. [`SolverMode::Fast`] is
    /// an opt-in fallback.
    pub solver: SolverMode,
    /// How large the cutting surface is made.
    pub extent: ExtentPolicy,
    /// Evaluate both sides concurrently (needs the `parallel` feature,
    /// ignored otherwise).
    pub parallel_sides: bool,
}

impl Default for SplitOptions {
    fn default() -> Self {
        SplitOptions {
            solver: SolverMode::Exact,
            extent: ExtentPolicy::default(),
            parallel_sides: false,
        }
    }
}

impl SplitOptions {
    pub const fn with_solver(mut self, solver: SolverMode) -> Self {
        self.solver = solver;
        self
    }

    pub const fn with_extent(mut self, extent: ExtentPolicy) -> Self {
        self.extent = extent;
        self
    }

    pub const fn with_parallel_sides(mut self, parallel_sides: bool) -> Self {
        self.parallel_sides = parallel_sides;
        self
    }
}

/// Stages of a single split call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitPhase {
    Validating,
    Preparing,
    Evaluating,
    CleaningUp,
    Done,
    Failed,
}

impl fmt::Display for SplitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SplitPhase::Validating => "validating",
            SplitPhase::Preparing => "preparing",
            SplitPhase::Evaluating => "evaluating",
            SplitPhase::CleaningUp => "cleaning up",
            SplitPhase::Done => "done",
            SplitPhase::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Where the source lies relative to the plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// No vertex strictly behind the plane (includes a flat mesh lying on it).
    Positive,
    /// No vertex strictly in front of the plane.
    Negative,
    Straddling,
}

/// Evaluation result of one requested side; `Ok(None)` is an empty side.
type SideOutcome<S> = Result<Option<Mesh<S>>, SplitError>;

/// Splits meshes with a [`BooleanKernel`].
///
/// The engine holds no per-call state, so one engine can serve concurrent
/// calls; every call duplicates what it mutates.
#[derive(Debug, Clone, Default)]
pub struct SplitEngine<K = BspKernel> {
    kernel: K,
    options: SplitOptions,
}

impl SplitEngine<BspKernel> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K> SplitEngine<K> {
    pub fn with_kernel(kernel: K) -> Self {
        SplitEngine {
            kernel,
            options: SplitOptions::default(),
        }
    }

    pub const fn with_options(mut self, options: SplitOptions) -> Self {
        self.options = options;
        self
    }

    pub const fn options(&self) -> &SplitOptions {
        &self.options
    }

    pub const fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Bisect `source` along `axis` through the centre of its bounding box.
    pub fn split_in_half<S>(&self, source: &Mesh<S>, axis: Axis, sides: SideSelector) -> SplitResult<S>
    where
        S: Clone + Send + Sync + Debug,
        K: BooleanKernel<S>,
    {
        self.split(SplitRequest::in_half(source, axis, sides))
    }

    /// Cut `source` (host object `source_id`) with a guide. The guide is consumed.
    pub fn split_by_guide<S>(
        &self,
        source: &Mesh<S>,
        source_id: ObjectId,
        guide: Option<Guide>,
        sides: SideSelector,
    ) -> SplitResult<S>
    where
        S: Clone + Send + Sync + Debug,
        K: BooleanKernel<S>,
    {
        self.split(SplitRequest::by_guide(source, source_id, guide, sides))
    }

    /// Run one split. Never mutates `request.source` and never panics on bad
    /// input: every problem is reported through the returned [`SplitResult`].
    #[instrument(skip_all, fields(sides = ?request.sides, polygons = request.source.polygons.len()))]
    pub fn split<S>(&self, request: SplitRequest<'_, S>) -> SplitResult<S>
    where
        S: Clone + Send + Sync + Debug,
        K: BooleanKernel<S>,
    {
        let SplitRequest { source, cut, sides } = request;

        enter(SplitPhase::Validating);
        let plane = match self.validate(source, cut) {
            Ok(plane) => plane,
            Err(error) => {
                warn!(%error, "split request rejected");
                enter(SplitPhase::Failed);
                return SplitResult::failed(error);
            },
        };

        enter(SplitPhase::Preparing);
        let bounds = crate::traits::CSGOps::bounding_box(source);
        let extent = self.options.extent.resolve(&plane, &bounds);

        if !surface::reaches(&plane, extent, &bounds) {
            debug!(extent, "cutting surface does not reach the source");
            enter(SplitPhase::CleaningUp);
            enter(SplitPhase::Done);
            return no_intersection(sides);
        }
        if !surface::covers(&plane, extent, &bounds) {
            warn!(extent, "cutting surface does not cover the source, the cut may be partial");
        }
        if !source.is_manifold() {
            warn!("source mesh is not manifold, boolean results may be degenerate");
        }
        let placement = self.placement(source, &plane);
        debug!(?placement, extent, kernel = self.kernel.name(), "operands prepared");

        enter(SplitPhase::Evaluating);
        let (positive, negative) = self.evaluate_sides(source, &plane, extent, placement, sides);

        enter(SplitPhase::CleaningUp);
        let mut first_error = None;
        let (positive, positive_status) = settle(positive, &mut first_error);
        let (negative, negative_status) = settle(negative, &mut first_error);

        let status = match first_error {
            Some(error) => {
                warn!(%error, "split failed");
                enter(SplitPhase::Failed);
                Outcome::Failed(error)
            },
            None => {
                enter(SplitPhase::Done);
                if sides == SideSelector::Both
                    && positive_status == SideStatus::EmptyResult
                    && negative_status == SideStatus::EmptyResult
                {
                    Outcome::NoIntersection
                } else {
                    Outcome::Success
                }
            },
        };

        SplitResult {
            positive,
            negative,
            status,
            positive_status,
            negative_status,
        }
    }

    /// Resolve the cut into a plane and check the request. Guide checks come
    /// first: they concern the request shape, not the geometry.
    fn validate<S>(&self, source: &Mesh<S>, cut: Cut) -> Result<PlaneDefinition, SplitError>
    where
        S: Clone + Send + Sync + Debug,
    {
        let plane = match cut {
            Cut::Plane(plane) => plane,
            Cut::Guide { guide: None, .. } => return Err(SplitError::MissingGuide),
            Cut::Guide {
                guide: Some(guide),
                source_id,
            } => {
                if guide.id() == source_id {
                    return Err(SplitError::InvalidSelection);
                }
                PlaneDefinition::from_guide(&guide)
            },
        };

        if source.polygons.is_empty() {
            return Err(SplitError::InvalidInput("source mesh has no faces".to_string()));
        }
        if !source.is_finite() {
            return Err(SplitError::InvalidInput(
                "source mesh has non-finite coordinates".to_string(),
            ));
        }
        let bounds = crate::traits::CSGOps::bounding_box(source);
        let diagonal = (bounds.maxs - bounds.mins).norm();
        if diagonal <= tolerance() {
            return Err(SplitError::InvalidInput(format!(
                "source mesh spans {diagonal}, below the classification tolerance {}",
                tolerance()
            )));
        }
        plane.validate()?;
        if let ExtentPolicy::Fixed(extent) = self.options.extent {
            if !(extent.is_finite() && extent > 0.0) {
                return Err(SplitError::InvalidInput(format!(
                    "fixed cutting extent {extent} must be positive and finite"
                )));
            }
        }

        Ok(plane)
    }

    fn placement<S>(&self, source: &Mesh<S>, plane: &PlaneDefinition) -> Placement
    where
        S: Clone + Send + Sync + Debug,
    {
        let bsp_plane = plane.to_bsp_plane();
        let combined = source
            .polygons
            .iter()
            .flat_map(|p| p.vertices.iter())
            .fold(0, |acc, v| acc | bsp_plane.orient_point_with(&v.pos, self.options.solver));

        if combined & BACK == 0 {
            Placement::Positive
        } else if combined & FRONT == 0 {
            Placement::Negative
        } else {
            Placement::Straddling
        }
    }

    #[allow(clippy::type_complexity)]
    fn evaluate_sides<S>(
        &self,
        source: &Mesh<S>,
        plane: &PlaneDefinition,
        extent: Real,
        placement: Placement,
        sides: SideSelector,
    ) -> (Option<SideOutcome<S>>, Option<SideOutcome<S>>)
    where
        S: Clone + Send + Sync + Debug,
        K: BooleanKernel<S>,
    {
        let evaluate = |side: Side| {
            sides
                .includes(side)
                .then(|| self.evaluate_side(source, plane, extent, placement, side))
        };

        #[cfg(feature = "parallel")]
        if self.options.parallel_sides && sides == SideSelector::Both {
            return rayon::join(|| evaluate(Side::Positive), || evaluate(Side::Negative));
        }

        (evaluate(Side::Positive), evaluate(Side::Negative))
    }

    fn evaluate_side<S>(
        &self,
        source: &Mesh<S>,
        plane: &PlaneDefinition,
        extent: Real,
        placement: Placement,
        side: Side,
    ) -> SideOutcome<S>
    where
        S: Clone + Send + Sync + Debug,
        K: BooleanKernel<S>,
    {
        match (placement, side) {
            (Placement::Positive, Side::Positive) | (Placement::Negative, Side::Negative) => {
                return Ok(Some(source.clone()));
            },
            (Placement::Positive, Side::Negative) | (Placement::Negative, Side::Positive) => {
                return Ok(None);
            },
            (Placement::Straddling, _) => {},
        }

        // each evaluation gets its own copies of both operands
        let working = source.clone();
        let operand: Mesh<S> = surface::to_cutting_operand(plane, extent);
        let result = match side {
            Side::Positive => self.kernel.intersection(&working, &operand, self.options.solver),
            Side::Negative => self.kernel.difference(&working, &operand, self.options.solver),
        };
        drop(operand);
        drop(working);

        match result {
            Ok(mesh) if mesh.polygons.is_empty() => {
                debug!(%side, "side is empty");
                Ok(None)
            },
            Ok(mesh) => {
                debug!(%side, polygons = mesh.polygons.len(), "side evaluated");
                Ok(Some(mesh))
            },
            Err(e) => Err(SplitError::BooleanSolverFailure {
                side,
                reason: e.to_string(),
            }),
        }
    }
}

fn enter(phase: SplitPhase) {
    debug!(%phase, "split phase");
}

fn settle<S: Clone + Send + Sync + Debug>(
    outcome: Option<SideOutcome<S>>,
    first_error: &mut Option<SplitError>,
) -> (Option<Mesh<S>>, SideStatus) {
    match outcome {
        None => (None, SideStatus::NotRequested),
        Some(Ok(Some(mesh))) => (Some(mesh), SideStatus::Populated),
        Some(Ok(None)) => (None, SideStatus::EmptyResult),
        Some(Err(error)) => {
            first_error.get_or_insert(error);
            (None, SideStatus::Failed)
        },
    }
}

fn no_intersection<S: Clone + Send + Sync + Debug>(sides: SideSelector) -> SplitResult<S> {
    let status = |side| {
        if sides.includes(side) {
            SideStatus::EmptyResult
        } else {
            SideStatus::NotRequested
        }
    };
    SplitResult {
        positive: None,
        negative: None,
        status: Outcome::NoIntersection,
        positive_status: status(Side::Positive),
        negative_status: status(Side::Negative),
    }
}
