mod support;

use approx::assert_relative_eq;
use csgsplit::{
    BooleanKernel, BspKernel, CSGOps, KernelError, SolverMode, SplitError,
    float_types::Real,
    mesh::Mesh,
    split::{
        Axis, ExtentPolicy, Guide, ObjectId, Outcome, PlaneDefinition, Side, SideSelector,
        SideStatus, SplitEngine, SplitOptions, SplitRequest,
    },
};
use nalgebra::{Point3, Vector3};
use support::{snapshot, unit_cube};

fn tilted_plane() -> PlaneDefinition {
    PlaneDefinition::new(Point3::new(0.1, 0.0, -0.1), Vector3::new(1.0, 2.0, 3.0))
}

#[test]
fn unit_cube_splits_into_two_halves() {
    let cube = unit_cube();
    let result = csgsplit::split(SplitRequest::axis(
        &cube,
        Point3::origin(),
        Axis::Z,
        SideSelector::Both,
    ));

    assert_eq!(result.status, Outcome::Success);
    assert_eq!(result.positive_status, SideStatus::Populated);
    assert_eq!(result.negative_status, SideStatus::Populated);
    let top = result.positive.expect("top half");
    let bottom = result.negative.expect("bottom half");
    assert_relative_eq!(top.volume(), 0.5, epsilon = 1e-9);
    assert_relative_eq!(bottom.volume(), 0.5, epsilon = 1e-9);

    let top_bb = top.bounding_box();
    assert_relative_eq!(top_bb.mins.z, 0.0, epsilon = 1e-9);
    assert_relative_eq!(top_bb.maxs.z, 0.5, epsilon = 1e-9);
    let bottom_bb = bottom.bounding_box();
    assert_relative_eq!(bottom_bb.mins.z, -0.5, epsilon = 1e-9);
    assert_relative_eq!(bottom_bb.maxs.z, 0.0, epsilon = 1e-9);
}

#[test]
fn source_is_never_mutated() {
    let cube = unit_cube();
    let before = snapshot(&cube);

    let engine = SplitEngine::new();
    let _ = engine.split(SplitRequest::new(&cube, tilted_plane(), SideSelector::Both));
    let _ = engine.split_by_guide(&cube, ObjectId(1), None, SideSelector::Both);
    let _ = engine.split(SplitRequest::new(
        &cube,
        PlaneDefinition::new(Point3::origin(), Vector3::zeros()),
        SideSelector::Both,
    ));

    assert_eq!(snapshot(&cube), before);
    assert_eq!(cube.polygons.len(), 6);
}

#[test]
fn pieces_partition_the_volume() {
    let cube = unit_cube();
    for plane in [
        tilted_plane(),
        PlaneDefinition::new(Point3::new(0.3, 0.0, 0.0), Vector3::x()),
        PlaneDefinition::new(Point3::origin(), Vector3::new(-1.0, 1.0, 0.0)),
    ] {
        let result = csgsplit::split(SplitRequest::new(&cube, plane, SideSelector::Both));
        let pieces = result.into_result().expect("split succeeds");
        let positive = pieces.positive.expect("positive piece").volume();
        let negative = pieces.negative.expect("negative piece").volume();
        assert!(positive > 0.0 && negative > 0.0);
        assert_relative_eq!(positive + negative, 1.0, epsilon = 1e-9);
    }
}

#[test]
fn axis_bisection_matches_explicit_plane() {
    let cube = unit_cube().translate(0.2, -0.1, 0.3);
    let center = Point3::new(0.1, 0.1, 0.25);

    let by_axis = csgsplit::split(SplitRequest::axis(&cube, center, Axis::Z, SideSelector::Both));
    let explicit = csgsplit::split(SplitRequest::new(
        &cube,
        PlaneDefinition::new(center, Vector3::new(0.0, 0.0, 1.0)),
        SideSelector::Both,
    ));

    assert_eq!(by_axis.status, explicit.status);
    for side in [Side::Positive, Side::Negative] {
        let (a, a_status) = by_axis.side(side);
        let (b, b_status) = explicit.side(side);
        assert_eq!(a_status, b_status);
        assert_eq!(
            snapshot(a.expect("axis piece")),
            snapshot(b.expect("explicit piece"))
        );
    }
}

#[test]
fn resplitting_a_piece_returns_it_unchanged() {
    let cube = unit_cube();
    let plane = tilted_plane();
    let first = csgsplit::split(SplitRequest::new(&cube, plane, SideSelector::Both));
    let positive = first.positive.expect("positive piece");

    let again = csgsplit::split(SplitRequest::new(&positive, plane, SideSelector::PositiveOnly));
    assert_eq!(again.status, Outcome::Success);
    assert_eq!(again.negative_status, SideStatus::NotRequested);
    let resplit = again.positive.expect("positive piece again");
    assert_eq!(snapshot(&resplit), snapshot(&positive));
    assert_relative_eq!(resplit.volume(), positive.volume(), epsilon = 1e-12);
}

#[test]
fn cube_above_plane_is_one_sided_not_missed() {
    let cube = unit_cube().translate(0.0, 0.0, 6.0);
    let plane = PlaneDefinition::new(Point3::origin(), Vector3::z());
    let result = csgsplit::split(SplitRequest::new(&cube, plane, SideSelector::Both));

    assert_eq!(result.status, Outcome::Success);
    assert_eq!(result.positive_status, SideStatus::Populated);
    assert_eq!(result.negative_status, SideStatus::EmptyResult);
    assert!(result.negative.is_none());
    assert_eq!(snapshot(result.positive.as_ref().expect("whole cube")), snapshot(&cube));
}

#[test]
fn cutting_surface_outside_the_source_reports_no_intersection() {
    let cube = unit_cube();

    let small = SplitEngine::new()
        .with_options(SplitOptions::default().with_extent(ExtentPolicy::Fixed(1.0)));
    let result = small.split(SplitRequest::new(
        &cube,
        PlaneDefinition::new(Point3::new(10.0, 0.0, 0.0), Vector3::z()),
        SideSelector::Both,
    ));
    assert_eq!(result.status, Outcome::NoIntersection);
    assert!(result.positive.is_none() && result.negative.is_none());
    assert_eq!(result.positive_status, SideStatus::EmptyResult);
    assert_eq!(result.negative_status, SideStatus::EmptyResult);

    let legacy = SplitEngine::new()
        .with_options(SplitOptions::default().with_extent(ExtentPolicy::legacy()));
    let far = cube.translate(2000.0, 0.0, 0.0);
    let result = legacy.split(SplitRequest::axis(&far, Point3::origin(), Axis::Z, SideSelector::Both));
    assert_eq!(result.status, Outcome::NoIntersection);
    assert!(result.into_result().expect("not an error").positive.is_none());
}

#[test]
fn outputs_hold_no_cutting_geometry() {
    let cube = unit_cube();
    let bb = cube.bounding_box();
    let result = csgsplit::split(SplitRequest::new(&cube, tilted_plane(), SideSelector::Both));

    for piece in [&result.positive, &result.negative] {
        let mesh = piece.as_ref().expect("piece");
        for v in mesh.vertices() {
            for axis in 0..3 {
                assert!(v.pos[axis] >= bb.mins[axis] - 1e-9);
                assert!(v.pos[axis] <= bb.maxs[axis] + 1e-9);
            }
        }
    }
}

#[test]
fn guide_cannot_cut_itself() {
    let cube = unit_cube();
    let before = snapshot(&cube);
    let guide = Guide::create(ObjectId(3), Point3::origin());

    let result = SplitEngine::new().split_by_guide(&cube, ObjectId(3), Some(guide), SideSelector::Both);
    assert_eq!(result.status, Outcome::Failed(SplitError::InvalidSelection));
    assert!(result.positive.is_none() && result.negative.is_none());
    assert_eq!(snapshot(&cube), before);
    assert!(!result.message().is_empty());
}

#[test]
fn missing_guide_is_reported() {
    let cube = unit_cube();
    let result = SplitEngine::new().split_by_guide(&cube, ObjectId(1), None, SideSelector::Both);
    assert_eq!(result.error(), Some(&SplitError::MissingGuide));
    assert!(matches!(result.into_result(), Err(SplitError::MissingGuide)));
}

#[test]
fn tilted_guide_splits_the_source() {
    let cube = unit_cube();
    let mut guide = Guide::create(ObjectId(2), Point3::new(0.1, 0.0, 0.0));
    guide.set_rotation_euler(0.0, 0.6, 0.3);
    let plane = PlaneDefinition::from_guide(&guide);

    let result = SplitEngine::new().split_by_guide(&cube, ObjectId(1), Some(guide), SideSelector::Both);
    assert!(result.is_success());
    let positive = result.positive.expect("positive piece");
    let negative = result.negative.expect("negative piece");
    assert_relative_eq!(positive.volume() + negative.volume(), 1.0, epsilon = 1e-9);
    for v in positive.vertices() {
        assert!(plane.signed_distance(&v.pos) > -1e-9);
    }
    for v in negative.vertices() {
        assert!(plane.signed_distance(&v.pos) < 1e-9);
    }
}

#[test]
fn invalid_requests_are_rejected() {
    let empty: Mesh<()> = Mesh::new();
    let result = csgsplit::split(SplitRequest::axis(&empty, Point3::origin(), Axis::Z, SideSelector::Both));
    assert!(matches!(result.status, Outcome::Failed(SplitError::InvalidInput(_))));
    assert_eq!(result.positive_status, SideStatus::NotRequested);

    let cube = unit_cube();
    for normal in [Vector3::zeros(), Vector3::new(Real::NAN, 0.0, 1.0)] {
        let result = csgsplit::split(SplitRequest::new(
            &cube,
            PlaneDefinition::new(Point3::origin(), normal),
            SideSelector::Both,
        ));
        assert!(matches!(result.status, Outcome::Failed(SplitError::InvalidInput(_))));
        assert!(result.positive.is_none() && result.negative.is_none());
    }
}

/// Kernel whose difference always fails.
struct FailingDifference;

impl BooleanKernel<()> for FailingDifference {
    fn name(&self) -> &'static str {
        "failing-difference"
    }

    fn intersection(
        &self,
        a: &Mesh<()>,
        b: &Mesh<()>,
        mode: SolverMode,
    ) -> Result<Mesh<()>, KernelError> {
        BspKernel.intersection(a, b, mode)
    }

    fn difference(&self, _a: &Mesh<()>, _b: &Mesh<()>, _mode: SolverMode) -> Result<Mesh<()>, KernelError> {
        Err(KernelError::NonFiniteResult { polygon: 0 })
    }
}

#[test]
fn kernel_failure_names_the_side() {
    let cube = unit_cube();
    let engine = SplitEngine::with_kernel(FailingDifference);
    let result = engine.split_in_half(&cube, Axis::Z, SideSelector::Both);

    match &result.status {
        Outcome::Failed(SplitError::BooleanSolverFailure { side, reason }) => {
            assert_eq!(*side, Side::Negative);
            assert!(reason.contains("non-finite"));
        },
        other => panic!("unexpected status {other:?}"),
    }
    assert_eq!(result.positive_status, SideStatus::Populated);
    assert_eq!(result.negative_status, SideStatus::Failed);
    assert!(result.negative.is_none());

    // only the positive side requested: the failing kernel path is never reached
    let positive_only = engine.split_in_half(&cube, Axis::Z, SideSelector::PositiveOnly);
    assert!(positive_only.is_success());
}

#[test]
fn fast_solver_is_an_opt_in_fallback() {
    assert_eq!(SplitOptions::default().solver, SolverMode::Exact);
    let cube = unit_cube();
    let engine = SplitEngine::new()
        .with_options(SplitOptions::default().with_solver(SolverMode::Fast));
    let result = engine.split_in_half(&cube, Axis::Z, SideSelector::Both);
    let pieces = result.into_result().expect("split");
    assert_relative_eq!(pieces.positive.expect("top").volume(), 0.5, epsilon = 1e-9);
    assert_relative_eq!(pieces.negative.expect("bottom").volume(), 0.5, epsilon = 1e-9);
}

#[test]
fn split_in_half_uses_the_requested_axis() {
    let block: Mesh<()> = Mesh::cuboid(4.0, 2.0, 1.0, None);
    for (axis, index, mid) in [(Axis::X, 0, 2.0), (Axis::Y, 1, 1.0), (Axis::Z, 2, 0.5)] {
        let result = SplitEngine::new().split_in_half(&block, axis, SideSelector::Both);
        let positive = result.positive.expect("positive half");
        let negative = result.negative.expect("negative half");
        assert_relative_eq!(positive.bounding_box().mins[index], mid, epsilon = 1e-9);
        assert_relative_eq!(negative.bounding_box().maxs[index], mid, epsilon = 1e-9);
        assert_relative_eq!(positive.volume(), 4.0, epsilon = 1e-9);
        assert_relative_eq!(negative.volume(), 4.0, epsilon = 1e-9);
    }
}

#[test]
fn fixed_extent_smaller_than_source_cuts_partially() {
    let cube = unit_cube();
    let engine = SplitEngine::new()
        .with_options(SplitOptions::default().with_extent(ExtentPolicy::Fixed(0.4)));
    let result = engine.split(SplitRequest::axis(&cube, Point3::origin(), Axis::Z, SideSelector::Both));
    let pieces = result.into_result().expect("split");
    // only the 0.4 box above the plane is carved out
    assert_relative_eq!(pieces.positive.expect("positive").volume(), 0.064, epsilon = 1e-9);
    assert_relative_eq!(pieces.negative.expect("negative").volume(), 0.936, epsilon = 1e-9);
}

#[test]
fn legacy_extent_splits_a_unit_cube() {
    let cube = unit_cube();
    let engine = SplitEngine::new()
        .with_options(SplitOptions::default().with_extent(ExtentPolicy::legacy()));
    let result = engine.split_in_half(&cube, Axis::X, SideSelector::Both);
    let pieces = result.into_result().expect("split");
    assert_relative_eq!(pieces.positive.expect("positive").volume(), 0.5, epsilon = 1e-6);
    assert_relative_eq!(pieces.negative.expect("negative").volume(), 0.5, epsilon = 1e-6);
}

#[test]
fn flat_mesh_on_the_plane_goes_to_the_positive_side() {
    let square: Mesh<()> = Mesh::square(1.0, None);
    let result = csgsplit::split(SplitRequest::axis(&square, Point3::origin(), Axis::Z, SideSelector::Both));
    assert_eq!(result.status, Outcome::Success);
    assert_eq!(result.positive_status, SideStatus::Populated);
    assert_eq!(result.negative_status, SideStatus::EmptyResult);
}

#[test]
fn concurrent_calls_share_one_source() {
    let cube = unit_cube();
    let engine = SplitEngine::new();
    let before = snapshot(&cube);

    std::thread::scope(|scope| {
        let handles: Vec<_> = [Axis::X, Axis::Y, Axis::Z, Axis::X]
            .into_iter()
            .map(|axis| {
                let (cube, engine) = (&cube, &engine);
                scope.spawn(move || engine.split_in_half(cube, axis, SideSelector::Both))
            })
            .collect();
        for handle in handles {
            let result = handle.join().expect("thread finished");
            let pieces = result.into_result().expect("split");
            let total = pieces.positive.expect("positive").volume()
                + pieces.negative.expect("negative").volume();
            assert_relative_eq!(total, 1.0, epsilon = 1e-9);
        }
    });

    assert_eq!(snapshot(&cube), before);
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_sides_match_serial_evaluation() {
    let cube = unit_cube();
    let serial = SplitEngine::new();
    let parallel = SplitEngine::new()
        .with_options(SplitOptions::default().with_parallel_sides(true));
    let a = serial.split(SplitRequest::new(&cube, tilted_plane(), SideSelector::Both));
    let b = parallel.split(SplitRequest::new(&cube, tilted_plane(), SideSelector::Both));
    for side in [Side::Positive, Side::Negative] {
        assert_eq!(
            snapshot(a.side(side).0.expect("serial piece")),
            snapshot(b.side(side).0.expect("parallel piece"))
        );
    }
}

#[test]
fn normal_length_does_not_change_the_split() {
    let cube = unit_cube();
    for scale in [Real::MAX / 2.0, 1e-20, Real::MIN_POSITIVE] {
        let plane = PlaneDefinition::new(Point3::origin(), Vector3::new(scale, 0.0, 0.0));
        let result = csgsplit::split(SplitRequest::new(&cube, plane, SideSelector::Both));
        assert_eq!(result.status, Outcome::Success, "normal scale {scale}");
        let positive = result.positive.expect("positive half");
        let negative = result.negative.expect("negative half");
        assert_relative_eq!(positive.volume(), 0.5, epsilon = 1e-9);
        assert_relative_eq!(negative.volume(), 0.5, epsilon = 1e-9);
        assert_relative_eq!(positive.bounding_box().mins.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(negative.bounding_box().maxs.x, 0.0, epsilon = 1e-9);
    }

    // tilted, with a huge normal: same pieces as the unit-length normal
    let unit = csgsplit::split(SplitRequest::new(&cube, tilted_plane(), SideSelector::Both));
    let huge = csgsplit::split(SplitRequest::new(
        &cube,
        PlaneDefinition::new(tilted_plane().origin, tilted_plane().normal * (Real::MAX / 8.0)),
        SideSelector::Both,
    ));
    for side in [Side::Positive, Side::Negative] {
        let a = unit.side(side).0.expect("unit-normal piece").volume();
        let b = huge.side(side).0.expect("huge-normal piece").volume();
        assert_relative_eq!(a, b, epsilon = 1e-9);
    }
}

#[test]
fn sources_far_from_the_origin_keep_their_volume() {
    let offset = Vector3::new(1e7, 0.0, 0.0);
    let cube = unit_cube().translate_vector(offset);
    let plane = PlaneDefinition::new(tilted_plane().origin + offset, tilted_plane().normal);
    let result = csgsplit::split(SplitRequest::new(&cube, plane, SideSelector::Both));
    let pieces = result.into_result().expect("split");
    let positive = pieces.positive.expect("positive piece").volume();
    let negative = pieces.negative.expect("negative piece").volume();
    assert!(positive > 0.0 && negative > 0.0);
    assert_relative_eq!(positive + negative, 1.0, epsilon = 1e-6);
}

#[test]
fn sources_smaller_than_the_tolerance_are_rejected() {
    let tiny = unit_cube().scale(1e-7, 1e-7, 1e-7);
    let result = csgsplit::split(SplitRequest::axis(&tiny, Point3::origin(), Axis::Z, SideSelector::Both));
    assert!(matches!(result.status, Outcome::Failed(SplitError::InvalidInput(_))));
    assert!(result.positive.is_none() && result.negative.is_none());

    // well above the tolerance the same shape splits normally
    let small = unit_cube().scale(1e-3, 1e-3, 1e-3);
    let result = csgsplit::split(SplitRequest::axis(&small, Point3::origin(), Axis::Z, SideSelector::Both));
    let pieces = result.into_result().expect("split");
    assert_relative_eq!(pieces.positive.expect("top").volume(), 0.5e-9, epsilon = 1e-15);
    assert_relative_eq!(pieces.negative.expect("bottom").volume(), 0.5e-9, epsilon = 1e-15);
}
