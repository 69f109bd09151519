// main.rs
//
// Demo of the host command surface: split a box in half along an axis and
// with a tilted guide, then write the pieces out as STL.
//
// Usage: csgsplit [X|Y|Z]   (default Z)

use csgsplit::split::{Axis, Guide, ObjectId, SideSelector, SplitEngine, SplitResult};
use csgsplit::{CSGOps, Mesh};
use nalgebra::Point3;

// No shared data, so bind the generic S to ()
type Solid = Mesh<()>;

fn report(label: &str, result: &SplitResult<()>) {
    println!("{label}: {}", result.message());
    for (side, piece) in [("positive", &result.positive), ("negative", &result.negative)] {
        if let Some(mesh) = piece {
            println!("  {side}: {} polygons, volume {:.4}", mesh.polygons.len(), mesh.volume());
        }
    }
}

#[cfg(feature = "stl-io")]
fn write_pieces(prefix: &str, result: &SplitResult<()>) {
    if let Err(e) = std::fs::create_dir_all("stl") {
        eprintln!("cannot create stl/: {e}");
        return;
    }
    for (side, piece) in [("positive", &result.positive), ("negative", &result.negative)] {
        if let Some(mesh) = piece {
            let name = format!("{prefix}_{side}");
            if let Err(e) = std::fs::write(format!("stl/{name}.stl"), mesh.to_stl_ascii(&name)) {
                eprintln!("cannot write {name}.stl: {e}");
            }
        }
    }
}

#[cfg(not(feature = "stl-io"))]
fn write_pieces(_prefix: &str, _result: &SplitResult<()>) {}

fn main() {
    let axis = match std::env::args().nth(1).map(|arg| arg.parse::<Axis>()) {
        None => Axis::default(),
        Some(Ok(axis)) => axis,
        Some(Err(e)) => {
            eprintln!("{e}");
            std::process::exit(2);
        },
    };

    let engine = SplitEngine::new();
    let block: Solid = Mesh::cuboid(4.0, 2.0, 1.0, None).center();
    println!("source volume {:.4}", block.volume());

    // "Split in Half"
    let halves = engine.split_in_half(&block, axis, SideSelector::Both);
    report(&format!("split in half along {axis}"), &halves);
    write_pieces(&format!("half_{axis}"), &halves);

    // "Create Guide" at the 3D cursor, user tilts it, then "Split by Guide"
    let block_id = ObjectId(1);
    let mut guide = Guide::create(ObjectId(2), Point3::new(0.5, 0.0, 0.0));
    guide.set_rotation_euler(0.0, 0.6, 0.3);
    let by_guide = engine.split_by_guide(&block, block_id, Some(guide), SideSelector::Both);
    report("split by guide", &by_guide);
    write_pieces("guide", &by_guide);

    // The guide cannot be used to cut itself
    let guide = Guide::create(block_id, Point3::origin());
    let refused = engine.split_by_guide(&block, block_id, Some(guide), SideSelector::Both);
    report("split guide by itself", &refused);
}
