// Re-export parry for the appropriate float size
#[cfg(feature = "f64")]
pub use parry3d_f64 as parry3d;

#[cfg(feature = "f32")]
pub use parry3d;

// Our Real scalar type:
#[cfg(feature = "f32")]
pub type Real = f32;
#[cfg(feature = "f64")]
pub type Real = f64;

use core::str::FromStr;
use std::sync::OnceLock;

/// Lazily-initialized tolerance used across the crate for point/plane
/// classification and coincidence tests.
/// Defaults depend on precision (`f32` vs `f64`), but can be overridden:
///  1) **Build-time**: set env var `CSGSPLIT_TOLERANCE` (e.g. `CSGSPLIT_TOLERANCE=1e-7 cargo build`)
///  2) **Runtime**: call [`set_tolerance`] once before using the library
///
/// The tolerance is absolute. Points closer than it to a plane count as lying
/// on the plane, so meshes whose bounding-box diagonal is not larger than the
/// tolerance cannot be split and are rejected by the split engine; lower the
/// tolerance to work at that scale.
static TOLERANCE_CELL: OnceLock<Real> = OnceLock::new();

#[inline]
const fn default_tolerance() -> Real {
    #[cfg(feature = "f32")]
    {
        1e-4
    }
    #[cfg(feature = "f64")]
    {
        1e-6
    }
}

/// Returns the current tolerance.
/// If not set yet, it tries `CSGSPLIT_TOLERANCE` (parsed as the active `Real`) and
/// falls back to a sensible default.
pub fn tolerance() -> Real {
    *TOLERANCE_CELL.get_or_init(|| {
        if let Some(environment_variable) = option_env!("CSGSPLIT_TOLERANCE") {
            if let Ok(value) = Real::from_str(environment_variable) {
                return value.max(Real::EPSILON);
            }
        }
        default_tolerance()
    })
}

/// Set the tolerance programmatically once (subsequent calls are ignored).
/// Returns `false` if a tolerance was already in effect.
///
/// Call near program start: `csgsplit::float_types::set_tolerance(1e-7);`
pub fn set_tolerance(value: Real) -> bool {
    TOLERANCE_CELL.set(value.max(Real::EPSILON)).is_ok()
}

// Pi
/// Archimedes' constant (π)
#[cfg(feature = "f32")]
pub const PI: Real = core::f32::consts::PI;
/// Archimedes' constant (π)
#[cfg(feature = "f64")]
pub const PI: Real = core::f64::consts::PI;

// Frac Pi 2
/// π/2
#[cfg(feature = "f32")]
pub const FRAC_PI_2: Real = core::f32::consts::FRAC_PI_2;
/// π/2
#[cfg(feature = "f64")]
pub const FRAC_PI_2: Real = core::f64::consts::FRAC_PI_2;
