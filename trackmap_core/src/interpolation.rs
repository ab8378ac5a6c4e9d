//! Scalar interpolation primitives used by the scheduler.
//!
//! Headings are in degrees; angular interpolation always takes the shortest
//! path around the circle so a car crossing the 0/360 seam never spins the
//! long way round.

/// Linear interpolation: `lerp(a, b, 0) == a`, `lerp(a, b, 1) == b`.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Shortest-path angular interpolation in degrees.
///
/// The signed difference is folded into `[-180, 180)` before scaling, so
/// interpolating 350° toward 10° passes through 360°, not 180°. The result
/// is not re-normalized into `[0, 360)`; it projects identically either way.
#[inline]
pub fn lerp_angle(current: f64, target: f64, t: f64) -> f64 {
    let diff = (target - current + 180.0).rem_euclid(360.0) - 180.0;
    current + diff * t
}
