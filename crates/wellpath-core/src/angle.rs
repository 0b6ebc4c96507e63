//! Degree helpers for azimuth and inclination channels.

/// Full turn in degrees.
pub const FULL_TURN: f64 = 360.0;

/// Wrap an angle in degrees into `[0, 360)`.
///
/// NaN passes through unchanged.
pub fn wrap_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(FULL_TURN);
    // rem_euclid rounds tiny negatives up to exactly 360.
    if wrapped >= FULL_TURN { 0.0 } else { wrapped }
}
