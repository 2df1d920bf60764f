//! Angle helpers

/// Wrap an angle in degrees into the half-open interval `(-180, 180]`.
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % 360.0;
    if a > 180.0 {
        a -= 360.0;
    } else if a <= -180.0 {
        a += 360.0;
    }
    a
}

/// Signed yaw error from `reference` to `actual`, in `(-180, 180]`.
///
/// Positive when the aircraft is rotated clockwise of the reference.
pub fn yaw_error(actual_deg: f32, reference_deg: f32) -> f32 {
    normalize_angle(actual_deg - reference_deg)
}
