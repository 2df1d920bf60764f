//! Headless (field-relative) command conversion
//!
//! In headless mode roll and pitch describe a desired displacement in the
//! field: roll along +x, pitch along +z, independent of where the nose
//! points. [`to_headless`] projects that displacement onto the aircraft's
//! current right and forward axes so the aircraft flies the intended field
//! direction whatever its heading.

use nalgebra::Vector3;

use super::pose::Pose;
use crate::control::ControlVector;

/// Convert a field-relative command into the aircraft's local frame.
///
/// Yaw, throttle, speed and triggers pass through unchanged. A zero
/// displacement stays zero.
pub fn to_headless(command: &ControlVector, pose: &Pose) -> ControlVector {
    let direction = Vector3::new(command.roll, 0.0, command.pitch);
    if direction.x == 0.0 && direction.z == 0.0 {
        return ControlVector {
            roll: 0.0,
            pitch: 0.0,
            ..*command
        };
    }

    let right = pose.right();
    let forward = pose.forward();

    ControlVector {
        roll: projected(&direction, &right),
        pitch: projected(&direction, &forward),
        ..*command
    }
}

/// Magnitude of `direction` projected onto `axis`, signed by which way it
/// points along the axis.
fn projected(direction: &Vector3<f32>, axis: &Vector3<f32>) -> f32 {
    let along = direction.dot(axis);
    let len_sq = axis.norm_squared();
    if len_sq == 0.0 {
        return 0.0;
    }
    let projection = axis * (along / len_sq);
    let magnitude = projection.norm();
    if along < 0.0 {
        -magnitude
    } else {
        magnitude
    }
}
