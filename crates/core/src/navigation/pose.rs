//! Field-relative pose and waypoint types
//!
//! The field frame is x right (east), y up, z forward (north). Yaw rotates
//! about +y and is measured in degrees clockwise from +z when seen from
//! above, so a yaw of 90 faces +x.

use core::fmt;

use nalgebra::{UnitQuaternion, Vector3};

/// Position and orientation in the field frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vector3<f32>,
    pub orientation: UnitQuaternion<f32>,
}

impl Pose {
    /// Pose with a level attitude and the given yaw in degrees.
    pub fn new(position: Vector3<f32>, yaw_deg: f32) -> Self {
        Self::from_euler_deg(position, yaw_deg, 0.0, 0.0)
    }

    /// Pose from yaw, pitch and roll in degrees, applied yaw first.
    pub fn from_euler_deg(position: Vector3<f32>, yaw_deg: f32, pitch_deg: f32, roll_deg: f32) -> Self {
        let yaw = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw_deg.to_radians());
        let pitch = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), pitch_deg.to_radians());
        let roll = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), roll_deg.to_radians());
        Self {
            position,
            orientation: yaw * pitch * roll,
        }
    }

    /// Level pose at the origin facing +z.
    pub fn origin() -> Self {
        Self::new(Vector3::zeros(), 0.0)
    }

    /// Unit vector the aircraft's nose points along.
    pub fn forward(&self) -> Vector3<f32> {
        self.orientation * Vector3::z()
    }

    /// Unit vector out of the aircraft's right side.
    pub fn right(&self) -> Vector3<f32> {
        self.orientation * Vector3::x()
    }

    /// Heading in degrees, in `[0, 360)`.
    pub fn yaw_deg(&self) -> f32 {
        let f = self.forward();
        let yaw = libm::atan2f(f.x, f.z).to_degrees();
        if yaw < 0.0 {
            yaw + 360.0
        } else {
            yaw
        }
    }

    /// Same position, level attitude, same heading.
    pub fn level(&self) -> Self {
        Self::new(self.position, self.yaw_deg())
    }

    /// Same position, heading replaced.
    pub fn with_yaw(&self, yaw_deg: f32) -> Self {
        Self::new(self.position, yaw_deg)
    }

    pub fn distance_to(&self, other: &Pose) -> f32 {
        (self.position - other.position).norm()
    }

    /// True when every position and orientation component is finite.
    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|v| v.is_finite())
            && self.orientation.coords.iter().all(|v| v.is_finite())
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::origin()
    }
}

/// Identity of a waypoint
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WaypointId(pub u16);

impl fmt::Display for WaypointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WP{}", self.0)
    }
}

/// A target pose with an identity
///
/// Two waypoints are equal only when both the id and the pose match, so a
/// re-target that reuses an id with a moved pose is still seen as a change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Waypoint {
    pub id: WaypointId,
    pub pose: Pose,
}

impl Waypoint {
    pub fn new(id: u16, position: Vector3<f32>, yaw_deg: f32) -> Self {
        Self {
            id: WaypointId(id),
            pose: Pose::new(position, yaw_deg),
        }
    }

    pub fn position(&self) -> Vector3<f32> {
        self.pose.position
    }
}
