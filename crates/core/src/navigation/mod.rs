//! Navigation geometry
//!
//! Field-frame poses and waypoints, the headless command conversion and
//! angle wrapping used by the autopilot.

mod angle;
mod headless;
mod pose;

pub use angle::{normalize_angle, yaw_error};
pub use headless::to_headless;
pub use pose::{Pose, Waypoint, WaypointId};
