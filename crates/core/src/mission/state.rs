//! Mission execution state

/// Where a waypoint mission stands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MissionState {
    /// Not started, or stopped by its owner
    #[default]
    Idle,
    /// Feeding waypoints to the autopilot
    Running,
    /// Reached the last waypoint of a non-looping mission
    Completed,
    /// Ended because something else retargeted or deactivated the autopilot
    Interrupted,
}

impl MissionState {
    pub fn is_running(self) -> bool {
        self == MissionState::Running
    }
}
