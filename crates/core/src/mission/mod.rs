//! Waypoint missions
//!
//! A [`Mission`] is an ordered list of waypoints with a loop flag, an
//! optional start waypoint flown before the first list entry, and an option
//! to land once the last waypoint is reached. [`WaypointMission`] feeds a
//! mission to the autopilot one waypoint at a time.
//!
//! Duplicates are allowed; order is flight order.

pub mod sequencer;
pub mod state;

use core::fmt;

use heapless::Vec;

use crate::navigation::Waypoint;

pub use sequencer::WaypointMission;
pub use state::MissionState;

/// Maximum number of waypoints in a mission
pub const MAX_WAYPOINTS: usize = 50;

/// Errors from building a mission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionError {
    /// No room for another waypoint
    Full,
}

impl fmt::Display for MissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissionError::Full => write!(f, "mission full (max {} waypoints)", MAX_WAYPOINTS),
        }
    }
}

/// Ordered waypoint plan
#[derive(Debug, Clone, Default)]
pub struct Mission {
    waypoints: Vec<Waypoint, MAX_WAYPOINTS>,
    looping: bool,
    start: Option<Waypoint>,
    land_on_complete: bool,
}

impl Mission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_waypoints(waypoints: &[Waypoint]) -> Result<Self, MissionError> {
        let mut mission = Self::new();
        for wp in waypoints {
            mission.push(*wp)?;
        }
        Ok(mission)
    }

    pub fn push(&mut self, waypoint: Waypoint) -> Result<(), MissionError> {
        self.waypoints.push(waypoint).map_err(|_| MissionError::Full)
    }

    pub fn clear(&mut self) {
        self.waypoints.clear();
    }

    pub fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Fly to `start` before the first waypoint. Looping wraps to the first
    /// list entry, not to the start waypoint.
    pub fn set_start(&mut self, start: Option<Waypoint>) {
        self.start = start;
    }

    pub fn start(&self) -> Option<Waypoint> {
        self.start
    }

    pub fn set_land_on_complete(&mut self, land: bool) {
        self.land_on_complete = land;
    }

    pub fn lands_on_complete(&self) -> bool {
        self.land_on_complete
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn get(&self, index: usize) -> Option<&Waypoint> {
        self.waypoints.get(index)
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}
