//! Waypoint mission sequencer
//!
//! Walks a [`Mission`] through one autopilot. It sets each waypoint as the
//! autopilot target and listens for arrival and target-change events:
//!
//! - Arrival at the current waypoint moves to the next one, wrapping to the
//!   first when looping and completing otherwise.
//! - A target change the mission did not make (an operator retarget, or the
//!   autopilot being deactivated) ends the mission as interrupted.

use super::state::MissionState;
use super::Mission;
use crate::autopilot::{AutopilotEvent, AutopilotObserver, EventKind, PidAutopilot};
use crate::events::SubscriberId;
use crate::navigation::Waypoint;
use crate::{log_debug, log_info, log_warn};

/// Which waypoint the mission is flying to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Leg {
    /// The mission's designated start waypoint
    Start,
    /// Index into the waypoint list
    Index(usize),
}

/// Runs a mission against an autopilot
pub struct WaypointMission {
    id: SubscriberId,
    mission: Mission,
    state: MissionState,
    leg: Option<Leg>,
    /// Target this mission last set
    expected: Option<Waypoint>,
    laps: u32,
}

impl WaypointMission {
    pub fn new(id: SubscriberId, mission: Mission) -> Self {
        Self {
            id,
            mission,
            state: MissionState::Idle,
            leg: None,
            expected: None,
            laps: 0,
        }
    }

    pub fn state(&self) -> MissionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn mission(&self) -> &Mission {
        &self.mission
    }

    /// Current leg, if running or last flown.
    pub fn leg(&self) -> Option<Leg> {
        self.leg
    }

    /// Completed passes through the list of a looping mission.
    pub fn laps(&self) -> u32 {
        self.laps
    }

    /// Subscribe to the autopilot and fly to the first waypoint.
    ///
    /// An empty mission is a no-op.
    pub fn begin(&mut self, autopilot: &mut PidAutopilot) -> bool {
        if self.mission.is_empty() {
            log_debug!("empty mission, nothing to begin");
            return false;
        }
        if self.is_running() {
            log_warn!("mission already running");
            return false;
        }
        if !autopilot.is_active() {
            log_warn!("mission not started: autopilot inactive");
            return false;
        }

        let _ = autopilot.subscribe(EventKind::Arrival, self.id);
        let _ = autopilot.subscribe(EventKind::TargetChanged, self.id);
        self.state = MissionState::Running;
        self.laps = 0;
        log_info!("mission started ({} waypoints)", self.mission.len());

        match self.mission.start() {
            Some(start) => self.fly(Leg::Start, start, autopilot),
            None => {
                let first = self.mission.waypoints()[0];
                self.fly(Leg::Index(0), first, autopilot);
            }
        }
        true
    }

    /// Stop the mission and unsubscribe. Safe to call repeatedly.
    pub fn end(&mut self, autopilot: &mut PidAutopilot) {
        self.finish(MissionState::Idle, autopilot);
    }

    fn finish(&mut self, state: MissionState, autopilot: &mut PidAutopilot) {
        if !self.is_running() {
            return;
        }
        let _ = autopilot.unsubscribe(EventKind::Arrival, self.id);
        let _ = autopilot.unsubscribe(EventKind::TargetChanged, self.id);
        self.state = state;
        self.expected = None;
        log_info!("mission ended: {:?}", state);
    }

    fn fly(&mut self, leg: Leg, waypoint: Waypoint, autopilot: &mut PidAutopilot) {
        self.leg = Some(leg);
        self.expected = Some(waypoint);
        autopilot.set_target(waypoint);
    }

    fn on_arrival(&mut self, reached: &Waypoint, autopilot: &mut PidAutopilot) {
        if self.expected != Some(*reached) {
            log_debug!("arrival at {} is not the mission target", reached.id);
            return;
        }

        let mut next = match self.leg {
            Some(Leg::Index(i)) => i + 1,
            Some(Leg::Start) | None => 0,
        };
        if next >= self.mission.len() {
            if !self.mission.is_looping() {
                self.finish(MissionState::Completed, autopilot);
                if self.mission.lands_on_complete() {
                    autopilot.request_land();
                }
                return;
            }
            self.laps += 1;
            next = 0;
        }

        let waypoint = self.mission.waypoints()[next];
        self.fly(Leg::Index(next), waypoint, autopilot);
    }

    fn on_target_changed(&mut self, target: Option<Waypoint>, autopilot: &mut PidAutopilot) {
        if target.is_some() && (target == self.expected || target == self.mission.start()) {
            return;
        }
        match target {
            Some(wp) => log_warn!("autopilot retargeted to {} outside the mission", wp.id),
            None => log_warn!("autopilot target cleared during mission"),
        }
        self.finish(MissionState::Interrupted, autopilot);
    }
}

impl AutopilotObserver for WaypointMission {
    fn subscriber_id(&self) -> SubscriberId {
        self.id
    }

    fn on_event(&mut self, event: &AutopilotEvent, autopilot: &mut PidAutopilot) {
        if !self.is_running() {
            return;
        }
        match event {
            AutopilotEvent::Arrived(wp) => self.on_arrival(wp, autopilot),
            AutopilotEvent::TargetChanged(target) => self.on_target_changed(*target, autopilot),
        }
    }
}
