//! Scripted manual pilot for unattended runs.
//!
//! A script is a queue of steps, each holding one command vector for a
//! duration. Trigger flags in a step fire on its first tick only, so a
//! press reads as a single edge however long the step lasts.

use std::collections::VecDeque;

use quadpilot_core::control::{ControlVector, Triggers};
use quadpilot_core::quad::{AircraftView, ControlSource, SourceId};

/// Source id of the manual pilot
pub const PILOT_SOURCE: SourceId = SourceId(0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptStep {
    pub duration_s: f32,
    pub command: ControlVector,
}

/// Replays a fixed sequence of pilot inputs, then stays neutral.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPilot {
    steps: VecDeque<ScriptStep>,
    elapsed_s: f32,
    fired: bool,
}

impl ScriptedPilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold `command` for `duration_s` seconds.
    pub fn hold(mut self, duration_s: f32, command: ControlVector) -> Self {
        self.push(ScriptStep {
            duration_s,
            command,
        });
        self
    }

    /// Neutral sticks for `duration_s` seconds.
    pub fn wait(self, duration_s: f32) -> Self {
        self.hold(duration_s, ControlVector::neutral())
    }

    /// Press `triggers` for a single tick.
    pub fn press(self, triggers: Triggers) -> Self {
        self.hold(0.0, ControlVector::neutral().with_triggers(triggers))
    }

    pub fn push(&mut self, step: ScriptStep) {
        self.steps.push_back(step);
    }

    pub fn remaining(&self) -> usize {
        self.steps.len()
    }

    pub fn is_finished(&self) -> bool {
        self.steps.is_empty()
    }
}

impl ControlSource for ScriptedPilot {
    fn source_id(&self) -> SourceId {
        PILOT_SOURCE
    }

    fn read(&mut self, view: &AircraftView) -> ControlVector {
        let Some(step) = self.steps.front().copied() else {
            return ControlVector::neutral();
        };

        let command = if self.fired {
            step.command.without_triggers()
        } else {
            step.command
        };
        self.fired = true;
        self.elapsed_s += view.dt_s;

        if self.elapsed_s >= step.duration_s {
            self.steps.pop_front();
            self.elapsed_s = 0.0;
            self.fired = false;
        }
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadpilot_core::navigation::Pose;
    use quadpilot_core::quad::FlightStatus;

    fn view(dt_s: f32) -> AircraftView {
        AircraftView {
            pose: Pose::origin(),
            simulated: true,
            tracking: true,
            status: FlightStatus::PreLaunch,
            dt_s,
        }
    }

    #[test]
    fn test_empty_script_is_neutral() {
        let mut pilot = ScriptedPilot::new();
        assert_eq!(pilot.read(&view(0.1)), ControlVector::neutral());
        assert!(pilot.is_finished());
    }

    #[test]
    fn test_press_lasts_one_tick() {
        let mut pilot = ScriptedPilot::new().press(Triggers::TAKE_OFF).wait(1.0);
        assert!(pilot.read(&view(0.1)).take_off());
        assert!(!pilot.read(&view(0.1)).take_off());
        assert_eq!(pilot.remaining(), 1);
    }

    #[test]
    fn test_hold_spans_duration() {
        let forward = ControlVector::new(0.0, 0.5, 0.0, 0.0);
        let mut pilot = ScriptedPilot::new().hold(0.3, forward);
        let dt = 0.125;
        assert_eq!(pilot.read(&view(dt)).pitch, 0.5);
        assert_eq!(pilot.read(&view(dt)).pitch, 0.5);
        assert_eq!(pilot.read(&view(dt)).pitch, 0.5);
        assert!(pilot.is_finished());
        assert_eq!(pilot.read(&view(dt)).pitch, 0.0);
    }

    #[test]
    fn test_triggers_stripped_after_first_tick_of_long_step() {
        let command = ControlVector::new(0.2, 0.0, 0.0, 0.0).with_triggers(Triggers::LAND);
        let mut pilot = ScriptedPilot::new().hold(1.0, command);
        let first = pilot.read(&view(0.25));
        let second = pilot.read(&view(0.25));
        assert!(first.land());
        assert!(!second.land());
        assert_eq!(second.yaw, 0.2);
    }

    #[test]
    fn test_source_id() {
        assert_eq!(ScriptedPilot::new().source_id(), PILOT_SOURCE);
    }
}
