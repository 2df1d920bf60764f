//! Flight context
//!
//! [`FlightController`] wires one aircraft to its manual pilot, the PID
//! autopilot and an optional waypoint mission. Each tick it:
//!
//! 1. Runs the quadcopter tick with the autopilot as the only override
//!    candidate.
//! 2. Handles the pilot's autopilot toggle edge.
//! 3. Stands the autopilot down if the quadcopter detached it or left
//!    Flying.
//! 4. Delivers queued autopilot events to the mission.

use crate::autopilot::{AutopilotObserver, PidAutopilot, PidProfiles, TranslationStyle};
use crate::events::SubscriberId;
use crate::mission::{Mission, WaypointMission};
use crate::navigation::{Waypoint, WaypointId};
use crate::parameters::{NavigatorParams, ParameterStore, PidProfileParams};
use crate::quad::{AircraftDriver, ControlSource, FlightStatus, Quadcopter, SourceId, TickReport};
use crate::{log_info, log_warn};

/// Source id the autopilot registers its override under
pub const AUTOPILOT_SOURCE: SourceId = SourceId(1);
/// Abort listener id of the autopilot
pub const AUTOPILOT_SUBSCRIBER: SubscriberId = SubscriberId(1);
/// Event listener id of the mission
pub const MISSION_SUBSCRIBER: SubscriberId = SubscriberId(2);
/// Waypoint id used for the home point
pub const HOME_WAYPOINT: WaypointId = WaypointId(u16::MAX);

/// One aircraft and everything that can command it
pub struct FlightController<D: AircraftDriver, I: ControlSource> {
    quad: Quadcopter<D>,
    input: I,
    autopilot: PidAutopilot,
    mission: Option<WaypointMission>,
    /// Toggle trigger state last tick
    toggle_held: bool,
}

impl<D: AircraftDriver, I: ControlSource> FlightController<D, I> {
    pub fn new(driver: D, input: I, params: &NavigatorParams, profiles: PidProfiles) -> Self {
        let mut quad = Quadcopter::new(driver);
        quad.set_headless(params.headless);
        quad.set_track_jump_limit(params.track_jump);

        let mut autopilot = PidAutopilot::new(
            AUTOPILOT_SOURCE,
            AUTOPILOT_SUBSCRIBER,
            params.to_config(),
            profiles,
        );
        autopilot.set_translation_style(params.style);

        Self {
            quad,
            input,
            autopilot,
            mission: None,
            toggle_held: false,
        }
    }

    /// Build from navigator and gain parameters in `store`.
    pub fn from_store(driver: D, input: I, store: &ParameterStore) -> Self {
        let params = NavigatorParams::from_store(store);
        let profiles = PidProfileParams::from_store(store).to_profiles();
        Self::new(driver, input, &params, profiles)
    }

    /// Re-read parameters into the running controller.
    ///
    /// Gains take effect on the next activation or style switch; the active
    /// style's controllers are rebuilt immediately.
    pub fn apply_params(&mut self, store: &ParameterStore) {
        let params = NavigatorParams::from_store(store);
        let profiles = PidProfileParams::from_store(store).to_profiles();

        self.quad.set_headless(params.headless);
        self.quad.set_track_jump_limit(params.track_jump);
        self.autopilot.set_config(params.to_config());
        for style in TranslationStyle::ALL {
            if self.autopilot.profiles().get(style) != profiles.get(style) {
                self.autopilot.set_profile_gains(style, profiles.get(style));
            }
        }
        if self.autopilot.style() != params.style {
            self.autopilot.set_translation_style(params.style);
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn status(&self) -> FlightStatus {
        self.quad.status()
    }

    pub fn quad(&self) -> &Quadcopter<D> {
        &self.quad
    }

    pub fn quad_mut(&mut self) -> &mut Quadcopter<D> {
        &mut self.quad
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn autopilot(&self) -> &PidAutopilot {
        &self.autopilot
    }

    pub fn mission(&self) -> Option<&WaypointMission> {
        self.mission.as_ref()
    }

    // ========================================================================
    // Commands
    // ========================================================================

    pub fn prime_props(&mut self) -> bool {
        self.quad.prime_props()
    }

    pub fn take_off(&mut self) -> bool {
        self.quad.take_off()
    }

    pub fn land(&mut self) -> bool {
        self.quad.land()
    }

    pub fn set_headless(&mut self, headless: bool) {
        self.quad.set_headless(headless);
    }

    pub fn set_translation_style(&mut self, style: TranslationStyle) {
        self.autopilot.set_translation_style(style);
    }

    /// Hand control to the autopilot and begin the loaded mission.
    pub fn activate_autopilot(&mut self) -> bool {
        if self.quad.status() != FlightStatus::Flying {
            log_warn!("autopilot activation ignored in {}", self.quad.status());
            return false;
        }
        if !self.quad.is_tracking() {
            log_warn!("autopilot activation ignored: no tracking");
            return false;
        }
        if !self.autopilot.activate(&self.quad.view(0.0)) {
            return false;
        }
        self.quad
            .override_source(AUTOPILOT_SOURCE, AUTOPILOT_SUBSCRIBER);
        if let Some(mission) = self.mission.as_mut() {
            mission.begin(&mut self.autopilot);
        }
        true
    }

    /// Return control to the pilot. A running mission is stopped.
    pub fn deactivate_autopilot(&mut self) -> bool {
        if !self.autopilot.is_active() {
            return false;
        }
        if let Some(mission) = self.mission.as_mut() {
            mission.end(&mut self.autopilot);
        }
        self.quad
            .remove_override(AUTOPILOT_SOURCE, AUTOPILOT_SUBSCRIBER);
        self.autopilot.deactivate();
        self.dispatch_events();
        true
    }

    /// Send the autopilot to `waypoint`. A running mission treats this as
    /// interference and ends.
    pub fn set_target(&mut self, waypoint: Waypoint) -> bool {
        if !self.autopilot.is_active() {
            log_warn!("set target {} ignored: autopilot inactive", waypoint.id);
            return false;
        }
        self.autopilot.set_target(waypoint);
        self.dispatch_events();
        true
    }

    /// Fly back to where the aircraft finished launching.
    ///
    /// Activates the autopilot if needed. A running mission is stopped
    /// first.
    pub fn return_home(&mut self) -> bool {
        let Some(home) = self.quad.home() else {
            log_warn!("return home ignored: no home point");
            return false;
        };
        if !self.autopilot.is_active() && !self.activate_autopilot() {
            return false;
        }
        if let Some(mission) = self.mission.as_mut() {
            mission.end(&mut self.autopilot);
        }
        log_info!("returning home");
        self.autopilot.set_target(Waypoint {
            id: HOME_WAYPOINT,
            pose: home.level(),
        });
        true
    }

    /// Replace the mission. It begins immediately if the autopilot is
    /// active, otherwise on the next activation.
    pub fn load_mission(&mut self, mission: Mission) {
        if let Some(previous) = self.mission.as_mut() {
            previous.end(&mut self.autopilot);
        }
        let mut run = WaypointMission::new(MISSION_SUBSCRIBER, mission);
        if self.autopilot.is_active() {
            run.begin(&mut self.autopilot);
        }
        self.mission = Some(run);
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Run one control tick of `dt_s` seconds.
    pub fn tick(&mut self, dt_s: f32) -> TickReport {
        let report = self
            .quad
            .tick(dt_s, &mut self.input, &mut [&mut self.autopilot]);

        let toggle = report.manual.toggle_autopilot();
        if toggle && !self.toggle_held {
            if self.autopilot.is_active() {
                self.deactivate_autopilot();
            } else {
                self.activate_autopilot();
            }
        }
        self.toggle_held = toggle;

        if self.autopilot.is_active()
            && (!self.quad.has_override(AUTOPILOT_SOURCE) || self.quad.status() != FlightStatus::Flying)
        {
            log_info!("autopilot stood down in {}", self.quad.status());
            self.quad
                .remove_override(AUTOPILOT_SOURCE, AUTOPILOT_SUBSCRIBER);
            self.autopilot.deactivate();
        }

        self.dispatch_events();
        report
    }

    fn dispatch_events(&mut self) {
        match self.mission.as_mut() {
            Some(mission) => {
                let observer: &mut dyn AutopilotObserver = mission;
                self.autopilot.dispatch(&mut [observer]);
            }
            None => {
                self.autopilot.clear_events();
            }
        }
    }
}
