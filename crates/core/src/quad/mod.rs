//! Quadcopter command arbitration
//!
//! [`Quadcopter`] owns the aircraft driver and the flight status machine. It
//! decides each tick whether the default source or the active override source
//! commands the aircraft, and broadcasts aborts to override sources.
//!
//! # Tick order
//!
//! 1. Drain telemetry, validate the pose and advance driver-confirmed
//!    transitions (Launching to Flying, Landing to PreLaunch).
//! 2. Poll the default source.
//! 3. Evaluate abort (lost tracking, or default-source input while an
//!    override is active).
//! 4. Compute the effective command.
//! 5. Apply take-off and land edges, then send the command.

mod driver;
mod source;
mod status;

pub use driver::{AircraftDriver, DriverError};
pub use source::{
    AbortReason, AbortResponse, AircraftView, ControlSource, OverrideSource, SourceId,
};
pub use status::FlightStatus;

use crate::control::{ControlVector, Triggers};
use crate::events::{SubscriberId, Subscribers, SubscriptionError};
use crate::navigation::{to_headless, Pose};
use crate::{log_debug, log_info, log_warn};

/// Maximum number of abort listeners
pub const MAX_ABORT_SUBSCRIBERS: usize = 4;

/// Default per-axis pose jump that counts as lost tracking
pub const DEFAULT_TRACK_JUMP_LIMIT: f32 = 2.0;

/// Registered override source
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OverrideSlot {
    source: SourceId,
    abort: SubscriberId,
}

/// Outcome of one tick
#[derive(Clone, Copy, Debug)]
pub struct TickReport {
    /// Status after the tick
    pub status: FlightStatus,
    /// Raw output of the default source this tick
    pub manual: ControlVector,
    /// Command that was in effect this tick
    pub command: ControlVector,
    /// Whether the command came from the override source
    pub overridden: bool,
    /// Whether new telemetry was applied
    pub telemetry_updated: bool,
    /// Whether the pose was trustworthy this tick
    pub tracking: bool,
    /// Abort broadcast this tick, if any
    pub abort: Option<AbortReason>,
    /// Whether an override had to be detached without releasing itself
    pub forced_detach: bool,
}

/// Flight status machine and source arbiter for one aircraft
pub struct Quadcopter<D: AircraftDriver> {
    driver: D,
    status: FlightStatus,
    headless: bool,
    override_slot: Option<OverrideSlot>,
    abort_subscribers: Subscribers<MAX_ABORT_SUBSCRIBERS>,
    /// Last accepted pose
    pose: Pose,
    tracking: bool,
    track_jump_limit: f32,
    home: Option<Pose>,
    /// Triggers seen last tick, for edge detection
    last_triggers: Triggers,
}

impl<D: AircraftDriver> Quadcopter<D> {
    pub fn new(driver: D) -> Self {
        let pose = driver.pose().unwrap_or_default();
        Self {
            driver,
            status: FlightStatus::PreLaunch,
            headless: false,
            override_slot: None,
            abort_subscribers: Subscribers::new(),
            pose,
            tracking: false,
            track_jump_limit: DEFAULT_TRACK_JUMP_LIMIT,
            home: None,
            last_triggers: Triggers::empty(),
        }
    }

    pub fn status(&self) -> FlightStatus {
        self.status
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Last accepted pose.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Pose at which the aircraft last entered Flying.
    pub fn home(&self) -> Option<Pose> {
        self.home
    }

    pub fn headless(&self) -> bool {
        self.headless
    }

    /// Interpret default-source roll and pitch as field-relative.
    pub fn set_headless(&mut self, headless: bool) {
        self.headless = headless;
    }

    pub fn set_track_jump_limit(&mut self, limit: f32) {
        self.track_jump_limit = limit;
    }

    /// Snapshot handed to command sources.
    pub fn view(&self, dt_s: f32) -> AircraftView {
        AircraftView {
            pose: self.pose,
            simulated: self.driver.is_simulated(),
            tracking: self.tracking,
            status: self.status,
            dt_s,
        }
    }

    // ========================================================================
    // Override registration
    // ========================================================================

    /// Make `source` the override, replacing any previous one.
    ///
    /// The previous override's abort handler is unsubscribed and `abort` is
    /// subscribed in its place.
    pub fn override_source(&mut self, source: SourceId, abort: SubscriberId) {
        if let Some(previous) = self.override_slot.take() {
            if previous.abort != abort {
                let _ = self.abort_subscribers.unsubscribe(previous.abort);
            }
            log_debug!("override {} replaced by {}", previous.source, source);
        }
        self.override_slot = Some(OverrideSlot { source, abort });
        if let Err(e) = self.abort_subscribers.subscribe(abort) {
            if e != SubscriptionError::AlreadySubscribed {
                log_warn!("abort subscribe for {} failed: {}", abort, e);
            }
        }
        log_info!("override active: {}", source);
    }

    /// Clear the override if `source` is the registered one.
    ///
    /// A non-matching `source` is a stale caller and is ignored.
    pub fn remove_override(&mut self, source: SourceId, abort: SubscriberId) {
        match self.override_slot {
            Some(slot) if slot.source == source => {
                self.override_slot = None;
                if let Err(e) = self.unsubscribe_abort(abort) {
                    log_debug!("override {} removed without abort handler: {}", source, e);
                }
                log_info!("override removed: {}", source);
            }
            _ => {}
        }
    }

    pub fn active_override(&self) -> Option<SourceId> {
        self.override_slot.map(|slot| slot.source)
    }

    pub fn has_override(&self, source: SourceId) -> bool {
        self.active_override() == Some(source)
    }

    pub fn subscribe_abort(&mut self, id: SubscriberId) -> Result<(), SubscriptionError> {
        self.abort_subscribers.subscribe(id).map_err(|e| {
            log_warn!("abort subscribe {}: {}", id, e);
            e
        })
    }

    pub fn unsubscribe_abort(&mut self, id: SubscriberId) -> Result<(), SubscriptionError> {
        self.abort_subscribers.unsubscribe(id).map_err(|e| {
            log_warn!("abort unsubscribe {}: {}", id, e);
            e
        })
    }

    pub fn is_abort_subscribed(&self, id: SubscriberId) -> bool {
        self.abort_subscribers.contains(id)
    }

    // ========================================================================
    // Lifecycle commands
    // ========================================================================

    /// Spin the motors up on the ground.
    pub fn prime_props(&mut self) -> bool {
        if self.status != FlightStatus::PreLaunch {
            log_warn!("prime props ignored in {}", self.status);
            return false;
        }
        match self.driver.start_motors() {
            Ok(()) => {
                self.set_status(FlightStatus::PrimingProps);
                true
            }
            Err(e) => {
                log_warn!("prime props failed: {}", e);
                false
            }
        }
    }

    pub fn take_off(&mut self) -> bool {
        if !self.status.can_take_off() {
            log_warn!("take-off ignored in {}", self.status);
            return false;
        }
        match self.driver.take_off() {
            Ok(()) => {
                self.set_status(FlightStatus::Launching);
                true
            }
            Err(e) => {
                log_warn!("take-off failed: {}", e);
                false
            }
        }
    }

    pub fn land(&mut self) -> bool {
        if !self.status.can_land() {
            log_warn!("land ignored in {}", self.status);
            return false;
        }
        match self.driver.land() {
            Ok(()) => {
                self.set_status(FlightStatus::Landing);
                true
            }
            Err(e) => {
                log_warn!("land failed: {}", e);
                false
            }
        }
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Run one control tick.
    ///
    /// `overrides` lists every source that may be registered as the override
    /// or as an abort listener; they are matched by id.
    pub fn tick(
        &mut self,
        dt_s: f32,
        default: &mut dyn ControlSource,
        overrides: &mut [&mut dyn OverrideSource],
    ) -> TickReport {
        let telemetry_updated = self.driver.sync();
        self.tracking = self.refresh_pose();
        self.advance_from_driver();

        let view = self.view(dt_s);
        let manual = default.read(&view);

        let mut abort = None;
        let mut forced_detach = false;

        if !self.tracking && self.status == FlightStatus::Flying && self.override_slot.is_some() {
            forced_detach |= self.broadcast_abort(AbortReason::LostTracking, overrides);
            abort = Some(AbortReason::LostTracking);
        }

        if manual.has_input() && self.override_slot.is_some() {
            forced_detach |= self.broadcast_abort(AbortReason::PilotInput, overrides);
            abort = Some(AbortReason::PilotInput);
        }

        let (command, overridden) = self.effective_command(&view, manual, overrides);

        let edges = command.triggers & !self.last_triggers;
        self.last_triggers = command.triggers;
        if edges.contains(Triggers::TAKE_OFF) {
            if overridden {
                log_warn!("take-off from override source ignored");
            } else {
                self.take_off();
            }
        }
        if edges.contains(Triggers::LAND) {
            self.land();
        }

        match self.status {
            FlightStatus::PreLaunch => {}
            FlightStatus::Flying => self.driver.send(&command.without_triggers(), dt_s),
            _ => self.driver.send(&ControlVector::neutral(), dt_s),
        }

        TickReport {
            status: self.status,
            manual,
            command,
            overridden,
            telemetry_updated,
            tracking: self.tracking,
            abort,
            forced_detach,
        }
    }

    /// Read the driver pose and decide whether it can be trusted.
    ///
    /// A failed read, a non-finite pose or a pose jump while flying keeps
    /// the previous pose.
    fn refresh_pose(&mut self) -> bool {
        let pose = match self.driver.pose() {
            Ok(pose) => pose,
            Err(e) => {
                if self.status == FlightStatus::Flying {
                    log_warn!("telemetry error while flying: {}", e);
                }
                return false;
            }
        };

        if !pose.is_finite() {
            log_warn!("non-finite pose from driver, frame rejected");
            return false;
        }

        if self.status == FlightStatus::Flying {
            let delta = pose.position - self.pose.position;
            let jumped = delta.iter().any(|d| libm::fabsf(*d) > self.track_jump_limit);
            if jumped {
                log_warn!("pose jumped beyond {} on one axis, frame rejected", self.track_jump_limit);
                return false;
            }
        }

        self.pose = pose;
        self.driver.is_tracking()
    }

    fn advance_from_driver(&mut self) {
        match self.status {
            FlightStatus::Launching if self.driver.launch_complete() => {
                self.set_status(FlightStatus::Flying);
                self.home = Some(self.pose);
            }
            FlightStatus::Landing if self.driver.landing_complete() => {
                self.set_status(FlightStatus::PreLaunch);
            }
            _ => {}
        }
    }

    fn effective_command(
        &mut self,
        view: &AircraftView,
        manual: ControlVector,
        overrides: &mut [&mut dyn OverrideSource],
    ) -> (ControlVector, bool) {
        if let Some(slot) = self.override_slot {
            match overrides.iter_mut().find(|o| o.source_id() == slot.source) {
                Some(source) => return (source.read(view), true),
                None => {
                    log_warn!("override {} not supplied to tick, detaching", slot.source);
                    self.override_slot = None;
                    let _ = self.abort_subscribers.unsubscribe(slot.abort);
                }
            }
        }

        let command = if self.headless {
            to_headless(&manual, &self.pose)
        } else {
            manual
        };
        (command, false)
    }

    /// Notify abort listeners in subscription order.
    ///
    /// Returns true when the override had to be detached by force.
    fn broadcast_abort(
        &mut self,
        reason: AbortReason,
        overrides: &mut [&mut dyn OverrideSource],
    ) -> bool {
        log_info!("abort: {}", reason);
        for id in self.abort_subscribers.snapshot() {
            let Some(handler) = overrides.iter_mut().find(|o| o.subscriber_id() == id) else {
                log_debug!("abort listener {} not supplied to tick", id);
                continue;
            };
            let source = handler.source_id();
            if handler.on_abort(reason) == AbortResponse::Released {
                self.remove_override(source, id);
            }
        }

        match self.override_slot.take() {
            Some(slot) => {
                log_warn!("override {} kept control after abort, detaching", slot.source);
                let _ = self.abort_subscribers.unsubscribe(slot.abort);
                true
            }
            None => false,
        }
    }

    fn set_status(&mut self, status: FlightStatus) {
        if self.status != status {
            log_info!("flight status {} -> {}", self.status, status);
            self.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockDriver, MockPilot};
    use nalgebra::Vector3;

    const DT: f32 = 0.02;

    /// Override source that records aborts
    struct MockOverride {
        source: SourceId,
        subscriber: SubscriberId,
        output: ControlVector,
        response: AbortResponse,
        aborts: u32,
        last_reason: Option<AbortReason>,
    }

    impl MockOverride {
        fn new(id: u8) -> Self {
            Self {
                source: SourceId(id),
                subscriber: SubscriberId(id),
                output: ControlVector::new(0.0, 0.5, 0.0, 0.0),
                response: AbortResponse::Released,
                aborts: 0,
                last_reason: None,
            }
        }
    }

    impl ControlSource for MockOverride {
        fn source_id(&self) -> SourceId {
            self.source
        }

        fn read(&mut self, _view: &AircraftView) -> ControlVector {
            self.output
        }
    }

    impl OverrideSource for MockOverride {
        fn subscriber_id(&self) -> SubscriberId {
            self.subscriber
        }

        fn on_abort(&mut self, reason: AbortReason) -> AbortResponse {
            self.aborts += 1;
            self.last_reason = Some(reason);
            self.response
        }
    }

    fn flying_quad() -> Quadcopter<MockDriver> {
        let mut quad = Quadcopter::new(MockDriver::new());
        quad.driver_mut().launch_complete = true;
        assert!(quad.take_off());
        let mut pilot = MockPilot::new();
        quad.tick(DT, &mut pilot, &mut []);
        assert_eq!(quad.status(), FlightStatus::Flying);
        quad
    }

    // ========================================================================
    // Status machine
    // ========================================================================

    #[test]
    fn test_take_off_edge_from_manual_launches() {
        let mut quad = Quadcopter::new(MockDriver::new());
        let mut pilot = MockPilot::new();
        pilot.next = Some(ControlVector::neutral().with_triggers(Triggers::TAKE_OFF));

        let report = quad.tick(DT, &mut pilot, &mut []);
        assert_eq!(report.status, FlightStatus::Launching);
        assert_eq!(quad.driver().take_off_calls, 1);
    }

    #[test]
    fn test_held_take_off_triggers_once() {
        let mut quad = Quadcopter::new(MockDriver::new());
        let mut pilot = MockPilot::new();
        pilot.held = ControlVector::neutral().with_triggers(Triggers::TAKE_OFF);
        for _ in 0..5 {
            quad.tick(DT, &mut pilot, &mut []);
        }
        assert_eq!(quad.driver().take_off_calls, 1);
    }

    #[test]
    fn test_launching_becomes_flying_when_driver_reports_launch() {
        let mut quad = Quadcopter::new(MockDriver::new());
        let mut pilot = MockPilot::new();
        assert!(quad.take_off());
        quad.tick(DT, &mut pilot, &mut []);
        assert_eq!(quad.status(), FlightStatus::Launching);

        quad.driver_mut().launch_complete = true;
        quad.driver_mut().pose = Ok(Pose::new(Vector3::new(0.0, 0.8, 0.0), 0.0));
        quad.tick(DT, &mut pilot, &mut []);
        assert_eq!(quad.status(), FlightStatus::Flying);
        assert_eq!(quad.home().map(|p| p.position.y), Some(0.8));
    }

    #[test]
    fn test_land_then_touchdown_returns_to_prelaunch() {
        let mut quad = flying_quad();
        let mut pilot = MockPilot::new();
        pilot.next = Some(ControlVector::neutral().with_triggers(Triggers::LAND));
        quad.tick(DT, &mut pilot, &mut []);
        assert_eq!(quad.status(), FlightStatus::Landing);

        quad.tick(DT, &mut pilot, &mut []);
        assert_eq!(quad.status(), FlightStatus::Landing);

        quad.driver_mut().landing_complete = true;
        quad.tick(DT, &mut pilot, &mut []);
        assert_eq!(quad.status(), FlightStatus::PreLaunch);
    }

    #[test]
    fn test_prime_props_then_take_off() {
        let mut quad = Quadcopter::new(MockDriver::new());
        assert!(quad.prime_props());
        assert_eq!(quad.status(), FlightStatus::PrimingProps);
        assert_eq!(quad.driver().motor_starts, 1);
        assert!(!quad.prime_props());
        assert!(quad.take_off());
        assert_eq!(quad.status(), FlightStatus::Launching);
    }

    #[test]
    fn test_land_ignored_on_ground() {
        let mut quad = Quadcopter::new(MockDriver::new());
        assert!(!quad.land());
        assert_eq!(quad.status(), FlightStatus::PreLaunch);
        assert_eq!(quad.driver().land_calls, 0);
    }

    #[test]
    fn test_rejected_take_off_keeps_status() {
        let mut quad = Quadcopter::new(MockDriver::new());
        quad.driver_mut().reject_commands = true;
        assert!(!quad.take_off());
        assert_eq!(quad.status(), FlightStatus::PreLaunch);
    }

    #[test]
    fn test_nothing_sent_before_launch() {
        let mut quad = Quadcopter::new(MockDriver::new());
        let mut pilot = MockPilot::new();
        pilot.held = ControlVector::new(0.0, 1.0, 0.0, 0.0);
        quad.tick(DT, &mut pilot, &mut []);
        assert_eq!(quad.driver().sent, 0);
    }

    // ========================================================================
    // Arbitration
    // ========================================================================

    #[test]
    fn test_manual_command_sent_when_no_override() {
        let mut quad = flying_quad();
        let mut pilot = MockPilot::new();
        pilot.held = ControlVector::new(0.1, 0.2, 0.3, 0.4);
        let report = quad.tick(DT, &mut pilot, &mut []);
        assert!(!report.overridden);
        assert_eq!(quad.driver().last_command, Some(ControlVector::new(0.1, 0.2, 0.3, 0.4)));
    }

    #[test]
    fn test_override_output_wins_while_pilot_idle() {
        let mut quad = flying_quad();
        let mut pilot = MockPilot::new();
        let mut ap = MockOverride::new(1);
        quad.override_source(ap.source, ap.subscriber);

        let report = quad.tick(DT, &mut pilot, &mut [&mut ap]);
        assert!(report.overridden);
        assert_eq!(report.command.pitch, 0.5);
        assert_eq!(ap.aborts, 0);
    }

    #[test]
    fn test_pilot_input_aborts_override_once_same_tick() {
        let mut quad = flying_quad();
        let mut pilot = MockPilot::new();
        let mut ap = MockOverride::new(1);
        quad.override_source(ap.source, ap.subscriber);

        pilot.next = Some(ControlVector::new(0.0, 0.0, 0.3, 0.0));
        let report = quad.tick(DT, &mut pilot, &mut [&mut ap]);

        assert_eq!(ap.aborts, 1);
        assert_eq!(ap.last_reason, Some(AbortReason::PilotInput));
        assert_eq!(report.abort, Some(AbortReason::PilotInput));
        assert!(!report.overridden);
        assert!(!report.forced_detach);
        assert_eq!(quad.active_override(), None);
        assert!(!quad.is_abort_subscribed(ap.subscriber));
        assert_eq!(report.command.roll, 0.3);

        // no further aborts once detached
        pilot.next = Some(ControlVector::new(0.0, 0.0, 0.3, 0.0));
        quad.tick(DT, &mut pilot, &mut [&mut ap]);
        assert_eq!(ap.aborts, 1);
    }

    #[test]
    fn test_retaining_override_is_force_detached() {
        let mut quad = flying_quad();
        let mut pilot = MockPilot::new();
        let mut ap = MockOverride::new(1);
        ap.response = AbortResponse::Retained;
        quad.override_source(ap.source, ap.subscriber);

        pilot.next = Some(ControlVector::new(0.2, 0.0, 0.0, 0.0));
        let report = quad.tick(DT, &mut pilot, &mut [&mut ap]);
        assert!(report.forced_detach);
        assert_eq!(quad.active_override(), None);
        assert!(!quad.is_abort_subscribed(ap.subscriber));
    }

    #[test]
    fn test_toggle_alone_does_not_abort() {
        let mut quad = flying_quad();
        let mut pilot = MockPilot::new();
        let mut ap = MockOverride::new(1);
        quad.override_source(ap.source, ap.subscriber);

        pilot.next = Some(ControlVector::neutral().with_triggers(Triggers::TOGGLE_AUTOPILOT));
        let report = quad.tick(DT, &mut pilot, &mut [&mut ap]);
        assert_eq!(ap.aborts, 0);
        assert!(report.overridden);
        assert!(report.manual.toggle_autopilot());
    }

    #[test]
    fn test_remove_override_with_stale_source_is_ignored() {
        let mut quad = flying_quad();
        quad.override_source(SourceId(2), SubscriberId(2));
        quad.remove_override(SourceId(1), SubscriberId(1));
        assert_eq!(quad.active_override(), Some(SourceId(2)));
        assert!(quad.is_abort_subscribed(SubscriberId(2)));

        quad.remove_override(SourceId(2), SubscriberId(2));
        assert_eq!(quad.active_override(), None);
        assert!(!quad.is_abort_subscribed(SubscriberId(2)));
    }

    #[test]
    fn test_override_replacement_unsubscribes_previous_handler() {
        let mut quad = flying_quad();
        quad.override_source(SourceId(1), SubscriberId(1));
        quad.override_source(SourceId(2), SubscriberId(2));
        assert_eq!(quad.active_override(), Some(SourceId(2)));
        assert!(!quad.is_abort_subscribed(SubscriberId(1)));
        assert!(quad.is_abort_subscribed(SubscriberId(2)));
    }

    #[test]
    fn test_unsubscribe_never_subscribed_is_reported() {
        let mut quad = flying_quad();
        assert_eq!(
            quad.unsubscribe_abort(SubscriberId(9)),
            Err(SubscriptionError::NotSubscribed)
        );
        assert!(quad.subscribe_abort(SubscriberId(9)).is_ok());
        assert_eq!(
            quad.subscribe_abort(SubscriberId(9)),
            Err(SubscriptionError::AlreadySubscribed)
        );
    }

    #[test]
    fn test_override_take_off_is_ignored() {
        let mut quad = Quadcopter::new(MockDriver::new());
        let mut pilot = MockPilot::new();
        let mut ap = MockOverride::new(1);
        ap.output = ControlVector::neutral().with_triggers(Triggers::TAKE_OFF);
        quad.override_source(ap.source, ap.subscriber);
        quad.tick(DT, &mut pilot, &mut [&mut ap]);
        assert_eq!(quad.status(), FlightStatus::PreLaunch);
        assert_eq!(quad.driver().take_off_calls, 0);
    }

    #[test]
    fn test_override_land_is_honoured() {
        let mut quad = flying_quad();
        let mut pilot = MockPilot::new();
        let mut ap = MockOverride::new(1);
        ap.output = ControlVector::neutral().with_triggers(Triggers::LAND);
        quad.override_source(ap.source, ap.subscriber);
        quad.tick(DT, &mut pilot, &mut [&mut ap]);
        assert_eq!(quad.status(), FlightStatus::Landing);
    }

    #[test]
    fn test_missing_override_is_detached() {
        let mut quad = flying_quad();
        let mut pilot = MockPilot::new();
        quad.override_source(SourceId(5), SubscriberId(5));
        let report = quad.tick(DT, &mut pilot, &mut []);
        assert!(!report.overridden);
        assert_eq!(quad.active_override(), None);
    }

    #[test]
    fn test_headless_applies_only_to_manual_input() {
        let mut quad = flying_quad();
        quad.driver_mut().pose = Ok(Pose::new(Vector3::new(0.0, 0.8, 0.0), 90.0));
        quad.set_headless(true);
        let mut pilot = MockPilot::new();
        pilot.held = ControlVector::new(0.0, 1.0, 0.0, 0.0);
        let report = quad.tick(DT, &mut pilot, &mut []);
        assert!((report.command.roll - (-1.0)).abs() < 1e-5);
        assert!(report.command.pitch.abs() < 1e-5);

        let mut ap = MockOverride::new(1);
        quad.override_source(ap.source, ap.subscriber);
        let idle = &mut MockPilot::new();
        let report = quad.tick(DT, idle, &mut [&mut ap]);
        assert_eq!(report.command.pitch, 0.5);
        assert_eq!(report.command.roll, 0.0);
    }

    // ========================================================================
    // Tracking
    // ========================================================================

    #[test]
    fn test_driver_error_while_flying_aborts_override() {
        let mut quad = flying_quad();
        let mut pilot = MockPilot::new();
        let mut ap = MockOverride::new(1);
        quad.override_source(ap.source, ap.subscriber);

        quad.driver_mut().pose = Err(DriverError::LinkDown);
        let report = quad.tick(DT, &mut pilot, &mut [&mut ap]);
        assert!(!report.tracking);
        assert_eq!(report.abort, Some(AbortReason::LostTracking));
        assert_eq!(ap.last_reason, Some(AbortReason::LostTracking));
        assert_eq!(quad.active_override(), None);
        assert_eq!(report.status, FlightStatus::Flying);
    }

    #[test]
    fn test_pose_jump_is_lost_tracking_and_keeps_previous_pose() {
        let mut quad = flying_quad();
        let mut pilot = MockPilot::new();
        let before = quad.pose();
        quad.driver_mut().pose = Ok(Pose::new(Vector3::new(0.0, 0.0, 2.5), 0.0));
        let report = quad.tick(DT, &mut pilot, &mut []);
        assert!(!report.tracking);
        assert_eq!(quad.pose(), before);
    }

    #[test]
    fn test_non_finite_pose_is_lost_tracking_and_keeps_previous_pose() {
        let mut quad = flying_quad();
        let mut pilot = MockPilot::new();
        let mut ap = MockOverride::new(1);
        quad.override_source(ap.source, ap.subscriber);
        let before = quad.pose();

        quad.driver_mut().pose = Ok(Pose::new(Vector3::new(0.0, 0.0, 0.1), f32::NAN));
        let report = quad.tick(DT, &mut pilot, &mut [&mut ap]);
        assert!(!report.tracking);
        assert_eq!(report.abort, Some(AbortReason::LostTracking));
        assert_eq!(quad.pose(), before);

        let sent = quad.driver().last_command.unwrap();
        assert!(sent.pitch.is_finite() && sent.roll.is_finite() && sent.yaw.is_finite());
    }

    #[test]
    fn test_non_finite_pose_on_ground_is_rejected() {
        let mut quad = Quadcopter::new(MockDriver::new());
        let mut pilot = MockPilot::new();
        quad.driver_mut().pose = Ok(Pose::new(Vector3::new(f32::NAN, 0.0, 0.0), 0.0));
        let report = quad.tick(DT, &mut pilot, &mut []);
        assert!(!report.tracking);
        assert!(quad.pose().is_finite());
    }

    #[test]
    fn test_pilot_is_polled_on_lost_tracking_tick() {
        let mut quad = flying_quad();
        let mut pilot = MockPilot::new();
        let mut ap = MockOverride::new(1);
        quad.override_source(ap.source, ap.subscriber);
        quad.driver_mut().tracking = false;

        let report = quad.tick(DT, &mut pilot, &mut [&mut ap]);
        assert_eq!(pilot.reads, 1);
        assert_eq!(report.abort, Some(AbortReason::LostTracking));
        assert_eq!(ap.aborts, 1);
    }

    #[test]
    fn test_small_move_is_accepted() {
        let mut quad = flying_quad();
        let mut pilot = MockPilot::new();
        quad.driver_mut().pose = Ok(Pose::new(Vector3::new(0.5, 0.2, 1.9), 0.0));
        let report = quad.tick(DT, &mut pilot, &mut []);
        assert!(report.tracking);
        assert_eq!(quad.pose().position, Vector3::new(0.5, 0.2, 1.9));
    }

    #[test]
    fn test_driver_untracked_flag_aborts_override() {
        let mut quad = flying_quad();
        let mut pilot = MockPilot::new();
        let mut ap = MockOverride::new(1);
        quad.override_source(ap.source, ap.subscriber);
        quad.driver_mut().tracking = false;
        let report = quad.tick(DT, &mut pilot, &mut [&mut ap]);
        assert_eq!(report.abort, Some(AbortReason::LostTracking));
        assert_eq!(ap.aborts, 1);
    }

    #[test]
    fn test_telemetry_update_is_reported() {
        let mut quad = flying_quad();
        let mut pilot = MockPilot::new();
        quad.driver_mut().pending_update = true;
        assert!(quad.tick(DT, &mut pilot, &mut []).telemetry_updated);
        assert!(!quad.tick(DT, &mut pilot, &mut []).telemetry_updated);
    }
}
