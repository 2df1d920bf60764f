//! PID navigator
//!
//! [`PidAutopilot`] steers an aircraft toward a target pose. It moves an
//! internal guide pose from the aircraft toward the target according to the
//! selected [`TranslationStyle`], and four PID loops (X, Y, Z and yaw) chase
//! the guide pose. Output is converted to the aircraft's local frame before
//! it leaves the autopilot.
//!
//! The autopilot is a command source: once activated the owner registers it
//! as the quadcopter's override, and an abort deactivates it.

mod events;
mod profile;

pub use events::{AutopilotEvent, AutopilotObserver, EventKind};
pub use profile::{AxisGains, PidProfiles, TranslationStyle};

use heapless::Deque;
use nalgebra::Vector3;

use crate::control::{ControlVector, PidController, Triggers};
use crate::events::{SubscriberId, Subscribers, SubscriptionError};
use crate::navigation::{to_headless, yaw_error, Pose, Waypoint};
use crate::quad::{
    AbortReason, AbortResponse, AircraftView, ControlSource, OverrideSource, SourceId,
};
use crate::{log_debug, log_info, log_warn};

/// Events queued between dispatches
pub const MAX_PENDING_EVENTS: usize = 8;

/// Observers per event kind
pub const MAX_EVENT_SUBSCRIBERS: usize = 4;

/// PID output limits for every axis
const OUTPUT_MIN: f32 = -1.0;
const OUTPUT_MAX: f32 = 1.0;

/// Navigator tuning
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NavigatorConfig {
    /// Distance to the target that counts as arrived. Also the guide
    /// offset below which a physical aircraft gets no correction.
    pub arrival_threshold: f32,
    /// Fraction of the leg added per second in the linear profile
    pub linear_speed: f32,
    /// Fraction of the remaining gap closed per second in the non-linear
    /// profile
    pub non_linear_speed: f32,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            arrival_threshold: 0.15,
            linear_speed: 0.5,
            non_linear_speed: 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AutopilotState {
    #[default]
    Inactive,
    Active,
}

/// One controller per navigation axis
#[derive(Clone, Debug)]
struct AxisControllers {
    x: PidController,
    y: PidController,
    z: PidController,
    yaw: PidController,
}

impl AxisControllers {
    fn new(gains: &AxisGains) -> Self {
        Self {
            x: PidController::new(gains.x, OUTPUT_MIN, OUTPUT_MAX),
            y: PidController::new(gains.y, OUTPUT_MIN, OUTPUT_MAX),
            z: PidController::new(gains.z, OUTPUT_MIN, OUTPUT_MAX),
            yaw: PidController::new(gains.yaw, OUTPUT_MIN, OUTPUT_MAX),
        }
    }
}

/// Guide-pose PID navigator
pub struct PidAutopilot {
    source_id: SourceId,
    subscriber_id: SubscriberId,
    state: AutopilotState,
    config: NavigatorConfig,
    style: TranslationStyle,
    profiles: PidProfiles,
    controllers: Option<AxisControllers>,
    /// Aircraft pose as of the last activation or tick
    aircraft: Pose,
    guide: Pose,
    target: Option<Waypoint>,
    /// Where the current leg started
    start: Vector3<f32>,
    /// Straight-line length of the current leg
    original_distance: f32,
    arrived: bool,
    land_requested: bool,
    events: Deque<AutopilotEvent, MAX_PENDING_EVENTS>,
    arrival_subscribers: Subscribers<MAX_EVENT_SUBSCRIBERS>,
    target_subscribers: Subscribers<MAX_EVENT_SUBSCRIBERS>,
}

impl PidAutopilot {
    pub fn new(
        source_id: SourceId,
        subscriber_id: SubscriberId,
        config: NavigatorConfig,
        profiles: PidProfiles,
    ) -> Self {
        Self {
            source_id,
            subscriber_id,
            state: AutopilotState::Inactive,
            config,
            style: TranslationStyle::default(),
            profiles,
            controllers: None,
            aircraft: Pose::origin(),
            guide: Pose::origin(),
            target: None,
            start: Vector3::zeros(),
            original_distance: 0.0,
            arrived: false,
            land_requested: false,
            events: Deque::new(),
            arrival_subscribers: Subscribers::new(),
            target_subscribers: Subscribers::new(),
        }
    }

    pub fn state(&self) -> AutopilotState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == AutopilotState::Active
    }

    pub fn target(&self) -> Option<Waypoint> {
        self.target
    }

    pub fn guide(&self) -> Pose {
        self.guide
    }

    pub fn has_arrived(&self) -> bool {
        self.arrived
    }

    pub fn style(&self) -> TranslationStyle {
        self.style
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: NavigatorConfig) {
        self.config = config;
    }

    pub fn profiles(&self) -> &PidProfiles {
        &self.profiles
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    // ========================================================================
    // Activation and targeting
    // ========================================================================

    /// Bind to the aircraft described by `view` and start fresh controllers.
    pub fn activate(&mut self, view: &AircraftView) -> bool {
        if self.is_active() {
            log_warn!("autopilot already active");
            return false;
        }
        self.state = AutopilotState::Active;
        self.aircraft = view.pose;
        self.guide = view.pose.level();
        self.target = None;
        self.arrived = false;
        self.land_requested = false;
        self.controllers = Some(AxisControllers::new(&self.profiles.get(self.style)));
        log_info!("autopilot active ({})", self.style);
        true
    }

    /// Stop steering and drop controller state.
    ///
    /// A set target is cleared and announced as `TargetChanged(None)`.
    pub fn deactivate(&mut self) -> bool {
        if !self.is_active() {
            log_debug!("autopilot already inactive");
            return false;
        }
        self.state = AutopilotState::Inactive;
        self.controllers = None;
        self.land_requested = false;
        if self.target.take().is_some() {
            self.queue(AutopilotEvent::TargetChanged(None));
        }
        log_info!("autopilot inactive");
        true
    }

    /// Start a new leg from the aircraft's current position.
    pub fn set_target(&mut self, waypoint: Waypoint) {
        if !self.is_active() {
            log_warn!("set target {} ignored: autopilot inactive", waypoint.id);
            return;
        }
        self.start = self.aircraft.position;
        self.original_distance = (waypoint.position() - self.start).norm();
        self.guide = Pose::new(self.aircraft.position, waypoint.pose.yaw_deg());
        self.arrived = false;
        self.target = Some(waypoint);
        log_info!("target {} ({} away)", waypoint.id, self.original_distance);
        self.queue(AutopilotEvent::TargetChanged(Some(waypoint)));
    }

    /// Emit a land request with the next output.
    pub fn request_land(&mut self) {
        if !self.is_active() {
            log_warn!("land request ignored: autopilot inactive");
            return;
        }
        self.land_requested = true;
    }

    /// Switch motion profile, rebuilding the controllers from its gains.
    ///
    /// A set target is issued again so the leg restarts under the new
    /// profile.
    pub fn set_translation_style(&mut self, style: TranslationStyle) {
        self.style = style;
        if !self.is_active() {
            return;
        }
        self.controllers = Some(AxisControllers::new(&self.profiles.get(style)));
        if let Some(target) = self.target {
            self.set_target(target);
        }
    }

    /// Replace the gains of one profile.
    pub fn set_profile_gains(&mut self, style: TranslationStyle, gains: AxisGains) {
        self.profiles.set(style, gains);
        if self.is_active() && style == self.style {
            self.controllers = Some(AxisControllers::new(&gains));
        }
    }

    // ========================================================================
    // Per-tick computation
    // ========================================================================

    /// Advance the guide pose and compute this tick's command.
    pub fn run(&mut self, view: &AircraftView) -> ControlVector {
        self.aircraft = view.pose;
        if !self.is_active() {
            return ControlVector::neutral();
        }
        let Some(target) = self.target else {
            return self.with_land_request(ControlVector::neutral());
        };

        self.advance_guide(&target, view.dt_s);

        let offset = view.pose.position - self.guide.position;
        let mut command = ControlVector::neutral();
        if offset.norm() > self.config.arrival_threshold || view.simulated {
            command = self.correction(&offset, view);
        }

        let remaining = (view.pose.position - target.position()).norm();
        if remaining < self.config.arrival_threshold && !self.arrived {
            self.arrived = true;
            log_info!("arrived at {}", target.id);
            self.queue(AutopilotEvent::Arrived(target));
        }

        self.with_land_request(command)
    }

    fn advance_guide(&mut self, target: &Waypoint, dt_s: f32) {
        let goal = target.position();
        match self.style {
            TranslationStyle::Linear => {
                if self.original_distance <= f32::EPSILON {
                    self.guide.position = goal;
                    return;
                }
                let covered = self.original_distance - (self.aircraft.position - goal).norm();
                let fraction = covered / self.original_distance;
                let t = (fraction + self.config.linear_speed * dt_s).clamp(0.0, 1.0);
                self.guide.position = self.start.lerp(&goal, t);
            }
            TranslationStyle::NonLinear => {
                let t = (self.config.non_linear_speed * dt_s).clamp(0.0, 1.0);
                self.guide.position = self.guide.position.lerp(&goal, t);
            }
            TranslationStyle::Instant => {
                self.guide.position = goal;
            }
        }
    }

    fn correction(&mut self, offset: &Vector3<f32>, view: &AircraftView) -> ControlVector {
        let Some(pids) = self.controllers.as_mut() else {
            return ControlVector::neutral();
        };
        let elapsed_ms = (view.dt_s * 1000.0) as u32;
        let yaw_err = yaw_error(view.pose.yaw_deg(), self.guide.yaw_deg());

        let field = ControlVector::new(
            pids.yaw.update(yaw_err, elapsed_ms),
            pids.z.update(offset.z, elapsed_ms),
            pids.x.update(offset.x, elapsed_ms),
            pids.y.update(offset.y, elapsed_ms),
        );
        to_headless(&field, &view.pose)
    }

    fn with_land_request(&mut self, mut command: ControlVector) -> ControlVector {
        if core::mem::take(&mut self.land_requested) {
            command.triggers |= Triggers::LAND;
        }
        command
    }

    // ========================================================================
    // Observers
    // ========================================================================

    pub fn subscribe(&mut self, kind: EventKind, id: SubscriberId) -> Result<(), SubscriptionError> {
        self.subscribers_mut(kind).subscribe(id).map_err(|e| {
            log_warn!("subscribe {} to {:?}: {}", id, kind, e);
            e
        })
    }

    pub fn unsubscribe(
        &mut self,
        kind: EventKind,
        id: SubscriberId,
    ) -> Result<(), SubscriptionError> {
        self.subscribers_mut(kind).unsubscribe(id).map_err(|e| {
            log_warn!("unsubscribe {} from {:?}: {}", id, kind, e);
            e
        })
    }

    pub fn is_subscribed(&self, kind: EventKind, id: SubscriberId) -> bool {
        self.subscribers(kind).contains(id)
    }

    /// Deliver queued events to subscribed observers, in order.
    ///
    /// Events queued by observers during delivery are delivered in the same
    /// call. Returns the number of deliveries made.
    pub fn dispatch(&mut self, observers: &mut [&mut dyn AutopilotObserver]) -> usize {
        let mut delivered = 0;
        while let Some(event) = self.events.pop_front() {
            let kind = event.kind();
            for id in self.subscribers(kind).snapshot() {
                // may have unsubscribed earlier in this delivery
                if !self.subscribers(kind).contains(id) {
                    continue;
                }
                if let Some(observer) = observers.iter_mut().find(|o| o.subscriber_id() == id) {
                    observer.on_event(&event, self);
                    delivered += 1;
                }
            }
        }
        delivered
    }

    /// Drop queued events without delivering them.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    fn queue(&mut self, event: AutopilotEvent) {
        if self.events.push_back(event).is_err() {
            log_warn!("autopilot event queue full, dropping {:?}", event.kind());
        }
    }

    fn subscribers(&self, kind: EventKind) -> &Subscribers<MAX_EVENT_SUBSCRIBERS> {
        match kind {
            EventKind::Arrival => &self.arrival_subscribers,
            EventKind::TargetChanged => &self.target_subscribers,
        }
    }

    fn subscribers_mut(&mut self, kind: EventKind) -> &mut Subscribers<MAX_EVENT_SUBSCRIBERS> {
        match kind {
            EventKind::Arrival => &mut self.arrival_subscribers,
            EventKind::TargetChanged => &mut self.target_subscribers,
        }
    }
}

impl ControlSource for PidAutopilot {
    fn source_id(&self) -> SourceId {
        self.source_id
    }

    fn read(&mut self, view: &AircraftView) -> ControlVector {
        self.run(view)
    }
}

impl OverrideSource for PidAutopilot {
    fn subscriber_id(&self) -> SubscriberId {
        self.subscriber_id
    }

    fn on_abort(&mut self, reason: AbortReason) -> AbortResponse {
        log_info!("autopilot aborted: {}", reason);
        self.deactivate();
        AbortResponse::Released
    }
}
