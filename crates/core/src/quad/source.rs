//! Command sources and the abort handshake
//!
//! The quadcopter polls a default source (normally the manual pilot) every
//! tick. An override source (normally the autopilot) supersedes it until the
//! pilot touches the controls, tracking is lost, or the override removes
//! itself.

use core::fmt;

use super::status::FlightStatus;
use crate::control::ControlVector;
use crate::events::SubscriberId;
use crate::navigation::Pose;

/// Identity of a command source
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SourceId(pub u8);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source#{}", self.0)
    }
}

/// Read-only view of the aircraft handed to sources each tick
#[derive(Clone, Copy, Debug)]
pub struct AircraftView {
    /// Last accepted pose
    pub pose: Pose,
    pub simulated: bool,
    /// Whether this tick's pose is trustworthy
    pub tracking: bool,
    pub status: FlightStatus,
    /// Seconds since the previous tick
    pub dt_s: f32,
}

/// Why an abort was broadcast
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbortReason {
    /// The default source produced input while an override was active
    PilotInput,
    /// Pose was lost, jumped, or telemetry failed while flying
    LostTracking,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::PilotInput => write!(f, "pilot input"),
            AbortReason::LostTracking => write!(f, "lost tracking"),
        }
    }
}

/// How an abort handler reacted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbortResponse {
    /// Handler stood down; the quadcopter detaches it
    Released,
    /// Handler kept control; the quadcopter detaches it anyway and warns
    Retained,
}

/// Produces a command vector on demand
pub trait ControlSource {
    fn source_id(&self) -> SourceId;

    fn read(&mut self, view: &AircraftView) -> ControlVector;
}

/// A source that can take over from the default source and be aborted
pub trait OverrideSource: ControlSource {
    /// Identity used in the abort subscriber list.
    fn subscriber_id(&self) -> SubscriberId;

    fn on_abort(&mut self, reason: AbortReason) -> AbortResponse;
}
