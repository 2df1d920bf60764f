//! Autopilot notifications
//!
//! The autopilot queues events as they happen and delivers them when the
//! owner calls [`PidAutopilot::dispatch`](super::PidAutopilot::dispatch).
//! Observers receive the autopilot mutably so they can react by setting the
//! next target or unsubscribing.

use super::PidAutopilot;
use crate::events::SubscriberId;
use crate::navigation::Waypoint;

/// Something observers of the autopilot care about
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AutopilotEvent {
    /// The aircraft reached the target (edge-triggered, once per approach)
    Arrived(Waypoint),
    /// The target was set, or cleared by deactivation
    TargetChanged(Option<Waypoint>),
}

impl AutopilotEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            AutopilotEvent::Arrived(_) => EventKind::Arrival,
            AutopilotEvent::TargetChanged(_) => EventKind::TargetChanged,
        }
    }
}

/// Subscription channel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Arrival,
    TargetChanged,
}

/// Receives autopilot events it subscribed to
pub trait AutopilotObserver {
    fn subscriber_id(&self) -> SubscriberId;

    fn on_event(&mut self, event: &AutopilotEvent, autopilot: &mut PidAutopilot);
}
