//! Aircraft driver contract
//!
//! A driver wraps either a physical aircraft link or a simulated stand-in.
//! Telemetry may arrive on another thread; the driver buffers it and only
//! applies it inside [`AircraftDriver::sync`], which the quadcopter calls at
//! the start of every tick.

use core::fmt;

use crate::control::ControlVector;
use crate::navigation::Pose;

/// Errors reported by an aircraft driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    /// No telemetry has been received yet
    NoTelemetry,
    /// The link to the aircraft is down
    LinkDown,
    /// The aircraft refused the command in its current state
    Rejected,
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::NoTelemetry => write!(f, "no telemetry received"),
            DriverError::LinkDown => write!(f, "aircraft link down"),
            DriverError::Rejected => write!(f, "command rejected by aircraft"),
        }
    }
}

/// Physical or simulated aircraft
pub trait AircraftDriver {
    /// Apply telemetry buffered since the last tick.
    ///
    /// Returns true when a new update was applied.
    fn sync(&mut self) -> bool;

    /// Current field-relative pose.
    fn pose(&self) -> Result<Pose, DriverError>;

    /// True for physics stand-ins, false for real aircraft.
    fn is_simulated(&self) -> bool;

    /// False when this tick's pose should not be trusted.
    fn is_tracking(&self) -> bool;

    /// True once a commanded take-off has finished and the aircraft holds
    /// position in the air.
    fn launch_complete(&self) -> bool;

    /// True once the aircraft is on the ground with motors stopped.
    fn landing_complete(&self) -> bool;

    /// Spin the motors up on the ground.
    fn start_motors(&mut self) -> Result<(), DriverError>;

    fn take_off(&mut self) -> Result<(), DriverError>;

    fn land(&mut self) -> Result<(), DriverError>;

    /// Send this tick's command in the aircraft's local frame.
    fn send(&mut self, command: &ControlVector, dt_s: f32);
}
