//! Mock collaborators for host testing
//!
//! Always compiled so downstream crates can drive the flight core in their
//! own tests without real hardware.

use crate::control::ControlVector;
use crate::navigation::Pose;
use crate::quad::{AircraftDriver, AircraftView, ControlSource, DriverError, SourceId};

/// Scriptable aircraft driver
///
/// Every field is public so tests can set the aircraft's reported state
/// directly between ticks.
#[derive(Debug, Clone)]
pub struct MockDriver {
    pub pose: Result<Pose, DriverError>,
    pub simulated: bool,
    pub tracking: bool,
    pub launch_complete: bool,
    pub landing_complete: bool,
    /// Returned (and cleared) by the next `sync`
    pub pending_update: bool,
    /// Make `start_motors`, `take_off` and `land` fail
    pub reject_commands: bool,
    pub last_command: Option<ControlVector>,
    pub sent: usize,
    pub take_off_calls: u32,
    pub land_calls: u32,
    pub motor_starts: u32,
}

impl MockDriver {
    pub fn new() -> Self {
        Self {
            pose: Ok(Pose::origin()),
            simulated: true,
            tracking: true,
            launch_complete: false,
            landing_complete: false,
            pending_update: false,
            reject_commands: false,
            last_command: None,
            sent: 0,
            take_off_calls: 0,
            land_calls: 0,
            motor_starts: 0,
        }
    }

    fn accept(&self) -> Result<(), DriverError> {
        if self.reject_commands {
            Err(DriverError::Rejected)
        } else {
            Ok(())
        }
    }
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl AircraftDriver for MockDriver {
    fn sync(&mut self) -> bool {
        core::mem::take(&mut self.pending_update)
    }

    fn pose(&self) -> Result<Pose, DriverError> {
        self.pose
    }

    fn is_simulated(&self) -> bool {
        self.simulated
    }

    fn is_tracking(&self) -> bool {
        self.tracking
    }

    fn launch_complete(&self) -> bool {
        self.launch_complete
    }

    fn landing_complete(&self) -> bool {
        self.landing_complete
    }

    fn start_motors(&mut self) -> Result<(), DriverError> {
        self.accept()?;
        self.motor_starts += 1;
        Ok(())
    }

    fn take_off(&mut self) -> Result<(), DriverError> {
        self.accept()?;
        self.take_off_calls += 1;
        Ok(())
    }

    fn land(&mut self) -> Result<(), DriverError> {
        self.accept()?;
        self.land_calls += 1;
        Ok(())
    }

    fn send(&mut self, command: &ControlVector, _dt_s: f32) {
        self.last_command = Some(*command);
        self.sent += 1;
    }
}

/// Manual pilot stand-in
///
/// Returns `next` once if set, otherwise `held` every tick.
#[derive(Debug, Clone, Default)]
pub struct MockPilot {
    pub next: Option<ControlVector>,
    pub held: ControlVector,
    pub reads: u32,
}

impl MockPilot {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ControlSource for MockPilot {
    fn source_id(&self) -> SourceId {
        SourceId(0)
    }

    fn read(&mut self, _view: &AircraftView) -> ControlVector {
        self.reads += 1;
        self.next.take().unwrap_or(self.held)
    }
}
