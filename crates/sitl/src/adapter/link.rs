//! Driver for a physical aircraft behind a telemetry/command link.
//!
//! Telemetry arrives through a [`TelemetryCell`] written by a link thread.
//! Commands go out through a [`CommandLink`], implemented by whatever talks
//! to the radio.
//!
//! The aircraft's tracking origin jumps by an arbitrary offset once its
//! automatic take-off settles. The driver records the reported position at
//! that moment and subtracts it from every later frame, then raises the
//! result by the reported hover height so the field origin sits on the
//! ground under the launch point.

use std::sync::Arc;

use nalgebra::Vector3;

use quadpilot_core::control::ControlVector;
use quadpilot_core::navigation::Pose;
use quadpilot_core::quad::{AircraftDriver, DriverError};

use crate::error::SimulatorError;
use crate::telemetry::{TelemetryCell, TelemetryFrame, MODE_HOVER};

/// Outbound side of the aircraft link.
pub trait CommandLink {
    fn is_connected(&self) -> bool;

    fn start_motors(&mut self) -> Result<(), SimulatorError>;

    fn take_off(&mut self) -> Result<(), SimulatorError>;

    fn land(&mut self) -> Result<(), SimulatorError>;

    /// Stick positions, each in `[-1, 1]`.
    fn set_axes(&mut self, yaw: f32, throttle: f32, roll: f32, pitch: f32);
}

/// Ticks without a new frame before the pose counts as stale
pub const DEFAULT_STALE_TICKS: u32 = 10;

/// Aircraft driver over a [`CommandLink`] and a [`TelemetryCell`].
pub struct LinkQuadcopter<L: CommandLink> {
    link: L,
    telemetry: Arc<TelemetryCell>,
    frame: Option<TelemetryFrame>,
    /// Reported position at launch completion
    tracking_offset: Vector3<f32>,
    /// Hover height at launch completion
    elevation: f32,
    launching: bool,
    launched: bool,
    landing: bool,
    stale_ticks: u32,
    max_stale_ticks: u32,
}

impl<L: CommandLink> LinkQuadcopter<L> {
    pub fn new(link: L, telemetry: Arc<TelemetryCell>) -> Self {
        Self {
            link,
            telemetry,
            frame: None,
            tracking_offset: Vector3::zeros(),
            elevation: 0.0,
            launching: false,
            launched: false,
            landing: false,
            stale_ticks: 0,
            max_stale_ticks: DEFAULT_STALE_TICKS,
        }
    }

    pub fn with_stale_limit(mut self, ticks: u32) -> Self {
        self.max_stale_ticks = ticks;
        self
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn last_frame(&self) -> Option<TelemetryFrame> {
        self.frame
    }

    pub fn tracking_offset(&self) -> Vector3<f32> {
        self.tracking_offset
    }

    pub fn elevation(&self) -> f32 {
        self.elevation
    }

    fn check_launch(&mut self, frame: &TelemetryFrame) {
        if !self.launching || frame.flight_mode != MODE_HOVER || !frame.flying {
            return;
        }
        self.tracking_offset = frame.position;
        self.elevation = frame.height_dm as f32 * 0.1;
        self.launching = false;
        self.launched = true;
        log::info!(
            "link: launch complete, offset {:?}, elevation {:.1}",
            self.tracking_offset,
            self.elevation
        );
    }

    fn ready(&self) -> Result<(), DriverError> {
        if self.telemetry.is_closed() || !self.link.is_connected() {
            return Err(DriverError::LinkDown);
        }
        Ok(())
    }

    fn command(
        &mut self,
        name: &str,
        send: impl FnOnce(&mut L) -> Result<(), SimulatorError>,
    ) -> Result<(), DriverError> {
        self.ready()?;
        send(&mut self.link).map_err(|e| {
            log::warn!("link: {} failed: {}", name, e);
            DriverError::Rejected
        })
    }
}

impl<L: CommandLink> AircraftDriver for LinkQuadcopter<L> {
    fn sync(&mut self) -> bool {
        match self.telemetry.take() {
            Some(frame) => {
                self.check_launch(&frame);
                self.frame = Some(frame);
                self.stale_ticks = 0;
                true
            }
            None => {
                self.stale_ticks = self.stale_ticks.saturating_add(1);
                false
            }
        }
    }

    fn pose(&self) -> Result<Pose, DriverError> {
        let Some(frame) = self.frame else {
            return Err(if self.telemetry.is_closed() {
                DriverError::LinkDown
            } else {
                DriverError::NoTelemetry
            });
        };
        let position =
            frame.position - self.tracking_offset + Vector3::new(0.0, self.elevation, 0.0);
        Ok(Pose::from_euler_deg(
            position,
            frame.yaw_deg,
            frame.pitch_deg,
            frame.roll_deg,
        ))
    }

    fn is_simulated(&self) -> bool {
        false
    }

    fn is_tracking(&self) -> bool {
        match self.frame {
            Some(frame) => {
                frame.tracked
                    && self.stale_ticks <= self.max_stale_ticks
                    && !self.telemetry.is_closed()
            }
            None => false,
        }
    }

    fn launch_complete(&self) -> bool {
        self.launched
    }

    fn landing_complete(&self) -> bool {
        self.landing && self.frame.is_some_and(|f| f.on_ground && !f.flying)
    }

    fn start_motors(&mut self) -> Result<(), DriverError> {
        self.command("start motors", |link| link.start_motors())
    }

    fn take_off(&mut self) -> Result<(), DriverError> {
        self.command("take-off", |link| link.take_off())?;
        self.launching = true;
        self.launched = false;
        self.landing = false;
        Ok(())
    }

    fn land(&mut self) -> Result<(), DriverError> {
        self.command("land", |link| link.land())?;
        self.launching = false;
        self.landing = true;
        Ok(())
    }

    fn send(&mut self, command: &ControlVector, _dt_s: f32) {
        if self.ready().is_err() {
            return;
        }
        self.link
            .set_axes(command.yaw, command.throttle, command.roll, command.pitch);
    }
}
