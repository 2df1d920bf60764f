//! Latest-value telemetry hand-off between a link thread and the flight loop.
//!
//! The link thread [`publish`](TelemetryCell::publish)es every frame it
//! decodes; the flight loop [`take`](TelemetryCell::take)s at most one per
//! tick. Older frames are overwritten, never queued.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use nalgebra::Vector3;
use serde::Deserialize;

use crate::error::SimulatorError;

/// Flight mode the aircraft reports once its automatic take-off has settled
pub const MODE_HOVER: u8 = 6;

/// One decoded state report from the aircraft
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryFrame {
    /// Position from the aircraft's own tracking, field axes, uncorrected
    pub position: Vector3<f32>,
    pub yaw_deg: f32,
    pub pitch_deg: f32,
    pub roll_deg: f32,
    /// Height above ground in decimetres
    pub height_dm: i32,
    pub flight_mode: u8,
    pub flying: bool,
    pub on_ground: bool,
    /// Whether the aircraft trusts its own position fix
    pub tracked: bool,
}

impl Default for TelemetryFrame {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            yaw_deg: 0.0,
            pitch_deg: 0.0,
            roll_deg: 0.0,
            height_dm: 0,
            flight_mode: 0,
            flying: false,
            on_ground: true,
            tracked: true,
        }
    }
}

/// Wire format of one telemetry line from the link.
#[derive(Debug, Deserialize)]
struct FrameJson {
    position: [f32; 3],
    #[serde(default)]
    yaw: f32,
    #[serde(default)]
    pitch: f32,
    #[serde(default)]
    roll: f32,
    #[serde(default)]
    height_dm: i32,
    #[serde(default)]
    mode: u8,
    #[serde(default)]
    flying: bool,
    #[serde(default = "yes")]
    on_ground: bool,
    #[serde(default = "yes")]
    tracked: bool,
}

fn yes() -> bool {
    true
}

impl TelemetryFrame {
    /// Decode one JSON telemetry line.
    pub fn from_json(line: &str) -> Result<Self, SimulatorError> {
        let parsed: FrameJson = serde_json::from_str(line)
            .map_err(|e| SimulatorError::TelemetryDecode(format!("JSON parse error: {e}")))?;

        let [x, y, z] = parsed.position;
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            return Err(SimulatorError::TelemetryDecode("non-finite position".into()));
        }
        if !(parsed.yaw.is_finite() && parsed.pitch.is_finite() && parsed.roll.is_finite()) {
            return Err(SimulatorError::TelemetryDecode("non-finite attitude".into()));
        }

        Ok(Self {
            position: Vector3::new(x, y, z),
            yaw_deg: parsed.yaw,
            pitch_deg: parsed.pitch,
            roll_deg: parsed.roll,
            height_dm: parsed.height_dm,
            flight_mode: parsed.mode,
            flying: parsed.flying,
            on_ground: parsed.on_ground,
            tracked: parsed.tracked,
        })
    }
}

#[derive(Debug, Default)]
struct Slot {
    frame: Option<TelemetryFrame>,
    dirty: bool,
}

/// Single-slot telemetry cell shared between threads.
#[derive(Debug, Default)]
pub struct TelemetryCell {
    slot: Mutex<Slot>,
    closed: AtomicBool,
    published: AtomicU64,
}

impl TelemetryCell {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        // slot is written in one assignment, so a poisoned lock is still consistent
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace the latest frame.
    pub fn publish(&self, frame: TelemetryFrame) -> Result<(), SimulatorError> {
        if self.is_closed() {
            return Err(SimulatorError::LinkClosed);
        }
        let mut slot = self.lock();
        slot.frame = Some(frame);
        slot.dirty = true;
        self.published.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Latest frame if it has not been taken yet.
    pub fn take(&self) -> Option<TelemetryFrame> {
        let mut slot = self.lock();
        if !slot.dirty {
            return None;
        }
        slot.dirty = false;
        slot.frame
    }

    /// Latest frame, taken or not.
    pub fn peek(&self) -> Option<TelemetryFrame> {
        self.lock().frame
    }

    pub fn has_update(&self) -> bool {
        self.lock().dirty
    }

    /// Mark the producer gone. Later publishes fail.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Frames published since creation.
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}
