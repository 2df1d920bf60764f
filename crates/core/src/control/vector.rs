//! One tick's worth of flight commands

use bitflags::bitflags;

bitflags! {
    /// Edge-triggered command flags
    ///
    /// A source sets a flag for exactly one tick per user action.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Triggers: u8 {
        /// Request take-off
        const TAKE_OFF = 0b0000_0001;
        /// Request landing
        const LAND = 0b0000_0010;
        /// Toggle the autopilot on or off
        const TOGGLE_AUTOPILOT = 0b0000_0100;
    }
}

/// Commanded yaw/pitch/roll/throttle for a single tick
///
/// Axis values are informally in `[-1, 1]`. Roll is positive to the right,
/// pitch positive forward, throttle positive up and yaw positive clockwise
/// seen from above.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlVector {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
    pub throttle: f32,
    /// Optional speed scalar chosen by the operator
    pub speed: f32,
    pub triggers: Triggers,
}

impl ControlVector {
    /// All axes zero, no triggers.
    pub const fn neutral() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            throttle: 0.0,
            speed: 0.0,
            triggers: Triggers::empty(),
        }
    }

    pub const fn new(yaw: f32, pitch: f32, roll: f32, throttle: f32) -> Self {
        Self {
            yaw,
            pitch,
            roll,
            throttle,
            speed: 0.0,
            triggers: Triggers::empty(),
        }
    }

    pub fn with_triggers(mut self, triggers: Triggers) -> Self {
        self.triggers = triggers;
        self
    }

    pub fn take_off(&self) -> bool {
        self.triggers.contains(Triggers::TAKE_OFF)
    }

    pub fn land(&self) -> bool {
        self.triggers.contains(Triggers::LAND)
    }

    pub fn toggle_autopilot(&self) -> bool {
        self.triggers.contains(Triggers::TOGGLE_AUTOPILOT)
    }

    /// True when the operator is doing anything that should preempt an
    /// override: a non-zero axis, take-off or land.
    ///
    /// The autopilot toggle and the speed scalar do not count.
    pub fn has_input(&self) -> bool {
        self.yaw != 0.0
            || self.pitch != 0.0
            || self.roll != 0.0
            || self.throttle != 0.0
            || self.triggers.intersects(Triggers::TAKE_OFF | Triggers::LAND)
    }

    /// Copy of the axes with every trigger cleared.
    pub fn without_triggers(&self) -> Self {
        Self {
            triggers: Triggers::empty(),
            ..*self
        }
    }
}
