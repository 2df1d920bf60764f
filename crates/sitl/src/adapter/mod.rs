//! Aircraft drivers for host runs.
//!
//! [`SimQuadcopter`] integrates a point-mass model with no link at all.
//! [`LinkQuadcopter`] drives a real aircraft through a [`CommandLink`] and
//! a telemetry cell fed from another thread.

pub mod link;
pub mod sim;

pub use link::{CommandLink, LinkQuadcopter, DEFAULT_STALE_TICKS};
pub use sim::{SimConfig, SimPhase, SimQuadcopter};
