//! Host-side harness for `quadpilot_core`.
//!
//! Provides the pieces needed to fly the flight core off-target:
//!
//! - [`adapter`]: aircraft drivers, a point-mass simulator and a link
//!   driver for a real aircraft
//! - [`telemetry`]: latest-value telemetry hand-off between threads
//! - [`clock`]: simulated and wall-clock time sources
//! - [`input`]: scripted manual pilot
//! - [`config`]: JSON run configuration
//! - [`logger`]: stdout backend for the `log` facade

pub mod adapter;
pub mod clock;
pub mod config;
pub mod error;
pub mod input;
pub mod logger;
pub mod telemetry;

pub use adapter::{CommandLink, LinkQuadcopter, SimConfig, SimPhase, SimQuadcopter};
pub use clock::SitlClock;
pub use config::FlightConfig;
pub use error::SimulatorError;
pub use input::{ScriptStep, ScriptedPilot};
pub use telemetry::{TelemetryCell, TelemetryFrame};
