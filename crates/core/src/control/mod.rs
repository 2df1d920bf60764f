//! Control primitives
//!
//! - [`pid`]: single-axis PID controller and gain sets
//! - [`vector`]: per-tick command vector and trigger flags

pub mod pid;
pub mod vector;

pub use pid::{PidController, PidGains};
pub use vector::{ControlVector, Triggers};
