//! Platform seams for the flight core
//!
//! Traits here have no feature gates, and mock implementations are always
//! compiled so hosts can drive the core deterministically.

pub mod time;

pub use time::{MockTime, TickTimer, TimeSource};
