//! quadpilot_core - no_std flight logic for waypoint-flying quadcopters
//!
//! This crate holds the platform-agnostic part of the flight stack: command
//! arbitration between a manual pilot and an autopilot, a guide-pose PID
//! navigator, and waypoint missions. Aircraft, pilots and clocks are
//! injected through traits so everything runs on the host.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives
//! - **Pure no_std**: Bounded `heapless` collections, no allocation
//! - **Trait abstractions**: Aircraft, command sources and time injected via traits
//!
//! # Modules
//!
//! - [`control`]: PID controller and the command vector
//! - [`navigation`]: Poses, waypoints, yaw wrapping and the headless transform
//! - [`events`]: Bounded subscriber lists
//! - [`quad`]: Flight status machine, driver trait and override arbitration
//! - [`autopilot`]: Guide-pose PID navigator and its events
//! - [`mission`]: Waypoint missions driven by autopilot events
//! - [`flight`]: Per-aircraft context tying the pieces together
//! - [`parameters`]: Parameter store and typed navigator/gain parameters
//! - [`traits`]: Time source and tick pacing
//! - [`testing`]: Mock driver and pilot for host tests
//! - [`logging`]: `log_*` macros

#![no_std]

pub mod autopilot;
pub mod control;
pub mod events;
pub mod flight;
pub mod logging;
pub mod mission;
pub mod navigation;
pub mod parameters;
pub mod quad;
pub mod testing;
pub mod traits;

pub use flight::FlightController;
