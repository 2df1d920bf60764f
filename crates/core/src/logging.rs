//! Logging abstraction
//!
//! Unified logging macros for the flight core. They forward to the `log`
//! facade so the embedding application chooses the backend (stdout logger on
//! host, RTT or serial bridges on targets). With no logger installed every
//! call is a no-op.
//!
//! Illegal-state conditions (setting a target on an inactive autopilot,
//! double subscription, removing an override that was never registered) are
//! reported at `warn` level and never abort the tick.

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        ::log::info!(target: "quadpilot", $($arg)*);
    }};
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        ::log::warn!(target: "quadpilot", $($arg)*);
    }};
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        ::log::error!(target: "quadpilot", $($arg)*);
    }};
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        ::log::debug!(target: "quadpilot", $($arg)*);
    }};
}
