//! Flight lifecycle states

use core::fmt;

/// Discrete aircraft lifecycle state
///
/// Progresses PreLaunch, PrimingProps, Launching, Flying, Landing and
/// returns to PreLaunch only once the aircraft is down with motors stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FlightStatus {
    /// On the ground, motors off
    #[default]
    PreLaunch,
    /// Motors spinning on the ground
    PrimingProps,
    /// Take-off commanded, waiting for the driver to report airborne
    Launching,
    /// Airborne and accepting commands
    Flying,
    /// Land commanded, waiting for touchdown and motor stop
    Landing,
}

impl FlightStatus {
    /// Whether the aircraft accepts a take-off command in this state.
    pub fn can_take_off(self) -> bool {
        matches!(self, FlightStatus::PreLaunch | FlightStatus::PrimingProps)
    }

    /// Whether the aircraft accepts a land command in this state.
    pub fn can_land(self) -> bool {
        matches!(
            self,
            FlightStatus::PrimingProps | FlightStatus::Launching | FlightStatus::Flying
        )
    }

    pub fn is_airborne(self) -> bool {
        matches!(
            self,
            FlightStatus::Launching | FlightStatus::Flying | FlightStatus::Landing
        )
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlightStatus::PreLaunch => "PreLaunch",
            FlightStatus::PrimingProps => "PrimingProps",
            FlightStatus::Launching => "Launching",
            FlightStatus::Flying => "Flying",
            FlightStatus::Landing => "Landing",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_prelaunch() {
        assert_eq!(FlightStatus::default(), FlightStatus::PreLaunch);
    }

    #[test]
    fn test_take_off_allowed_only_on_ground() {
        assert!(FlightStatus::PreLaunch.can_take_off());
        assert!(FlightStatus::PrimingProps.can_take_off());
        assert!(!FlightStatus::Launching.can_take_off());
        assert!(!FlightStatus::Flying.can_take_off());
        assert!(!FlightStatus::Landing.can_take_off());
    }

    #[test]
    fn test_land_not_allowed_before_props_or_twice() {
        assert!(!FlightStatus::PreLaunch.can_land());
        assert!(FlightStatus::Flying.can_land());
        assert!(!FlightStatus::Landing.can_land());
    }

    #[test]
    fn test_display() {
        extern crate std;
        use std::string::ToString;
        assert_eq!(FlightStatus::PrimingProps.to_string(), "PrimingProps");
    }
}
