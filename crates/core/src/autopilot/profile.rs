//! Motion profiles and their PID gain sets

use core::fmt;

use crate::control::PidGains;

/// How the guide pose advances toward the target
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TranslationStyle {
    /// Interpolate from the leg start, paced by distance actually covered
    #[default]
    Linear,
    /// Close a fixed fraction of the remaining gap each second
    NonLinear,
    /// Jump the guide pose straight to the target
    Instant,
}

impl TranslationStyle {
    pub const ALL: [TranslationStyle; 3] = [
        TranslationStyle::Linear,
        TranslationStyle::NonLinear,
        TranslationStyle::Instant,
    ];

    /// Numeric code used in parameter storage.
    pub fn code(self) -> i32 {
        match self {
            TranslationStyle::Linear => 0,
            TranslationStyle::NonLinear => 1,
            TranslationStyle::Instant => 2,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(TranslationStyle::Linear),
            1 => Some(TranslationStyle::NonLinear),
            2 => Some(TranslationStyle::Instant),
            _ => None,
        }
    }
}

impl fmt::Display for TranslationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TranslationStyle::Linear => "linear",
            TranslationStyle::NonLinear => "non-linear",
            TranslationStyle::Instant => "instant",
        };
        f.write_str(name)
    }
}

/// Gains for the four navigation axes
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisGains {
    /// Right/left offset, drives roll
    pub x: PidGains,
    /// Vertical offset, drives throttle
    pub y: PidGains,
    /// Forward/back offset, drives pitch
    pub z: PidGains,
    pub yaw: PidGains,
}

impl Default for AxisGains {
    fn default() -> Self {
        let translation = PidGains::new(0.1, 0.0, 0.0);
        Self {
            x: translation,
            y: translation,
            z: translation,
            yaw: PidGains::default(),
        }
    }
}

/// One gain set per translation style
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct PidProfiles {
    pub linear: AxisGains,
    pub non_linear: AxisGains,
    pub instant: AxisGains,
}

impl PidProfiles {
    pub fn get(&self, style: TranslationStyle) -> AxisGains {
        match style {
            TranslationStyle::Linear => self.linear,
            TranslationStyle::NonLinear => self.non_linear,
            TranslationStyle::Instant => self.instant,
        }
    }

    pub fn set(&mut self, style: TranslationStyle, gains: AxisGains) {
        match style {
            TranslationStyle::Linear => self.linear = gains,
            TranslationStyle::NonLinear => self.non_linear = gains,
            TranslationStyle::Instant => self.instant = gains,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_gains() {
        let gains = AxisGains::default();
        assert_eq!(gains.x, PidGains::new(0.1, 0.0, 0.0));
        assert_eq!(gains.z, PidGains::new(0.1, 0.0, 0.0));
        assert_eq!(gains.yaw, PidGains::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_style_codes_round_trip() {
        for style in TranslationStyle::ALL {
            assert_eq!(TranslationStyle::from_code(style.code()), Some(style));
        }
        assert_eq!(TranslationStyle::from_code(7), None);
    }

    #[test]
    fn test_profiles_set_only_touches_one_style() {
        let mut profiles = PidProfiles::default();
        let mut fast = AxisGains::default();
        fast.x = PidGains::new(0.8, 0.01, 0.2);
        profiles.set(TranslationStyle::Instant, fast);
        assert_eq!(profiles.get(TranslationStyle::Instant).x.kp, 0.8);
        assert_eq!(profiles.get(TranslationStyle::Linear), AxisGains::default());
    }
}
