//! PID profile parameter definitions
//!
//! One gain per style, axis and term, named `<STYLE>_<AXIS>_<TERM>`:
//! styles `LIN`, `NLIN`, `INST`; axes `X`, `Y`, `Z`, `YAW`; terms `P`, `I`,
//! `D`. For example `LIN_X_P` or `NLIN_YAW_D`.

use core::fmt::Write;

use heapless::String;

use super::error::ParameterError;
use super::load_float;
use super::storage::{ParamValue, ParameterStore, PARAM_NAME_LEN};
use crate::autopilot::{AxisGains, PidProfiles, TranslationStyle};
use crate::control::PidGains;

const MIN_GAIN: f32 = 0.0;
const MAX_GAIN: f32 = 100.0;

const AXES: [Axis; 4] = [Axis::X, Axis::Y, Axis::Z, Axis::Yaw];
const TERMS: [Term; 3] = [Term::P, Term::I, Term::D];

#[derive(Clone, Copy)]
enum Axis {
    X,
    Y,
    Z,
    Yaw,
}

#[derive(Clone, Copy)]
enum Term {
    P,
    I,
    D,
}

fn style_prefix(style: TranslationStyle) -> &'static str {
    match style {
        TranslationStyle::Linear => "LIN",
        TranslationStyle::NonLinear => "NLIN",
        TranslationStyle::Instant => "INST",
    }
}

fn param_name(style: TranslationStyle, axis: Axis, term: Term) -> Result<String<PARAM_NAME_LEN>, ParameterError> {
    let axis = match axis {
        Axis::X => "X",
        Axis::Y => "Y",
        Axis::Z => "Z",
        Axis::Yaw => "YAW",
    };
    let term = match term {
        Term::P => "P",
        Term::I => "I",
        Term::D => "D",
    };
    let mut name = String::new();
    write!(name, "{}_{}_{}", style_prefix(style), axis, term)
        .map_err(|_| ParameterError::NameTooLong)?;
    Ok(name)
}

fn axis_gains(gains: &mut AxisGains, axis: Axis) -> &mut PidGains {
    match axis {
        Axis::X => &mut gains.x,
        Axis::Y => &mut gains.y,
        Axis::Z => &mut gains.z,
        Axis::Yaw => &mut gains.yaw,
    }
}

fn term(gains: &mut PidGains, term: Term) -> &mut f32 {
    match term {
        Term::P => &mut gains.kp,
        Term::I => &mut gains.ki,
        Term::D => &mut gains.kd,
    }
}

/// PID gains for every translation style
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PidProfileParams {
    pub profiles: PidProfiles,
}

impl PidProfileParams {
    /// Register all gain parameters with default values
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        let defaults = PidProfiles::default();
        for style in TranslationStyle::ALL {
            let mut gains = defaults.get(style);
            for axis in AXES {
                let pid = axis_gains(&mut gains, axis);
                for t in TERMS {
                    let name = param_name(style, axis, t)?;
                    store.register(&name, ParamValue::Float(*term(pid, t)))?;
                }
            }
        }
        Ok(())
    }

    /// Load gains from the store, clamped to `[0, 100]`
    pub fn from_store(store: &ParameterStore) -> Self {
        let mut profiles = PidProfiles::default();
        for style in TranslationStyle::ALL {
            let mut gains = profiles.get(style);
            for axis in AXES {
                let pid = axis_gains(&mut gains, axis);
                for t in TERMS {
                    let Ok(name) = param_name(style, axis, t) else {
                        continue;
                    };
                    let value = term(pid, t);
                    *value = load_float(store, &name, *value, MIN_GAIN, MAX_GAIN);
                }
            }
            profiles.set(style, gains);
        }
        Self { profiles }
    }

    /// Write one style's gains back into the store
    pub fn store_gains(
        store: &mut ParameterStore,
        style: TranslationStyle,
        gains: &AxisGains,
    ) -> Result<(), ParameterError> {
        let mut gains = *gains;
        for axis in AXES {
            let pid = axis_gains(&mut gains, axis);
            for t in TERMS {
                let name = param_name(style, axis, t)?;
                store.set(&name, ParamValue::Float(*term(pid, t)))?;
            }
        }
        Ok(())
    }

    pub fn to_profiles(&self) -> PidProfiles {
        self.profiles
    }
}
