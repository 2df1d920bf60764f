//! Navigator parameter definitions
//!
//! # Parameters
//!
//! - `NAV_ARRIVE_DIST` - Distance to the target that counts as arrived
//! - `NAV_LIN_SPEED` - Leg fraction per second for the linear profile
//! - `NAV_NLIN_SPEED` - Gap fraction per second for the non-linear profile
//! - `NAV_TRACK_JUMP` - Per-axis pose jump between frames treated as lost tracking
//! - `NAV_STYLE` - Translation style (0 linear, 1 non-linear, 2 instant)
//! - `NAV_HEADLESS` - Interpret manual input in the field frame

use super::error::ParameterError;
use super::storage::{ParamValue, ParameterStore};
use super::{load_bool, load_float, load_int};
use crate::autopilot::{NavigatorConfig, TranslationStyle};
use crate::quad::DEFAULT_TRACK_JUMP_LIMIT;

// --- Defaults ---

const DEFAULT_ARRIVAL_DIST: f32 = 0.15;
const DEFAULT_LINEAR_SPEED: f32 = 0.5;
const DEFAULT_NON_LINEAR_SPEED: f32 = 0.5;

// --- Ranges ---

const MIN_ARRIVAL_DIST: f32 = 0.01;
const MAX_ARRIVAL_DIST: f32 = 5.0;

const MIN_SPEED: f32 = 0.01;
const MAX_SPEED: f32 = 10.0;

const MIN_TRACK_JUMP: f32 = 0.1;
const MAX_TRACK_JUMP: f32 = 100.0;

/// Navigator parameters loaded from parameter store
#[derive(Debug, Clone, PartialEq)]
pub struct NavigatorParams {
    pub arrival_dist: f32,
    pub linear_speed: f32,
    pub non_linear_speed: f32,
    pub track_jump: f32,
    pub style: TranslationStyle,
    pub headless: bool,
}

impl Default for NavigatorParams {
    fn default() -> Self {
        Self {
            arrival_dist: DEFAULT_ARRIVAL_DIST,
            linear_speed: DEFAULT_LINEAR_SPEED,
            non_linear_speed: DEFAULT_NON_LINEAR_SPEED,
            track_jump: DEFAULT_TRACK_JUMP_LIMIT,
            style: TranslationStyle::default(),
            headless: false,
        }
    }
}

impl NavigatorParams {
    /// Register navigator parameters with default values
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        store.register("NAV_ARRIVE_DIST", ParamValue::Float(DEFAULT_ARRIVAL_DIST))?;
        store.register("NAV_LIN_SPEED", ParamValue::Float(DEFAULT_LINEAR_SPEED))?;
        store.register("NAV_NLIN_SPEED", ParamValue::Float(DEFAULT_NON_LINEAR_SPEED))?;
        store.register("NAV_TRACK_JUMP", ParamValue::Float(DEFAULT_TRACK_JUMP_LIMIT))?;
        store.register(
            "NAV_STYLE",
            ParamValue::Int(TranslationStyle::default().code()),
        )?;
        store.register("NAV_HEADLESS", ParamValue::Bool(false))?;
        Ok(())
    }

    /// Load navigator parameters from parameter store
    ///
    /// Out-of-range values are clamped; an unknown style code falls back to
    /// linear.
    pub fn from_store(store: &ParameterStore) -> Self {
        let style_code = load_int(store, "NAV_STYLE", TranslationStyle::default().code());
        Self {
            arrival_dist: load_float(
                store,
                "NAV_ARRIVE_DIST",
                DEFAULT_ARRIVAL_DIST,
                MIN_ARRIVAL_DIST,
                MAX_ARRIVAL_DIST,
            ),
            linear_speed: load_float(
                store,
                "NAV_LIN_SPEED",
                DEFAULT_LINEAR_SPEED,
                MIN_SPEED,
                MAX_SPEED,
            ),
            non_linear_speed: load_float(
                store,
                "NAV_NLIN_SPEED",
                DEFAULT_NON_LINEAR_SPEED,
                MIN_SPEED,
                MAX_SPEED,
            ),
            track_jump: load_float(
                store,
                "NAV_TRACK_JUMP",
                DEFAULT_TRACK_JUMP_LIMIT,
                MIN_TRACK_JUMP,
                MAX_TRACK_JUMP,
            ),
            style: TranslationStyle::from_code(style_code).unwrap_or_default(),
            headless: load_bool(store, "NAV_HEADLESS", false),
        }
    }

    /// Convert to the autopilot's `NavigatorConfig`
    pub fn to_config(&self) -> NavigatorConfig {
        NavigatorConfig {
            arrival_threshold: self.arrival_dist,
            linear_speed: self.linear_speed,
            non_linear_speed: self.non_linear_speed,
        }
    }
}
