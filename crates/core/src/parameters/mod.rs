//! Runtime configuration
//!
//! Flight tuning lives in a [`ParameterStore`]. Each consumer registers its
//! defaults, then reads a typed snapshot (`from_store`) that clamps every
//! value into its valid range and converts to the runtime config type.

pub mod error;
pub mod navigator;
pub mod pid;
pub mod storage;

pub use error::ParameterError;
pub use navigator::NavigatorParams;
pub use pid::PidProfileParams;
pub use storage::{ParamValue, ParameterStore, MAX_PARAMS, PARAM_NAME_LEN};

/// Load a float parameter from store with clamping
pub(crate) fn load_float(store: &ParameterStore, name: &str, default: f32, min: f32, max: f32) -> f32 {
    match store.get(name) {
        Some(ParamValue::Float(v)) if v.is_finite() => v.clamp(min, max),
        Some(ParamValue::Int(v)) => (*v as f32).clamp(min, max),
        _ => default,
    }
}

/// Load an integer parameter, falling back to `default` for other types
pub(crate) fn load_int(store: &ParameterStore, name: &str, default: i32) -> i32 {
    match store.get(name) {
        Some(ParamValue::Int(v)) => *v,
        _ => default,
    }
}

pub(crate) fn load_bool(store: &ParameterStore, name: &str, default: bool) -> bool {
    match store.get(name) {
        Some(ParamValue::Bool(v)) => *v,
        Some(ParamValue::Int(v)) => *v != 0,
        _ => default,
    }
}
