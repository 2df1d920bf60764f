//! Parameter storage
//!
//! A bounded, insertion-ordered map from parameter name to value. Every
//! parameter is registered once with its default; later writes must name a
//! registered parameter and keep its type. Integer writes to a float
//! parameter are widened.

use heapless::index_map::FnvIndexMap;
use heapless::String;

use super::error::ParameterError;

/// Longest accepted parameter name
pub const PARAM_NAME_LEN: usize = 16;

/// Store capacity
pub const MAX_PARAMS: usize = 64;

type Key = String<PARAM_NAME_LEN>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Int(i32),
    Float(f32),
}

impl ParamValue {
    /// Stable numeric tag of the value's type, as used on the wire
    pub fn type_id(&self) -> u8 {
        match self {
            ParamValue::Bool(_) => 1,
            ParamValue::Int(_) => 2,
            ParamValue::Float(_) => 3,
        }
    }

    /// Convert `value` to this value's type, if the types are compatible.
    fn coerce(&self, value: ParamValue) -> Option<ParamValue> {
        match (self, value) {
            (ParamValue::Float(_), ParamValue::Int(v)) => Some(ParamValue::Float(v as f32)),
            (current, v) if current.type_id() == v.type_id() => Some(v),
            _ => None,
        }
    }
}

/// Named flight parameters with registered defaults
#[derive(Debug, Default)]
pub struct ParameterStore {
    values: FnvIndexMap<Key, ParamValue, MAX_PARAMS>,
    /// Written since the last `clear_dirty`
    dirty: bool,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(name: &str) -> Result<Key, ParameterError> {
        let mut key = Key::new();
        key.push_str(name).map_err(|_| ParameterError::NameTooLong)?;
        Ok(key)
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(&Self::key(name).ok()?)
    }

    /// Overwrite a registered parameter.
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<(), ParameterError> {
        let key = Self::key(name)?;
        let slot = self
            .values
            .get_mut(&key)
            .ok_or(ParameterError::UnknownName)?;
        *slot = slot.coerce(value).ok_or(ParameterError::TypeMismatch)?;
        self.dirty = true;
        Ok(())
    }

    /// Add a parameter with its default. Registering an existing name keeps
    /// the current value.
    pub fn register(&mut self, name: &str, default: ParamValue) -> Result<(), ParameterError> {
        let key = Self::key(name)?;
        if self.values.contains_key(&key) {
            return Ok(());
        }
        self.values
            .insert(key, default)
            .map_err(|_| ParameterError::StoreFull)?;
        self.dirty = true;
        Ok(())
    }

    /// Names in registration order.
    pub fn iter_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    /// `(name, value)` pairs in registration order.
    pub fn iter_all(&self) -> impl Iterator<Item = (&str, ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
