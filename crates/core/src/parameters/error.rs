//! Parameter error types

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterError {
    /// No parameter registered under this name
    UnknownName,
    /// Name does not fit the store's key length
    NameTooLong,
    StoreFull,
    /// Value type differs from the registered default
    TypeMismatch,
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterError::UnknownName => write!(f, "unknown parameter"),
            ParameterError::NameTooLong => write!(f, "parameter name too long"),
            ParameterError::StoreFull => write!(f, "parameter store full"),
            ParameterError::TypeMismatch => write!(f, "parameter type does not match its default"),
        }
    }
}
