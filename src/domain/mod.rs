/// Domain module containing the tool parameter model and argument validation
///
/// This module defines how tools describe their parameters (ParameterSpec),
/// how handlers read arguments (Arguments), and the schema check that runs
/// before any handler is invoked.

pub mod arguments;
pub mod types;
pub mod validator;

// Re-export public types for easy access
pub use arguments::*;
pub use types::*;
pub use validator::*;

use thiserror::Error;

/// Errors produced when an argument payload fails its tool's schema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field '{name}'")]
    MissingRequiredField { name: String },

    #[error("field '{name}' must be {expected}, got {actual}")]
    TypeMismatch {
        name: String,
        expected: ParamType,
        actual: String,
    },
}

impl ValidationError {
    /// Name of the offending field
    pub fn field(&self) -> &str {
        match self {
            ValidationError::MissingRequiredField { name } => name,
            ValidationError::TypeMismatch { name, .. } => name,
        }
    }

    /// Stable kind tag used on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::MissingRequiredField { .. } => "MissingRequiredField",
            ValidationError::TypeMismatch { .. } => "TypeMismatch",
        }
    }
}
