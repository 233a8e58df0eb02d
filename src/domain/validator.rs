/// Schema validation for tool arguments
///
/// Runs before any handler is invoked. The check is a pure function of the
/// parameter schema and the argument payload, so validating the same input
/// twice always yields the same verdict.

use crate::domain::{value_type_name, Arguments, ParameterSpec, ValidationError};

/// Validate an argument payload against a tool's parameter schema
///
/// Parameters are checked in declaration order and the first failure is
/// returned. Keys that the schema does not mention are ignored so that
/// newer clients can send extra fields to older servers.
///
/// A present-but-null argument counts as a type mismatch rather than as
/// missing, for both required and optional parameters.
pub fn validate(schema: &[ParameterSpec], arguments: &Arguments) -> Result<(), ValidationError> {
    for param in schema {
        match arguments.get(&param.name) {
            None if param.required => {
                return Err(ValidationError::MissingRequiredField {
                    name: param.name.clone(),
                });
            }
            None => {}
            Some(value) if !param.param_type.matches(value) => {
                return Err(ValidationError::TypeMismatch {
                    name: param.name.clone(),
                    expected: param.param_type,
                    actual: value_type_name(value).to_string(),
                });
            }
            Some(_) => {}
        }
    }

    Ok(())
}
