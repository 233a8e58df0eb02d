/// Core types describing tool parameters
///
/// This module defines ParamType and ParameterSpec, the building blocks of a
/// tool's declared parameter schema. The schema is what the validator checks
/// incoming arguments against and what `tools/list` advertises to clients.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

/// Primitive type a tool parameter is declared with
///
/// These map one-to-one onto JSON Schema type names, which is how they are
/// rendered in `tools/list` and in validation error payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// UTF-8 text
    String,
    /// Any JSON number (integer or floating point)
    Number,
    /// true / false
    Boolean,
    /// Nested key/value object
    Object,
    /// Ordered list of values
    Array,
}

impl ParamType {
    /// JSON Schema name for this type
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Object => "object",
            ParamType::Array => "array",
        }
    }

    /// Check whether a runtime JSON value has this type
    ///
    /// No coercion happens here: the string "42" is not a Number and
    /// the number 1 is not a Boolean.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Number => value.is_number(),
            ParamType::Boolean => value.is_boolean(),
            ParamType::Object => value.is_object(),
            ParamType::Array => value.is_array(),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of the runtime type of a JSON value, as reported in TypeMismatch errors
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Declaration of a single tool parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Argument key the client must use
    pub name: String,
    /// Declared primitive type
    pub param_type: ParamType,
    /// Whether the argument must be present
    pub required: bool,
    /// Human-readable description shown to clients
    pub description: String,
}

impl ParameterSpec {
    /// Declare a required parameter
    pub fn required(name: impl Into<String>, param_type: ParamType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type,
            required: true,
            description: description.into(),
        }
    }

    /// Declare an optional parameter
    pub fn optional(name: impl Into<String>, param_type: ParamType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type,
            required: false,
            description: description.into(),
        }
    }
}

/// Render a parameter schema as the JSON Schema object MCP clients expect
///
/// Parameters keep their declared order in `required`; `properties` is a
/// JSON map and therefore serializes with sorted keys.
pub fn input_schema(params: &[ParameterSpec]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for param in params {
        properties.insert(
            param.name.clone(),
            json!({
                "type": param.param_type.as_str(),
                "description": param.description,
            }),
        );
        if param.required {
            required.push(Value::String(param.name.clone()));
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}
