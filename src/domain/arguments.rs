/// Typed view over a request's untyped argument payload
///
/// Arguments arrive as a JSON object. Handlers read them through accessors
/// named after the declared ParamType, so a handler never has to match on
/// raw JSON itself. After validation, a required argument is guaranteed to
/// be present with the declared type and its accessor cannot fail.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::domain::{value_type_name, ParamType};

/// Raised when a handler asks for an argument that is absent or has another type
#[derive(Error, Debug, Clone, PartialEq)]
#[error("argument '{name}' is {found}, expected {expected}")]
pub struct ArgumentError {
    pub name: String,
    pub expected: ParamType,
    /// "missing" or the runtime type name of the value found
    pub found: String,
}

/// Argument mapping for one tool invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    /// Empty argument set
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Raw value for a key, if present
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert or replace a value, returning the previous one
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(name.into(), value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    pub fn str(&self, name: &str) -> Result<&str, ArgumentError> {
        self.typed(name, ParamType::String, Value::as_str)
    }

    /// Number as f64; integers outside the f64 range lose precision
    pub fn number(&self, name: &str) -> Result<f64, ArgumentError> {
        self.typed(name, ParamType::Number, Value::as_f64)
    }

    /// The JSON number itself, for handlers that care about integer precision
    pub fn raw_number(&self, name: &str) -> Result<&Number, ArgumentError> {
        self.typed(name, ParamType::Number, |v| match v {
            Value::Number(n) => Some(n),
            _ => None,
        })
    }

    pub fn bool(&self, name: &str) -> Result<bool, ArgumentError> {
        self.typed(name, ParamType::Boolean, Value::as_bool)
    }

    pub fn object(&self, name: &str) -> Result<&Map<String, Value>, ArgumentError> {
        self.typed(name, ParamType::Object, Value::as_object)
    }

    pub fn array(&self, name: &str) -> Result<&Vec<Value>, ArgumentError> {
        self.typed(name, ParamType::Array, Value::as_array)
    }

    /// Optional string: `Ok(None)` when absent, error only on a type mismatch
    pub fn opt_str(&self, name: &str) -> Result<Option<&str>, ArgumentError> {
        if self.contains(name) {
            self.str(name).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Optional boolean: `Ok(None)` when absent, error only on a type mismatch
    pub fn opt_bool(&self, name: &str) -> Result<Option<bool>, ArgumentError> {
        if self.contains(name) {
            self.bool(name).map(Some)
        } else {
            Ok(None)
        }
    }

    fn typed<'a, T>(
        &'a self,
        name: &str,
        expected: ParamType,
        extract: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<T, ArgumentError> {
        let value = self.0.get(name).ok_or_else(|| ArgumentError {
            name: name.to_string(),
            expected,
            found: "missing".to_string(),
        })?;

        extract(value).ok_or_else(|| ArgumentError {
            name: name.to_string(),
            expected,
            found: value_type_name(value).to_string(),
        })
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Arguments {
    type Error = Value;

    /// Accepts a JSON object; anything else is handed back unchanged
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

impl FromIterator<(String, Value)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
