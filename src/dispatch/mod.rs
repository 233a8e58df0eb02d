/// Request dispatch: resolve a tool, validate its arguments, run its handler
///
/// Every request produces exactly one Response. Request-level failures
/// (unknown tool, bad arguments, handler failure) are carried inside the
/// Response and never escape as Rust errors, so one bad call cannot take
/// down the session.

pub mod context;
pub mod dispatcher;

pub use context::*;
pub use dispatcher::*;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::{ArgumentError, Arguments, ValidationError};
use crate::mcp::protocol::RequestId;

/// Failure reported by a tool handler itself
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("{0}")]
    Execution(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ArgumentError),

    #[error("request was cancelled")]
    Cancelled,
}

impl ToolError {
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }
}

/// Why a request did not produce a successful result
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    /// No tool with the requested name is registered
    #[error("tool '{0}' not found")]
    ToolNotFound(String),

    /// Arguments failed the tool's schema; the handler never ran
    #[error("invalid arguments: {0}")]
    Validation(#[from] ValidationError),

    /// The handler returned an error or panicked
    #[error("{0}")]
    HandlerFailure(String),
}

impl DispatchError {
    /// Stable kind tag used on the wire and in logs
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::ToolNotFound(_) => "ToolNotFound",
            DispatchError::Validation(e) => e.kind(),
            DispatchError::HandlerFailure(_) => "HandlerFailure",
        }
    }
}

/// Successful handler result
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Plain UTF-8 text
    Text(String),
    /// Nested key/value tree
    Structured(Value),
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn structured(value: Value) -> Self {
        Self::Structured(value)
    }

    /// Structured output from any serializable value
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ToolError> {
        serde_json::to_value(value)
            .map(Self::Structured)
            .map_err(|e| ToolError::execution(format!("failed to serialize result: {}", e)))
    }
}

/// Result of dispatching one request
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(ToolOutput),
    Failure(DispatchError),
}

impl Outcome {
    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }
}

/// A decoded `tools/call` request
#[derive(Debug, Clone)]
pub struct Request {
    pub id: RequestId,
    pub tool_name: String,
    pub arguments: Arguments,
}

impl Request {
    pub fn new(id: impl Into<RequestId>, tool_name: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            id: id.into(),
            tool_name: tool_name.into(),
            arguments,
        }
    }
}

/// The answer to one Request, correlated by id
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub id: RequestId,
    pub outcome: Outcome,
}

impl Response {
    pub fn is_error(&self) -> bool {
        self.outcome.is_error()
    }
}
