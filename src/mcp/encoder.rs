/// Result/Error encoder: dispatcher outcomes to JSON-RPC responses
///
/// Deterministic and side-effect free. Handler failures stay inside a
/// normal `result` with `isError: true`; bad requests (unknown tool,
/// schema violations) become JSON-RPC errors tagged with a `kind`.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::dispatch::{DispatchError, Outcome, Response, ToolOutput};
use crate::domain::ValidationError;
use crate::mcp::protocol::{error_codes, JsonRpcResponse, RequestId, ToolCallResult};

/// Encode a dispatcher Response for the wire
pub fn encode(response: Response) -> JsonRpcResponse {
    encode_outcome(response.id, response.outcome)
}

pub fn encode_outcome(id: RequestId, outcome: Outcome) -> JsonRpcResponse {
    match outcome {
        Outcome::Success(output) => tool_result(id, tool_output(output)),
        Outcome::Failure(DispatchError::HandlerFailure(message)) => {
            tool_result(id, ToolCallResult::error(message))
        }
        Outcome::Failure(error) => {
            let message = error.to_string();
            JsonRpcResponse::error(Some(id), error_codes::INVALID_PARAMS, message, Some(error_data(&error)))
        }
    }
}

fn tool_output(output: ToolOutput) -> ToolCallResult {
    match output {
        ToolOutput::Text(text) => ToolCallResult::success(text),
        ToolOutput::Structured(value) => ToolCallResult::structured(value),
    }
}

fn tool_result(id: RequestId, result: ToolCallResult) -> JsonRpcResponse {
    encode_result(id, &result)
}

/// Wrap any serializable result in a success response
///
/// A result that fails to serialize becomes an internal error for the same id.
pub fn encode_result<T: Serialize>(id: RequestId, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => {
            warn!("Failed to encode result for request {}: {}", id, e);
            JsonRpcResponse::error(
                Some(id),
                error_codes::INTERNAL_ERROR,
                format!("Failed to encode result: {}", e),
                None,
            )
        }
    }
}

/// Structured `data` payload telling callers which kind of bad request this was
fn error_data(error: &DispatchError) -> Value {
    match error {
        DispatchError::ToolNotFound(tool) => json!({
            "kind": error.kind(),
            "tool": tool,
        }),
        DispatchError::Validation(ValidationError::MissingRequiredField { name }) => json!({
            "kind": error.kind(),
            "field": name,
        }),
        DispatchError::Validation(ValidationError::TypeMismatch { name, expected, actual }) => json!({
            "kind": error.kind(),
            "field": name,
            "expected": expected.as_str(),
            "actual": actual,
        }),
        DispatchError::HandlerFailure(message) => json!({
            "kind": error.kind(),
            "message": message,
        }),
    }
}
