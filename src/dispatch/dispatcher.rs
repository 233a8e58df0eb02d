/// Dispatcher implementation
///
/// Holds the frozen registry and turns each Request into a Response:
/// lookup, schema validation, handler invocation, outcome wrapping. There
/// are no retries; the handler runs at most once per request.

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::dispatch::{DispatchError, ExecutionContext, Outcome, Request, Response, ToolError};
use crate::domain::validate;
use crate::registry::ToolRegistry;

#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    /// Create a dispatcher over a registry
    ///
    /// The registry is shared without locks, so callers are expected to
    /// have frozen it already.
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        if !registry.is_frozen() {
            warn!("Dispatcher created over a registry that is not frozen");
        }
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Dispatch with a context that is never cancelled
    pub async fn dispatch(&self, request: Request) -> Response {
        let ctx = ExecutionContext::detached(request.id.clone());
        self.dispatch_with_context(request, ctx).await
    }

    /// Dispatch a request, passing `ctx` through to the handler
    pub async fn dispatch_with_context(&self, request: Request, ctx: ExecutionContext) -> Response {
        let Request { id, tool_name, arguments } = request;

        let Some(tool) = self.registry.lookup(&tool_name) else {
            debug!("Request {} names unknown tool '{}'", id, tool_name);
            return Response {
                id,
                outcome: Outcome::Failure(DispatchError::ToolNotFound(tool_name)),
            };
        };

        if let Err(e) = validate(tool.parameters(), &arguments) {
            debug!("Request {} rejected by schema of '{}': {}", id, tool_name, e);
            return Response {
                id,
                outcome: Outcome::Failure(e.into()),
            };
        }

        debug!("Invoking '{}' for request {}", tool_name, id);
        let call = tool.handler().call(arguments, ctx);

        let outcome = match AssertUnwindSafe(call).catch_unwind().await {
            Ok(Ok(output)) => Outcome::Success(output),
            Ok(Err(e)) => {
                if matches!(e, ToolError::Cancelled) {
                    debug!("Tool '{}' stopped after cancellation of request {}", tool_name, id);
                } else {
                    warn!("Tool '{}' failed for request {}: {}", tool_name, id, e);
                }
                Outcome::Failure(DispatchError::HandlerFailure(e.to_string()))
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                warn!("Tool '{}' panicked for request {}: {}", tool_name, id, message);
                Outcome::Failure(DispatchError::HandlerFailure(format!("tool panicked: {}", message)))
            }
        };

        Response { id, outcome }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
