/// Tool record: name, description, parameter schema and handler
///
/// A Tool is immutable once built. Cloning is cheap because the handler
/// sits behind an Arc.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::dispatch::{ExecutionContext, ToolError, ToolOutput};
use crate::domain::{input_schema, Arguments, ParameterSpec};
use crate::registry::ToolHandler;

#[derive(Clone)]
pub struct Tool {
    name: String,
    description: String,
    parameters: Vec<ParameterSpec>,
    handler: Arc<dyn ToolHandler>,
}

impl Tool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Vec<ParameterSpec>,
        handler: Arc<dyn ToolHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler,
        }
    }

    /// Build a tool from an async closure
    ///
    /// ```ignore
    /// Tool::from_fn("echo", "Echo text", params, |args, _ctx| async move {
    ///     Ok(ToolOutput::text(args.str("text")?))
    /// });
    /// ```
    pub fn from_fn<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Vec<ParameterSpec>,
        handler: F,
    ) -> Self
    where
        F: Fn(Arguments, ExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolOutput, ToolError>> + Send + 'static,
    {
        Self::new(name, description, parameters, Arc::new(FnHandler(handler)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    pub fn handler(&self) -> &Arc<dyn ToolHandler> {
        &self.handler
    }

    /// JSON Schema for this tool's arguments, as advertised by `tools/list`
    pub fn input_schema(&self) -> Value {
        input_schema(&self.parameters)
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// Adapter that lets a plain async closure act as a ToolHandler
struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> ToolHandler for FnHandler<F>
where
    F: Fn(Arguments, ExecutionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ToolOutput, ToolError>> + Send + 'static,
{
    async fn call(&self, args: Arguments, ctx: ExecutionContext) -> Result<ToolOutput, ToolError> {
        (self.0)(args, ctx).await
    }
}
