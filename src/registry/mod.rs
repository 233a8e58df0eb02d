/// Tool registry: the set of tools a server exposes
///
/// Tools are registered once during startup. When serving begins the
/// registry is frozen and shared read-only between concurrently running
/// dispatch tasks, so lookups never take a lock.

pub mod tool;
pub mod tool_registry;

// Re-export the main registry types
pub use tool::*;
pub use tool_registry::*;

use async_trait::async_trait;
use thiserror::Error;

use crate::dispatch::{ExecutionContext, ToolError, ToolOutput};
use crate::domain::Arguments;

/// Startup-time registry misconfiguration
///
/// Both variants are fatal: the server refuses to start serving with a
/// registry that could not be built as requested.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("a tool named '{0}' is already registered")]
    DuplicateName(String),

    #[error("cannot register '{0}': registry is frozen")]
    RegistryFrozen(String),
}

/// Business logic behind a tool
///
/// The dispatcher calls this with arguments that already passed schema
/// validation. Handlers should poll `ctx` for cancellation at their own
/// suspension points; nothing stops a handler that ignores it.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, args: Arguments, ctx: ExecutionContext) -> Result<ToolOutput, ToolError>;
}
