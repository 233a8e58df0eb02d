/// Built-in MCP tools
///
/// Each tool lives in its own file and exposes a `register` function that
/// adds it to a ToolRegistry during startup.

pub mod hello;

pub use hello::*;

use crate::registry::{RegistryError, ToolRegistry};

/// Register every built-in tool
pub fn register_builtin_tools(registry: &mut ToolRegistry) -> Result<(), RegistryError> {
    hello::register(registry)?;
    Ok(())
}
