/// Tool for greeting someone by name
///
/// This module implements the hello_world MCP tool.

use crate::dispatch::{ExecutionContext, ToolError, ToolOutput};
use crate::domain::{Arguments, ParamType, ParameterSpec};
use crate::registry::{RegistryError, ToolRegistry};

pub const HELLO_WORLD: &str = "hello_world";

/// Parameter schema: a single required `name`
pub fn hello_world_parameters() -> Vec<ParameterSpec> {
    vec![ParameterSpec::required("name", ParamType::String, "Person's name")]
}

/// Build the greeting for a validated argument set
pub async fn greet(args: Arguments, _ctx: ExecutionContext) -> Result<ToolOutput, ToolError> {
    let name = args.str("name")?;
    Ok(ToolOutput::text(format!("Hello, {}!", name)))
}

pub fn register(registry: &mut ToolRegistry) -> Result<(), RegistryError> {
    registry.register_tool(HELLO_WORLD, "Greet someone", hello_world_parameters(), greet)
}
