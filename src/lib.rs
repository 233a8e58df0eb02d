/// Public library interface for the Hello World MCP server
///
/// This module exports the tool registry, the request dispatcher and the
/// MCP transport loop, plus a small facade that wires them together the
/// way the binary does.

use thiserror::Error;

// Internal modules
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod mcp;
pub mod registry;
pub mod tools;

// Re-export public modules and types
pub use config::ServerConfig;
pub use dispatch::{
    DispatchError, Dispatcher, ExecutionContext, Outcome, Request, Response, ToolError, ToolOutput,
};
pub use domain::{validate, Arguments, ParamType, ParameterSpec, ValidationError};
pub use mcp::protocol::RequestId;
pub use mcp::McpServer;
pub use registry::{RegistryError, Tool, ToolHandler, ToolRegistry};

/// Errors that end the server process
#[derive(Error, Debug)]
pub enum ServerError {
    /// Startup misconfiguration of the tool registry
    #[error("Tool registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Unrecoverable failure of the input or output stream
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),
}

/// Greeting server: the built-in tools plus any extra tools registered
/// before serving starts
///
/// Registration happens on a mutable builder; `run` consumes it, freezes the
/// registry and serves until the input stream closes.
pub struct HelloWorldServer {
    registry: ToolRegistry,
    config: ServerConfig,
}

impl HelloWorldServer {
    /// Create a server with the built-in tools registered
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        tracing::info!("Initializing {} v{}", config.name, config.version);

        let mut registry = ToolRegistry::new();
        tools::register_builtin_tools(&mut registry)?;

        Ok(Self { registry, config })
    }

    /// Register an additional tool; fails on duplicate names
    pub fn register(&mut self, tool: Tool) -> Result<(), ServerError> {
        self.registry.register(tool)?;
        Ok(())
    }

    /// Get a reference to the registry (useful for testing)
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Freeze the registry and build the MCP server
    pub fn into_mcp_server(self) -> McpServer {
        tracing::info!("Server ready with {} tools", self.registry.len());
        McpServer::new(self.registry, self.config)
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// This method will block until stdin is closed or an I/O error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        self.into_mcp_server().run().await
    }
}
