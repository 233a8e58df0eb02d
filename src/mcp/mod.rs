/// MCP protocol implementation
///
/// This module handles the Model Context Protocol communication,
/// including JSON-RPC framing, response encoding and the transport loop.

pub mod encoder;
pub mod protocol;
pub mod server;
pub mod transport;

// Re-export main types
pub use server::McpServer;
