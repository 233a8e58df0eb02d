/// Integration tests driving the MCP transport loop over in-memory streams
mod common;
mod concurrency;
