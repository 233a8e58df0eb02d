/// Test harness: a server running on one side of a pair of duplex pipes
use hello_world_mcp::*;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines};
use tokio::task::JoinHandle;

pub struct TestClient {
    input: Option<DuplexStream>,
    output: Lines<BufReader<DuplexStream>>,
    pub server: JoinHandle<Result<(), ServerError>>,
}

impl TestClient {
    /// Start serving `registry` and connect a client to it
    pub fn start(registry: ToolRegistry, config: ServerConfig) -> Self {
        let (client_in, server_in) = tokio::io::duplex(64 * 1024);
        let (server_out, client_out) = tokio::io::duplex(64 * 1024);

        let server = Arc::new(McpServer::new(registry, config));
        let handle = tokio::spawn(async move { server.serve(server_in, server_out).await });

        Self {
            input: Some(client_in),
            output: BufReader::new(client_out).lines(),
            server: handle,
        }
    }

    /// Server with only the built-in tools
    pub fn builtin(config: ServerConfig) -> Self {
        let mut registry = ToolRegistry::new();
        hello_world_mcp::tools::register_builtin_tools(&mut registry).expect("register built-ins");
        Self::start(registry, config)
    }

    pub async fn send_raw(&mut self, line: &str) {
        let input = self.input.as_mut().expect("input still open");
        input.write_all(line.as_bytes()).await.expect("write frame");
        input.write_all(b"\n").await.expect("write newline");
    }

    pub async fn send(&mut self, message: Value) {
        self.send_raw(&message.to_string()).await;
    }

    pub async fn request(&mut self, id: i64, method: &str, params: Value) {
        self.send(json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}))
            .await;
    }

    pub async fn notify(&mut self, method: &str, params: Value) {
        self.send(json!({"jsonrpc": "2.0", "method": method, "params": params}))
            .await;
    }

    pub async fn call_tool(&mut self, id: i64, name: &str, arguments: Value) {
        self.request(id, "tools/call", json!({"name": name, "arguments": arguments}))
            .await;
    }

    /// Next response frame, parsed; panics if the frame is not complete JSON
    pub async fn recv(&mut self) -> Value {
        let line = tokio::time::timeout(std::time::Duration::from_secs(5), self.output.next_line())
            .await
            .expect("response within timeout")
            .expect("read response")
            .expect("server closed output");
        serde_json::from_str(&line).unwrap_or_else(|e| panic!("corrupt frame {:?}: {}", line, e))
    }

    /// Close the client's side of the input stream
    pub fn close_input(&mut self) {
        self.input.take();
    }

    /// Close input and wait for the server to finish
    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        self.close_input();
        self.server.await.expect("server task")
    }
}

pub fn text_of(response: &Value) -> &str {
    response["result"]["content"][0]["text"]
        .as_str()
        .expect("text content")
}
