/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the transport loop that:
/// 1. Reads newline-delimited JSON-RPC frames from the input stream
/// 2. Answers lifecycle methods and routes `tools/call` to the Dispatcher
/// 3. Writes each response as one frame through a single writer task
///
/// In concurrent mode each tool call runs as its own task and the loop keeps
/// reading while handlers execute; responses may then arrive out of order
/// and are matched up by id. In sequential mode every request is finished
/// before the next frame is read.

use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::dispatch::{CancelHandle, Dispatcher, ExecutionContext, Request};
use crate::domain::Arguments;
use crate::mcp::encoder::{encode, encode_result};
use crate::mcp::protocol::*;
use crate::mcp::transport::{decode, write_frames, FrameReader, Incoming};
use crate::registry::ToolRegistry;
use crate::ServerError;

/// Responses waiting for the writer task
const OUTBOUND_QUEUE: usize = 256;

/// MCP server over a frozen tool registry
pub struct McpServer {
    dispatcher: Dispatcher,
    config: ServerConfig,
}

impl McpServer {
    /// Create a server, freezing the registry
    ///
    /// No tool can be added once this returns.
    pub fn new(mut registry: ToolRegistry, config: ServerConfig) -> Self {
        registry.freeze();
        Self {
            dispatcher: Dispatcher::new(Arc::new(registry)),
            config,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serve over stdin/stdout until stdin closes
    pub async fn run(&self) -> Result<(), ServerError> {
        info!("Starting MCP server, waiting for JSON-RPC requests...");
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve one session over an arbitrary pair of byte streams
    ///
    /// Returns `Ok(())` when the input reaches end of stream and every
    /// pending response has been written. A read or write failure on the
    /// streams ends the session with `ServerError::Transport`.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<(), ServerError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let session = Arc::new(Session::default());
        let permits = Arc::new(Semaphore::new(self.config.max_in_flight.max(1)));
        let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE);
        let mut writer_task = tokio::spawn(write_frames(writer, rx));
        let mut frames = FrameReader::new(BufReader::new(reader));
        let mut tasks = JoinSet::new();

        let read_result = loop {
            let frame = tokio::select! {
                frame = frames.next_frame() => frame,
                written = &mut writer_task => {
                    // We still hold a sender, so the writer can only have stopped on failure.
                    session.cancel_all();
                    tasks.abort_all();
                    let error = match writer_outcome(written) {
                        Err(e) => e,
                        Ok(()) => ServerError::Transport(std::io::Error::new(
                            std::io::ErrorKind::BrokenPipe,
                            "output stream closed",
                        )),
                    };
                    error!("Output stream failed: {}", error);
                    return Err(error);
                }
            };

            match frame {
                Ok(Some(frame)) => {
                    let scope = Scope {
                        tx: &tx,
                        session: &session,
                        permits: &permits,
                    };
                    self.handle_frame(&frame, scope, &mut tasks).await;
                }
                Ok(None) => {
                    info!("MCP server shutting down (input closed)");
                    break Ok(());
                }
                Err(e) => {
                    error!("Failed to read from input: {}", e);
                    break Err(e);
                }
            }

            while let Some(joined) = tasks.try_join_next() {
                log_join_failure(joined);
            }
        };

        // Transport closure cancels whatever is still running; their
        // responses are still written if the handlers return.
        let pending = session.cancel_all();
        if pending > 0 {
            info!("Waiting for {} in-flight requests", pending);
        }
        while let Some(joined) = tasks.join_next().await {
            log_join_failure(joined);
        }

        drop(tx);
        let written = writer_outcome(writer_task.await);

        read_result.map_err(ServerError::Transport)?;
        written
    }

    async fn handle_frame(&self, frame: &[u8], scope: Scope<'_>, tasks: &mut JoinSet<()>) {
        debug!("Processing frame: {}", String::from_utf8_lossy(frame));

        match decode(frame) {
            Ok(Incoming::Request(request)) => self.handle_request(request, scope, tasks).await,
            Ok(Incoming::Notification(notification)) => self.handle_notification(notification, scope.session),
            Ok(Incoming::Response(response)) => {
                debug!("Ignoring client response for {:?}", response.id);
            }
            Err(e) => {
                warn!("Skipping malformed frame: {}", e);
                send(scope.tx, e.to_response()).await;
            }
        }
    }

    /// Handle a JSON-RPC request
    async fn handle_request(&self, request: JsonRpcRequest, scope: Scope<'_>, tasks: &mut JoinSet<()>) {
        // decode() only yields Request for messages that carry an id.
        let Some(id) = request.id.clone() else {
            return;
        };

        let response = match request.method.as_str() {
            methods::INITIALIZE => self.handle_initialize(id, request.params),
            methods::PING => JsonRpcResponse::success(id, json!({})),
            methods::TOOLS_LIST => self.handle_tools_list(id),
            methods::TOOLS_CALL => match parse_tool_call(id, request.params) {
                Ok(call) => {
                    if !scope.session.initialized.load(Ordering::SeqCst) {
                        debug!("Tool call {} arrived before notifications/initialized", call.id);
                    }
                    self.submit(call, scope, tasks).await;
                    return;
                }
                Err(response) => response,
            },
            other => JsonRpcResponse::error(
                Some(id),
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", other),
                None,
            ),
        };

        send(scope.tx, response).await;
    }

    fn handle_notification(&self, notification: JsonRpcRequest, session: &Session) {
        match notification.method.as_str() {
            methods::INITIALIZED => {
                session.initialized.store(true, Ordering::SeqCst);
                info!("MCP client finished initialization");
            }
            methods::CANCELLED => {
                let params = notification
                    .params
                    .map(serde_json::from_value::<CancelledParams>);
                match params {
                    Some(Ok(params)) => {
                        let reason = params.reason.as_deref().unwrap_or("no reason given");
                        if session.cancel(&params.request_id) {
                            info!("Cancelling request {} ({})", params.request_id, reason);
                        } else {
                            debug!("Cancellation for unknown request {}", params.request_id);
                        }
                    }
                    Some(Err(e)) => warn!("Malformed cancellation notification: {}", e),
                    None => warn!("Cancellation notification without params"),
                }
            }
            other => debug!("Ignoring notification '{}'", other),
        }
    }

    /// Handle MCP initialization request
    fn handle_initialize(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: InitializeParams = match params.map(serde_json::from_value::<InitializeParams>).transpose() {
            Ok(params) => params.unwrap_or_default(),
            Err(e) => {
                return JsonRpcResponse::error(
                    Some(id),
                    error_codes::INVALID_PARAMS,
                    format!("Invalid initialize parameters: {}", e),
                    None,
                )
            }
        };

        if let Some(client) = &params.client_info {
            info!("MCP client connected: {} {}", client.name, client.version);
        } else {
            info!("MCP client connected");
        }

        let result = InitializeResult {
            protocol_version: negotiate_version(params.protocol_version.as_deref()).to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
            },
            server_info: ServerInfo {
                name: self.config.name.clone(),
                version: self.config.version.clone(),
            },
        };

        encode_result(id, &result)
    }

    /// Handle tools/list request
    fn handle_tools_list(&self, id: RequestId) -> JsonRpcResponse {
        let tools: Vec<ToolDefinition> = self
            .dispatcher
            .registry()
            .tools()
            .iter()
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                input_schema: tool.input_schema(),
            })
            .collect();

        encode_result(id, &json!({ "tools": tools }))
    }

    /// Run a tool call inline or hand it to its own task
    async fn submit(&self, request: Request, scope: Scope<'_>, tasks: &mut JoinSet<()>) {
        let (seq, ctx) = scope.session.track(request.id.clone());

        if !self.config.concurrent {
            let id = request.id.clone();
            let response = self.dispatcher.dispatch_with_context(request, ctx).await;
            scope.session.finish(&id, seq);
            send(scope.tx, encode(response)).await;
            return;
        }

        let dispatcher = self.dispatcher.clone();
        let tx = scope.tx.clone();
        let session = scope.session.clone();
        let permits = scope.permits.clone();

        tasks.spawn(async move {
            // The semaphore is never closed, so acquiring cannot fail.
            let _permit = permits.acquire_owned().await.ok();
            let id = request.id.clone();
            let response = dispatcher.dispatch_with_context(request, ctx).await;
            session.finish(&id, seq);
            send(&tx, encode(response)).await;
        });
    }
}

/// Per-frame view of the session's shared plumbing
#[derive(Clone, Copy)]
struct Scope<'a> {
    tx: &'a mpsc::Sender<JsonRpcResponse>,
    session: &'a Arc<Session>,
    permits: &'a Arc<Semaphore>,
}

/// State of one client session
#[derive(Default)]
struct Session {
    /// Cancellation handles of running tool calls, oldest first. A client
    /// may reuse an id while a call with it is still running, so each id maps
    /// to every call carrying it, tagged with a sequence number.
    in_flight: Mutex<HashMap<RequestId, Vec<(u64, CancelHandle)>>>,
    next_seq: AtomicU64,
    initialized: AtomicBool,
}

impl Session {
    fn track(&self, id: RequestId) -> (u64, ExecutionContext) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let (handle, ctx) = ExecutionContext::channel(id.clone());
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        let calls = in_flight.entry(id.clone()).or_default();
        if !calls.is_empty() {
            warn!("Request id {} reused while a request with that id is still running", id);
        }
        calls.push((seq, handle));
        (seq, ctx)
    }

    fn finish(&self, id: &RequestId, seq: u64) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(calls) = in_flight.get_mut(id) {
            calls.retain(|(s, _)| *s != seq);
            if calls.is_empty() {
                in_flight.remove(id);
            }
        }
    }

    /// Cancel the newest running call with this id; false if there is none
    fn cancel(&self, id: &RequestId) -> bool {
        let in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        match in_flight.get(id).and_then(|calls| calls.last()) {
            Some((_, handle)) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every running call, returning how many there were
    fn cancel_all(&self) -> usize {
        let in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        let mut count = 0;
        for (_, handle) in in_flight.values().flatten() {
            handle.cancel();
            count += 1;
        }
        count
    }
}

/// Turn `tools/call` params into a dispatcher Request
fn parse_tool_call(id: RequestId, params: Option<Value>) -> Result<Request, JsonRpcResponse> {
    let invalid = |id: RequestId, message: String| {
        Err(JsonRpcResponse::error(Some(id), error_codes::INVALID_PARAMS, message, None))
    };

    let Some(params) = params else {
        return invalid(id, "Missing parameters".to_string());
    };

    let params: ToolCallParams = match serde_json::from_value(params) {
        Ok(p) => p,
        Err(e) => return invalid(id, format!("Invalid parameters: {}", e)),
    };

    let arguments = match params.arguments {
        Value::Null => Arguments::new(),
        other => match Arguments::try_from(other) {
            Ok(arguments) => arguments,
            Err(_) => return invalid(id, "Tool arguments must be an object".to_string()),
        },
    };

    Ok(Request::new(id, params.name, arguments))
}

async fn send(tx: &mpsc::Sender<JsonRpcResponse>, response: JsonRpcResponse) {
    if tx.send(response).await.is_err() {
        debug!("Dropping response: writer has stopped");
    }
}

fn writer_outcome(joined: Result<std::io::Result<()>, JoinError>) -> Result<(), ServerError> {
    match joined {
        Ok(result) => result.map_err(ServerError::Transport),
        Err(e) => Err(ServerError::Transport(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("writer task failed: {}", e),
        ))),
    }
}

fn log_join_failure(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        if !e.is_cancelled() {
            error!("Dispatch task failed: {}", e);
        }
    }
}
