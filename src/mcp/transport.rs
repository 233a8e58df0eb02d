/// Newline-delimited JSON framing over byte streams
///
/// One JSON-RPC message per line in each direction. Reading yields raw
/// frames; decoding a frame into a message is separate so that a malformed
/// frame can be rejected without disturbing the stream. All writes go
/// through a single writer task that owns the output stream, which keeps
/// concurrently finishing responses from interleaving.

use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::mcp::protocol::{error_codes, JsonRpcRequest, JsonRpcResponse, RequestId};

/// A frame that could not be turned into a JSON-RPC message
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("frame is not valid UTF-8")]
    InvalidUtf8,

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid JSON-RPC message: {reason}")]
    InvalidMessage { id: Option<RequestId>, reason: String },
}

impl DecodeError {
    /// The error response a client should see for this frame
    pub fn to_response(&self) -> JsonRpcResponse {
        match self {
            DecodeError::InvalidUtf8 | DecodeError::Json(_) => {
                JsonRpcResponse::error(None, error_codes::PARSE_ERROR, self.to_string(), None)
            }
            DecodeError::InvalidMessage { id, .. } => {
                JsonRpcResponse::error(id.clone(), error_codes::INVALID_REQUEST, self.to_string(), None)
            }
        }
    }
}

/// A decoded incoming frame
#[derive(Debug)]
pub enum Incoming {
    /// Has an id and expects exactly one response
    Request(JsonRpcRequest),
    /// No id; never answered
    Notification(JsonRpcRequest),
    /// A response from the client. We never send requests, so these are dropped.
    Response(JsonRpcResponse),
}

/// Reads newline-delimited frames from a buffered byte stream
pub struct FrameReader<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: AsyncBufRead + Unpin> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buf: Vec::new() }
    }

    /// Next non-blank frame without its line terminator, or `None` at end of stream
    ///
    /// A final line without a trailing newline still counts as a frame.
    pub async fn next_frame(&mut self) -> std::io::Result<Option<Vec<u8>>> {
        loop {
            self.buf.clear();
            let n = self.reader.read_until(b'\n', &mut self.buf).await?;
            if n == 0 {
                return Ok(None);
            }

            let frame = trim_line(&self.buf);
            if !frame.iter().all(u8::is_ascii_whitespace) {
                return Ok(Some(frame.to_vec()));
            }
        }
    }
}

fn trim_line(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Decode one frame into a JSON-RPC message
pub fn decode(frame: &[u8]) -> Result<Incoming, DecodeError> {
    let text = std::str::from_utf8(frame).map_err(|_| DecodeError::InvalidUtf8)?;
    let value: Value = serde_json::from_str(text)?;

    let Value::Object(ref object) = value else {
        return Err(DecodeError::InvalidMessage {
            id: None,
            reason: "expected a JSON object".to_string(),
        });
    };

    // Recover the id first so that later failures can still be correlated.
    let id = match object.get("id") {
        None | Some(Value::Null) => None,
        Some(raw) => match serde_json::from_value::<RequestId>(raw.clone()) {
            Ok(id) => Some(id),
            Err(_) => {
                return Err(DecodeError::InvalidMessage {
                    id: None,
                    reason: "id must be a string or an integer".to_string(),
                })
            }
        },
    };

    if !object.contains_key("method") {
        if object.contains_key("result") || object.contains_key("error") {
            return serde_json::from_value(value)
                .map(Incoming::Response)
                .map_err(|e| DecodeError::InvalidMessage { id, reason: e.to_string() });
        }
        return Err(DecodeError::InvalidMessage {
            id,
            reason: "missing method".to_string(),
        });
    }

    let request: JsonRpcRequest = serde_json::from_value(value)
        .map_err(|e| DecodeError::InvalidMessage { id: id.clone(), reason: e.to_string() })?;

    if request.is_notification() {
        Ok(Incoming::Notification(request))
    } else {
        Ok(Incoming::Request(request))
    }
}

/// Serialize a response as one frame and flush it
pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, response: &JsonRpcResponse) -> std::io::Result<()> {
    let mut line = serde_json::to_vec(response)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await
}

/// Single-writer loop: drains the channel into the output stream
///
/// Returns once every sender is dropped and the queue is empty, or on the
/// first write failure.
pub async fn write_frames<W: AsyncWrite + Unpin>(
    mut writer: W,
    mut responses: mpsc::Receiver<JsonRpcResponse>,
) -> std::io::Result<()> {
    while let Some(response) = responses.recv().await {
        write_frame(&mut writer, &response).await?;
        debug!("Sent response for request {:?}", response.id);
    }
    writer.shutdown().await
}
