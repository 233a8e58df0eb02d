/// Execution context handed to every tool handler
///
/// Carries the correlation token of the request being served and an
/// advisory cancellation signal. The signal is raised when the client sends
/// `notifications/cancelled` for the request or when the transport closes.
/// Handlers observe it cooperatively; nothing is forcibly aborted.

use tokio::sync::watch;

use crate::dispatch::ToolError;
use crate::mcp::protocol::RequestId;

#[derive(Debug, Clone)]
pub struct ExecutionContext {
    request_id: RequestId,
    cancel: watch::Receiver<bool>,
}

/// Sending half of a request's cancellation signal
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    /// Raise the signal. Idempotent, and fine to call after the handler finished.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }
}

impl ExecutionContext {
    /// Create a context together with the handle that cancels it
    pub fn channel(request_id: RequestId) -> (CancelHandle, Self) {
        let (sender, cancel) = watch::channel(false);
        (CancelHandle { sender }, Self { request_id, cancel })
    }

    /// A context that is never cancelled, for calls made outside a session
    pub fn detached(request_id: RequestId) -> Self {
        let (_handle, ctx) = Self::channel(request_id);
        ctx
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// `Err(ToolError::Cancelled)` once cancellation has been requested
    pub fn check_cancelled(&self) -> Result<(), ToolError> {
        if self.is_cancelled() {
            Err(ToolError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Resolve when cancellation is requested
    ///
    /// Never resolves for a detached context. Meant to be raced against the
    /// handler's own work with `tokio::select!`.
    pub async fn cancelled(&self) {
        let mut cancel = self.cancel.clone();
        if cancel.wait_for(|cancelled| *cancelled).await.is_err() {
            // Sender gone without cancelling: the signal can no longer fire.
            std::future::pending::<()>().await;
        }
    }
}
