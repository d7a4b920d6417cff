// crates/pcbook-rpc/src/handlers/mod.rs
//
// Service implementations plus the helpers they share: deriving a call
// context from an inbound request, cancelling it when the caller stops
// listening, and mapping errors onto gRPC statuses.

pub mod auth;
pub mod laptop;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tonic::{Request, Status};

use pcbook_core::context::{CallContext, ContextError};

pub use auth::AuthServer;
pub use laptop::LaptopServer;

/// Capacity of the channel feeding a response stream.
pub(crate) const STREAM_BUFFER: usize = 16;

/// Build the context for one call from its `grpc-timeout` header.
pub(crate) fn call_context<T>(request: &Request<T>) -> CallContext {
    let timeout = request
        .metadata()
        .get("grpc-timeout")
        .and_then(|value| value.to_str().ok());
    CallContext::from_grpc_timeout(timeout)
}

pub(crate) fn context_status(err: ContextError) -> Status {
    match err {
        ContextError::Canceled => Status::cancelled(err.to_string()),
        ContextError::DeadlineExceeded => Status::deadline_exceeded(err.to_string()),
    }
}

/// Log a status before it is returned to the caller.
pub(crate) fn log_status(status: Status) -> Status {
    tracing::warn!(code = ?status.code(), "{}", status.message());
    status
}

/// Cancels a call context once the receiving half of a response stream is
/// dropped, i.e. when the client goes away. The watcher is aborted when the
/// guard is dropped so it does not keep the stream open.
pub(crate) struct CancelOnClose(JoinHandle<()>);

impl CancelOnClose {
    pub(crate) fn watch<T: Send + 'static>(tx: &mpsc::Sender<T>, ctx: &CallContext) -> Self {
        let tx = tx.clone();
        let ctx = ctx.clone();
        Self(tokio::spawn(async move {
            tx.closed().await;
            ctx.cancel();
        }))
    }
}

impl Drop for CancelOnClose {
    fn drop(&mut self) {
        self.0.abort();
    }
}
