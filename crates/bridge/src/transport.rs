//! Transport trait.

use std::future::Future;

use serde_json::Value;

use crate::error::Result;
use crate::protocol::{CommandRequest, Endpoint};

/// A handle to one remote command executor.
///
/// Implementations own at most one live handle. Callers are expected to
/// serialize access (every method takes `&mut self`), so request/response
/// pairs never interleave.
pub trait Transport: Send {
    /// Open a fresh handle and check liveness.
    ///
    /// Never fails: returns `false` and records the reason in
    /// [`last_error`](Transport::last_error) instead.
    fn connect(&mut self) -> impl Future<Output = bool> + Send;

    /// Cheap liveness check against the open handle.
    fn ping(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Send one command and return the remote JSON body verbatim.
    fn execute(&mut self, request: &CommandRequest)
    -> impl Future<Output = Result<Value>> + Send;

    /// Release the handle. Calling it on a closed transport is a no-op.
    fn close(&mut self);

    /// Whether a handle is currently open.
    fn is_open(&self) -> bool;

    /// Reason for the most recent failure, if any.
    fn last_error(&self) -> Option<&str>;

    fn endpoint(&self) -> &Endpoint;
}
