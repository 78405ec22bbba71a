//! Pending-request table and request id allocation.
//!
//! Requests go out in call order but replies arrive in whatever order
//! the privileged context produces them; the correlator is the table
//! that routes each reply back to the caller that is waiting on it.

use dashmap::DashMap;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::oneshot;
use tracing::warn;

use crate::error::ShimError;

/// Outcome delivered to a waiting caller.
pub type ReplyResult = Result<Value, ShimError>;

/// Allocates request ids and settles replies against pending callers.
///
/// Constructed once at startup and owned for the content-script
/// lifetime; never explicitly torn down. Ids start at 0, increase
/// monotonically, and are never reused while their request is pending.
#[derive(Debug, Default)]
pub struct Correlator {
    next_id: AtomicU64,
    pending: DashMap<u64, oneshot::Sender<ReplyResult>>,
}

impl Correlator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next request id and register a pending slot.
    ///
    /// The receiver resolves exactly once, when the matching reply is
    /// settled, or errors if the correlator is dropped first.
    pub fn begin(&self) -> (u64, oneshot::Receiver<ReplyResult>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.insert(id, tx);
        (id, rx)
    }

    /// Settle the pending request for `id`, exactly once.
    ///
    /// The entry is removed unconditionally, so a second settle for the
    /// same id is a no-op. A reply for an unknown or already-settled id
    /// is a protocol violation: logged and dropped, never a panic — the
    /// receive pipeline has to stay alive.
    pub fn settle(&self, id: u64, data: Option<Value>, error: Option<Value>) {
        let Some((_, tx)) = self.pending.remove(&id) else {
            warn!(request_id = id, "reply for unknown or already-settled request, dropping");
            return;
        };
        let outcome = match (data, error) {
            (_, Some(error)) => Err(ShimError::Remote(error)),
            (Some(data), None) => Ok(data),
            (None, None) => {
                warn!(request_id = id, "reply carried neither data nor error");
                Err(ShimError::Transport(
                    "reply carried neither data nor error".into(),
                ))
            }
        };
        // The caller may have stopped waiting; that is fine.
        let _ = tx.send(outcome);
    }

    /// Drop a pending slot whose command never made it onto the channel.
    pub fn abandon(&self, id: u64) {
        self.pending.remove(&id);
    }

    /// Number of requests still waiting on a reply.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
