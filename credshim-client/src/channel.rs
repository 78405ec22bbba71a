//! Channel adapter for the privileged-context port.
//!
//! One adapter is established at initialization and lives for the
//! content script's lifetime; it owns the outbound transport and the
//! dispatch task that routes every inbound reply to the correlator.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use credshim_core::wire::{InboundReply, OutboundCommand};

use crate::correlator::Correlator;
use crate::error::{Result, ShimError};

/// Outbound half of the port to the privileged context.
///
/// Implementations transmit fully encoded frames; there is no
/// acknowledgement beyond the eventual correlated reply.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, frame: String) -> Result<()>;
}

/// The single long-lived channel to the privileged context.
///
/// Torn down implicitly when dropped with the page context; there is no
/// explicit shutdown operation.
pub struct Channel {
    transport: Arc<dyn Transport>,
    dispatch: JoinHandle<()>,
}

impl Channel {
    /// Open the adapter over `transport`, dispatching frames arriving on
    /// `inbound` to `correlator`.
    ///
    /// The dispatch task never performs credential reconstruction: a
    /// payload that later fails to decode rejects only the caller that
    /// asked for it, not the receive pipeline.
    pub fn spawn(
        transport: Arc<dyn Transport>,
        mut inbound: mpsc::Receiver<String>,
        correlator: Arc<Correlator>,
    ) -> Self {
        let dispatch = tokio::spawn(async move {
            while let Some(frame) = inbound.recv().await {
                match serde_json::from_str::<InboundReply>(&frame) {
                    Ok(reply) => {
                        debug!(
                            request_id = reply.request_id,
                            "reply received from privileged context"
                        );
                        correlator.settle(reply.request_id, reply.data, reply.error);
                    }
                    Err(error) => {
                        warn!(%error, "undecodable frame from privileged context, dropping");
                    }
                }
            }
            debug!("inbound channel closed");
        });
        Self { transport, dispatch }
    }

    /// Serialize and transmit one command.
    pub async fn send(&self, command: &OutboundCommand) -> Result<()> {
        let frame = serde_json::to_string(command)
            .map_err(|e| ShimError::Transport(format!("failed to encode command: {e}")))?;
        debug!(
            request_id = command.request_id,
            cmd = ?command.cmd,
            "forwarding command to privileged context"
        );
        self.transport.send(frame).await
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        self.dispatch.abort();
    }
}
