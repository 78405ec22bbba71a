//! API surface installer.
//!
//! The three entry points page code sees instead of the native
//! implementations: `create`, `get`, and — when the hosting environment
//! has the platform capability API at all — `getClientCapabilities`.
//! Each one drives a correlated request over the channel and, for the
//! credential calls, pipes the reply through reconstruction and the
//! realm bridge.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

use credshim_core::credential::PublicKeyCredential;
use credshim_core::realm::RealmBridge;
use credshim_core::wire::{Cmd, OutboundCommand};

use crate::channel::{Channel, Transport};
use crate::config::ShimConfig;
use crate::correlator::Correlator;
use crate::error::{Result, ShimError};

/// Options key removed before transmission: abort handles cannot cross
/// the channel, so calls cannot be cancelled once sent.
const SIGNAL_KEY: &str = "signal";

/// The forwarding implementations behind the installed entry points.
pub struct CredentialsApi {
    correlator: Arc<Correlator>,
    channel: Channel,
    bridge: Arc<dyn RealmBridge>,
}

impl CredentialsApi {
    pub fn new(
        transport: Arc<dyn Transport>,
        inbound: mpsc::Receiver<String>,
        bridge: Arc<dyn RealmBridge>,
    ) -> Self {
        let correlator = Arc::new(Correlator::new());
        let channel = Channel::spawn(transport, inbound, Arc::clone(&correlator));
        Self {
            correlator,
            channel,
            bridge,
        }
    }

    /// Replacement for the native credential-creation entry point.
    #[instrument(level = "debug", skip_all)]
    pub async fn create(&self, options: Value) -> Result<PublicKeyCredential> {
        self.request_credential(Cmd::Create, options).await
    }

    /// Replacement for the native credential-request entry point.
    #[instrument(level = "debug", skip_all)]
    pub async fn get(&self, options: Value) -> Result<PublicKeyCredential> {
        self.request_credential(Cmd::Get, options).await
    }

    /// Replacement for the platform capability query.
    ///
    /// The capabilities value needs no reconstruction; it crosses the
    /// realm bridge unmodified and is typed at the edge.
    #[instrument(level = "debug", skip_all)]
    pub async fn get_client_capabilities(&self) -> Result<BTreeMap<String, bool>> {
        let data = self.round_trip(Cmd::GetClientCapabilities, None).await?;
        let data = self.bridge.transfer_value(data);
        serde_json::from_value(data)
            .map_err(|e| ShimError::UnexpectedPayload(format!("capabilities mapping: {e}")))
    }

    /// Requests still waiting on the privileged context.
    pub fn pending_count(&self) -> usize {
        self.correlator.pending_count()
    }

    async fn request_credential(&self, cmd: Cmd, options: Value) -> Result<PublicKeyCredential> {
        let options = strip_signal(options);
        let data = self.round_trip(cmd, Some(options)).await?;
        let credential = PublicKeyCredential::from_value(data)?;
        Ok(self.bridge.transfer_credential(credential))
    }

    /// Send one command and wait for its correlated reply. Exactly one
    /// attempt; no retries, no timeout.
    async fn round_trip(&self, cmd: Cmd, options: Option<Value>) -> Result<Value> {
        let (request_id, reply) = self.correlator.begin();
        let command = OutboundCommand {
            request_id,
            cmd,
            options,
        };
        if let Err(error) = self.channel.send(&command).await {
            // The command never reached the wire; nothing will settle it.
            self.correlator.abandon(request_id);
            return Err(error);
        }
        reply.await.unwrap_or(Err(ShimError::ChannelClosed))
    }
}

/// Drop the non-transportable abort handle, keeping everything else.
fn strip_signal(options: Value) -> Value {
    match options {
        Value::Object(mut map) => {
            if map.remove(SIGNAL_KEY).is_some() {
                debug!("discarded abort signal from options; cancellation does not cross the channel");
            }
            Value::Object(map)
        }
        other => other,
    }
}

/// The installed API surface.
///
/// `create` and `get` are always present; the capability query is only
/// installed when the hosting environment exposes the platform
/// capability API.
pub struct InstalledApi {
    api: CredentialsApi,
    capabilities_installed: bool,
}

/// Wire up the correlator, channel, and realm bridge into an installed
/// API surface.
pub fn install(
    config: &ShimConfig,
    transport: Arc<dyn Transport>,
    inbound: mpsc::Receiver<String>,
    bridge: Arc<dyn RealmBridge>,
) -> InstalledApi {
    info!(
        channel = %config.channel_name,
        capabilities = config.expose_client_capabilities,
        "installing credential API surface"
    );
    InstalledApi {
        api: CredentialsApi::new(transport, inbound, bridge),
        capabilities_installed: config.expose_client_capabilities,
    }
}

impl InstalledApi {
    pub async fn create(&self, options: Value) -> Result<PublicKeyCredential> {
        self.api.create(options).await
    }

    pub async fn get(&self, options: Value) -> Result<PublicKeyCredential> {
        self.api.get(options).await
    }

    /// `None` when the entry point was not installed because the hosting
    /// environment lacks the platform capability API.
    pub async fn get_client_capabilities(&self) -> Option<Result<BTreeMap<String, bool>>> {
        if !self.capabilities_installed {
            return None;
        }
        Some(self.api.get_client_capabilities().await)
    }

    pub fn pending_count(&self) -> usize {
        self.api.pending_count()
    }
}
