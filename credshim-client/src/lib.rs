//! Credshim Client - request correlation and API surface
//!
//! The async half of the credshim content-script layer. Page code calls
//! the installed entry points; each call is assigned a request id,
//! forwarded over the single long-lived channel to the privileged
//! context, and settled when the matching reply arrives — in reply
//! order, not call order. Successful credential replies are rebuilt by
//! `credshim-core` and handed through the realm bridge.
//!
//! # Architecture
//!
//! - `correlator`: pending-request table plus id allocation
//! - `channel`: transport seam and the inbound dispatch task
//! - `api`: the installed `create`/`get`/`getClientCapabilities` surface
//! - `config`: channel name and conditional capability exposure
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use credshim_client::{install, ShimConfig, Transport};
//! use credshim_core::SameRealmBridge;
//! use tokio::sync::mpsc;
//!
//! # async fn example(transport: Arc<dyn Transport>, inbound: mpsc::Receiver<String>) {
//! let api = install(
//!     &ShimConfig::default(),
//!     transport,
//!     inbound,
//!     Arc::new(SameRealmBridge),
//! );
//! let credential = api
//!     .create(serde_json::json!({ "publicKey": {} }))
//!     .await
//!     .expect("privileged context refused the request");
//! assert_eq!(credential.credential_type(), "public-key");
//! # }
//! ```

pub mod api;
pub mod channel;
pub mod config;
pub mod correlator;
pub mod error;

// Re-export main types for convenience
pub use api::{install, CredentialsApi, InstalledApi};
pub use channel::{Channel, Transport};
pub use config::{ShimConfig, DEFAULT_CHANNEL_NAME};
pub use correlator::Correlator;
pub use error::{Result, ShimError};
