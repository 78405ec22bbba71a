//! Wire protocol types for the channel to the privileged context.
//!
//! Everything here is JSON-safe: binary fields travel as base64url
//! strings and are only decoded during reconstruction. The response
//! carries all subtype fields as options; which subtype applies is
//! decided exactly once, when the credential is rebuilt.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{MalformedCredentialResponse, Result};

/// Command verb understood by the privileged context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cmd {
    #[serde(rename = "create")]
    Create,
    #[serde(rename = "get")]
    Get,
    #[serde(rename = "getClientCapabilities")]
    GetClientCapabilities,
}

/// Message sent to the privileged context.
///
/// `options` is present for create/get and absent for
/// getClientCapabilities; it is the caller's argument object with
/// non-serializable members already stripped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundCommand {
    pub request_id: u64,
    pub cmd: Cmd,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

/// Reply received from the privileged context.
///
/// Exactly one of `data`/`error` is expected per the collaborator
/// contract; the correlator decides what to do with anything else.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundReply {
    pub request_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

/// JSON-safe description of a credential as it crosses the channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCredential {
    pub id: String,
    pub raw_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_attachment: Option<String>,
    pub response: WireAuthenticatorResponse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_extension_results: Option<WireExtensions>,
}

impl WireCredential {
    /// Parse a reply payload into a wire credential.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(MalformedCredentialResponse::Schema)
    }
}

/// Union of registration and assertion response fields.
///
/// An attestation response carries `attestation_object`; an assertion
/// response carries `signature`. Which fields are actually required is
/// enforced by the reconstructor, not the serde layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireAuthenticatorResponse {
    #[serde(rename = "clientDataJSON", skip_serializing_if = "Option::is_none")]
    pub client_data_json: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attestation_object: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authenticator_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transports: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_algorithm: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_handle: Option<String>,
}

/// Extension outputs as they appear on the wire.
///
/// Keys this layer does not recognize are dropped by serde; that
/// narrowing is deliberate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireExtensions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hmac_get_secret: Option<WireHmacGetSecret>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prf: Option<WirePrf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large_blob: Option<WireLargeBlob>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cred_props: Option<Value>,
}

/// hmac-secret outputs; `output1` is required whenever the key is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireHmacGetSecret {
    pub output1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output2: Option<String>,
}

/// prf extension output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WirePrf {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<WirePrfValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// prf evaluation results; `first` is required whenever present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WirePrfValues {
    pub first: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second: Option<String>,
}

/// largeBlob extension output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WireLargeBlob {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob: Option<String>,
}
