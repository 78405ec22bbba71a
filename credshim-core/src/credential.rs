//! Credential reconstruction.
//!
//! Turns a [`WireCredential`] — the JSON-safe description that crossed
//! the channel — back into a fully formed credential object: binary
//! fields decoded, the response subtype decided once, extension outputs
//! rebuilt, and the platform serialization subset reproduced by
//! [`PublicKeyCredential::to_json`].

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::codec;
use crate::error::{MalformedCredentialResponse, Result};
use crate::wire::{WireAuthenticatorResponse, WireCredential, WireExtensions};

/// Credential type discriminant; this layer only ever produces
/// public-key credentials.
pub const CREDENTIAL_TYPE: &str = "public-key";

/// Realm-native public-key credential handed back to page code.
///
/// Ownership transfers to the caller on return; this layer never
/// mutates a credential afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PublicKeyCredential {
    pub id: String,
    pub raw_id: Vec<u8>,
    pub authenticator_attachment: Option<String>,
    pub response: AuthenticatorResponse,
    client_extension_results: ExtensionOutputs,
}

/// Response subtype, decided once at decode time.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthenticatorResponse {
    /// Registration (`create`) result.
    Attestation(AttestationResponse),
    /// Authentication (`get`) result.
    Assertion(AssertionResponse),
}

/// Registration response with decoded binary fields.
#[derive(Debug, Clone, PartialEq)]
pub struct AttestationResponse {
    pub client_data_json: Vec<u8>,
    pub attestation_object: Vec<u8>,
    pub authenticator_data: Vec<u8>,
    pub public_key: Vec<u8>,
    pub public_key_algorithm: i64,
    pub transports: Vec<String>,
}

impl AttestationResponse {
    /// Accessor mirroring the platform's computed getter.
    pub fn get_authenticator_data(&self) -> &[u8] {
        &self.authenticator_data
    }

    /// Accessor mirroring the platform's computed getter.
    pub fn get_public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Accessor mirroring the platform's computed getter.
    pub fn get_public_key_algorithm(&self) -> i64 {
        self.public_key_algorithm
    }

    /// Accessor mirroring the platform's computed getter.
    pub fn get_transports(&self) -> &[String] {
        &self.transports
    }
}

/// Assertion response with decoded binary fields.
#[derive(Debug, Clone, PartialEq)]
pub struct AssertionResponse {
    pub client_data_json: Vec<u8>,
    pub authenticator_data: Vec<u8>,
    pub signature: Vec<u8>,
    /// Always a present field; `None` serializes as `null`, never as an
    /// absent key.
    pub user_handle: Option<Vec<u8>>,
}

/// Reconstructed client extension outputs.
///
/// A key absent on the wire stays absent here; no defaults are
/// synthesized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtensionOutputs {
    pub hmac_get_secret: Option<HmacGetSecretOutput>,
    pub prf: Option<PrfOutput>,
    pub large_blob: Option<LargeBlobOutput>,
    pub cred_props: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HmacGetSecretOutput {
    pub output1: Vec<u8>,
    pub output2: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrfOutput {
    pub results: Option<PrfValues>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrfValues {
    pub first: Vec<u8>,
    pub second: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LargeBlobOutput {
    pub blob: Option<Vec<u8>>,
}

impl PublicKeyCredential {
    /// Rebuild a credential from its wire description.
    ///
    /// Fails with [`MalformedCredentialResponse`] on any decode error or
    /// missing required field; a partial credential is never returned.
    pub fn from_wire(wire: WireCredential) -> Result<Self> {
        let raw_id = decode_field("rawId", &wire.raw_id)?;
        let response = AuthenticatorResponse::from_wire(wire.response)?;
        let client_extension_results = ExtensionOutputs::from_wire(wire.client_extension_results)?;
        Ok(Self {
            id: wire.id,
            raw_id,
            authenticator_attachment: wire.authenticator_attachment,
            response,
            client_extension_results,
        })
    }

    /// Parse and rebuild straight from a reply payload.
    pub fn from_value(value: Value) -> Result<Self> {
        Self::from_wire(WireCredential::from_value(value)?)
    }

    /// Credential type discriminant, always `"public-key"`.
    pub fn credential_type(&self) -> &'static str {
        CREDENTIAL_TYPE
    }

    /// Accessor mirroring the platform's computed getter.
    pub fn get_client_extension_results(&self) -> &ExtensionOutputs {
        &self.client_extension_results
    }

    /// Reproduce the platform's JSON serialization subset.
    ///
    /// `rawId` serializes as the string id, not the raw bytes: the
    /// serialization format uses base64url-friendly identifiers.
    pub fn to_json(&self) -> Value {
        let response = match &self.response {
            AuthenticatorResponse::Attestation(r) => json!({
                "clientDataJSON": codec::encode(&r.client_data_json),
                "authenticatorData": codec::encode(&r.authenticator_data),
                "transports": r.transports,
                "publicKey": codec::encode(&r.public_key),
                "publicKeyAlgorithm": r.public_key_algorithm,
                "attestationObject": codec::encode(&r.attestation_object),
            }),
            AuthenticatorResponse::Assertion(r) => json!({
                "clientDataJSON": codec::encode(&r.client_data_json),
                "authenticatorData": codec::encode(&r.authenticator_data),
                "signature": codec::encode(&r.signature),
                "userHandle": r.user_handle.as_ref().map(codec::encode),
            }),
        };
        json!({
            "id": self.id,
            "rawId": self.id,
            "response": response,
            "authenticatorAttachment": self.authenticator_attachment,
            "clientExtensionResults": self.client_extension_results.to_json(),
            "type": CREDENTIAL_TYPE,
        })
    }
}

impl AuthenticatorResponse {
    /// Decide the subtype from the fields present and decode it.
    ///
    /// `attestationObject` marks a registration response, `signature` an
    /// assertion; anything else is unknown.
    fn from_wire(wire: WireAuthenticatorResponse) -> Result<Self> {
        if let Some(attestation_object) = wire.attestation_object {
            debug!("reconstructing registration response");
            Ok(Self::Attestation(AttestationResponse {
                client_data_json: decode_required("clientDataJSON", wire.client_data_json)?,
                attestation_object: decode_field("attestationObject", &attestation_object)?,
                authenticator_data: decode_required("authenticatorData", wire.authenticator_data)?,
                public_key: decode_required("publicKey", wire.public_key)?,
                public_key_algorithm: wire
                    .public_key_algorithm
                    .ok_or(MalformedCredentialResponse::MissingField("publicKeyAlgorithm"))?,
                transports: wire
                    .transports
                    .ok_or(MalformedCredentialResponse::MissingField("transports"))?,
            }))
        } else if let Some(signature) = wire.signature {
            debug!("reconstructing assertion response");
            Ok(Self::Assertion(AssertionResponse {
                client_data_json: decode_required("clientDataJSON", wire.client_data_json)?,
                authenticator_data: decode_required("authenticatorData", wire.authenticator_data)?,
                signature: decode_field("signature", &signature)?,
                user_handle: match wire.user_handle {
                    Some(handle) => Some(decode_field("userHandle", &handle)?),
                    None => None,
                },
            }))
        } else {
            Err(MalformedCredentialResponse::UnknownResponseType)
        }
    }
}

impl ExtensionOutputs {
    /// Rebuild extension outputs, each recognized key independently.
    fn from_wire(wire: Option<WireExtensions>) -> Result<Self> {
        let Some(wire) = wire else {
            return Ok(Self::default());
        };
        let hmac_get_secret = match wire.hmac_get_secret {
            Some(hmac) => Some(HmacGetSecretOutput {
                output1: decode_field("hmacGetSecret.output1", &hmac.output1)?,
                output2: match hmac.output2 {
                    Some(output2) => Some(decode_field("hmacGetSecret.output2", &output2)?),
                    None => None,
                },
            }),
            None => None,
        };
        let prf = match wire.prf {
            Some(prf) => Some(PrfOutput {
                results: match prf.results {
                    Some(results) => Some(PrfValues {
                        first: decode_field("prf.results.first", &results.first)?,
                        second: match results.second {
                            Some(second) => Some(decode_field("prf.results.second", &second)?),
                            None => None,
                        },
                    }),
                    None => None,
                },
                enabled: prf.enabled,
            }),
            None => None,
        };
        let large_blob = match wire.large_blob {
            Some(large_blob) => Some(LargeBlobOutput {
                blob: match large_blob.blob {
                    Some(blob) => Some(decode_field("largeBlob.blob", &blob)?),
                    None => None,
                },
            }),
            None => None,
        };
        Ok(Self {
            hmac_get_secret,
            prf,
            large_blob,
            cred_props: wire.cred_props,
        })
    }

    /// Serialized form used by [`PublicKeyCredential::to_json`]; byte
    /// fields re-encode as base64url, absent keys stay absent.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        if let Some(hmac) = &self.hmac_get_secret {
            let mut entry = Map::new();
            entry.insert("output1".into(), json!(codec::encode(&hmac.output1)));
            if let Some(output2) = &hmac.output2 {
                entry.insert("output2".into(), json!(codec::encode(output2)));
            }
            map.insert("hmacGetSecret".into(), Value::Object(entry));
        }
        if let Some(prf) = &self.prf {
            let mut entry = Map::new();
            if let Some(results) = &prf.results {
                let mut values = Map::new();
                values.insert("first".into(), json!(codec::encode(&results.first)));
                if let Some(second) = &results.second {
                    values.insert("second".into(), json!(codec::encode(second)));
                }
                entry.insert("results".into(), Value::Object(values));
            }
            if let Some(enabled) = prf.enabled {
                entry.insert("enabled".into(), json!(enabled));
            }
            map.insert("prf".into(), Value::Object(entry));
        }
        if let Some(large_blob) = &self.large_blob {
            let mut entry = Map::new();
            if let Some(blob) = &large_blob.blob {
                entry.insert("blob".into(), json!(codec::encode(blob)));
            }
            map.insert("largeBlob".into(), Value::Object(entry));
        }
        if let Some(cred_props) = &self.cred_props {
            map.insert("credProps".into(), cred_props.clone());
        }
        Value::Object(map)
    }
}

fn decode_field(field: &'static str, text: &str) -> Result<Vec<u8>> {
    codec::decode(text)
        .map_err(|source| MalformedCredentialResponse::InvalidBase64 { field, source })
}

fn decode_required(field: &'static str, text: Option<String>) -> Result<Vec<u8>> {
    let text = text.ok_or(MalformedCredentialResponse::MissingField(field))?;
    decode_field(field, &text)
}
