//! Errors raised while turning a wire credential description into a
//! realm-native credential.

use thiserror::Error;

/// The reconstructor could not interpret a credential description.
///
/// Any of these fails the whole reconstruction; partial credentials are
/// never returned.
#[derive(Debug, Error)]
pub enum MalformedCredentialResponse {
    /// The description did not match the wire schema at all.
    #[error("credential description does not match the wire schema: {0}")]
    Schema(#[from] serde_json::Error),

    /// A field the response subtype requires was absent.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// A binary field did not decode as base64url.
    #[error("invalid base64url in `{field}`: {source}")]
    InvalidBase64 {
        field: &'static str,
        #[source]
        source: base64::DecodeError,
    },

    /// Neither an attestation nor an assertion response.
    #[error("unknown credential response type")]
    UnknownResponseType,
}

pub type Result<T> = std::result::Result<T, MalformedCredentialResponse>;
