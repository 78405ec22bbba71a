//! Errors surfaced to callers of the shim API.

use credshim_core::MalformedCredentialResponse;
use serde_json::Value;
use thiserror::Error;

/// Failure of a single forwarded call.
///
/// Each call is attempted exactly once; none of these trigger a retry.
/// Replies for unknown request ids are not represented here — they are
/// logged and dropped at the correlator, since no caller is left to
/// notify.
#[derive(Debug, Error)]
pub enum ShimError {
    /// The channel failed to transmit or deliver.
    #[error("transport error: {0}")]
    Transport(String),

    /// The privileged context reported an error; carried verbatim.
    #[error("privileged context error: {0}")]
    Remote(Value),

    /// The reply payload could not be rebuilt into a credential.
    #[error(transparent)]
    Malformed(#[from] MalformedCredentialResponse),

    /// The channel was torn down before this request's reply arrived.
    #[error("channel closed before a reply arrived")]
    ChannelClosed,

    /// The reply payload was not the shape this command expects.
    #[error("unexpected reply payload: {0}")]
    UnexpectedPayload(String),
}

pub type Result<T> = std::result::Result<T, ShimError>;
