//! Credshim Core - wire protocol and credential reconstruction
//!
//! This crate holds the runtime-free half of the credshim content-script
//! layer: the JSON wire protocol spoken with the privileged context, the
//! base64url codec for binary credential fields, the algorithm that
//! rebuilds a realm-native credential from its wire description, and the
//! seam through which finished objects are handed into the page realm.
//!
//! # Example
//!
//! ```
//! use credshim_core::{codec, PublicKeyCredential};
//! use serde_json::json;
//!
//! # fn example() -> credshim_core::Result<()> {
//! let credential = PublicKeyCredential::from_value(json!({
//!     "id": "abc",
//!     "rawId": codec::encode(b"abc"),
//!     "response": {
//!         "clientDataJSON": codec::encode(b"{}"),
//!         "authenticatorData": codec::encode([4u8, 5, 6]),
//!         "signature": codec::encode([1u8, 2, 3]),
//!     },
//! }))?;
//! assert_eq!(credential.credential_type(), "public-key");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod codec;
pub mod credential;
pub mod error;
pub mod realm;
pub mod wire;

// Re-export main types for convenience
pub use credential::{
    AssertionResponse, AttestationResponse, AuthenticatorResponse, ExtensionOutputs,
    HmacGetSecretOutput, LargeBlobOutput, PrfOutput, PrfValues, PublicKeyCredential,
    CREDENTIAL_TYPE,
};
pub use error::{MalformedCredentialResponse, Result};
pub use realm::{RealmBridge, SameRealmBridge};
pub use wire::{Cmd, InboundReply, OutboundCommand, WireCredential, WireExtensions};
