//! Cross-realm handoff seam.
//!
//! Handing an object built in the privileged realm to the unprivileged
//! page realm — with its accessors still callable — is an environment
//! capability, not a language feature. The API surface depends only on
//! this trait; each host supplies an implementation for its own
//! boundary mechanism.

use serde_json::Value;

use crate::credential::PublicKeyCredential;

/// Places values into the page realm.
pub trait RealmBridge: Send + Sync {
    /// Place a reconstructed credential into the page realm. Accessor
    /// methods must remain callable after the transfer.
    fn transfer_credential(&self, credential: PublicKeyCredential) -> PublicKeyCredential;

    /// Place a plain JSON value (e.g. a capabilities mapping) into the
    /// page realm.
    fn transfer_value(&self, value: Value) -> Value;
}

/// Identity bridge for hosts where both realms coincide, and for tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct SameRealmBridge;

impl RealmBridge for SameRealmBridge {
    fn transfer_credential(&self, credential: PublicKeyCredential) -> PublicKeyCredential {
        credential
    }

    fn transfer_value(&self, value: Value) -> Value {
        value
    }
}
