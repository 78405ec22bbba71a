//! Integration tests for the credshim client.
//!
//! These drive the installed API surface end to end against a loopback
//! privileged-context stub: commands are captured as parsed frames, and
//! each test replies on the inbound channel whenever — and in whatever
//! order — it chooses.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use credshim_client::{install, InstalledApi, ShimConfig, ShimError, Transport};
use credshim_core::credential::AuthenticatorResponse;
use credshim_core::wire::OutboundCommand;
use credshim_core::{MalformedCredentialResponse, SameRealmBridge};

/// Captures every frame the shim sends, parsed back into a command.
struct RecordingTransport {
    sent: mpsc::UnboundedSender<OutboundCommand>,
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, frame: String) -> Result<(), ShimError> {
        let command: OutboundCommand =
            serde_json::from_str(&frame).expect("shim emitted an undecodable frame");
        self.sent
            .send(command)
            .map_err(|_| ShimError::Transport("recording sink closed".into()))
    }
}

/// A transport that refuses every send.
struct FailingTransport;

#[async_trait]
impl Transport for FailingTransport {
    async fn send(&self, _frame: String) -> Result<(), ShimError> {
        Err(ShimError::Transport("port disconnected".into()))
    }
}

struct Harness {
    api: Arc<InstalledApi>,
    commands: mpsc::UnboundedReceiver<OutboundCommand>,
    replies: mpsc::Sender<String>,
}

/// Surface shim tracing in test output; `RUST_LOG` overrides the level.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();
}

fn harness(config: &ShimConfig) -> Harness {
    init_tracing();
    let (sent_tx, sent_rx) = mpsc::unbounded_channel();
    let (reply_tx, reply_rx) = mpsc::channel(16);
    let api = install(
        config,
        Arc::new(RecordingTransport { sent: sent_tx }),
        reply_rx,
        Arc::new(SameRealmBridge),
    );
    Harness {
        api: Arc::new(api),
        commands: sent_rx,
        replies: reply_tx,
    }
}

async fn reply(harness: &Harness, request_id: u64, body: Value) {
    let frame = json!({ "requestId": request_id, "data": body }).to_string();
    harness.replies.send(frame).await.unwrap();
}

fn registration_data() -> Value {
    json!({
        "id": "abc",
        "rawId": "YWJj",
        "authenticatorAttachment": "platform",
        "response": {
            "attestationObject": "AQID",
            "clientDataJSON": "eyJ9",
            "transports": ["usb"],
            "authenticatorData": "BAUG",
            "publicKey": "BwgJ",
            "publicKeyAlgorithm": -7,
        },
    })
}

fn assertion_data() -> Value {
    json!({
        "id": "abc",
        "rawId": "YWJj",
        "response": {
            "clientDataJSON": "eyJ9",
            "authenticatorData": "BAUG",
            "signature": "AQID",
        },
        "clientExtensionResults": {
            "hmacGetSecret": { "output1": "AQID" },
        },
    })
}

// ============================================================================
// Credential round trips
// ============================================================================

#[tokio::test]
async fn create_round_trip_reconstructs_the_credential() {
    let mut h = harness(&ShimConfig::default());
    let api = Arc::clone(&h.api);

    let call = tokio::spawn(async move {
        api.create(json!({
            "signal": { "aborted": false },
            "publicKey": { "rp": { "id": "example.com" } },
        }))
        .await
    });

    let command = h.commands.recv().await.unwrap();
    assert_eq!(command.request_id, 0);
    // The abort handle must not cross the channel.
    let options = command.options.unwrap();
    assert!(options.get("signal").is_none());
    assert_eq!(options["publicKey"]["rp"]["id"], json!("example.com"));

    reply(&h, command.request_id, registration_data()).await;

    let credential = call.await.unwrap().unwrap();
    assert_eq!(credential.id, "abc");
    assert_eq!(credential.raw_id, b"abc");
    assert_eq!(credential.authenticator_attachment.as_deref(), Some("platform"));
    let AuthenticatorResponse::Attestation(response) = &credential.response else {
        panic!("create must produce an attestation response");
    };
    assert_eq!(response.get_transports(), ["usb".to_string()]);
    assert_eq!(response.get_public_key_algorithm(), -7);
    assert_eq!(h.api.pending_count(), 0);
}

#[tokio::test]
async fn get_round_trip_decodes_extension_outputs() {
    let mut h = harness(&ShimConfig::default());
    let api = Arc::clone(&h.api);

    let call = tokio::spawn(async move { api.get(json!({ "publicKey": {} })).await });

    let command = h.commands.recv().await.unwrap();
    reply(&h, command.request_id, assertion_data()).await;

    let credential = call.await.unwrap().unwrap();
    let AuthenticatorResponse::Assertion(response) = &credential.response else {
        panic!("get must produce an assertion response");
    };
    assert_eq!(response.user_handle, None);

    let hmac = credential
        .get_client_extension_results()
        .hmac_get_secret
        .as_ref()
        .unwrap();
    assert_eq!(hmac.output1, [1, 2, 3]);
    assert_eq!(hmac.output2, None);
}

// ============================================================================
// Reply ordering
// ============================================================================

#[tokio::test]
async fn replies_settle_callers_in_arrival_order() {
    let mut h = harness(&ShimConfig::default());

    let api_a = Arc::clone(&h.api);
    let call_a = tokio::spawn(async move { api_a.create(json!({ "publicKey": {} })).await });
    let id_a = h.commands.recv().await.unwrap().request_id;

    let api_b = Arc::clone(&h.api);
    let call_b = tokio::spawn(async move { api_b.get(json!({ "publicKey": {} })).await });
    let id_b = h.commands.recv().await.unwrap().request_id;
    assert!(id_b > id_a);

    // B's reply arrives first: B settles immediately, A stays pending.
    reply(&h, id_b, assertion_data()).await;
    let credential_b = call_b.await.unwrap().unwrap();
    assert!(matches!(
        credential_b.response,
        AuthenticatorResponse::Assertion(_)
    ));

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!call_a.is_finished());
    assert_eq!(h.api.pending_count(), 1);

    reply(&h, id_a, registration_data()).await;
    let credential_a = call_a.await.unwrap().unwrap();
    assert!(matches!(
        credential_a.response,
        AuthenticatorResponse::Attestation(_)
    ));
}

#[tokio::test]
async fn stray_replies_are_ignored_and_the_channel_survives() {
    let mut h = harness(&ShimConfig::default());

    // Nothing pending; these must be dropped without consequence.
    h.replies
        .send(json!({ "requestId": 999, "data": 1 }).to_string())
        .await
        .unwrap();
    h.replies.send("garbage frame".into()).await.unwrap();

    let api = Arc::clone(&h.api);
    let call = tokio::spawn(async move { api.get(json!({ "publicKey": {} })).await });
    let command = h.commands.recv().await.unwrap();
    reply(&h, command.request_id, assertion_data()).await;
    assert!(call.await.unwrap().is_ok());
}

// ============================================================================
// Failure paths
// ============================================================================

#[tokio::test]
async fn remote_errors_propagate_verbatim() {
    let mut h = harness(&ShimConfig::default());
    let api = Arc::clone(&h.api);

    let call = tokio::spawn(async move { api.get(json!({ "publicKey": {} })).await });
    let command = h.commands.recv().await.unwrap();
    let frame = json!({
        "requestId": command.request_id,
        "error": { "name": "NotAllowedError" },
    })
    .to_string();
    h.replies.send(frame).await.unwrap();

    let error = call.await.unwrap().unwrap_err();
    let ShimError::Remote(value) = error else {
        panic!("expected the privileged context's error, got {error}");
    };
    assert_eq!(value, json!({ "name": "NotAllowedError" }));
}

#[tokio::test]
async fn malformed_reply_rejects_only_that_caller() {
    let mut h = harness(&ShimConfig::default());

    let api = Arc::clone(&h.api);
    let bad_call = tokio::spawn(async move { api.create(json!({ "publicKey": {} })).await });
    let bad_id = h.commands.recv().await.unwrap().request_id;

    // Neither attestationObject nor signature: reconstruction must fail.
    reply(
        &h,
        bad_id,
        json!({ "id": "abc", "rawId": "YWJj", "response": {} }),
    )
    .await;

    let error = bad_call.await.unwrap().unwrap_err();
    assert!(matches!(
        error,
        ShimError::Malformed(MalformedCredentialResponse::UnknownResponseType)
    ));

    // The dispatch pipeline is still alive for the next caller.
    let api = Arc::clone(&h.api);
    let good_call = tokio::spawn(async move { api.get(json!({ "publicKey": {} })).await });
    let good_id = h.commands.recv().await.unwrap().request_id;
    reply(&h, good_id, assertion_data()).await;
    assert!(good_call.await.unwrap().is_ok());
}

#[tokio::test]
async fn failed_send_rejects_and_leaves_no_pending_entry() {
    init_tracing();
    let (_reply_tx, reply_rx) = mpsc::channel(1);
    let api = install(
        &ShimConfig::default(),
        Arc::new(FailingTransport),
        reply_rx,
        Arc::new(SameRealmBridge),
    );

    let error = api.create(json!({ "publicKey": {} })).await.unwrap_err();
    assert!(matches!(error, ShimError::Transport(_)));
    assert_eq!(api.pending_count(), 0);
}

// ============================================================================
// Client capabilities
// ============================================================================

#[tokio::test]
async fn capabilities_round_trip_types_the_mapping() {
    let mut h = harness(&ShimConfig::default());
    let api = Arc::clone(&h.api);

    let call = tokio::spawn(async move { api.get_client_capabilities().await });

    let command = h.commands.recv().await.unwrap();
    assert!(command.options.is_none());
    reply(
        &h,
        command.request_id,
        json!({ "conditionalGet": true, "hybridTransport": false }),
    )
    .await;

    let capabilities = call.await.unwrap().expect("entry point installed").unwrap();
    assert_eq!(capabilities.get("conditionalGet"), Some(&true));
    assert_eq!(capabilities.get("hybridTransport"), Some(&false));
}

#[tokio::test]
async fn capabilities_entry_point_can_be_left_uninstalled() {
    let config = ShimConfig {
        expose_client_capabilities: false,
        ..ShimConfig::default()
    };
    let h = harness(&config);
    assert!(h.api.get_client_capabilities().await.is_none());
}
