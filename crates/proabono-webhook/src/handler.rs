//! Inbound notification handling
//!
//! Every POST the host delivers lands here. The handler authenticates the
//! sender, completes the one-time verification handshake when it is still
//! pending, and decides what the workflow gets to see. The HTTP answer is
//! always a 200 acknowledgment: ProAbono retries non-2xx deliveries, which
//! is never what we want, so the trust decision lives entirely in the
//! forwarded payload.

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    client::RemoteServicePort,
    sample::SampleEventResolver,
    signature::verify_signature,
    store::{RegistrationStore, WebhookRegistration},
    Result,
};

/// Header carrying the base64 signature digest
pub const SIGNATURE_HEADER: &str = "x-proabono-signature";
/// Header carrying the per-delivery public key material
pub const PUBLIC_KEY_HEADER: &str = "x-proabono-key";

/// One received call, as handed over by the host. Not persisted.
#[derive(Debug, Clone)]
pub struct InboundNotification {
    /// Raw headers
    pub headers: Vec<(String, String)>,
    /// Event payload or handshake challenge
    pub body: Value,
    /// Arrival time
    pub received_at: DateTime<Utc>,
}

impl InboundNotification {
    pub fn new(headers: Vec<(String, String)>, body: Value) -> Self {
        Self {
            headers,
            body,
            received_at: Utc::now(),
        }
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// HTTP-level acknowledgment returned to ProAbono on every delivery
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookAck {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub message: String,
}

impl WebhookAck {
    pub fn received() -> Self {
        Self {
            status_code: 200,
            message: "Webhook received successfully".to_string(),
        }
    }
}

/// Outcome of one inbound call: what to answer and what to forward
#[derive(Debug, Clone)]
pub struct WebhookReceipt {
    pub ack: WebhookAck,
    /// Payload handed to the workflow; `{}` for untrusted deliveries
    pub payload: Value,
}

impl WebhookReceipt {
    fn forward(payload: Value) -> Self {
        Self {
            ack: WebhookAck::received(),
            payload,
        }
    }

    /// No-op delivery: acknowledged to the sender, nothing for the workflow
    fn empty() -> Self {
        Self::forward(json!({}))
    }

    pub fn is_empty(&self) -> bool {
        self.payload.as_object().map(|o| o.is_empty()).unwrap_or(false)
    }
}

/// Inbound-request state machine for one registration
pub struct NotificationHandler {
    port: Arc<dyn RemoteServicePort>,
    store: Arc<dyn RegistrationStore>,
    resolver: SampleEventResolver,
}

impl NotificationHandler {
    pub fn new(port: Arc<dyn RemoteServicePort>, store: Arc<dyn RegistrationStore>) -> Self {
        let resolver = SampleEventResolver::new(Arc::clone(&port));
        Self {
            port,
            store,
            resolver,
        }
    }

    /// Process one inbound notification.
    ///
    /// Untrusted input (missing, blank, or invalid signature, or no
    /// registration to verify against) is acknowledged like anything else
    /// and forwarded as an empty payload; bad signatures are adversarial
    /// input, not system faults, and are never surfaced as errors.
    pub async fn handle(&self, notification: InboundNotification) -> Result<WebhookReceipt> {
        let signature = notification.header(SIGNATURE_HEADER).unwrap_or("");
        if signature.trim().is_empty() {
            debug!("Inbound notification without signature header, dropping");
            return Ok(WebhookReceipt::empty());
        }

        let Some(registration) = self.store.load().await? else {
            debug!("Inbound notification with no registration on record, dropping");
            return Ok(WebhookReceipt::empty());
        };

        let public_key = notification.header(PUBLIC_KEY_HEADER).unwrap_or("");
        if !verify_signature(public_key, signature, &registration.webhook_security_key) {
            // Possible spoofing attempt; say nothing to the caller
            warn!(webhook_id = %registration.webhook_id, "Inbound signature rejected");
            return Ok(WebhookReceipt::empty());
        }

        if registration.is_verified {
            // Common case: live event, pass the body through unchanged
            debug!(webhook_id = %registration.webhook_id, "Forwarding live event");
            return Ok(WebhookReceipt::forward(notification.body));
        }

        self.complete_handshake(registration, &notification.body).await
    }

    /// One-time challenge/response: echo the code back, mark the
    /// registration verified, and replay a first payload for the workflow.
    async fn complete_handshake(
        &self,
        mut registration: WebhookRegistration,
        body: &Value,
    ) -> Result<WebhookReceipt> {
        let code = body.get("Code").and_then(Value::as_str).unwrap_or_default();
        let endpoint = format!(
            "/Notification/Webhooks/{}/Verification",
            registration.webhook_id
        );

        if let Err(error) = self
            .port
            .send(
                Method::POST,
                &endpoint,
                json!({}),
                Some(json!({ "code": code, "echo": true })),
            )
            .await
        {
            // Leave the registration unverified; ProAbono re-sends the
            // challenge on its next delivery attempt
            warn!(
                webhook_id = %registration.webhook_id,
                error = %error,
                "Verification acknowledgment failed"
            );
            return Ok(WebhookReceipt::empty());
        }

        registration.is_verified = true;
        self.store.save(&registration).await?;
        info!(webhook_id = %registration.webhook_id, "Webhook verified");

        let payload = self
            .resolver
            .resolve_latest(&registration.webhook_events, registration.id_business)
            .await;

        Ok(WebhookReceipt::forward(payload))
    }
}
