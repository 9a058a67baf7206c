//! Persisted registration state
//!
//! One [`WebhookRegistration`] exists per workflow instance, held in the
//! host's workflow-scoped key/value record. The [`RegistrationStore`] port
//! abstracts that record; the host adapter persists it, and
//! [`InMemoryRegistrationStore`] stands in for tests and embedding.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Local record of a remote webhook registration.
///
/// Serde names match the host's key/value layout, so the record round-trips
/// the keys the host already stores (`webhookId`, `idBusiness`, ...).
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRegistration {
    /// Remote-assigned webhook identifier
    pub webhook_id: String,
    /// Owning account, copied from credentials at creation time
    pub id_business: i64,
    /// Trigger tags this registration subscribes to
    pub webhook_events: Vec<String>,
    /// False until the verification handshake completes; until then inbound
    /// payloads are treated as handshake challenges, not live events
    pub is_verified: bool,
    /// Secret shared with ProAbono; verifier input only, never transmitted
    pub webhook_security_key: String,
}

impl WebhookRegistration {
    /// Create a fresh, not-yet-verified registration
    pub fn new(
        webhook_id: String,
        id_business: i64,
        webhook_events: Vec<String>,
        webhook_security_key: String,
    ) -> Self {
        Self {
            webhook_id,
            id_business,
            webhook_events,
            is_verified: false,
            webhook_security_key,
        }
    }
}

// The security key stays out of debug output
impl std::fmt::Debug for WebhookRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookRegistration")
            .field("webhook_id", &self.webhook_id)
            .field("id_business", &self.id_business)
            .field("webhook_events", &self.webhook_events)
            .field("is_verified", &self.is_verified)
            .field("webhook_security_key", &"***")
            .finish()
    }
}

/// Port over the host's persistent per-workflow record
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Load the current registration, if one is on record
    async fn load(&self) -> Result<Option<WebhookRegistration>>;

    /// Persist the registration, replacing any previous record
    async fn save(&self, registration: &WebhookRegistration) -> Result<()>;

    /// Remove the registration entirely
    async fn clear(&self) -> Result<()>;
}

/// In-memory registration store
pub struct InMemoryRegistrationStore {
    record: RwLock<Option<WebhookRegistration>>,
}

impl InMemoryRegistrationStore {
    pub fn new() -> Self {
        Self {
            record: RwLock::new(None),
        }
    }

    /// Start from an existing record (e.g. restored by the host)
    pub fn with_registration(registration: WebhookRegistration) -> Self {
        Self {
            record: RwLock::new(Some(registration)),
        }
    }
}

impl Default for InMemoryRegistrationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RegistrationStore for InMemoryRegistrationStore {
    async fn load(&self) -> Result<Option<WebhookRegistration>> {
        Ok(self.record.read().clone())
    }

    async fn save(&self, registration: &WebhookRegistration) -> Result<()> {
        *self.record.write() = Some(registration.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.record.write() = None;
        Ok(())
    }
}
