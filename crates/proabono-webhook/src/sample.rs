//! Sample event resolution
//!
//! When a workflow is being designed there is usually no live event to show
//! yet. The resolver replays the most recent real event for the subscribed
//! triggers, falls back to ProAbono's static sample payloads, and as a last
//! resort produces a diagnostic placeholder. It never fails: this path only
//! exists to aid workflow design.

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{client::RemoteServicePort, Result, WebhookError};

const REWIND_EVENTS_ENDPOINT: &str = "/Notification/WebhookNotifications/RewindEvents";
const SAMPLE_ENDPOINT: &str = "/Notification/Webhooks/Sample";

/// Fallback chain for representative event payloads
pub struct SampleEventResolver {
    port: Arc<dyn RemoteServicePort>,
}

impl SampleEventResolver {
    pub fn new(port: Arc<dyn RemoteServicePort>) -> Self {
        Self { port }
    }

    /// Resolve a representative payload for a single trigger tag
    pub async fn resolve(&self, trigger: &str, id_business: i64) -> Value {
        let triggers = vec![trigger.to_string()];
        self.resolve_latest(&triggers, id_business).await
    }

    /// Resolve a representative payload across a set of subscribed triggers.
    ///
    /// One rewind query covers the whole set; the static-sample fallback
    /// uses the first trigger. Any transport error becomes a diagnostic
    /// placeholder describing the failure.
    pub async fn resolve_latest(&self, triggers: &[String], id_business: i64) -> Value {
        let label = triggers.join(", ");

        match self.lookup(triggers, id_business).await {
            Ok(Some(event)) => event,
            Ok(None) => {
                debug!(triggers = %label, "No historical or sample event available");
                json!({ "message": format!("No sample available for trigger: {label}") })
            }
            Err(error) => {
                warn!(triggers = %label, error = %error, "Sample event lookup failed");
                json!({
                    "message": format!("Error retrieving event for trigger: {label}"),
                    "error": error.to_string(),
                })
            }
        }
    }

    async fn lookup(&self, triggers: &[String], id_business: i64) -> Result<Option<Value>> {
        // 1. Most recent real event for the subscribed triggers
        let rewind = self
            .port
            .fetch(
                REWIND_EVENTS_ENDPOINT,
                Some(json!({
                    "idBusiness": id_business,
                    "sizepage": 1,
                    "links": false,
                    "TypeTrigger": triggers,
                })),
            )
            .await?;

        let count = rewind.get("Count").and_then(Value::as_i64).unwrap_or(0);
        if count >= 1 {
            if let Some(item) = rewind
                .get("Items")
                .and_then(Value::as_array)
                .and_then(|items| items.first())
            {
                return Ok(Some(item.clone()));
            }
        }

        // 2. Static sample payload
        let Some(trigger) = triggers.first() else {
            return Ok(None);
        };

        let sample = self
            .port
            .fetch(SAMPLE_ENDPOINT, Some(json!({ "TypeTrigger": trigger })))
            .await?;

        match sample.get("Data") {
            // Samples are sometimes delivered as a JSON-encoded string
            Some(Value::String(encoded)) => {
                let decoded = serde_json::from_str(encoded)
                    .map_err(|e| WebhookError::Serialization(e.to_string()))?;
                Ok(Some(decoded))
            }
            Some(Value::Null) | None => Ok(None),
            Some(data) => Ok(Some(data.clone())),
        }
    }
}
