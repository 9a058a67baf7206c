//! Subscription registrar
//!
//! Drives the create / check-exists / delete lifecycle of the remote webhook
//! registration and keeps the persisted [`WebhookRegistration`] in step with
//! what ProAbono has on its side.

use proabono_core::Trigger;
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    client::RemoteServicePort,
    store::{RegistrationStore, WebhookRegistration},
    Result,
};

/// Lifecycle manager for one workflow's webhook registration
pub struct SubscriptionRegistrar {
    port: Arc<dyn RemoteServicePort>,
    store: Arc<dyn RegistrationStore>,
}

impl SubscriptionRegistrar {
    pub fn new(port: Arc<dyn RemoteServicePort>, store: Arc<dyn RegistrationStore>) -> Self {
        Self { port, store }
    }

    /// Check whether the registration recorded locally still exists remotely.
    ///
    /// With no record on file this is a no-op returning `false`. A remote
    /// not-found response means ProAbono dropped the registration, so the
    /// local record is cleared as well. Other remote errors propagate.
    pub async fn exists(&self) -> Result<bool> {
        let Some(registration) = self.store.load().await? else {
            return Ok(false);
        };

        let endpoint = format!("/Notification/Webhooks/{}", registration.webhook_id);

        match self.port.fetch(&endpoint, None).await {
            Ok(_) => Ok(true),
            Err(error) if error.is_not_found() => {
                info!(
                    webhook_id = %registration.webhook_id,
                    "Remote webhook is gone, clearing local registration"
                );
                self.store.clear().await?;
                Ok(false)
            }
            Err(error) => Err(error),
        }
    }

    /// Register a webhook for `callback_url` subscribed to `triggers`.
    ///
    /// On success a fresh unverified registration is persisted and ProAbono
    /// is asked to send its verification challenge. That request is
    /// fire-and-forget: ProAbono re-sends the challenge on first delivery
    /// anyway, so its failure never fails `create`. Returns `false` when the
    /// creation response carries no identifier, leaving any prior record
    /// untouched.
    pub async fn create(&self, callback_url: &str, triggers: &[Trigger]) -> Result<bool> {
        let credentials = self.port.credentials();
        let id_business = credentials.business_id;
        let security_key = credentials.webhook_security_key.clone();

        let requested: Vec<&str> = triggers.iter().map(Trigger::as_str).collect();
        let body = json!({
            "Url": callback_url,
            "IdBusiness": id_business,
            "Triggers": requested,
        });

        let response = self
            .port
            .send(Method::POST, "/Notification/Webhooks", body, None)
            .await?;

        let Some(webhook_id) = identifier(&response) else {
            warn!("Webhook creation response did not contain an identifier");
            return Ok(false);
        };

        // ProAbono echoes the accepted triggers back; trust its version
        let webhook_events = response
            .get("Triggers")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_else(|| requested.iter().map(|t| t.to_string()).collect());

        let registration =
            WebhookRegistration::new(webhook_id.clone(), id_business, webhook_events, security_key);
        self.store.save(&registration).await?;

        info!(webhook_id = %webhook_id, "Webhook registered, requesting verification code");
        self.request_verification_code(webhook_id);

        Ok(true)
    }

    /// Tear down the remote registration.
    ///
    /// Errors from the remote delete are swallowed into a `false` outcome,
    /// and the local record is cleared once the delete has been attempted,
    /// whether or not it succeeded.
    pub async fn delete(&self) -> Result<bool> {
        let Some(registration) = self.store.load().await? else {
            return Ok(true);
        };

        let endpoint = format!("/Notification/Webhooks/{}", registration.webhook_id);
        let outcome = self
            .port
            .send(Method::DELETE, &endpoint, json!({}), None)
            .await;

        self.store.clear().await?;

        match outcome {
            Ok(_) => {
                debug!(webhook_id = %registration.webhook_id, "Webhook deleted");
                Ok(true)
            }
            Err(error) => {
                warn!(
                    webhook_id = %registration.webhook_id,
                    error = %error,
                    "Webhook delete failed"
                );
                Ok(false)
            }
        }
    }

    /// Ask ProAbono to issue the verification challenge, detached from the
    /// caller. Failure is logged and swallowed.
    fn request_verification_code(&self, webhook_id: String) {
        let port = Arc::clone(&self.port);
        tokio::spawn(async move {
            let endpoint = format!("/Notification/Webhooks/{webhook_id}/Verification");
            if let Err(error) = port.fetch(&endpoint, Some(json!({ "sendCode": true }))).await {
                warn!(
                    webhook_id = %webhook_id,
                    error = %error,
                    "Verification code request failed"
                );
            }
        });
    }
}

/// Remote identifiers arrive as either a JSON number or a string
fn identifier(response: &Value) -> Option<String> {
    match response.get("Id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryRegistrationStore;
    use crate::testing::FakePort;
    use crate::WebhookError;

    fn registrar_with(
        port: Arc<FakePort>,
        store: Arc<InMemoryRegistrationStore>,
    ) -> SubscriptionRegistrar {
        SubscriptionRegistrar::new(port, store)
    }

    fn existing_registration() -> WebhookRegistration {
        WebhookRegistration::new(
            "42".to_string(),
            8641,
            vec!["CustomerAdded".to_string()],
            "whsec-123".to_string(),
        )
    }

    fn not_found() -> WebhookError {
        WebhookError::RemoteApi {
            status: 404,
            body: Value::Null,
        }
    }

    #[tokio::test]
    async fn test_exists_without_record_makes_no_call() {
        let port = Arc::new(FakePort::new());
        let store = Arc::new(InMemoryRegistrationStore::new());
        let registrar = registrar_with(port.clone(), store);

        assert!(!registrar.exists().await.unwrap());
        assert!(port.calls().is_empty());
    }

    #[tokio::test]
    async fn test_exists_checks_remote_webhook() {
        let port = Arc::new(FakePort::new());
        port.push_response(Ok(json!({ "Id": 42 })));
        let store = Arc::new(InMemoryRegistrationStore::with_registration(
            existing_registration(),
        ));
        let registrar = registrar_with(port.clone(), store);

        assert!(registrar.exists().await.unwrap());
        assert_eq!(port.calls()[0].path, "/Notification/Webhooks/42");
    }

    #[tokio::test]
    async fn test_exists_not_found_clears_record() {
        let port = Arc::new(FakePort::new());
        port.push_response(Err(not_found()));
        let store = Arc::new(InMemoryRegistrationStore::with_registration(
            existing_registration(),
        ));
        let registrar = registrar_with(port, store.clone());

        assert!(!registrar.exists().await.unwrap());
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_exists_propagates_other_errors() {
        let port = Arc::new(FakePort::new());
        port.push_response(Err(WebhookError::RemoteApi {
            status: 500,
            body: Value::Null,
        }));
        let store = Arc::new(InMemoryRegistrationStore::with_registration(
            existing_registration(),
        ));
        let registrar = registrar_with(port, store.clone());

        assert!(registrar.exists().await.is_err());
        // Record survives a transient error
        assert!(store.load().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_persists_registration_and_requests_code() {
        let port = Arc::new(FakePort::new());
        port.push_response(Ok(json!({
            "Id": 42,
            "Triggers": ["CustomerAdded", "SubscriptionRenewed"],
        })));
        let store = Arc::new(InMemoryRegistrationStore::new());
        let registrar = registrar_with(port.clone(), store.clone());

        let created = registrar
            .create(
                "https://host.example/webhook/abc",
                &[Trigger::CustomerAdded, Trigger::SubscriptionRenewed],
            )
            .await
            .unwrap();
        assert!(created);

        let registration = store.load().await.unwrap().unwrap();
        assert_eq!(registration.webhook_id, "42");
        assert_eq!(registration.id_business, 8641);
        assert!(!registration.is_verified);
        assert_eq!(registration.webhook_security_key, "whsec-123");
        assert_eq!(
            registration.webhook_events,
            vec!["CustomerAdded".to_string(), "SubscriptionRenewed".to_string()]
        );

        let create_call = &port.calls()[0];
        assert_eq!(create_call.method, "POST");
        assert_eq!(create_call.path, "/Notification/Webhooks");
        assert_eq!(create_call.body["Url"], "https://host.example/webhook/abc");
        assert_eq!(create_call.body["IdBusiness"], 8641);
        // Security key never travels in the body
        assert!(create_call.body.get("webhookSecurityKey").is_none());

        // Let the detached verification request run
        tokio::task::yield_now().await;
        let calls = port.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].path, "/Notification/Webhooks/42/Verification");
        assert_eq!(calls[1].query["sendCode"], true);
    }

    #[tokio::test]
    async fn test_create_without_identifier_leaves_state_untouched() {
        let port = Arc::new(FakePort::new());
        port.push_response(Ok(json!({ "Message": "rejected" })));
        let store = Arc::new(InMemoryRegistrationStore::with_registration(
            existing_registration(),
        ));
        let registrar = registrar_with(port.clone(), store.clone());

        let created = registrar
            .create("https://host.example/webhook/abc", &[Trigger::CustomerAdded])
            .await
            .unwrap();
        assert!(!created);

        // Prior registration survives the failed create
        assert_eq!(store.load().await.unwrap(), Some(existing_registration()));

        tokio::task::yield_now().await;
        assert_eq!(port.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_create_succeeds_even_if_code_request_fails() {
        let port = Arc::new(FakePort::new());
        port.push_response(Ok(json!({ "Id": "42" })));
        port.push_response(Err(WebhookError::Http("connection reset".to_string())));
        let store = Arc::new(InMemoryRegistrationStore::new());
        let registrar = registrar_with(port, store.clone());

        let created = registrar
            .create("https://host.example/webhook/abc", &[Trigger::CustomerAdded])
            .await
            .unwrap();
        assert!(created);

        tokio::task::yield_now().await;
        assert!(store.load().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_without_record_is_noop_success() {
        let port = Arc::new(FakePort::new());
        let store = Arc::new(InMemoryRegistrationStore::new());
        let registrar = registrar_with(port.clone(), store);

        assert!(registrar.delete().await.unwrap());
        assert!(port.calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_clears_record() {
        let port = Arc::new(FakePort::new());
        port.push_response(Ok(Value::Null));
        let store = Arc::new(InMemoryRegistrationStore::with_registration(
            existing_registration(),
        ));
        let registrar = registrar_with(port.clone(), store.clone());

        assert!(registrar.delete().await.unwrap());
        assert!(store.load().await.unwrap().is_none());

        let call = &port.calls()[0];
        assert_eq!(call.method, "DELETE");
        assert_eq!(call.path, "/Notification/Webhooks/42");
    }

    #[tokio::test]
    async fn test_delete_failure_reports_false_but_clears() {
        let port = Arc::new(FakePort::new());
        port.push_response(Err(WebhookError::RemoteApi {
            status: 500,
            body: Value::Null,
        }));
        let store = Arc::new(InMemoryRegistrationStore::with_registration(
            existing_registration(),
        ));
        let registrar = registrar_with(port, store.clone());

        assert!(!registrar.delete().await.unwrap());
        assert!(store.load().await.unwrap().is_none());
    }

    #[test]
    fn test_identifier_accepts_number_or_string() {
        assert_eq!(identifier(&json!({ "Id": 42 })), Some("42".to_string()));
        assert_eq!(identifier(&json!({ "Id": "wh-42" })), Some("wh-42".to_string()));
        assert_eq!(identifier(&json!({ "Id": null })), None);
        assert_eq!(identifier(&json!({})), None);
    }
}
