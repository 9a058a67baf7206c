//! Remote webhook client
//!
//! A thin authenticated wrapper over ProAbono's webhook-management and
//! event-sampling endpoints. The [`RemoteServicePort`] trait is the seam the
//! rest of the subsystem depends on; [`ProAbonoClient`] is the production
//! implementation and tests substitute an in-memory fake.

use async_trait::async_trait;
use proabono_core::ProAbonoConfig;
use reqwest::{header, Client, Method};
use serde_json::Value;
use tracing::debug;

use crate::{Result, WebhookError};

/// Capability port for authenticated calls to the remote service.
///
/// Mirrors the host-provided request helpers: `fetch` for GET with query
/// parameters, `send` for requests that carry a JSON body. Both resolve to
/// the parsed JSON response body, or [`WebhookError::RemoteApi`] on any
/// non-2xx response.
#[async_trait]
pub trait RemoteServicePort: Send + Sync {
    /// GET `path`, JSON response expected
    async fn fetch(&self, path: &str, query: Option<Value>) -> Result<Value>;

    /// POST/DELETE `path` with a JSON body
    async fn send(&self, method: Method, path: &str, body: Value, query: Option<Value>)
        -> Result<Value>;

    /// Credentials of the account this port is bound to
    fn credentials(&self) -> &ProAbonoConfig;
}

/// Production client backed by reqwest
pub struct ProAbonoClient {
    client: Client,
    config: ProAbonoConfig,
}

impl ProAbonoClient {
    pub fn new(config: ProAbonoConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Credential test request: a plain authenticated GET against the
    /// per-business API. Succeeds on any 2xx response.
    pub async fn test_connection(&self) -> Result<()> {
        let url = format!("{}/customers", self.config.api_base_url());
        self.execute(Method::GET, &url, None, None).await?;
        Ok(())
    }

    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        query: Option<&Value>,
    ) -> Result<Value> {
        let mut request = self
            .client
            .request(method.clone(), url)
            .basic_auth(&self.config.agent_key, Some(&self.config.api_key))
            .header(header::ACCEPT, "application/json");

        // An empty query object is omitted entirely, not sent as "?"
        if let Some(query) = query {
            let pairs = query_pairs(query);
            if !pairs.is_empty() {
                request = request.query(&pairs);
            }
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(%method, %url, "Issuing ProAbono API request");

        let response = request
            .send()
            .await
            .map_err(|e| WebhookError::Http(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| WebhookError::Http(e.to_string()))?;

        // Non-JSON bodies are preserved verbatim so callers still see what
        // the remote side said
        let payload = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        if !status.is_success() {
            return Err(WebhookError::RemoteApi {
                status: status.as_u16(),
                body: payload,
            });
        }

        Ok(payload)
    }
}

#[async_trait]
impl RemoteServicePort for ProAbonoClient {
    async fn fetch(&self, path: &str, query: Option<Value>) -> Result<Value> {
        let url = format!("{}{}", self.config.base_url, path);
        self.execute(Method::GET, &url, None, query.as_ref()).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Value,
        query: Option<Value>,
    ) -> Result<Value> {
        let url = format!("{}{}", self.config.base_url, path);
        self.execute(method, &url, Some(&body), query.as_ref()).await
    }

    fn credentials(&self) -> &ProAbonoConfig {
        &self.config
    }
}

/// Flatten a JSON object into query pairs. Array values repeat the key once
/// per element; null values are dropped.
fn query_pairs(query: &Value) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    if let Some(object) = query.as_object() {
        for (key, value) in object {
            match value {
                Value::Array(items) => {
                    for item in items {
                        pairs.push((key.clone(), scalar_to_string(item)));
                    }
                }
                Value::Null => {}
                other => pairs.push((key.clone(), scalar_to_string(other))),
            }
        }
    }

    pairs
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
