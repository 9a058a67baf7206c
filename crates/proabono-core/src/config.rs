use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Credentials and endpoints for one ProAbono account.
///
/// The agent key / API key pair authenticates every management call via HTTP
/// Basic auth. The webhook security key is only ever an input to signature
/// verification and must never leave the connector in a request body or log.
#[derive(Clone, Deserialize)]
pub struct ProAbonoConfig {
    pub agent_key: String,
    pub api_key: String,
    pub business_id: i64,
    pub webhook_security_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl ProAbonoConfig {
    pub fn new(agent_key: String, api_key: String, business_id: i64, webhook_security_key: String) -> Self {
        Self {
            agent_key,
            api_key,
            business_id,
            webhook_security_key,
            base_url: default_base_url(),
        }
    }

    /// Load configuration from `PROABONO__*` environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_env("PROABONO")
    }

    /// Load configuration from environment with custom prefix
    pub fn load_from_env(prefix: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(
                Environment::with_prefix(prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("base_url", default_base_url())?;

        let config = builder.build()?;
        config.try_deserialize()
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Per-business API base URL, used by the credential test request
    pub fn api_base_url(&self) -> String {
        format!("https://api-{}.proabono.com/v1", self.business_id)
    }
}

// Keys stay out of debug output
impl std::fmt::Debug for ProAbonoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProAbonoConfig")
            .field("agent_key", &"***")
            .field("api_key", &"***")
            .field("business_id", &self.business_id)
            .field("webhook_security_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn default_base_url() -> String {
    "https://via.proabono.com".to_string()
}
