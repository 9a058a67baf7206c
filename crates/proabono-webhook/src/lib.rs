//! Webhook trust-and-replay subsystem for the ProAbono connector
//!
//! This crate provides everything the connector needs to live behind a
//! workflow-automation host:
//! - Registering and tearing down the remote webhook subscription
//! - Verifying the authenticity of inbound notifications
//! - Completing the one-time verification handshake ProAbono requires
//!   before it starts delivering live events
//! - Resolving a representative sample event for workflow design
//!
//! The host supplies HTTP delivery and a persistent per-workflow key/value
//! record; the crate contributes no server or runtime of its own. All host
//! capabilities enter through two ports: [`RemoteServicePort`] for
//! authenticated calls to ProAbono and [`RegistrationStore`] for the
//! persisted registration record.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use proabono_core::{ProAbonoConfig, Trigger};
//! use proabono_webhook::{
//!     InMemoryRegistrationStore, NotificationHandler, ProAbonoClient,
//!     SubscriptionRegistrar,
//! };
//!
//! let config = ProAbonoConfig::load()?;
//! let port = Arc::new(ProAbonoClient::new(config));
//! let store = Arc::new(InMemoryRegistrationStore::new());
//!
//! let registrar = SubscriptionRegistrar::new(port.clone(), store.clone());
//! registrar
//!     .create("https://host.example/webhook/abc", &[Trigger::CustomerAdded])
//!     .await?;
//!
//! let handler = NotificationHandler::new(port, store);
//! let receipt = handler.handle(notification).await?;
//! ```

pub mod client;
pub mod handler;
pub mod registrar;
pub mod sample;
pub mod signature;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use client::*;
pub use handler::*;
pub use registrar::*;
pub use sample::*;
pub use signature::*;
pub use store::*;

use thiserror::Error;

/// Webhook errors
#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("remote API error (status {status}): {body}")]
    RemoteApi { status: u16, body: serde_json::Value },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("registration store error: {0}")]
    Store(String),
}

impl WebhookError {
    /// Status code of the remote response, when one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteApi { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error is a remote not-found response
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

pub type Result<T> = std::result::Result<T, WebhookError>;
