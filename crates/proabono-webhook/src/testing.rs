//! In-memory fake of the remote service port, shared by unit tests

use async_trait::async_trait;
use parking_lot::Mutex;
use proabono_core::ProAbonoConfig;
use reqwest::Method;
use serde_json::Value;
use std::collections::VecDeque;

use crate::{client::RemoteServicePort, Result};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedCall {
    pub method: String,
    pub path: String,
    pub body: Value,
    pub query: Value,
}

/// Scripted port: responses are handed out in FIFO order, every call is
/// recorded for assertions. An empty script yields `null` bodies.
pub(crate) struct FakePort {
    config: ProAbonoConfig,
    responses: Mutex<VecDeque<Result<Value>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakePort {
    pub fn new() -> Self {
        Self {
            config: ProAbonoConfig::new(
                "agent-key".to_string(),
                "api-key".to_string(),
                8641,
                "whsec-123".to_string(),
            ),
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn push_response(&self, response: Result<Value>) {
        self.responses.lock().push_back(response);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    fn record(&self, method: &str, path: &str, body: Value, query: Option<Value>) {
        self.calls.lock().push(RecordedCall {
            method: method.to_string(),
            path: path.to_string(),
            body,
            query: query.unwrap_or(Value::Null),
        });
    }

    fn next_response(&self) -> Result<Value> {
        self.responses
            .lock()
            .pop_front()
            .unwrap_or(Ok(Value::Null))
    }
}

#[async_trait]
impl RemoteServicePort for FakePort {
    async fn fetch(&self, path: &str, query: Option<Value>) -> Result<Value> {
        self.record("GET", path, Value::Null, query);
        self.next_response()
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Value,
        query: Option<Value>,
    ) -> Result<Value> {
        self.record(method.as_str(), path, body, query);
        self.next_response()
    }

    fn credentials(&self) -> &ProAbonoConfig {
        &self.config
    }
}
