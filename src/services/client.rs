use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::ProbeError;
use super::request::{Method, ProbeRequest};

/// The only way the harness talks to the testbed.
///
/// The poller and the experiment runner depend on this trait rather than on
/// reqwest directly.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// Performs the request and decodes a 2xx JSON body. An empty 2xx body
    /// decodes to `Value::Null`.
    async fn execute(&self, request: &ProbeRequest) -> Result<Value, ProbeError>;
}

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    timeout: Duration,
}

impl BackendClient {
    pub fn new(timeout: Duration) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .timeout(timeout) // covers connect + body
            .build()
            .map_err(|e| ProbeError::Transport(e.to_string()))?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn classify(&self, err: reqwest::Error) -> ProbeError {
        if err.is_timeout() {
            ProbeError::Timeout(self.timeout.as_millis() as u64)
        } else {
            ProbeError::Transport(err.to_string())
        }
    }
}

/// Pulls the `error` field out of a backend error body, if it has one.
fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("error")? {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl HttpBackend for BackendClient {
    async fn execute(&self, request: &ProbeRequest) -> Result<Value, ProbeError> {
        let builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = builder.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        debug!(%request, status = status.as_u16(), len = bytes.len(), "Backend responded");

        if !status.is_success() {
            let text = String::from_utf8_lossy(&bytes);
            return Err(ProbeError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
                detail: error_detail(&text),
            });
        }

        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| ProbeError::Decode(e.to_string()))
    }
}
