//! Request/response exchange with the planning service

use std::time::Duration;

use async_trait::async_trait;
use planview_core::{PlanRequest, PlanResponse, TransportError};
use reqwest::header::CONTENT_TYPE;

/// Planning endpoint used when none is configured
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/generate-plan";

/// One request, one response
#[async_trait]
pub trait PlanTransport: Send + Sync {
    async fn send(&self, request: &PlanRequest) -> Result<PlanResponse, TransportError>;
}

/// JSON over HTTP POST
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// Transport without a request timeout
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Transport that gives up after `timeout`
    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Transport over a preconfigured client (proxies, TLS, headers)
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PlanTransport for HttpTransport {
    async fn send(&self, request: &PlanRequest) -> Result<PlanResponse, TransportError> {
        tracing::debug!(endpoint = %self.endpoint, "Sending plan request");

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::Request(format!("Failed to send request: {}", e)))?;

        // Failed plans come back with 4xx/5xx and a JSON body, so the
        // status alone does not decide the outcome.
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Request(format!("Failed to read response: {}", e)))?;

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "Received plan response");

        serde_json::from_str(&body).map_err(|e| {
            TransportError::Decode(format!("{} (HTTP {})", e, status.as_u16()))
        })
    }
}
