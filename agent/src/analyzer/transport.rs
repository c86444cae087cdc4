use crate::analyzer::gemini::GenerateContentRequest;
use crate::error::{AdvisorError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// A provider call that did not produce a success body.
/// `status` is `None` when the request never got an HTTP answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub status: Option<u16>,
    pub detail: String,
}

/// Black-box request/response function in front of `generateContent`.
/// One call, one request; no retries.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Returns the raw body of a 2xx response.
    async fn generate_content(
        &self,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> std::result::Result<String, TransportFailure>;
}

/// HTTPS transport backed by reqwest. The credential travels as the `key` query parameter.
pub struct ReqwestTransport {
    endpoint: String,
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(api_base: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdvisorError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self {
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                api_base.trim_end_matches('/'),
                model
            ),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn generate_content(
        &self,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> std::result::Result<String, TransportFailure> {
        let resp = self
            .client
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| TransportFailure {
                status: e.status().map(|s| s.as_u16()),
                // the URL carries the key
                detail: format!("Gemini API request: {}", e.without_url()),
            })?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| unreadable_body(status, e.without_url()))?;

        if !status.is_success() {
            return Err(TransportFailure {
                status: Some(status.as_u16()),
                detail: body,
            });
        }

        debug!("Gemini: {} bytes from {}", body.len(), status);
        Ok(body)
    }
}

/// An error status survives a body that could not be read.
fn unreadable_body(status: reqwest::StatusCode, err: impl std::fmt::Display) -> TransportFailure {
    TransportFailure {
        status: (!status.is_success()).then_some(status.as_u16()),
        detail: format!("Gemini API body: {err}"),
    }
}
