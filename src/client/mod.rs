//! HTTP clients for the serving, metrics and pilot APIs.
//!
//! Each upstream gets a thin client over a shared [`HttpApi`] that stamps a
//! trace id on every request and unwraps the `{code, message, result}`
//! envelope. The traits at the bottom are the seam the console API
//! depends on.

pub mod monitor;
pub mod pilot;
pub mod serving;

#[cfg(test)]
pub mod mock;

pub use monitor::{MonitorClient, PromData, PromSeries, RangeQuery};
pub use pilot::PilotClient;
pub use serving::{ExperimentQuery, ServingClient};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::EndpointConfig;
use crate::models::{CreateInstance, CreateTest, ExperimentPage, InstanceRecord};

/// Errors raised while talking to an upstream API.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("API error {code}: {message}")]
    Api { code: String, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid path segment: {0:?}")]
    InvalidSegment(String),
}

/// Header carrying the per-request trace id.
pub const TRACE_HEADER: &str = "trace_id";

/// Shared request plumbing for one upstream.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(config: &EndpointConfig) -> Result<Self, ClientError> {
        Url::parse(&config.base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("serving-console/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Absolute URL for `path`, keeping any prefix in the base URL.
    pub fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(Url::parse(&format!("{}{}", self.base_url, path))?)
    }

    /// Absolute URL for `path` with `segment` appended as one escaped path segment.
    pub fn url_with_segment(&self, path: &str, segment: &str) -> Result<Url, ClientError> {
        if !is_plain_segment(segment) {
            return Err(ClientError::InvalidSegment(segment.to_string()));
        }
        let mut url = self.url(path)?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(segment);
        Ok(url)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Send a request and decode the JSON body, failing on non-2xx.
    pub async fn send(&self, request: RequestBuilder) -> Result<Value, ClientError> {
        let trace_id = uuid::Uuid::new_v4().to_string();
        let request = request.header(TRACE_HEADER, &trace_id).build()?;
        info!(
            method = %request.method(),
            url = %request.url(),
            trace_id = %trace_id,
            "Calling upstream"
        );

        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| error_message(&v))
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Error").to_string());
            warn!(status = status.as_u16(), %message, "Upstream returned error status");
            return Err(ClientError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        debug!(bytes = body.len(), "Upstream response received");
        Ok(serde_json::from_str(&body)?)
    }

    /// Send a request and unwrap the response envelope.
    pub async fn send_enveloped(&self, request: RequestBuilder) -> Result<Value, ClientError> {
        unwrap_envelope(self.send(request).await?)
    }
}

/// True when `segment` names a single resource: non-empty, no `/`, and not a dot segment.
pub fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".." && !segment.contains('/')
}

fn error_message(body: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Unwrap a response envelope.
///
/// `code` 0 (number or string) yields `result`; a body with
/// `status: "success"` is returned whole; anything else is an API error.
pub fn unwrap_envelope(body: Value) -> Result<Value, ClientError> {
    let code_ok = match body.get("code") {
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::String(s)) => s.trim() == "0",
        _ => false,
    };
    if code_ok {
        return Ok(body.get("result").cloned().unwrap_or(Value::Null));
    }

    if body.get("status").and_then(Value::as_str) == Some("success") {
        return Ok(body);
    }

    let code = match body.get("code") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    let message = error_message(&body).unwrap_or_else(|| "Error".to_string());
    warn!(%code, %message, "Upstream API reported failure");
    Err(ClientError::Api { code, message })
}

/// Serving-management API.
#[async_trait]
pub trait ServingApi: Send + Sync {
    async fn list_instances(&self) -> Result<Vec<InstanceRecord>, ClientError>;

    async fn create_instance(&self, body: &CreateInstance) -> Result<Value, ClientError>;

    async fn delete_instance(&self, instance_id: &str) -> Result<Value, ClientError>;

    async fn list_experiments(&self, query: &ExperimentQuery)
        -> Result<ExperimentPage, ClientError>;

    async fn create_experiment(&self, body: &CreateTest) -> Result<Value, ClientError>;
}

/// Prometheus-compatible metrics API.
#[async_trait]
pub trait MonitorApi: Send + Sync {
    async fn query_range(&self, query: &RangeQuery) -> Result<PromData, ClientError>;
}

/// Autoscaler (pilot) API.
#[async_trait]
pub trait PilotApi: Send + Sync {
    async fn detect_history(&self, task_name: &str) -> Result<Value, ClientError>;
}
