//! Prometheus range-query client.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{unwrap_envelope, ClientError, HttpApi, MonitorApi};
use crate::config::EndpointConfig;

const QUERY_RANGE_PATH: &str = "/api/v1/query_range";

/// Parameters of a `query_range` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeQuery {
    pub query: String,
    pub start: String,
    pub end: String,
    pub step: String,
}

/// One time series; each sample is `[unix_ts, "value"]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromSeries {
    #[serde(default)]
    pub metric: BTreeMap<String, String>,
    #[serde(default)]
    pub values: Vec<(f64, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PromData {
    #[serde(rename = "resultType", default)]
    pub result_type: String,
    #[serde(default)]
    pub result: Vec<PromSeries>,
}

#[derive(Debug, Deserialize)]
struct PromResponse {
    #[serde(default)]
    data: PromData,
}

pub struct MonitorClient {
    api: HttpApi,
}

impl MonitorClient {
    pub fn new(config: &EndpointConfig) -> Result<Self, ClientError> {
        Ok(Self {
            api: HttpApi::new(config)?,
        })
    }
}

/// Decode a `query_range` body, rejecting non-success statuses.
pub fn decode_range_response(body: Value) -> Result<PromData, ClientError> {
    let body = unwrap_envelope(body)?;
    let response: PromResponse = serde_json::from_value(body)?;
    Ok(response.data)
}

#[async_trait]
impl MonitorApi for MonitorClient {
    async fn query_range(&self, query: &RangeQuery) -> Result<PromData, ClientError> {
        debug!(query = %query.query, start = %query.start, end = %query.end, "Range query");
        let request = self
            .api
            .client()
            .get(self.api.url(QUERY_RANGE_PATH)?)
            .query(query);
        decode_range_response(self.api.send(request).await?)
    }
}
