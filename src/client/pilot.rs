//! Autoscaler (pilot) API client.

use async_trait::async_trait;
use serde_json::Value;

use super::{ClientError, HttpApi, PilotApi};
use crate::config::EndpointConfig;

const DETECT_HISTORY_PATH: &str = "/api/escaler/v1/task/detect/history";

pub struct PilotClient {
    api: HttpApi,
}

impl PilotClient {
    pub fn new(config: &EndpointConfig) -> Result<Self, ClientError> {
        Ok(Self {
            api: HttpApi::new(config)?,
        })
    }
}

#[async_trait]
impl PilotApi for PilotClient {
    async fn detect_history(&self, task_name: &str) -> Result<Value, ClientError> {
        let request = self
            .api
            .client()
            .get(self.api.url(DETECT_HISTORY_PATH)?)
            .query(&[("task_name", task_name)]);
        self.api.send_enveloped(request).await
    }
}
