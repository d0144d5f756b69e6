//! Serving-management API client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::{ClientError, HttpApi, ServingApi};
use crate::config::EndpointConfig;
use crate::models::{CreateInstance, CreateTest, ExperimentPage, InstanceList, InstanceRecord};

const SERVING_PATH: &str = "/v1/serving";
const TEST_PATH: &str = "/v1/serving/instance/test";

/// Filters for listing experiments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_status: Option<String>,
    pub page: u32,
    pub size: u32,
}

pub struct ServingClient {
    api: HttpApi,
}

impl ServingClient {
    pub fn new(config: &EndpointConfig) -> Result<Self, ClientError> {
        Ok(Self {
            api: HttpApi::new(config)?,
        })
    }
}

#[async_trait]
impl ServingApi for ServingClient {
    async fn list_instances(&self) -> Result<Vec<InstanceRecord>, ClientError> {
        let request = self.api.client().get(self.api.url(SERVING_PATH)?);
        let result = self.api.send_enveloped(request).await?;
        let list: InstanceList = serde_json::from_value(result)?;
        info!("Fetched {} serving instances", list.data.len());
        Ok(list.data)
    }

    async fn create_instance(&self, body: &CreateInstance) -> Result<Value, ClientError> {
        let request = self.api.client().post(self.api.url(SERVING_PATH)?).json(body);
        self.api.send_enveloped(request).await
    }

    async fn delete_instance(&self, instance_id: &str) -> Result<Value, ClientError> {
        let url = self.api.url_with_segment(SERVING_PATH, instance_id)?;
        self.api.send_enveloped(self.api.client().delete(url)).await
    }

    async fn list_experiments(
        &self,
        query: &ExperimentQuery,
    ) -> Result<ExperimentPage, ClientError> {
        let request = self.api.client().get(self.api.url(TEST_PATH)?).query(query);
        let result = self.api.send_enveloped(request).await?;
        let page: ExperimentPage = serde_json::from_value(result)?;
        info!(
            "Fetched {} experiments (page {}/{})",
            page.data.len(),
            page.page,
            page.total_page
        );
        Ok(page)
    }

    async fn create_experiment(&self, body: &CreateTest) -> Result<Value, ClientError> {
        let request = self.api.client().post(self.api.url(TEST_PATH)?).json(body);
        self.api.send_enveloped(request).await
    }
}
