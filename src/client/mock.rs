//! In-memory upstreams for handler tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{
    ClientError, ExperimentQuery, MonitorApi, PilotApi, PromData, RangeQuery, ServingApi,
};
use crate::models::{CreateInstance, CreateTest, ExperimentPage, ExperimentRecord, InstanceRecord};

#[derive(Default)]
pub struct MockServing {
    pub instances: Vec<InstanceRecord>,
    pub experiments: Vec<ExperimentRecord>,
    pub fail: bool,
    pub last_query: Mutex<Option<ExperimentQuery>>,
}

impl MockServing {
    fn check(&self) -> Result<(), ClientError> {
        if self.fail {
            return Err(ClientError::Api {
                code: "500".to_string(),
                message: "serving unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ServingApi for MockServing {
    async fn list_instances(&self) -> Result<Vec<InstanceRecord>, ClientError> {
        self.check()?;
        Ok(self.instances.clone())
    }

    async fn create_instance(&self, body: &CreateInstance) -> Result<Value, ClientError> {
        self.check()?;
        Ok(json!({"instance_id": "new", "instance_name": body.instance_name}))
    }

    async fn delete_instance(&self, instance_id: &str) -> Result<Value, ClientError> {
        self.check()?;
        if self.instances.iter().any(|i| i.instance_id == instance_id) {
            Ok(Value::Null)
        } else {
            Err(ClientError::Api {
                code: "404".to_string(),
                message: format!("instance {instance_id} not found"),
            })
        }
    }

    async fn list_experiments(
        &self,
        query: &ExperimentQuery,
    ) -> Result<ExperimentPage, ClientError> {
        self.check()?;
        *self.last_query.lock().unwrap() = Some(query.clone());
        let data: Vec<ExperimentRecord> = self
            .experiments
            .iter()
            .filter(|e| {
                query
                    .instance_id
                    .as_ref()
                    .map_or(true, |id| &e.instance_id == id)
            })
            .cloned()
            .collect();
        let total = data.len() as u32;
        Ok(ExperimentPage {
            data,
            page: query.page,
            size: query.size,
            total_num: total,
            total_page: total.div_ceil(query.size.max(1)),
        })
    }

    async fn create_experiment(&self, body: &CreateTest) -> Result<Value, ClientError> {
        self.check()?;
        Ok(json!({"test_id": "t-new", "instance_id": body.instance_id}))
    }
}

#[derive(Default)]
pub struct MockMonitor {
    pub data: PromData,
    pub last_query: Mutex<Option<RangeQuery>>,
}

#[async_trait]
impl MonitorApi for MockMonitor {
    async fn query_range(&self, query: &RangeQuery) -> Result<PromData, ClientError> {
        *self.last_query.lock().unwrap() = Some(query.clone());
        Ok(self.data.clone())
    }
}

#[derive(Default)]
pub struct MockPilot;

#[async_trait]
impl PilotApi for MockPilot {
    async fn detect_history(&self, task_name: &str) -> Result<Value, ClientError> {
        Ok(json!({"data": [{"task_name": task_name}]}))
    }
}
