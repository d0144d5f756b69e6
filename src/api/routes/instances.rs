use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::client::is_plain_segment;
use crate::models::{CreateInstance, InstanceRecord};

#[derive(Debug, Serialize)]
pub struct InstanceListResponse {
    pub instances: Vec<InstanceRecord>,
    pub current_id: String,
}

/// Refresh the instance list from the serving API.
pub async fn list_instances(
    State(state): State<AppState>,
) -> Result<Json<InstanceListResponse>, ApiError> {
    state.instances.write().await.table_loading = true;

    let fetched = state.serving.list_instances().await;

    let mut store = state.instances.write().await;
    store.table_loading = false;
    match fetched {
        Ok(instances) => {
            store.instance_list = instances;
            Ok(Json(InstanceListResponse {
                instances: store.instance_list.clone(),
                current_id: store.current_id.clone(),
            }))
        }
        Err(e) => {
            error!("Failed to list instances: {}", e);
            Err(e.into())
        }
    }
}

pub async fn create_instance(
    State(state): State<AppState>,
    Json(body): Json<CreateInstance>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if body.model.trim().is_empty() {
        return Err(ApiError::BadRequest("model must not be empty".to_string()));
    }
    info!("Deploying instance '{}' ({})", body.instance_name, body.model);
    let created = state.serving.create_instance(&body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete_instance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !is_plain_segment(&id) {
        return Err(ApiError::BadRequest(format!("invalid instance id {id:?}")));
    }
    state.serving.delete_instance(&id).await?;
    info!("Deleted instance {}", id);

    let mut store = state.instances.write().await;
    store.instance_list.retain(|i| i.instance_id != id);
    if store.current_id == id {
        store.current_id.clear();
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;

    use crate::api::build_router;
    use crate::api::routes::test_support::*;
    use crate::client::mock::{MockMonitor, MockServing};

    #[tokio::test]
    async fn test_list_instances_populates_store() {
        let serving = MockServing {
            instances: vec![instance("a", "job-a"), instance("b", "job-b")],
            ..MockServing::default()
        };
        let state = setup_state(serving, Arc::new(MockMonitor::default()));
        let app = build_router(state.clone());

        let (status, json) = get_json(app, "/api/instances").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["instances"].as_array().unwrap().len(), 2);
        let store = state.instances.read().await;
        assert_eq!(store.instance_list.len(), 2);
        assert!(!store.table_loading);
    }

    #[tokio::test]
    async fn test_list_instances_upstream_failure() {
        let serving = MockServing {
            fail: true,
            ..MockServing::default()
        };
        let state = setup_state(serving, Arc::new(MockMonitor::default()));
        let app = build_router(state.clone());

        let (status, json) = get_json(app, "/api/instances").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"]["code"], "UPSTREAM_ERROR");
        assert!(!state.instances.read().await.table_loading);
    }

    #[tokio::test]
    async fn test_create_instance() {
        let state = setup_state(MockServing::default(), Arc::new(MockMonitor::default()));
        let app = build_router(state);

        let (status, json) = send(
            app,
            "POST",
            "/api/instances",
            Some(r#"{"instance_name": "demo", "model": "THUDM/chatglm3-6b"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["instance_name"], "demo");
    }

    #[tokio::test]
    async fn test_create_instance_requires_model() {
        let state = setup_state(MockServing::default(), Arc::new(MockMonitor::default()));
        let app = build_router(state);

        let (status, _) = send(
            app,
            "POST",
            "/api/instances",
            Some(r#"{"instance_name": "demo", "model": " "}"#),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_instance_clears_selection() {
        let serving = MockServing {
            instances: vec![instance("a", "job-a")],
            ..MockServing::default()
        };
        let state = setup_state(serving, Arc::new(MockMonitor::default()));
        {
            let mut store = state.instances.write().await;
            store.instance_list = vec![instance("a", "job-a")];
            store.current_id = "a".to_string();
        }
        let app = build_router(state.clone());

        let (status, _) = send(app, "DELETE", "/api/instances/a", None).await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        let store = state.instances.read().await;
        assert!(store.instance_list.is_empty());
        assert!(store.current_id.is_empty());
    }

    #[tokio::test]
    async fn test_delete_instance_rejects_traversal_id() {
        let serving = MockServing {
            instances: vec![instance("../../admin", "job-a")],
            ..MockServing::default()
        };
        let state = setup_state(serving, Arc::new(MockMonitor::default()));
        {
            let mut store = state.instances.write().await;
            store.instance_list = vec![instance("../../admin", "job-a")];
        }
        let app = build_router(state.clone());

        let (status, json) = send(app, "DELETE", "/api/instances/..%2F..%2Fadmin", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"]["message"].as_str().unwrap().contains("../../admin"));
        assert_eq!(state.instances.read().await.instance_list.len(), 1);
    }
}
