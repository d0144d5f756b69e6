use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::api::state::AppState;
use crate::api::{ApiError, Pagination, PaginationMeta};
use crate::client::ExperimentQuery;
use crate::models::{CreateTest, ExperimentRecord};
use crate::window::DurationUnit;

#[derive(Debug, Deserialize)]
pub struct ListExperimentsParams {
    pub instance_id: Option<String>,
    pub test_id: Option<String>,
    pub test_status: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ExperimentListResponse {
    pub experiments: Vec<ExperimentRecord>,
    pub current_id: String,
    pub pagination: PaginationMeta,
}

/// Fetch a page of experiments and make it the dashboard's list.
pub async fn list_experiments(
    State(state): State<AppState>,
    Query(params): Query<ListExperimentsParams>,
) -> Result<Json<ExperimentListResponse>, ApiError> {
    let pagination = Pagination::new(params.page, params.size);
    let query = ExperimentQuery {
        instance_id: params.instance_id,
        test_id: params.test_id,
        test_status: params.test_status,
        page: pagination.page,
        size: pagination.page_size,
    };

    let page = state.serving.list_experiments(&query).await?;
    let meta = PaginationMeta::new(&pagination, page.total_num);

    let mut store = state.experiments.write().await;
    store.replace(page.data);

    Ok(Json(ExperimentListResponse {
        experiments: store.test_list.clone(),
        current_id: store.current_id.clone(),
        pagination: meta,
    }))
}

/// Launch a load test against an instance.
pub async fn create_experiment(
    State(state): State<AppState>,
    Json(body): Json<CreateTest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if body.instance_id.trim().is_empty() {
        return Err(ApiError::BadRequest("instance_id must not be empty".to_string()));
    }
    if body.test_spec.duration < 0.0 {
        return Err(ApiError::BadRequest("duration must not be negative".to_string()));
    }
    if DurationUnit::parse(&body.test_spec.duration_unit) == DurationUnit::Unrecognized {
        return Err(ApiError::BadRequest(format!(
            "unsupported duration_unit '{}'",
            body.test_spec.duration_unit
        )));
    }

    info!(
        "Launching {} test on {} for {}{}",
        body.test_spec.data_set,
        body.instance_id,
        body.test_spec.duration,
        body.test_spec.duration_unit
    );
    let created = state.serving.create_experiment(&body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;

    use crate::api::build_router;
    use crate::api::routes::test_support::*;
    use crate::client::mock::{MockMonitor, MockServing};

    fn create_body(unit: &str, duration: f64) -> String {
        serde_json::json!({
            "instance_id": "i-1",
            "test_spec": {
                "data_set": "GSM8K",
                "duration": duration,
                "duration_unit": unit,
                "distribution": "poisson",
                "tps_mean": 10.0,
                "tps_std": 10.0
            },
            "param_spec": {"max_tokens": 1024, "temperature": 0.8, "top_p": 0.8, "others": ""}
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_list_experiments_filters_and_paginates() {
        let serving = Arc::new(MockServing {
            experiments: vec![
                experiment("t-1", "i-1", 1.0, "hour"),
                experiment("t-2", "i-2", 1.0, "hour"),
            ],
            ..MockServing::default()
        });
        let state = crate::api::state::AppState::new(
            serving.clone(),
            Arc::new(MockMonitor::default()),
            Arc::new(crate::client::mock::MockPilot),
            Arc::new(crate::window::FixedClock(now())),
        );
        let app = build_router(state.clone());

        let (status, json) =
            get_json(app, "/api/experiments?instance_id=i-1&page=0&size=500").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["experiments"].as_array().unwrap().len(), 1);
        assert_eq!(json["pagination"]["page"], 1);
        assert_eq!(json["pagination"]["page_size"], 100);
        assert_eq!(json["pagination"]["total_items"], 1);

        let sent = serving.last_query.lock().unwrap().clone().unwrap();
        assert_eq!(sent.instance_id.as_deref(), Some("i-1"));
        assert_eq!(sent.size, 100);

        assert_eq!(state.experiments.read().await.test_list[0].test_id, "t-1");
    }

    #[tokio::test]
    async fn test_create_experiment() {
        let state = setup_state(MockServing::default(), Arc::new(MockMonitor::default()));
        let app = build_router(state);

        let (status, json) =
            send(app, "POST", "/api/experiments", Some(&create_body("sec", 10.0))).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["instance_id"], "i-1");
    }

    #[tokio::test]
    async fn test_create_experiment_rejects_unknown_unit() {
        let state = setup_state(MockServing::default(), Arc::new(MockMonitor::default()));
        let app = build_router(state);

        let (status, json) =
            send(app, "POST", "/api/experiments", Some(&create_body("day", 1.0))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"]["message"].as_str().unwrap().contains("day"));
    }

    #[tokio::test]
    async fn test_create_experiment_rejects_negative_duration() {
        let state = setup_state(MockServing::default(), Arc::new(MockMonitor::default()));
        let app = build_router(state);

        let (status, _) =
            send(app, "POST", "/api/experiments", Some(&create_body("min", -5.0))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
