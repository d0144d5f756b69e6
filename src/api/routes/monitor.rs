//! Metric range queries and pilot detection history.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::api::routes::window::{chart_query_for, refresh_window, viewer_offset, ZoneParams};
use crate::api::state::AppState;
use crate::api::ApiError;
use crate::client::{PromData, RangeQuery};

/// Placeholder in PromQL replaced by the selected instance's exported job.
pub const JOB_PLACEHOLDER: &str = "$job";

#[derive(Debug, Deserialize)]
pub struct MonitorParams {
    pub query: String,
    pub step: Option<String>,
    pub utc_offset_minutes: Option<i32>,
}

/// Run a range query over the current chart window.
pub async fn query_monitor(
    State(state): State<AppState>,
    Query(params): Query<MonitorParams>,
) -> Result<Json<PromData>, ApiError> {
    if params.query.trim().is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".to_string()));
    }

    let zone = ZoneParams {
        utc_offset_minutes: params.utc_offset_minutes,
    };
    let offset = viewer_offset(&zone)?;

    let (stored, job) = {
        let instances = state.instances.read().await;
        let stored = instances
            .chart_time_range
            .is_some()
            .then(|| chart_query_for(&instances, offset));
        (stored, instances.active_serving_job())
    };
    let chart_query = match stored {
        Some(q) => q,
        None => refresh_window(&state, &zone).await?.chart_query,
    };

    let range = RangeQuery {
        query: params.query.replace(JOB_PLACEHOLDER, &job),
        start: chart_query.start,
        end: chart_query.end,
        step: params.step.unwrap_or(chart_query.step),
    };
    Ok(Json(state.monitor.query_range(&range).await?))
}

#[derive(Debug, Deserialize)]
pub struct DetectHistoryParams {
    pub task_name: Option<String>,
}

/// Autoscaler detection history; defaults to the active serving id.
pub async fn detect_history(
    State(state): State<AppState>,
    Query(params): Query<DetectHistoryParams>,
) -> Result<Json<Value>, ApiError> {
    let task_name = match params.task_name {
        Some(name) => name,
        None => state.instances.read().await.active_serving_id(),
    };
    if task_name.is_empty() {
        return Err(ApiError::BadRequest("no task_name and no instance selected".to_string()));
    }
    Ok(Json(state.pilot.detect_history(&task_name).await?))
}
