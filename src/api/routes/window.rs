//! Selection and the dashboard's default query window.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{FixedOffset, Local};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::store::{init_query_range, ChartQuery, InstanceStore};
use crate::window::QueryWindow;

/// Viewer zone as minutes east of UTC; server local zone when absent.
#[derive(Debug, Default, Deserialize)]
pub struct ZoneParams {
    pub utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    pub instance_id: Option<String>,
    pub test_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WindowResponse {
    pub window: QueryWindow,
    pub chart_query: ChartQuery,
    pub instance_id: String,
    pub test_id: String,
    pub active: bool,
}

/// Parse the requested viewer offset; `None` means the server's local zone.
pub(crate) fn viewer_offset(zone: &ZoneParams) -> Result<Option<FixedOffset>, ApiError> {
    match zone.utc_offset_minutes {
        Some(minutes) => minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(Some)
            .ok_or_else(|| {
                ApiError::BadRequest(format!("utc_offset_minutes out of range: {minutes}"))
            }),
        None => Ok(None),
    }
}

/// Chart query for the stored window, reading its bounds in the viewer zone.
pub(crate) fn chart_query_for(instances: &InstanceStore, offset: Option<FixedOffset>) -> ChartQuery {
    match offset {
        Some(offset) => instances.chart_query_in(&offset),
        None => instances.chart_query(),
    }
}

/// Recompute the window from current selection and write it to the range slots.
pub(crate) async fn refresh_window(
    state: &AppState,
    zone: &ZoneParams,
) -> Result<WindowResponse, ApiError> {
    let offset = viewer_offset(zone)?;
    let experiments = state.experiments.read().await;
    let mut instances = state.instances.write().await;

    let window = match offset {
        Some(offset) => {
            init_query_range(&*experiments, state.clock.as_ref(), &offset, &mut instances)
        }
        None => init_query_range(&*experiments, state.clock.as_ref(), &Local, &mut instances),
    };

    Ok(WindowResponse {
        window,
        chart_query: chart_query_for(&instances, offset),
        instance_id: instances.current_id.clone(),
        test_id: experiments.current_id.clone(),
        active: experiments.active_experiment().is_some(),
    })
}

pub async fn get_query_range(
    State(state): State<AppState>,
    Query(zone): Query<ZoneParams>,
) -> Result<Json<WindowResponse>, ApiError> {
    Ok(Json(refresh_window(&state, &zone).await?))
}

/// Change the selected instance and/or test and reset the window.
pub async fn put_selection(
    State(state): State<AppState>,
    Query(zone): Query<ZoneParams>,
    Json(body): Json<SelectionRequest>,
) -> Result<Json<WindowResponse>, ApiError> {
    if let Some(test_id) = body.test_id {
        state.experiments.write().await.select(test_id);
    }
    if let Some(instance_id) = body.instance_id {
        state.instances.write().await.current_id = instance_id;
    }
    Ok(Json(refresh_window(&state, &zone).await?))
}
