use std::collections::HashMap;

use chrono::{Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::models::InstanceRecord;
use crate::window::{QueryWindow, WINDOW_FORMAT};

/// Resolution of dashboard range queries.
pub const CHART_STEP: &str = "15s";

/// Range parameters handed to the metrics backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartQuery {
    pub start: String,
    pub end: String,
    pub step: String,
}

/// Instances, the selected one, and the time ranges the charts read.
#[derive(Debug, Clone, Default)]
pub struct InstanceStore {
    pub instance_list: Vec<InstanceRecord>,
    pub current_id: String,
    pub chart_time_range: Option<QueryWindow>,
    pub table_loading: bool,
    pub search_time_pair: Option<QueryWindow>,
}

impl InstanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_instance(&self) -> Option<&InstanceRecord> {
        self.instance_list
            .iter()
            .find(|i| i.instance_id == self.current_id)
    }

    /// Map of instance id to display name.
    pub fn instance_name_map(&self) -> HashMap<String, String> {
        self.instance_list
            .iter()
            .map(|i| (i.instance_id.clone(), i.display_name().to_string()))
            .collect()
    }

    /// Selected instance, else the first listed one.
    fn active_or_first(&self) -> Option<&InstanceRecord> {
        self.active_instance().or_else(|| self.instance_list.first())
    }

    pub fn active_serving_id(&self) -> String {
        self.active_or_first()
            .map(|i| i.serving_id.clone())
            .unwrap_or_default()
    }

    pub fn active_serving_job(&self) -> String {
        self.active_or_first()
            .map(|i| i.exported_job().to_string())
            .unwrap_or_default()
    }

    /// Copy a computed window into both the chart and search slots.
    pub fn apply_window(&mut self, window: &QueryWindow) {
        self.chart_time_range = Some(window.clone());
        self.search_time_pair = Some(window.clone());
    }

    /// Chart range as epoch seconds, reading the bounds in `zone`.
    pub fn chart_query_in<Tz: TimeZone>(&self, zone: &Tz) -> ChartQuery {
        let (start, end) = match &self.chart_time_range {
            Some(window) => (
                epoch_seconds(&window.start, zone),
                epoch_seconds(&window.end, zone),
            ),
            None => (String::new(), String::new()),
        };

        ChartQuery {
            start,
            end,
            step: CHART_STEP.to_string(),
        }
    }

    pub fn chart_query(&self) -> ChartQuery {
        self.chart_query_in(&Local)
    }
}

/// Parse a formatted bound back into whole epoch seconds ("1704067200.000").
fn epoch_seconds<Tz: TimeZone>(formatted: &str, zone: &Tz) -> String {
    NaiveDateTime::parse_from_str(formatted, WINDOW_FORMAT)
        .ok()
        // ambiguous fall-back times resolve to the earlier instant, like the dashboard's Date parsing
        .and_then(|naive| zone.from_local_datetime(&naive).earliest())
        .map(|dt| format!("{}.000", dt.timestamp()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use pretty_assertions::assert_eq;

    fn instance(id: &str, serving_id: &str, job: &str) -> InstanceRecord {
        serde_json::from_value(serde_json::json!({
            "instance_id": id,
            "instance_name": format!("name-{id}"),
            "serving_id": serving_id,
            "startup_args": {"exported_job": job},
        }))
        .unwrap()
    }

    fn window(start: &str, end: &str) -> QueryWindow {
        QueryWindow {
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    #[test]
    fn test_active_instance() {
        let mut store = InstanceStore::new();
        store.instance_list = vec![instance("a", "s-a", "job-a"), instance("b", "s-b", "job-b")];
        store.current_id = "b".to_string();

        assert_eq!(store.active_instance().unwrap().instance_id, "b");
        assert_eq!(store.active_serving_id(), "s-b");
        assert_eq!(store.active_serving_job(), "job-b");
    }

    #[test]
    fn test_serving_falls_back_to_first() {
        let mut store = InstanceStore::new();
        store.instance_list = vec![instance("a", "s-a", "job-a"), instance("b", "s-b", "job-b")];

        assert!(store.active_instance().is_none());
        assert_eq!(store.active_serving_id(), "s-a");
        assert_eq!(store.active_serving_job(), "job-a");
    }

    #[test]
    fn test_serving_empty_list() {
        let store = InstanceStore::new();
        assert_eq!(store.active_serving_id(), "");
        assert_eq!(store.active_serving_job(), "");
    }

    #[test]
    fn test_instance_name_map() {
        let mut store = InstanceStore::new();
        store.instance_list = vec![instance("a", "s-a", "job-a")];

        let names = store.instance_name_map();
        assert_eq!(names.get("a").map(String::as_str), Some("name-a"));
    }

    #[test]
    fn test_apply_window_writes_both_slots() {
        let mut store = InstanceStore::new();
        let w = window("2024-01-01 00:00:00", "2024-01-01 02:03:00");
        store.apply_window(&w);

        assert_eq!(store.chart_time_range.as_ref(), Some(&w));
        assert_eq!(store.search_time_pair.as_ref(), Some(&w));
    }

    #[test]
    fn test_chart_query_utc() {
        let mut store = InstanceStore::new();
        store.apply_window(&window("2024-01-01 00:00:00", "2024-01-01 02:03:00"));

        assert_eq!(
            store.chart_query_in(&Utc),
            ChartQuery {
                start: "1704067200.000".to_string(),
                end: "1704074580.000".to_string(),
                step: "15s".to_string(),
            }
        );
    }

    #[test]
    fn test_chart_query_reads_bounds_in_zone() {
        let mut store = InstanceStore::new();
        store.apply_window(&window("2024-01-01 08:00:00", "2024-01-01 09:00:00"));
        let shanghai = FixedOffset::east_opt(8 * 3600).unwrap();

        assert_eq!(store.chart_query_in(&shanghai).start, "1704067200.000");
    }

    #[test]
    fn test_chart_query_unset() {
        let query = InstanceStore::new().chart_query();
        assert_eq!(query.start, "");
        assert_eq!(query.end, "");
        assert_eq!(query.step, CHART_STEP);
    }

    #[test]
    fn test_chart_query_malformed_bound() {
        let mut store = InstanceStore::new();
        store.apply_window(&window("not a date", "2024-01-01 00:00:00"));

        let query = store.chart_query_in(&Utc);
        assert_eq!(query.start, "");
        assert_eq!(query.end, "1704067200.000");
    }
}
