//! Default time window for monitoring range queries.
//!
//! With a load test selected, the window spans the test's declared run time
//! plus a drain buffer, starting at its creation instant. Without one, the
//! window looks back one hour from now. Both bounds are rendered in the
//! viewer's zone, while test creation times are always read as UTC.
//!
//! The calculation is a pure function; callers copy the result into
//! whatever state their charts and tables read.

mod clock;
mod duration;

pub use clock::*;
pub use duration::*;

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ExperimentRecord;

/// Display pattern for both window bounds.
pub const WINDOW_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Tail added after a test's declared duration to cover draining requests.
pub const DRAIN_BUFFER_SECS: f64 = 180.0;

/// Look-back used when no test is selected.
pub const DEFAULT_LOOKBACK_SECS: i64 = 3600;

/// A `[start, end]` pair of formatted instants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryWindow {
    pub start: String,
    pub end: String,
}

impl QueryWindow {
    pub fn to_pair(&self) -> [String; 2] {
        [self.start.clone(), self.end.clone()]
    }
}

/// Find the experiment whose identifier equals `selected_id`.
///
/// An empty id never matches.
pub fn find_active<'a>(
    experiments: &'a [ExperimentRecord],
    selected_id: &str,
) -> Option<&'a ExperimentRecord> {
    if selected_id.is_empty() {
        return None;
    }
    experiments.iter().find(|e| e.identifier() == selected_id)
}

/// Window bounds as UTC instants.
pub fn window_bounds(
    active: Option<&ExperimentRecord>,
    now: DateTime<Utc>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    match active {
        Some(experiment) => {
            let start = experiment.creation_timestamp();
            let declared = experiment.declared_duration();
            let seconds = normalize(declared.magnitude, &declared.unit);
            let offset_ms = ((seconds + DRAIN_BUFFER_SECS) * 1000.0).trunc() as i64;
            let end = Duration::try_milliseconds(offset_ms)
                .and_then(|offset| start.checked_add_signed(offset))
                .unwrap_or_else(|| saturated_bound(offset_ms));
            (start, end)
        }
        // end stays pinned to `now` here
        None => (now - Duration::seconds(DEFAULT_LOOKBACK_SECS), now),
    }
}

/// Bound used when a declared duration runs past the representable range.
///
/// Kept one day inside chrono's limits so any viewer offset still formats.
pub fn saturated_bound(offset_ms: i64) -> DateTime<Utc> {
    if offset_ms < 0 {
        DateTime::<Utc>::MIN_UTC + Duration::days(1)
    } else {
        DateTime::<Utc>::MAX_UTC - Duration::days(1)
    }
}

/// Compute the window and format it in `zone`.
pub fn compute_window_in<Tz>(
    active: Option<&ExperimentRecord>,
    now: DateTime<Utc>,
    zone: &Tz,
) -> QueryWindow
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let (start, end) = window_bounds(active, now);
    QueryWindow {
        start: start.with_timezone(zone).format(WINDOW_FORMAT).to_string(),
        end: end.with_timezone(zone).format(WINDOW_FORMAT).to_string(),
    }
}

/// Compute the window and format it in the viewer's local zone.
pub fn compute_window(active: Option<&ExperimentRecord>, now: DateTime<Utc>) -> QueryWindow {
    compute_window_in(active, now, &Local)
}
