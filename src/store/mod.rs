//! Dashboard state: fetched lists, the current selection, and the
//! time ranges that charts and tables read.

mod experiment;
mod instance;

pub use experiment::*;
pub use instance::*;

use chrono::TimeZone;
use tracing::debug;

use crate::window::{compute_window_in, find_active, Clock, QueryWindow};

/// Recompute the default query window and copy it into both range slots.
pub fn init_query_range<P, C, Tz>(
    provider: &P,
    clock: &C,
    zone: &Tz,
    slots: &mut InstanceStore,
) -> QueryWindow
where
    P: ExperimentProvider + ?Sized,
    C: Clock + ?Sized,
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let active = find_active(provider.list(), provider.selected_id());
    let window = compute_window_in(active, clock.now(), zone);
    debug!(
        test_id = active.map(|e| e.identifier()).unwrap_or(""),
        start = %window.start,
        end = %window.end,
        "Initialized query range"
    );
    slots.apply_window(&window);
    window
}
