use std::sync::Arc;

use tokio::sync::RwLock;

use crate::client::{MonitorApi, PilotApi, ServingApi};
use crate::store::{ExperimentStore, InstanceStore};
use crate::window::Clock;

/// Shared handler state.
///
/// Lock order: `experiments` before `instances`.
#[derive(Clone)]
pub struct AppState {
    pub serving: Arc<dyn ServingApi>,
    pub monitor: Arc<dyn MonitorApi>,
    pub pilot: Arc<dyn PilotApi>,
    pub experiments: Arc<RwLock<ExperimentStore>>,
    pub instances: Arc<RwLock<InstanceStore>>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(
        serving: Arc<dyn ServingApi>,
        monitor: Arc<dyn MonitorApi>,
        pilot: Arc<dyn PilotApi>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            serving,
            monitor,
            pilot,
            experiments: Arc::new(RwLock::new(ExperimentStore::new())),
            instances: Arc::new(RwLock::new(InstanceStore::new())),
            clock,
        }
    }
}
