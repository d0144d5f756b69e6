use crate::models::ExperimentRecord;
use crate::window::find_active;

/// Read access to the experiment list and the current selection.
pub trait ExperimentProvider {
    fn list(&self) -> &[ExperimentRecord];
    fn selected_id(&self) -> &str;
}

/// Experiments fetched for the dashboard and the selected one.
#[derive(Debug, Clone, Default)]
pub struct ExperimentStore {
    pub test_list: Vec<ExperimentRecord>,
    pub current_id: String,
    pub drawer_visible: bool,
}

impl ExperimentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_experiment(&self) -> Option<&ExperimentRecord> {
        find_active(&self.test_list, &self.current_id)
    }

    /// Replace the list with a freshly fetched page.
    pub fn replace(&mut self, experiments: Vec<ExperimentRecord>) {
        self.test_list = experiments;
    }

    pub fn select(&mut self, test_id: impl Into<String>) {
        self.current_id = test_id.into();
    }
}

impl ExperimentProvider for ExperimentStore {
    fn list(&self) -> &[ExperimentRecord] {
        &self.test_list
    }

    fn selected_id(&self) -> &str {
        &self.current_id
    }
}
