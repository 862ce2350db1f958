use serde::Serialize;
use step_tracker_data_management::DataManager;
use step_tracker_lib::step_record::StepRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    pub date: String,
    pub steps: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryView {
    pub heading: String,
    pub rows: Vec<HistoryRow>,
}

/// Past walks plus the step count of the walk that just finished.
pub struct HistoryScreen {
    steps: u64,
    records: Vec<StepRecord>,
}

impl HistoryScreen {
    pub async fn mount(data_manager: &DataManager, steps: u64) -> Self {
        let records = data_manager.list_all().await;
        tracing::debug!("Loaded {} step records", records.len());

        Self { steps, records }
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    pub fn render(&self) -> HistoryView {
        HistoryView {
            heading: format!("Wow! You completed {} steps!", self.steps),
            rows: self.records.iter()
                .map(|record| HistoryRow {
                    date: record.date_label(),
                    steps: record.steps_label(),
                })
                .collect(),
        }
    }
}
