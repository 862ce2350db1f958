use serde::Serialize;
use step_tracker_data_management::DataManager;
use step_tracker_lib::{map_view::MapView, metrics::elapsed_display, session_state::{SessionState, SessionSummary}, step_record::StepRecord};

use crate::{app_state::AppState, config::TrackerConfig, navigator::{Navigator, Route}, session_tracker::SessionTracker};

use super::StatusBarStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ControlIcon {
    Play,
    Pause,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub step_count: u64,
    /// Estimated from steps, "1.00"
    pub distance: String,
    pub calories: String,
    /// Measured from GPS fixes
    pub travelled_km: f64,
    pub elapsed: String,
    pub pedometer_status: String,
    pub control: ControlIcon,
    pub status_bar: StatusBarStyle,
    pub map: MapView,
}

impl SessionView {
    pub fn from_state(state: &SessionState, config: &TrackerConfig) -> Self {
        let (control, status_bar) = if state.is_active {
            (ControlIcon::Pause, StatusBarStyle::Dark)
        } else {
            (ControlIcon::Play, StatusBarStyle::Light)
        };

        Self {
            step_count: state.step_count,
            distance: config.metrics.distance_display(state.step_count),
            calories: config.metrics.calories_display(state.step_count),
            travelled_km: state.cumulative_distance_km,
            elapsed: elapsed_display(state.elapsed_seconds),
            pedometer_status: state.pedometer_status.clone(),
            control,
            status_bar,
            map: MapView::from_state(state, config.map_region),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlOutcome {
    Started,
    /// `record` is `None` if the walk could not be saved
    Finished {
        summary: SessionSummary,
        record: Option<StepRecord>,
    },
}

/// Hosts the tracker while it is mounted. Unmounting drops the tracker, which ends any running walk.
pub struct SessionScreen {
    tracker: SessionTracker,
    data_manager: DataManager,
}

impl SessionScreen {
    pub fn mount(state: &AppState) -> Self {
        Self {
            tracker: SessionTracker::new(state.pedometer.clone(), state.location.clone(), state.config.clone()),
            data_manager: state.data_manager.clone(),
        }
    }

    pub fn tracker(&self) -> &SessionTracker {
        &self.tracker
    }

    pub fn render(&self) -> SessionView {
        SessionView::from_state(&self.tracker.snapshot(), self.tracker.config())
    }

    /// The play/pause button. Stopping saves the walk and moves on to the history.
    pub async fn press_control(&mut self, navigator: &mut Navigator) -> ControlOutcome {
        let Some(summary) = self.tracker.stop() else {
            self.tracker.start();
            return ControlOutcome::Started;
        };

        let record = self.data_manager.append(summary.to_record()).await;
        navigator.navigate(Route::PastSteps { steps: summary.steps });

        ControlOutcome::Finished { summary, record }
    }
}
