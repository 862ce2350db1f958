use serde::Serialize;
use step_tracker_data_management::DataManager;

use crate::navigator::{Navigator, Route};

use super::StatusBarStyle;

pub const GET_STARTED_LABEL: &str = "Get started";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnboardView {
    pub button_label: &'static str,
    pub status_bar: StatusBarStyle,
}

pub struct OnboardScreen {
    schema_ready: bool,
}

impl OnboardScreen {
    /// Makes sure the history table exists. A failure is logged by the data manager and
    /// does not keep the user from walking.
    pub async fn mount(data_manager: &DataManager) -> Self {
        Self {
            schema_ready: data_manager.ensure_schema().await,
        }
    }

    pub fn schema_ready(&self) -> bool {
        self.schema_ready
    }

    pub fn get_started(&self, navigator: &mut Navigator) {
        navigator.navigate(Route::Main);
    }

    pub fn render(&self) -> OnboardView {
        OnboardView {
            button_label: GET_STARTED_LABEL,
            status_bar: StatusBarStyle::Dark,
        }
    }
}
