use std::sync::Arc;

use step_tracker_data_management::DataManager;

use crate::{config::TrackerConfig, sensors::{LocationProvider, Pedometer}};

/// Everything the screens share for the lifetime of the app.
pub struct AppState {
    pub data_manager: DataManager,
    pub pedometer: Arc<dyn Pedometer>,
    pub location: Arc<dyn LocationProvider>,
    pub config: TrackerConfig,
}
