use std::time::Duration;

use step_tracker_lib::{map_view::MapRegion, metrics::WalkMetrics};

/// Options passed with every location request.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    pub maximum_age: Duration,
    /// Meters the device must move before a new fix is reported
    pub distance_filter: f64,
}

impl Default for LocationOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_millis(20_000),
            maximum_age: Duration::from_millis(10_000),
            distance_filter: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub tick_interval: Duration,
    pub metrics: WalkMetrics,
    pub location: LocationOptions,
    pub map_region: MapRegion,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            metrics: WalkMetrics::default(),
            location: LocationOptions::default(),
            map_region: MapRegion::default(),
        }
    }
}
