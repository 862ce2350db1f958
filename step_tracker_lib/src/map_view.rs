use std::time::Duration;

use geo_types::{Coord, LineString, Point};
use serde::{Deserialize, Serialize};

use crate::session_state::SessionState;

pub const LATITUDE_DELTA: f64 = 0.007;
pub const LONGITUDE_DELTA: f64 = 0.007;
pub const DEFAULT_LATITUDE: f64 = 11.58291;
pub const DEFAULT_LONGITUDE: f64 = 122.753156;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapRegion {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl MapRegion {
    pub fn centered(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            latitude_delta: LATITUDE_DELTA,
            longitude_delta: LONGITUDE_DELTA,
        }
    }
}

impl Default for MapRegion {
    fn default() -> Self {
        Self::centered(DEFAULT_LATITUDE, DEFAULT_LONGITUDE)
    }
}

/// Opacity the map animates towards
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapFade {
    pub opacity: f32,
    pub duration: Duration,
}

impl MapFade {
    pub fn for_walk(is_active: bool) -> Self {
        if is_active {
            Self { opacity: 1.0, duration: Duration::from_millis(1000) }
        } else {
            Self { opacity: 0.0, duration: Duration::ZERO }
        }
    }
}

/// What the map sink needs to draw: region, marker and the visited polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub region: MapRegion,
    pub marker: Point,
    pub route: LineString,
    pub fade: MapFade,
}

impl MapView {
    pub fn from_state(state: &SessionState, default_region: MapRegion) -> Self {
        let region = state.current_position()
            .map(|fix| MapRegion::centered(fix.latitude, fix.longitude))
            .unwrap_or(default_region);

        Self {
            region,
            marker: Point::new(region.longitude, region.latitude),
            route: state.route.iter().map(Coord::from).collect(),
            fade: MapFade::for_walk(state.is_active),
        }
    }
}
