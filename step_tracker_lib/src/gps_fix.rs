use chrono::{DateTime, Utc};
use geo_types::{Coord, Point};
use serde::{Deserialize, Serialize};

use crate::metrics::haversine_distance;

/// A single location sample reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
}

impl GpsFix {
    pub fn new(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            timestamp,
        }
    }

    pub fn now(latitude: f64, longitude: f64) -> Self {
        Self::new(latitude, longitude, Utc::now())
    }

    /// Finite and inside the lat/lon ranges. Only valid fixes take part in distance accumulation.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance in km
    pub fn distance_km_to(&self, other: &GpsFix) -> f64 {
        haversine_distance((self.latitude, self.longitude), (other.latitude, other.longitude))
    }
}

// geo-types is x = longitude, y = latitude
impl From<&GpsFix> for Coord {
    fn from(fix: &GpsFix) -> Self {
        Coord { x: fix.longitude, y: fix.latitude }
    }
}

impl From<&GpsFix> for Point {
    fn from(fix: &GpsFix) -> Self {
        Point::from(Coord::from(fix))
    }
}
