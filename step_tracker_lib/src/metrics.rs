//! Conversions from raw sensor totals to the numbers shown during a walk.

use std::fmt;

pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const STEPS_PER_KM: f64 = 1300.0;
pub const KCAL_PER_KM: f64 = 60.0;

pub fn haversine_distance(p1: (f64, f64), p2: (f64, f64)) -> f64 {
    let d_lat = (p2.0 - p1.0).to_radians();
    let d_lon = (p2.1 - p1.1).to_radians();
    let lat1 = p1.0.to_radians();
    let lat2 = p2.0.to_radians();

    let a = f64::sin(d_lat / 2.).powi(2)
        + f64::cos(lat1) * f64::cos(lat2) * f64::sin(d_lon / 2.).powi(2);
    let c = 2. * f64::asin(f64::sqrt(a));

    EARTH_RADIUS_KM * c
}

/// The fixed heuristics used to turn steps into distance and distance into energy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkMetrics {
    pub steps_per_km: f64,
    pub kcal_per_km: f64,
}

impl Default for WalkMetrics {
    fn default() -> Self {
        Self {
            steps_per_km: STEPS_PER_KM,
            kcal_per_km: KCAL_PER_KM,
        }
    }
}

impl WalkMetrics {
    pub fn distance_km(&self, steps: u64) -> f64 {
        steps as f64 / self.steps_per_km
    }

    pub fn calories_kcal(&self, distance_km: f64) -> f64 {
        distance_km * self.kcal_per_km
    }

    /// Distance as displayed, two decimals.
    pub fn distance_display(&self, steps: u64) -> String {
        format!("{:.2}", self.distance_km(steps))
    }

    /// Calories are derived from the already rounded distance, so the two displayed values agree.
    pub fn calories_display(&self, steps: u64) -> String {
        let distance = round_to_hundredths(self.distance_km(steps));
        format!("{:.2}", self.calories_kcal(distance))
    }
}

pub fn distance_km(steps: u64) -> f64 {
    WalkMetrics::default().distance_km(steps)
}

pub fn calories_kcal(distance_km: f64) -> f64 {
    WalkMetrics::default().calories_kcal(distance_km)
}

pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElapsedTime {
    pub minutes: u64,
    pub seconds: u64,
}

impl From<u64> for ElapsedTime {
    fn from(elapsed_seconds: u64) -> Self {
        Self {
            minutes: elapsed_seconds / 60,
            seconds: elapsed_seconds % 60,
        }
    }
}

impl fmt::Display for ElapsedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}m:{:02}s", self.minutes, self.seconds)
    }
}

pub fn elapsed_display(elapsed_seconds: u64) -> String {
    ElapsedTime::from(elapsed_seconds).to_string()
}
