use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{gps_fix::GpsFix, step_record::NewStepRecord};

pub const PEDOMETER_CHECKING: &str = "Checking";

/// Snapshot of a walk session. Every transition returns a new snapshot instead of mutating in place,
/// so observers can hold on to an old one safely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub is_active: bool,
    /// Bumped on every start. Location requests remember the generation they were issued in.
    pub generation: u64,
    pub elapsed_seconds: u64,
    pub step_count: u64,
    pub route: Vec<GpsFix>,
    pub cumulative_distance_km: f64,
    pub last_fix: Option<GpsFix>,
    pub pedometer_status: String,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            is_active: false,
            generation: 0,
            elapsed_seconds: 0,
            step_count: 0,
            route: Vec::new(),
            cumulative_distance_km: 0.0,
            last_fix: None,
            pedometer_status: PEDOMETER_CHECKING.to_string(),
        }
    }
}

impl SessionState {
    /// A fresh, active session. Metrics from the previous walk are dropped.
    pub fn start(&self) -> Self {
        Self {
            is_active: true,
            generation: self.generation + 1,
            ..Self::default()
        }
    }

    /// Idle again with the elapsed time reset. Steps, distance and route stay for the final render.
    pub fn stop(&self) -> Self {
        Self {
            is_active: false,
            elapsed_seconds: 0,
            ..self.clone()
        }
    }

    pub fn tick(&self) -> Option<Self> {
        if !self.is_active {
            return None;
        }

        Some(Self {
            elapsed_seconds: self.elapsed_seconds + 1,
            ..self.clone()
        })
    }

    pub fn with_step_count(&self, step_count: u64) -> Option<Self> {
        if !self.is_active {
            return None;
        }

        Some(Self {
            step_count,
            ..self.clone()
        })
    }

    pub fn with_pedometer_status(&self, pedometer_status: String) -> Self {
        Self {
            pedometer_status,
            ..self.clone()
        }
    }

    /// Integrates a fix into the route. Returns `None` when the fix must be discarded: the session
    /// is no longer active, it belongs to an earlier session, or the coordinates are invalid.
    pub fn apply_fix(&self, fix: GpsFix, generation: u64) -> Option<Self> {
        if !self.is_active || generation != self.generation || !fix.is_valid() {
            return None;
        }

        let increment = self.last_fix.map(|previous| previous.distance_km_to(&fix)).unwrap_or(0.0);

        let mut route = self.route.clone();
        route.push(fix);

        Some(Self {
            route,
            cumulative_distance_km: self.cumulative_distance_km + increment,
            last_fix: Some(fix),
            ..self.clone()
        })
    }

    pub fn current_position(&self) -> Option<&GpsFix> {
        self.last_fix.as_ref()
    }

    pub fn summary(&self, ended_at: DateTime<Utc>) -> SessionSummary {
        SessionSummary {
            steps: self.step_count,
            elapsed_seconds: self.elapsed_seconds,
            distance_km: self.cumulative_distance_km,
            route_length: self.route.len(),
            ended_at,
            date: ended_at.with_timezone(&Local).date_naive(),
        }
    }
}

/// Totals of a finished walk, taken just before the session is reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub steps: u64,
    pub elapsed_seconds: u64,
    pub distance_km: f64,
    pub route_length: usize,
    pub ended_at: DateTime<Utc>,
    pub date: NaiveDate,
}

impl SessionSummary {
    pub fn to_record(&self) -> NewStepRecord {
        NewStepRecord::for_date(self.date, self.steps)
    }
}
