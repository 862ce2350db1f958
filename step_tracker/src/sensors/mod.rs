use std::fmt;

use async_trait::async_trait;
use step_tracker_lib::gps_fix::GpsFix;
use tokio::sync::mpsc;

use crate::config::LocationOptions;

pub mod simulated;

/// Cumulative step counts since the subscription was made. Dropping it removes the subscription.
pub type StepSubscription = mpsc::UnboundedReceiver<u64>;

#[async_trait]
pub trait Pedometer: Send + Sync {
    async fn watch_step_count(&self) -> StepSubscription;

    /// `Err` carries the platform's description of why the query failed.
    async fn is_available(&self) -> Result<bool, String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocationError {
    PermissionDenied,
    Timeout,
    Unavailable(String),
}

impl fmt::Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationError::PermissionDenied => write!(f, "location permission denied"),
            LocationError::Timeout => write!(f, "location request timed out"),
            LocationError::Unavailable(reason) => write!(f, "location unavailable: {reason}"),
        }
    }
}

impl std::error::Error for LocationError {}

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn request_permission(&self) -> PermissionStatus;

    async fn current_position(&self, options: &LocationOptions) -> Result<GpsFix, LocationError>;
}
