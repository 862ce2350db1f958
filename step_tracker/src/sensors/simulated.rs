//! Scripted sensors for tests and the demo walk.

use std::{collections::VecDeque, sync::atomic::{AtomicUsize, Ordering}, time::Duration};

use async_trait::async_trait;
use step_tracker_lib::gps_fix::GpsFix;
use tokio::sync::{mpsc, Mutex};

use crate::config::LocationOptions;

use super::{LocationError, LocationProvider, Pedometer, PermissionStatus, StepSubscription};

pub struct SimulatedPedometer {
    availability: Result<bool, String>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<u64>>>,
}

impl SimulatedPedometer {
    pub fn new() -> Self {
        Self::with_availability(Ok(true))
    }

    pub fn unavailable(reason: &str) -> Self {
        Self::with_availability(Err(reason.to_string()))
    }

    pub fn with_availability(availability: Result<bool, String>) -> Self {
        Self {
            availability,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Reports a cumulative step count to every live subscription.
    pub async fn emit(&self, steps: u64) {
        let mut subscribers = self.subscribers.lock().await;
        subscribers.retain(|sender| sender.send(steps).is_ok());
    }

    pub async fn active_subscriptions(&self) -> usize {
        let mut subscribers = self.subscribers.lock().await;
        subscribers.retain(|sender| !sender.is_closed());
        subscribers.len()
    }
}

impl Default for SimulatedPedometer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Pedometer for SimulatedPedometer {
    async fn watch_step_count(&self) -> StepSubscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribers.lock().await.push(sender);
        receiver
    }

    async fn is_available(&self) -> Result<bool, String> {
        self.availability.clone()
    }
}

pub struct SimulatedLocation {
    permission: PermissionStatus,
    fixes: Mutex<VecDeque<(f64, f64)>>,
    delay: Duration,
    requests: AtomicUsize,
}

impl SimulatedLocation {
    pub fn new(fixes: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Self {
            permission: PermissionStatus::Granted,
            fixes: Mutex::new(fixes.into_iter().collect()),
            delay: Duration::ZERO,
            requests: AtomicUsize::new(0),
        }
    }

    /// `count` fixes starting at `start`, each `step` (lat, lon) degrees further.
    pub fn straight_walk(start: (f64, f64), step: (f64, f64), count: usize) -> Self {
        Self::new((0..count).map(|i| (start.0 + step.0 * i as f64, start.1 + step.1 * i as f64)))
    }

    pub fn denied() -> Self {
        Self::new(Vec::<(f64, f64)>::new()).with_permission(PermissionStatus::Denied)
    }

    pub fn with_permission(mut self, permission: PermissionStatus) -> Self {
        self.permission = permission;
        self
    }

    /// Every position request resolves only after `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of position requests made, permission requests excluded
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl LocationProvider for SimulatedLocation {
    async fn request_permission(&self) -> PermissionStatus {
        self.permission
    }

    async fn current_position(&self, _options: &LocationOptions) -> Result<GpsFix, LocationError> {
        self.requests.fetch_add(1, Ordering::Relaxed);

        if self.permission != PermissionStatus::Granted {
            return Err(LocationError::PermissionDenied);
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.fixes.lock().await.pop_front()
            .map(|(latitude, longitude)| GpsFix::now(latitude, longitude))
            .ok_or_else(|| LocationError::Unavailable("no more scripted fixes".to_string()))
    }
}

#[tokio::test]
async fn dropped_subscription_is_removed() {
    let pedometer = SimulatedPedometer::new();
    let mut subscription = pedometer.watch_step_count().await;

    pedometer.emit(12).await;
    assert_eq!(subscription.recv().await, Some(12));
    assert_eq!(pedometer.active_subscriptions().await, 1);

    drop(subscription);
    assert_eq!(pedometer.active_subscriptions().await, 0);
}

#[tokio::test]
async fn scripted_fixes_run_out() {
    let location = SimulatedLocation::straight_walk((0.0, 0.0), (0.0, 0.01), 2);
    let options = LocationOptions::default();

    let first = location.current_position(&options).await.unwrap();
    let second = location.current_position(&options).await.unwrap();
    assert_eq!((first.latitude, first.longitude), (0.0, 0.0));
    assert_eq!((second.latitude, second.longitude), (0.0, 0.01));
    assert!(matches!(location.current_position(&options).await, Err(LocationError::Unavailable(_))));
    assert_eq!(location.requests(), 3);
}
