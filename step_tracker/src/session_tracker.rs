use std::{sync::Arc, time::Duration};

use chrono::Utc;
use step_tracker_lib::session_state::{SessionState, SessionSummary};
use tokio::{sync::watch, task::JoinHandle, time::{interval_at, Instant, MissedTickBehavior}};

use crate::{config::{LocationOptions, TrackerConfig}, sensors::{LocationError, LocationProvider, Pedometer, PermissionStatus}};

/// Owns one walk at a time: the step subscription, the one second timer and the snapshots
/// published to whoever renders them.
///
/// Both background tasks are released on `stop` and when the tracker is dropped. Location
/// requests already in flight are not cancelled, but their fixes are discarded once the
/// session they were requested for is over.
pub struct SessionTracker {
    pedometer: Arc<dyn Pedometer>,
    location: Arc<dyn LocationProvider>,
    config: TrackerConfig,
    state: Arc<watch::Sender<SessionState>>,
    timer: Option<JoinHandle<()>>,
    step_subscription: Option<JoinHandle<()>>,
}

/// Applies a transition atomically. Observers are only notified if it produced a new snapshot.
fn transition(state: &watch::Sender<SessionState>, f: impl FnOnce(&SessionState) -> Option<SessionState>) -> bool {
    state.send_if_modified(|current| match f(current) {
        Some(next) => {
            *current = next;
            true
        }
        None => false,
    })
}

impl SessionTracker {
    pub fn new(pedometer: Arc<dyn Pedometer>, location: Arc<dyn LocationProvider>, config: TrackerConfig) -> Self {
        let (state, _) = watch::channel(SessionState::default());

        Self {
            pedometer,
            location,
            config,
            state: Arc::new(state),
            timer: None,
            step_subscription: None,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.state.borrow().is_active
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receives every new snapshot
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Must be called from within a tokio runtime. Does nothing if a walk is already running.
    pub fn start(&mut self) {
        if self.is_active() {
            tracing::debug!("Session already active, ignoring start");
            return;
        }

        transition(&self.state, |state| Some(state.start()));
        let generation = self.state.borrow().generation;
        tracing::info!("Walk session {generation} started");

        self.step_subscription = Some(tokio::spawn(watch_steps(
            self.pedometer.clone(),
            self.state.clone(),
            generation,
        )));

        self.timer = Some(tokio::spawn(run_timer(
            self.location.clone(),
            self.state.clone(),
            self.config.location.clone(),
            self.config.tick_interval,
            generation,
        )));
    }

    /// Ends the walk and returns its totals, or `None` if no walk was running.
    pub fn stop(&mut self) -> Option<SessionSummary> {
        self.release();

        let mut summary = None;
        self.state.send_if_modified(|state| {
            if !state.is_active {
                return false;
            }

            summary = Some(state.summary(Utc::now()));
            *state = state.stop();
            true
        });

        if let Some(summary) = &summary {
            tracing::info!(
                "Walk session stopped after {}s with {} steps, {:.3} km travelled",
                summary.elapsed_seconds, summary.steps, summary.distance_km
            );
        }

        summary
    }

    fn release(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }

        if let Some(subscription) = self.step_subscription.take() {
            subscription.abort();
        }
    }
}

impl Drop for SessionTracker {
    fn drop(&mut self) {
        self.release();
        if transition(&self.state, |state| state.is_active.then(|| state.stop())) {
            tracing::debug!("Walk session torn down while active");
        }
    }
}

async fn watch_steps(pedometer: Arc<dyn Pedometer>, state: Arc<watch::Sender<SessionState>>, generation: u64) {
    let mut subscription = pedometer.watch_step_count().await;

    let status = match pedometer.is_available().await {
        Ok(available) => available.to_string(),
        Err(err) => {
            tracing::warn!("Pedometer availability query failed: {err}");
            format!("isPedometerAvailable:{err}")
        }
    };
    transition(&state, |current| (current.generation == generation).then(|| current.with_pedometer_status(status)));

    while let Some(steps) = subscription.recv().await {
        transition(&state, |current| {
            if current.generation != generation {
                return None;
            }
            current.with_step_count(steps)
        });
    }

    tracing::debug!("Step count stream ended");
}

async fn run_timer(
    location: Arc<dyn LocationProvider>,
    state: Arc<watch::Sender<SessionState>>,
    options: LocationOptions,
    period: Duration,
    generation: u64,
) {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let ticked = transition(&state, |current| {
            if current.generation != generation {
                return None;
            }
            current.tick()
        });

        if !ticked {
            break;
        }

        tokio::spawn(track_location(location.clone(), state.clone(), options.clone(), generation));
    }
}

/// One location sample. Every failure just skips this tick.
async fn track_location(
    location: Arc<dyn LocationProvider>,
    state: Arc<watch::Sender<SessionState>>,
    options: LocationOptions,
    generation: u64,
) {
    let permission = location.request_permission().await;
    if permission != PermissionStatus::Granted {
        tracing::trace!("Location permission {:?}, skipping tick", permission);
        return;
    }

    let fix = match tokio::time::timeout(options.timeout, location.current_position(&options)).await {
        Ok(Ok(fix)) => fix,
        Ok(Err(err)) => {
            tracing::debug!("Location request failed: {err}");
            return;
        }
        Err(_) => {
            tracing::debug!("{}", LocationError::Timeout);
            return;
        }
    };

    if !transition(&state, |current| current.apply_fix(fix, generation)) {
        tracing::trace!("Discarded fix ({}, {}) from session {generation}", fix.latitude, fix.longitude);
    }
}

#[cfg(test)]
mod tests {
    use step_tracker_lib::metrics::{haversine_distance, WalkMetrics};
    use tokio::time::sleep;

    use super::*;
    use crate::sensors::simulated::{SimulatedLocation, SimulatedPedometer};

    fn tracker(pedometer: &Arc<SimulatedPedometer>, location: &Arc<SimulatedLocation>) -> SessionTracker {
        SessionTracker::new(pedometer.clone(), location.clone(), TrackerConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn three_ticks_then_stop() {
        let pedometer = Arc::new(SimulatedPedometer::new());
        let location = Arc::new(SimulatedLocation::straight_walk((0.0, 0.0), (0.0, 0.01), 3));
        let mut tracker = tracker(&pedometer, &location);

        tracker.start();
        sleep(Duration::from_millis(3500)).await;

        let state = tracker.snapshot();
        assert!(state.is_active);
        assert_eq!(state.elapsed_seconds, 3);
        assert_eq!(state.route.len(), 3);

        let expected = haversine_distance((0.0, 0.0), (0.0, 0.01)) + haversine_distance((0.0, 0.01), (0.0, 0.02));
        assert!((state.cumulative_distance_km - expected).abs() < 1e-12);

        pedometer.emit(1300).await;
        sleep(Duration::from_millis(10)).await;
        assert_eq!(tracker.snapshot().step_count, 1300);

        let summary = tracker.stop().unwrap();
        assert_eq!(summary.steps, 1300);
        assert_eq!(summary.elapsed_seconds, 3);
        assert_eq!(summary.route_length, 3);

        let stopped = tracker.snapshot();
        assert!(!stopped.is_active);
        assert_eq!(stopped.elapsed_seconds, 0);

        let metrics = WalkMetrics::default();
        assert_eq!(metrics.distance_display(stopped.step_count), "1.00");
        assert_eq!(metrics.calories_display(stopped.step_count), "60.00");
    }

    #[tokio::test(start_paused = true)]
    async fn late_fix_after_stop_is_ignored() {
        let pedometer = Arc::new(SimulatedPedometer::new());
        let location = Arc::new(SimulatedLocation::straight_walk((0.0, 0.0), (0.0, 0.01), 5).with_delay(Duration::from_secs(2)));
        let mut tracker = tracker(&pedometer, &location);

        tracker.start();
        sleep(Duration::from_millis(1500)).await;
        assert_eq!(location.requests(), 1);

        tracker.stop().unwrap();
        let at_stop = tracker.snapshot();

        sleep(Duration::from_secs(5)).await;

        let after = tracker.snapshot();
        assert_eq!(after, at_stop);
        assert_eq!(after.elapsed_seconds, 0);
        assert!(after.route.is_empty());
        assert_eq!(after.cumulative_distance_km, 0.0);
        assert_eq!(location.requests(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn late_fix_does_not_leak_into_next_session() {
        let pedometer = Arc::new(SimulatedPedometer::new());
        let location = Arc::new(SimulatedLocation::straight_walk((0.0, 0.0), (0.0, 0.01), 5).with_delay(Duration::from_millis(1800)));
        let mut tracker = tracker(&pedometer, &location);

        tracker.start();
        sleep(Duration::from_millis(1500)).await;
        tracker.stop();
        tracker.start();

        // The first session's fix resolves at 2.8s, inside the second session
        sleep(Duration::from_millis(1400)).await;
        let state = tracker.snapshot();
        assert_eq!(state.elapsed_seconds, 1);
        assert!(state.route.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn denied_permission_skips_ticks() {
        let pedometer = Arc::new(SimulatedPedometer::new());
        let location = Arc::new(SimulatedLocation::denied());
        let mut tracker = tracker(&pedometer, &location);

        tracker.start();
        sleep(Duration::from_millis(3500)).await;

        let state = tracker.snapshot();
        assert_eq!(state.elapsed_seconds, 3);
        assert!(state.route.is_empty());
        assert!(state.last_fix.is_none());
        assert_eq!(location.requests(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn undetermined_permission_skips_ticks() {
        let pedometer = Arc::new(SimulatedPedometer::new());
        let location = Arc::new(
            SimulatedLocation::straight_walk((0.0, 0.0), (0.0, 0.01), 3).with_permission(PermissionStatus::Undetermined),
        );
        let mut tracker = tracker(&pedometer, &location);

        tracker.start();
        sleep(Duration::from_millis(2500)).await;

        let state = tracker.snapshot();
        assert_eq!(state.elapsed_seconds, 2);
        assert!(state.route.is_empty());
        assert_eq!(location.requests(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn pedometer_status_is_reported() {
        let location = Arc::new(SimulatedLocation::new(Vec::<(f64, f64)>::new()));

        let available = Arc::new(SimulatedPedometer::new());
        let mut tracker_a = tracker(&available, &location);
        assert_eq!(tracker_a.snapshot().pedometer_status, "Checking");
        tracker_a.start();
        sleep(Duration::from_millis(10)).await;
        assert_eq!(tracker_a.snapshot().pedometer_status, "true");

        let missing = Arc::new(SimulatedPedometer::unavailable("not supported"));
        let mut tracker_b = tracker(&missing, &location);
        tracker_b.start();
        sleep(Duration::from_millis(2500)).await;

        let state = tracker_b.snapshot();
        assert_eq!(state.pedometer_status, "isPedometerAvailable:not supported");
        assert_eq!(state.step_count, 0);
        assert_eq!(state.elapsed_seconds, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn observers_see_each_tick() {
        let pedometer = Arc::new(SimulatedPedometer::new());
        let location = Arc::new(SimulatedLocation::denied());
        let mut tracker = tracker(&pedometer, &location);
        let mut observer = tracker.subscribe();

        tracker.start();
        assert!(observer.borrow_and_update().is_active);

        let mut seen = Vec::new();
        while seen.len() < 3 {
            observer.changed().await.unwrap();
            let state = observer.borrow_and_update().clone();
            if state.elapsed_seconds > 0 && seen.last() != Some(&state.elapsed_seconds) {
                seen.push(state.elapsed_seconds);
            }
        }

        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn resources_released_on_stop_and_drop() {
        let pedometer = Arc::new(SimulatedPedometer::new());
        let location = Arc::new(SimulatedLocation::straight_walk((0.0, 0.0), (0.0, 0.001), 100));

        let mut tracker = tracker(&pedometer, &location);
        tracker.start();
        sleep(Duration::from_millis(100)).await;
        assert_eq!(pedometer.active_subscriptions().await, 1);

        tracker.stop();
        sleep(Duration::from_millis(10)).await;
        assert_eq!(pedometer.active_subscriptions().await, 0);
        assert!(tracker.stop().is_none());

        tracker.start();
        sleep(Duration::from_millis(1500)).await;
        assert_eq!(pedometer.active_subscriptions().await, 1);
        let requests = location.requests();

        drop(tracker);
        sleep(Duration::from_secs(3)).await;
        assert_eq!(pedometer.active_subscriptions().await, 0);
        assert_eq!(location.requests(), requests);
    }

    #[tokio::test(start_paused = true)]
    async fn start_twice_keeps_one_session() {
        let pedometer = Arc::new(SimulatedPedometer::new());
        let location = Arc::new(SimulatedLocation::denied());
        let mut tracker = tracker(&pedometer, &location);

        tracker.start();
        sleep(Duration::from_millis(1500)).await;
        tracker.start();
        sleep(Duration::from_millis(1000)).await;

        let state = tracker.snapshot();
        assert_eq!(state.generation, 1);
        assert_eq!(state.elapsed_seconds, 2);
        assert_eq!(pedometer.active_subscriptions().await, 1);
    }
}
