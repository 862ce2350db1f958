use std::sync::Arc;

use crate::{
    app_state::AppState,
    navigator::{Navigator, Route},
    screens::{session::ControlOutcome, HistoryScreen, OnboardScreen, Screen, SessionScreen},
};

/// Binds the navigator to the mounted screen. Every navigation unmounts the current screen and
/// mounts the one for the new route.
pub struct App {
    state: Arc<AppState>,
    navigator: Navigator,
    screen: Screen,
}

impl App {
    pub async fn launch(state: Arc<AppState>) -> Self {
        let screen = Screen::Onboard(OnboardScreen::mount(&state.data_manager).await);

        Self {
            state,
            navigator: Navigator::new(Route::Onboard),
            screen,
        }
    }

    pub fn route(&self) -> &Route {
        self.navigator.current()
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Returns false if the onboarding screen is not showing.
    pub async fn get_started(&mut self) -> bool {
        let Screen::Onboard(onboard) = &self.screen else {
            return false;
        };

        onboard.get_started(&mut self.navigator);
        self.mount_current().await;
        true
    }

    /// Presses the play/pause button. `None` if the session screen is not showing.
    pub async fn toggle_walk(&mut self) -> Option<ControlOutcome> {
        let Screen::Main(session) = &mut self.screen else {
            return None;
        };

        let outcome = session.press_control(&mut self.navigator).await;
        if matches!(outcome, ControlOutcome::Finished { .. }) {
            self.mount_current().await;
        }

        Some(outcome)
    }

    pub async fn go_back(&mut self) -> bool {
        if !self.navigator.go_back() {
            return false;
        }

        self.mount_current().await;
        true
    }

    async fn mount_current(&mut self) {
        self.screen = match self.navigator.current().clone() {
            Route::Onboard => Screen::Onboard(OnboardScreen::mount(&self.state.data_manager).await),
            Route::Main => Screen::Main(SessionScreen::mount(&self.state)),
            Route::PastSteps { steps } => Screen::PastSteps(HistoryScreen::mount(&self.state.data_manager, steps).await),
        };

        tracing::debug!("Mounted {:?}", self.navigator.current());
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use step_tracker_data_management::DataManager;
    use tokio::time::sleep;

    use super::*;
    use crate::{config::TrackerConfig, sensors::simulated::{SimulatedLocation, SimulatedPedometer}};

    async fn app_with(pedometer: Arc<SimulatedPedometer>, location: Arc<SimulatedLocation>) -> App {
        let state = AppState {
            data_manager: DataManager::in_memory().await.unwrap(),
            pedometer,
            location,
            config: TrackerConfig::default(),
        };

        App::launch(Arc::new(state)).await
    }

    // The sqlite worker runs on its own thread, so the clock is only paused while no query is in flight.
    #[tokio::test]
    async fn walk_is_saved_and_shown_in_history() {
        let pedometer = Arc::new(SimulatedPedometer::new());
        let location = Arc::new(SimulatedLocation::straight_walk((0.0, 0.0), (0.0, 0.01), 3));
        let mut app = app_with(pedometer.clone(), location).await;

        let Screen::Onboard(onboard) = app.screen() else { panic!("expected onboarding") };
        assert!(onboard.schema_ready());
        assert!(app.toggle_walk().await.is_none());

        tokio::time::pause();
        assert!(app.get_started().await);
        assert_eq!(app.route(), &Route::Main);

        assert_eq!(app.toggle_walk().await, Some(ControlOutcome::Started));
        sleep(Duration::from_millis(3500)).await;
        pedometer.emit(1300).await;
        sleep(Duration::from_millis(10)).await;

        let Screen::Main(session) = app.screen() else { panic!("expected session screen") };
        assert!(session.tracker().is_active());
        let view = session.render();
        assert_eq!(view.elapsed, "00m:03s");
        assert_eq!(view.distance, "1.00");
        assert_eq!(view.calories, "60.00");
        assert_eq!(view.map.route.0.len(), 3);

        tokio::time::resume();
        let Some(ControlOutcome::Finished { summary, record }) = app.toggle_walk().await else {
            panic!("expected the walk to finish")
        };
        assert_eq!(summary.steps, 1300);
        assert_eq!(record.map(|record| record.steps), Some(1300));
        assert_eq!(app.route(), &Route::PastSteps { steps: 1300 });

        // Leaving the session screen released the step subscription
        sleep(Duration::from_millis(10)).await;
        assert_eq!(pedometer.active_subscriptions().await, 0);

        let Screen::PastSteps(history) = app.screen() else { panic!("expected history") };
        assert_eq!(history.steps(), 1300);
        let view = history.render();
        assert_eq!(view.heading, "Wow! You completed 1300 steps!");
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].steps, "1300 steps");
    }

    #[tokio::test]
    async fn going_back_tears_down_running_walk() {
        let pedometer = Arc::new(SimulatedPedometer::new());
        let location = Arc::new(SimulatedLocation::denied());
        let mut app = app_with(pedometer.clone(), location).await;

        tokio::time::pause();
        app.get_started().await;
        app.toggle_walk().await;
        sleep(Duration::from_millis(1500)).await;
        assert_eq!(pedometer.active_subscriptions().await, 1);

        tokio::time::resume();
        assert!(app.go_back().await);
        assert_eq!(app.route(), &Route::Onboard);
        sleep(Duration::from_millis(10)).await;
        assert_eq!(pedometer.active_subscriptions().await, 0);
        assert!(!app.go_back().await);
    }
}
