use std::{fs::OpenOptions, sync::Arc, time::Duration};

use step_tracker::{
    app::App,
    app_state::AppState,
    config::TrackerConfig,
    screens::{session::ControlOutcome, Screen},
    sensors::simulated::{SimulatedLocation, SimulatedPedometer},
};
use step_tracker_data_management::DataManager;
use step_tracker_lib::map_view::{DEFAULT_LATITUDE, DEFAULT_LONGITUDE};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_WALK_SECONDS: u64 = 10;
const STEPS_PER_SECOND: u64 = 2;

// Runs one simulated walk through all three screens
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    std::fs::create_dir_all("step_tracker/log")?;
    let log_file = "step_tracker/log/step_tracker.log";

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| format!("{}=trace", env!("CARGO_CRATE_NAME")).into())
        )
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file))
        .init();

    let walk_seconds = std::env::args().nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or(DEFAULT_WALK_SECONDS);

    tracing::info!("Starting step tracker, walking for {walk_seconds}s");

    let data_manager = DataManager::start().await
        .map_err(|err| anyhow::anyhow!("Failed to open step history: {err}"))?;

    let pedometer = Arc::new(SimulatedPedometer::new());
    // Roughly 11 m between fixes
    let location = Arc::new(SimulatedLocation::straight_walk(
        (DEFAULT_LATITUDE, DEFAULT_LONGITUDE),
        (0.0001, 0.0),
        walk_seconds as usize + 1,
    ));

    let state = Arc::new(AppState {
        data_manager,
        pedometer: pedometer.clone(),
        location,
        config: TrackerConfig::default(),
    });

    let mut app = App::launch(state).await;
    if let Screen::Onboard(onboard) = app.screen() {
        tracing::info!("{}", serde_json::to_string(&onboard.render())?);
    }

    app.get_started().await;
    app.toggle_walk().await;

    for second in 1..=walk_seconds {
        tokio::time::sleep(Duration::from_secs(1)).await;
        pedometer.emit(second * STEPS_PER_SECOND).await;

        if let Screen::Main(session) = app.screen() {
            let view = session.render();
            tracing::info!(
                "{} steps, {} km, {} kcal, {} ({:.3} km by GPS)",
                view.step_count, view.distance, view.calories, view.elapsed, view.travelled_km
            );
        }
    }

    if let Some(ControlOutcome::Finished { summary, record }) = app.toggle_walk().await {
        tracing::info!("Walk finished: {}", serde_json::to_string(&summary)?);
        if record.is_none() {
            tracing::warn!("Walk was not saved to the history");
        }
    }

    if let Screen::PastSteps(history) = app.screen() {
        println!("{}", serde_json::to_string_pretty(&history.render())?);
    }

    Ok(())
}
