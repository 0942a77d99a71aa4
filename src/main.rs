// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Run-Tracker headless recorder
//!
//! Replays a recorded track through the session driver as if it came from a
//! live device, saves the finished run to Firestore and logs its summary.

use run_tracker::{
    config::Config,
    db::FirestoreDb,
    models::SessionStatus,
    services::{
        DriverOptions, ReplayLocationProvider, RunService, SaveOutcome, SessionDriver,
        StaticIdentity, TracingNotifier,
    },
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(owner = %config.owner_id, "Starting Run-Tracker recorder");

    // Initialize Firestore database
    let db = Arc::new(FirestoreDb::new(&config.gcp_project_id).await?);

    // Load the track to replay
    tracing::info!(path = %config.track_file.display(), "Loading replay track");
    let provider = Arc::new(ReplayLocationProvider::load_from_file(
        &config.track_file,
        config.replay_interval,
    )?);

    let mut driver = SessionDriver::new(
        Arc::clone(&provider),
        Arc::clone(&db),
        Arc::new(TracingNotifier::new()),
        Arc::new(StaticIdentity::signed_in(config.owner_id.clone())),
        DriverOptions::from(&config),
    );

    driver.mount().await;
    driver.handle_start_run().await;
    if driver.state().status != SessionStatus::Running {
        return Err("Could not start a run: no starting position".into());
    }

    tokio::select! {
        _ = driver.run() => {}
        _ = provider.finished() => tracing::info!("Replay finished"),
        _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted, saving run"),
    }

    // Samples delivered just before the replay ended
    while driver.try_step() {}

    driver.pause();
    match driver.handle_save_run().await {
        SaveOutcome::Saved { run_id } => {
            let summary = RunService::new(db).summary(&run_id).await?;
            tracing::info!(
                run_id = %summary.id,
                date = %summary.date,
                duration = %summary.duration,
                distance_km = %summary.distance,
                pace = %summary.pace,
                points = summary.positions.len(),
                "Run summary"
            );
            Ok(())
        }
        other => Err(format!("Run was not saved: {:?}", other).into()),
    }
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("run_tracker=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
