//! FitLab Inference Server - Main Entry Point
//!
//! Loads the workout model artifacts once and serves predictions over HTTP.

use anyhow::{Context, Result};
use fitlab_inference::{
    api::{self, AppState},
    config::{AppConfig, LogFormat, LoggingConfig},
    metrics::{MetricsReporter, ServiceMetrics},
    ArtifactLoader, FEATURE_SCHEMA,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config.logging)?;

    info!("Starting FitLab inference server");
    info!(
        base_dir = %config.artifacts.base_dir,
        features = FEATURE_SCHEMA.len(),
        "Configuration loaded successfully"
    );

    // Missing artifacts disable /predict but do not stop the server
    let artifacts = ArtifactLoader::new(&config.artifacts, &FEATURE_SCHEMA).load();

    let metrics = Arc::new(ServiceMetrics::new());
    if config.metrics.report_interval_secs > 0 {
        let reporter = MetricsReporter::new(metrics.clone(), config.metrics.report_interval_secs);
        tokio::spawn(reporter.start());
    }

    let state = AppState::new(artifacts, metrics.clone());
    let app = api::router(state, &config.server);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Listening on http://{}", addr);
    info!("  GET  /          - Service info");
    info!("  GET  /health    - Artifact status");
    info!("  POST /predict   - Workout type prediction");
    info!("  GET  /workouts  - Sample workouts");
    info!("  GET  /meals     - Sample meals");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    metrics.print_summary();

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(format!(
            "fitlab_inference={level},fitlab_server={level},tower_http={level}",
            level = logging.level
        ))
    })?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
