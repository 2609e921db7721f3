//! Price Estimator - vehicle market value estimation service
//!
//! Loads the trained artifacts once at startup and serves price estimates
//! over HTTP. Artifact problems are fatal: the process refuses to start
//! rather than serve predictions from an inconsistent artifact set.

use anyhow::{Context, Result};
use estimator_lib::{
    health::{components, HealthRegistry},
    observability::{EstimatorMetrics, StructuredLogger},
    pipeline::InferenceContext,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting price-estimator");

    // Load configuration
    let config = config::EstimatorConfig::load()?;
    info!(
        artifact_dir = %config.artifact_dir.display(),
        policy = ?config.unknown_category_policy,
        "Estimator configured"
    );

    // Load artifacts and build the shared inference context
    let context = InferenceContext::from_artifacts(
        &config.artifact_dir,
        config.unknown_category_policy,
    )
    .with_context(|| {
        format!(
            "Failed to load trained artifacts from {}; redeploy the artifact set before restarting",
            config.artifact_dir.display()
        )
    })?;
    let context = Arc::new(context);

    // Initialize health registry
    let health_registry = HealthRegistry::new();
    health_registry.register(components::ARTIFACTS).await;
    health_registry.register(components::REGRESSOR).await;

    // Initialize metrics
    let metrics = EstimatorMetrics::new();
    metrics.set_model_version(context.model_version());
    metrics.set_feature_width(context.feature_width() as i64);

    // Initialize structured logger
    let logger = StructuredLogger::new(context.model_version());
    logger.log_startup(SERVICE_VERSION, context.feature_width());

    // Create shared application state
    let app_state = Arc::new(api::AppState::new(
        context,
        health_registry.clone(),
        metrics.clone(),
        logger.clone(),
    ));

    // Mark service as ready after initialization
    health_registry.set_ready(true).await;

    // Start the API server
    let api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    logger.log_shutdown("SIGINT received");
    info!("Shutting down");

    api_handle.abort();

    Ok(())
}
