//! HTTP API for price estimation, health checks, and Prometheus metrics

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use estimator_lib::{
    health::{ComponentStatus, HealthRegistry},
    models::{PriceEstimate, RawInput},
    observability::{EstimatorMetrics, StructuredLogger},
    pipeline::InferenceContext,
    EstimateError,
};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub context: Arc<InferenceContext>,
    pub health_registry: HealthRegistry,
    pub metrics: EstimatorMetrics,
    pub logger: StructuredLogger,
}

impl AppState {
    pub fn new(
        context: Arc<InferenceContext>,
        health_registry: HealthRegistry,
        metrics: EstimatorMetrics,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            context,
            health_registry,
            metrics,
            logger,
        }
    }
}

/// Successful estimation response
#[derive(Debug, Clone, Serialize)]
pub struct EstimateResponse {
    /// Estimated market value, in the scale the model was trained on.
    /// The core attaches no currency unit; labeling is up to the caller.
    pub estimate: f64,
    pub model_version: String,
    pub generated_at: i64,
}

impl From<PriceEstimate> for EstimateResponse {
    fn from(estimate: PriceEstimate) -> Self {
        Self {
            estimate: estimate.value,
            model_version: estimate.model_version,
            generated_at: estimate.generated_at,
        }
    }
}

/// Error envelope: a generic user-facing message plus the cause code and
/// detail for logs and tests.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub details: String,
}

impl ErrorResponse {
    fn from_estimate_error(err: &EstimateError) -> Self {
        Self {
            error: "could not compute an estimate".to_string(),
            code: err.code().to_string(),
            details: err.to_string(),
        }
    }
}

/// Field inventory for form-rendering callers
#[derive(Debug, Clone, Serialize)]
pub struct SchemaResponse {
    pub numeric_fields: Vec<String>,
    pub categorical_fields: Vec<CategoricalField>,
    pub feature_width: usize,
    pub model_version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoricalField {
    pub name: String,
    pub values: Vec<String>,
}

/// Compute a price estimate from a raw attribute mapping
async fn estimate(
    State(state): State<Arc<AppState>>,
    Json(input): Json<RawInput>,
) -> impl IntoResponse {
    let start = Instant::now();

    match state.context.estimate(&input) {
        Ok(price) => {
            let elapsed = start.elapsed();
            state.metrics.inc_estimates();
            state.metrics.observe_estimate_latency(elapsed.as_secs_f64());
            state
                .logger
                .log_estimate(price.value, elapsed.as_micros() as u64);

            (StatusCode::OK, Json(EstimateResponse::from(price))).into_response()
        }
        Err(err) => {
            state.metrics.inc_estimate_errors(err.code());
            state.logger.log_estimate_failed(err.code(), &err.to_string());

            let status = if err.is_client_error() {
                StatusCode::UNPROCESSABLE_ENTITY
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, Json(ErrorResponse::from_estimate_error(&err))).into_response()
        }
    }
}

/// Describe the fields an estimation request must supply
async fn schema(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let schema = state.context.schema();

    let categorical_fields = schema
        .categorical_columns()
        .iter()
        .map(|name| CategoricalField {
            name: name.clone(),
            values: schema.vocabulary(name).unwrap_or(&[]).to_vec(),
        })
        .collect();

    Json(SchemaResponse {
        numeric_fields: schema.numeric_columns().to_vec(),
        categorical_fields,
        feature_width: state.context.feature_width(),
        model_version: state.context.model_version().to_string(),
    })
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder.encode(&metric_families, &mut buffer).unwrap();

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/estimate", post(estimate))
        .route("/api/v1/schema", get(schema))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
