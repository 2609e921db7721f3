//! Observability infrastructure for the estimator service
//!
//! Provides:
//! - Prometheus metrics (estimate latency, request/error totals, model version)
//! - Structured JSON logging with tracing

use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, register_int_counter_vec,
    register_int_gauge, GaugeVec, Histogram, IntCounter, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<EstimatorMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct EstimatorMetricsInner {
    estimate_latency_seconds: Histogram,
    estimates_total: IntCounter,
    estimate_errors_total: IntCounterVec,
    model_version_info: GaugeVec,
    feature_width: IntGauge,
}

impl EstimatorMetricsInner {
    fn new() -> Self {
        Self {
            estimate_latency_seconds: register_histogram!(
                "price_estimator_estimate_latency_seconds",
                "Time spent computing one price estimate end to end",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register estimate_latency_seconds"),

            estimates_total: register_int_counter!(
                "price_estimator_estimates_total",
                "Total number of successful price estimates"
            )
            .expect("Failed to register estimates_total"),

            estimate_errors_total: register_int_counter_vec!(
                "price_estimator_estimate_errors_total",
                "Total number of failed estimation requests by cause code",
                &["code"]
            )
            .expect("Failed to register estimate_errors_total"),

            model_version_info: register_gauge_vec!(
                "price_estimator_model_version_info",
                "Information about the currently loaded regression model",
                &["version"]
            )
            .expect("Failed to register model_version_info"),

            feature_width: register_int_gauge!(
                "price_estimator_feature_width",
                "Width of the feature vector the loaded model expects"
            )
            .expect("Failed to register feature_width"),
        }
    }
}

/// Estimator metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct EstimatorMetrics {
    _private: (),
}

impl Default for EstimatorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl EstimatorMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(EstimatorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &EstimatorMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    /// Record an estimate latency observation
    pub fn observe_estimate_latency(&self, duration_secs: f64) {
        self.inner().estimate_latency_seconds.observe(duration_secs);
    }

    /// Increment successful estimate counter
    pub fn inc_estimates(&self) {
        self.inner().estimates_total.inc();
    }

    /// Increment error counter for a cause code
    pub fn inc_estimate_errors(&self, code: &str) {
        self.inner()
            .estimate_errors_total
            .with_label_values(&[code])
            .inc();
    }

    /// Update model version info
    pub fn set_model_version(&self, version: &str) {
        self.inner().model_version_info.reset();
        self.inner()
            .model_version_info
            .with_label_values(&[version])
            .set(1.0);
    }

    /// Update the expected feature width
    pub fn set_feature_width(&self, width: i64) {
        self.inner().feature_width.set(width);
    }
}

/// Structured logger for estimator events
///
/// Provides consistent JSON-formatted logging for estimates and lifecycle
/// events.
#[derive(Clone)]
pub struct StructuredLogger {
    model_version: String,
}

impl StructuredLogger {
    pub fn new(model_version: impl Into<String>) -> Self {
        Self {
            model_version: model_version.into(),
        }
    }

    /// Log a successful estimate
    pub fn log_estimate(&self, value: f64, duration_us: u64) {
        info!(
            event = "estimate_generated",
            model_version = %self.model_version,
            value = value,
            duration_us = duration_us,
            "Generated price estimate"
        );
    }

    /// Log a failed estimation request
    pub fn log_estimate_failed(&self, code: &str, error: &str) {
        warn!(
            event = "estimate_failed",
            model_version = %self.model_version,
            code = %code,
            error = %error,
            "Could not compute an estimate"
        );
    }

    /// Log service startup
    pub fn log_startup(&self, version: &str, feature_width: usize) {
        info!(
            event = "estimator_started",
            service_version = %version,
            model_version = %self.model_version,
            feature_width = feature_width,
            "Price estimator started"
        );
    }

    /// Log service shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "estimator_shutdown",
            model_version = %self.model_version,
            reason = %reason,
            "Price estimator shutting down"
        );
    }
}
