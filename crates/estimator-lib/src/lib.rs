//! Core library for the vehicle price estimator
//!
//! This crate provides the core functionality for:
//! - Trained artifact loading and validation
//! - Deterministic inference preprocessing (normalization, one-hot encoding,
//!   feature assembly)
//! - Single-call price inference against a pre-fitted regression model
//! - Health checks and observability

pub mod artifacts;
pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod pipeline;

pub use error::{ArtifactError, EstimateError, ValidationError};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{EstimatorMetrics, StructuredLogger};
pub use pipeline::{
    CategoricalEncoder, FeatureSchema, InferenceContext, NumericNormalizer, OnnxRegressor,
    Regressor, ScalerParams, UnknownCategoryPolicy,
};
