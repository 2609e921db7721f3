//! Error taxonomy for artifact loading and price estimation
//!
//! Artifact failures are startup-fatal: the process cannot serve estimates
//! without a consistent artifact set and should exit rather than retry.
//! Request failures are recoverable and carry a stable cause code for
//! logs, metrics labels, and API payloads.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading or cross-validating the trained artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact {name} not found at {path:?}")]
    Missing {
        name: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("artifact {name} could not be decoded: {reason}")]
    Corrupt { name: &'static str, reason: String },

    #[error("artifact {name} failed checksum validation: expected {expected}, computed {computed}")]
    ChecksumMismatch {
        name: String,
        expected: String,
        computed: String,
    },

    #[error("schema declares {schema_width} feature columns but the model expects {model_width}")]
    DimensionMismatch {
        schema_width: usize,
        model_width: usize,
    },
}

/// Per-request input validation failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing required field {0:?}")]
    SchemaMismatch(String),

    #[error("field {field:?} has value {value:?} outside the trained vocabulary")]
    UnknownValue { field: String, value: String },

    #[error("field {field:?} expects a numeric value, got {value:?}")]
    TypeMismatch { field: String, value: String },

    #[error("assembled vector has {actual} columns, model expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl ValidationError {
    /// Stable cause code for logs and error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::SchemaMismatch(_) => "schema_mismatch",
            ValidationError::UnknownValue { .. } => "unknown_value",
            ValidationError::TypeMismatch { .. } => "type_mismatch",
            ValidationError::DimensionMismatch { .. } => "dimension_mismatch",
        }
    }
}

/// Failures surfaced by [`estimate`](crate::pipeline::InferenceContext::estimate).
///
/// Validation failures are the caller's to fix; inference failures are not.
#[derive(Debug, Error)]
pub enum EstimateError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("inference failed: {0}")]
    Inference(#[source] anyhow::Error),
}

impl EstimateError {
    /// Stable cause code for logs and error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            EstimateError::Validation(cause) => cause.code(),
            EstimateError::Inference(_) => "inference_error",
        }
    }

    /// True when the caller can correct the input and retry.
    pub fn is_client_error(&self) -> bool {
        matches!(self, EstimateError::Validation(_))
    }
}
