//! Inference preprocessing pipeline
//!
//! Wires schema validation, numeric normalization, one-hot encoding, and
//! feature assembly into a single `estimate` call against a pre-fitted
//! regressor. The context is built once at startup and shared read-only
//! across requests; no call mutates it.

mod assembler;
mod encoder;
mod inference;
mod normalizer;
mod schema;

pub use assembler::assemble;
pub use encoder::{CategoricalEncoder, UnknownCategoryPolicy};
pub use inference::{InferenceStats, OnnxRegressor, Regressor};
pub use normalizer::{NumericNormalizer, ScalerParams};
pub use schema::FeatureSchema;

use crate::artifacts::{self, ArtifactSet};
use crate::error::{ArtifactError, EstimateError};
use crate::models::{PriceEstimate, RawInput};
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Immutable inference context: schema, pre-fitted transforms, and model.
///
/// Built once at process start; every estimation request borrows it
/// read-only, so it can be shared across handlers without locking.
pub struct InferenceContext {
    schema: FeatureSchema,
    normalizer: NumericNormalizer,
    encoder: CategoricalEncoder,
    regressor: Box<dyn Regressor>,
    feature_width: usize,
}

impl InferenceContext {
    /// Assemble a context from loaded parts, checking the schema-vs-model
    /// width agreement once so the per-request path never re-derives it.
    pub fn new(
        schema: FeatureSchema,
        scaler: ScalerParams,
        policy: UnknownCategoryPolicy,
        regressor: Box<dyn Regressor>,
    ) -> Result<Self, ArtifactError> {
        let feature_width = schema.feature_width();
        if feature_width != regressor.input_width() {
            return Err(ArtifactError::DimensionMismatch {
                schema_width: feature_width,
                model_width: regressor.input_width(),
            });
        }

        if scaler.scale.len() != schema.numeric_columns().len()
            || scaler.offset.len() != schema.numeric_columns().len()
        {
            return Err(ArtifactError::Corrupt {
                name: artifacts::SCALER_ARTIFACT,
                reason: format!(
                    "scaler has {} columns, schema declares {} numeric columns",
                    scaler.scale.len().min(scaler.offset.len()),
                    schema.numeric_columns().len()
                ),
            });
        }

        Ok(Self {
            schema,
            normalizer: NumericNormalizer::new(scaler),
            encoder: CategoricalEncoder::new(policy),
            regressor,
            feature_width,
        })
    }

    /// Load all artifacts from a directory and build the production
    /// context with an ONNX-backed regressor.
    pub fn from_artifacts(
        dir: &Path,
        policy: UnknownCategoryPolicy,
    ) -> Result<Self, ArtifactError> {
        let ArtifactSet {
            schema,
            scaler,
            model_bytes,
            model_version,
        } = artifacts::load(dir)?;

        let regressor = OnnxRegressor::from_bytes(
            &model_bytes,
            schema.feature_width(),
            &model_version,
        )
        .map_err(|e| ArtifactError::Corrupt {
            name: artifacts::MODEL_ARTIFACT,
            reason: format!("{e:#}"),
        })?;

        Self::new(schema, scaler, policy, Box::new(regressor))
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn model_version(&self) -> &str {
        self.regressor.version()
    }

    pub fn feature_width(&self) -> usize {
        self.feature_width
    }

    pub fn unknown_category_policy(&self) -> UnknownCategoryPolicy {
        self.encoder.policy()
    }

    /// Transform the raw attribute mapping into the model's feature vector.
    ///
    /// Exposed separately from [`estimate`](Self::estimate) so tests can
    /// assert on the exact vector the regressor would receive.
    pub fn feature_vector(&self, input: &RawInput) -> Result<Vec<f32>, EstimateError> {
        self.schema.validate(input)?;
        let numeric = self.normalizer.normalize(input, &self.schema)?;
        let categorical = self.encoder.encode(input, &self.schema)?;
        Ok(assemble(numeric, categorical, self.feature_width)?)
    }

    /// Run the full pipeline: validate, normalize, encode, assemble,
    /// predict. A failed request leaves the shared context untouched.
    pub fn estimate(&self, input: &RawInput) -> Result<PriceEstimate, EstimateError> {
        let start = Instant::now();

        let features = self.feature_vector(input)?;
        let value = self
            .regressor
            .predict(&features)
            .map_err(EstimateError::Inference)? as f64;

        if !value.is_finite() {
            return Err(EstimateError::Inference(anyhow::anyhow!(
                "model produced a non-finite value: {value}"
            )));
        }

        debug!(
            elapsed_us = start.elapsed().as_micros(),
            value, "Estimate computed"
        );

        Ok(PriceEstimate {
            value,
            model_version: self.regressor.version().to_string(),
            generated_at: chrono::Utc::now().timestamp(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::models::RawValue;
    use anyhow::Result;
    use std::collections::HashMap;

    /// Sums all features; linear enough to make estimates predictable.
    struct StubRegressor {
        width: usize,
    }

    impl StubRegressor {
        fn uniform(width: usize) -> Self {
            Self { width }
        }
    }

    impl Regressor for StubRegressor {
        fn predict(&self, features: &[f32]) -> Result<f32> {
            Ok(features.iter().sum())
        }

        fn input_width(&self) -> usize {
            self.width
        }

        fn version(&self) -> &str {
            "stub"
        }
    }

    struct NonFiniteRegressor {
        width: usize,
        output: f32,
    }

    impl Regressor for NonFiniteRegressor {
        fn predict(&self, _features: &[f32]) -> Result<f32> {
            Ok(self.output)
        }

        fn input_width(&self) -> usize {
            self.width
        }

        fn version(&self) -> &str {
            "stub"
        }
    }

    fn car_schema() -> FeatureSchema {
        FeatureSchema::new(
            vec![
                "Year".to_string(),
                "Present_Price".to_string(),
                "Kms_Driven".to_string(),
                "Owner".to_string(),
            ],
            vec![
                "Fuel_Type".to_string(),
                "Seller_Type".to_string(),
                "Transmission".to_string(),
            ],
            HashMap::from([
                (
                    "Fuel_Type".to_string(),
                    vec!["Petrol".to_string(), "Diesel".to_string(), "CNG".to_string()],
                ),
                (
                    "Seller_Type".to_string(),
                    vec!["Dealer".to_string(), "Individual".to_string()],
                ),
                (
                    "Transmission".to_string(),
                    vec!["Manual".to_string(), "Automatic".to_string()],
                ),
            ]),
        )
        .unwrap()
    }

    fn car_input() -> RawInput {
        RawInput::from([
            ("Year".to_string(), RawValue::from(2018.0)),
            ("Present_Price".to_string(), RawValue::from(5.0)),
            ("Kms_Driven".to_string(), RawValue::from(20000.0)),
            ("Owner".to_string(), RawValue::from(0.0)),
            ("Fuel_Type".to_string(), RawValue::from("Diesel")),
            ("Seller_Type".to_string(), RawValue::from("Dealer")),
            ("Transmission".to_string(), RawValue::from("Manual")),
        ])
    }

    fn car_context(policy: UnknownCategoryPolicy) -> InferenceContext {
        InferenceContext::new(
            car_schema(),
            ScalerParams::identity(4),
            policy,
            Box::new(StubRegressor::uniform(11)),
        )
        .unwrap()
    }

    #[test]
    fn test_assembled_vector_matches_training_layout() {
        let context = InferenceContext::new(
            car_schema(),
            ScalerParams::identity(4),
            UnknownCategoryPolicy::Reject,
            Box::new(StubRegressor::uniform(11)),
        )
        .unwrap();

        let features = context.feature_vector(&car_input()).unwrap();
        assert_eq!(features.len(), 11);
        // Numeric block in schema order, untransformed by the identity scaler
        assert_eq!(&features[..4], &[2018.0, 5.0, 20000.0, 0.0]);
        // Fuel_Type = Diesel, Seller_Type = Dealer, Transmission = Manual
        assert_eq!(&features[4..7], &[0.0, 1.0, 0.0]);
        assert_eq!(&features[7..9], &[1.0, 0.0]);
        assert_eq!(&features[9..11], &[1.0, 0.0]);
    }

    #[test]
    fn test_estimate_returns_finite_scalar() {
        let context = car_context(UnknownCategoryPolicy::Reject);
        let estimate = context.estimate(&car_input()).unwrap();
        assert!(estimate.value.is_finite());
        assert_eq!(estimate.model_version, "stub");
    }

    #[test]
    fn test_estimate_is_deterministic() {
        let context = car_context(UnknownCategoryPolicy::Reject);
        let first = context.estimate(&car_input()).unwrap();
        let second = context.estimate(&car_input()).unwrap();
        assert_eq!(first.value.to_bits(), second.value.to_bits());
    }

    #[test]
    fn test_input_insertion_order_is_irrelevant() {
        let context = car_context(UnknownCategoryPolicy::Reject);

        let forward = car_input();
        let mut reversed = RawInput::new();
        let mut keys: Vec<_> = forward.keys().cloned().collect();
        keys.sort();
        keys.reverse();
        for key in keys {
            reversed.insert(key.clone(), forward[&key].clone());
        }

        let a = context.feature_vector(&forward).unwrap();
        let b = context.feature_vector(&reversed).unwrap();
        assert_eq!(a, b);

        let ea = context.estimate(&forward).unwrap();
        let eb = context.estimate(&reversed).unwrap();
        assert_eq!(ea.value.to_bits(), eb.value.to_bits());
    }

    #[test]
    fn test_missing_field_never_predicts() {
        let context = car_context(UnknownCategoryPolicy::Reject);
        let mut input = car_input();
        input.remove("Kms_Driven");

        match context.estimate(&input) {
            Err(EstimateError::Validation(ValidationError::SchemaMismatch(field))) => {
                assert_eq!(field, "Kms_Driven")
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_category_rejected_under_reject_policy() {
        let context = car_context(UnknownCategoryPolicy::Reject);
        let mut input = car_input();
        input.insert("Fuel_Type".to_string(), RawValue::from("Electric"));

        let err = context.estimate(&input).unwrap_err();
        assert_eq!(err.code(), "unknown_value");
    }

    #[test]
    fn test_unknown_category_zero_filled_under_zero_fill_policy() {
        let context = car_context(UnknownCategoryPolicy::ZeroFill);
        let mut input = car_input();
        input.insert("Fuel_Type".to_string(), RawValue::from("Electric"));

        let features = context.feature_vector(&input).unwrap();
        assert_eq!(&features[4..7], &[0.0, 0.0, 0.0]);
        assert!(context.estimate(&input).is_ok());
    }

    #[test]
    fn test_width_disagreement_is_a_construction_error() {
        let result = InferenceContext::new(
            car_schema(),
            ScalerParams::identity(4),
            UnknownCategoryPolicy::Reject,
            Box::new(StubRegressor::uniform(7)),
        );
        match result {
            Err(ArtifactError::DimensionMismatch {
                schema_width,
                model_width,
            }) => {
                assert_eq!(schema_width, 11);
                assert_eq!(model_width, 7);
            }
            other => panic!("expected DimensionMismatch, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_scaler_column_count_checked_at_construction() {
        let result = InferenceContext::new(
            car_schema(),
            ScalerParams::identity(2),
            UnknownCategoryPolicy::Reject,
            Box::new(StubRegressor::uniform(11)),
        );
        assert!(matches!(result, Err(ArtifactError::Corrupt { .. })));
    }

    #[test]
    fn test_non_finite_model_output_is_an_inference_error() {
        let context = InferenceContext::new(
            car_schema(),
            ScalerParams::identity(4),
            UnknownCategoryPolicy::Reject,
            Box::new(NonFiniteRegressor {
                width: 11,
                output: f32::NAN,
            }),
        )
        .unwrap();

        let err = context.estimate(&car_input()).unwrap_err();
        assert_eq!(err.code(), "inference_error");
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_scaler_applied_before_assembly() {
        let scaler = ScalerParams {
            scale: vec![0.5, 1.0, 1.0, 1.0],
            offset: vec![-1000.0, 0.0, 0.0, 0.0],
        };
        let context = InferenceContext::new(
            car_schema(),
            scaler,
            UnknownCategoryPolicy::Reject,
            Box::new(StubRegressor::uniform(11)),
        )
        .unwrap();

        let features = context.feature_vector(&car_input()).unwrap();
        assert_eq!(features[0], 2018.0 * 0.5 - 1000.0);
    }
}
