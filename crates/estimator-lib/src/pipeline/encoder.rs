//! One-hot encoding against the trained vocabulary
//!
//! Each categorical column expands to a fixed-width indicator block in
//! vocabulary order. Values the model never saw during training follow an
//! explicit policy: rejected by default, or encoded as an all-zero block
//! when the deployment opts in.

use crate::error::ValidationError;
use crate::models::RawInput;
use crate::pipeline::FeatureSchema;
use serde::{Deserialize, Serialize};

/// Policy for categorical values absent from the trained vocabulary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCategoryPolicy {
    /// Reject the request with an `UnknownValue` error.
    #[default]
    Reject,
    /// Encode the column as an all-zero indicator block.
    ZeroFill,
}

/// Expands categorical values into one-hot indicator blocks.
#[derive(Debug, Clone)]
pub struct CategoricalEncoder {
    policy: UnknownCategoryPolicy,
}

impl CategoricalEncoder {
    pub fn new(policy: UnknownCategoryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> UnknownCategoryPolicy {
        self.policy
    }

    /// Encode every categorical column of the input, in schema order.
    pub fn encode(
        &self,
        input: &RawInput,
        schema: &FeatureSchema,
    ) -> Result<Vec<f32>, ValidationError> {
        let mut encoded = Vec::new();

        for column in schema.categorical_columns() {
            let raw = input
                .get(column)
                .ok_or_else(|| ValidationError::SchemaMismatch(column.clone()))?;
            let value = raw.as_category();

            // Schema construction guarantees a vocabulary for every column
            let vocabulary = schema.vocabulary(column).unwrap_or(&[]);
            let position = vocabulary.iter().position(|v| v == value.as_ref());

            match (position, self.policy) {
                (Some(hit), _) => {
                    encoded.extend((0..vocabulary.len()).map(|i| if i == hit { 1.0 } else { 0.0 }));
                }
                (None, UnknownCategoryPolicy::ZeroFill) => {
                    encoded.extend(std::iter::repeat(0.0).take(vocabulary.len()));
                }
                (None, UnknownCategoryPolicy::Reject) => {
                    return Err(ValidationError::UnknownValue {
                        field: column.clone(),
                        value: value.into_owned(),
                    });
                }
            }
        }

        Ok(encoded)
    }
}
