//! Numeric normalization with pre-fitted scale parameters
//!
//! Applies the affine transform captured at training time to the numeric
//! columns, in schema order. The transform kind is opaque to the pipeline:
//! min-max fitting stores `scale = 1/(max-min)` and `offset = -min/(max-min)`,
//! but any column-wise affine transform works. Inputs outside the training
//! range are not clamped, so outputs may fall outside [0, 1].

use crate::error::ValidationError;
use crate::models::RawInput;
use crate::pipeline::FeatureSchema;
use serde::{Deserialize, Serialize};

/// Pre-fitted affine parameters, one `(scale, offset)` pair per numeric
/// column in schema order: `out = in * scale + offset`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerParams {
    pub scale: Vec<f32>,
    pub offset: Vec<f32>,
}

impl ScalerParams {
    /// Identity transform for the given column count.
    pub fn identity(columns: usize) -> Self {
        Self {
            scale: vec![1.0; columns],
            offset: vec![0.0; columns],
        }
    }
}

/// Applies the pre-fitted transform to the numeric block of a request.
#[derive(Debug, Clone)]
pub struct NumericNormalizer {
    params: ScalerParams,
}

impl NumericNormalizer {
    pub fn new(params: ScalerParams) -> Self {
        Self { params }
    }

    /// Project the input onto the schema's numeric columns, coerce each to
    /// a finite float, and apply the per-column transform.
    pub fn normalize(
        &self,
        input: &RawInput,
        schema: &FeatureSchema,
    ) -> Result<Vec<f32>, ValidationError> {
        let mut normalized = Vec::with_capacity(schema.numeric_columns().len());

        for (idx, column) in schema.numeric_columns().iter().enumerate() {
            let raw = input
                .get(column)
                .ok_or_else(|| ValidationError::SchemaMismatch(column.clone()))?;
            let value = raw.as_number().ok_or_else(|| ValidationError::TypeMismatch {
                field: column.clone(),
                value: raw.as_category().into_owned(),
            })? as f32;

            normalized.push(value * self.params.scale[idx] + self.params.offset[idx]);
        }

        Ok(normalized)
    }
}
