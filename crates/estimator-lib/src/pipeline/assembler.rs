//! Feature vector assembly
//!
//! Concatenates the normalized numeric block and the encoded categorical
//! blocks into the single fixed-length vector the model consumes. The
//! schema-vs-model width agreement is established once at context
//! construction; the check here is a final guard on the per-request path
//! and cannot fire when the artifacts are consistent.

use crate::error::ValidationError;

/// Concatenate the numeric block and the categorical blocks, numeric first.
pub fn assemble(
    numeric: Vec<f32>,
    categorical: Vec<f32>,
    expected_width: usize,
) -> Result<Vec<f32>, ValidationError> {
    let mut features = numeric;
    features.extend(categorical);

    if features.len() != expected_width {
        return Err(ValidationError::DimensionMismatch {
            expected: expected_width,
            actual: features.len(),
        });
    }

    Ok(features)
}
