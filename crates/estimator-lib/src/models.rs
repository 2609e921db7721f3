//! Core data models for the price estimator

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;

/// A single raw attribute value supplied by the caller.
///
/// Numeric fields accept either JSON numbers or numeric strings; categorical
/// fields match against the trained vocabulary by string form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Coerce to a float. Returns `None` for text that does not parse or
    /// for non-finite results.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            RawValue::Number(n) => *n,
            RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    /// Canonical string form used for vocabulary lookup. Whole numbers
    /// render without a fractional part so `2018` matches "2018".
    pub fn as_category(&self) -> Cow<'_, str> {
        match self {
            RawValue::Text(s) => Cow::Borrowed(s.as_str()),
            RawValue::Number(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                Cow::Owned(format!("{}", *n as i64))
            }
            RawValue::Number(n) => Cow::Owned(n.to_string()),
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

/// Raw attribute mapping for one estimation request.
///
/// Must contain every column the schema declares; extra entries are ignored.
pub type RawInput = HashMap<String, RawValue>;

/// Price estimate produced by the pipeline.
///
/// The value carries no currency unit; it is in whatever scale the model
/// was trained on. Unit labeling belongs to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceEstimate {
    pub value: f64,
    pub model_version: String,
    pub generated_at: i64,
}
