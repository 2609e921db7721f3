//! Feature schema captured at training time
//!
//! The schema fixes the set of accepted input fields, the order of the
//! numeric and categorical columns, and the closed vocabulary of every
//! categorical column. Column order must never change after training:
//! reordering silently corrupts predictions without raising an error.

use crate::error::{ArtifactError, ValidationError};
use crate::models::RawInput;
use std::collections::{HashMap, HashSet};

/// Immutable feature schema shared by every estimation request.
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
    vocabulary: HashMap<String, Vec<String>>,
}

impl FeatureSchema {
    /// Build a schema from the loaded artifact parts, enforcing the
    /// cross-artifact invariants once so requests never have to.
    pub fn new(
        numeric_columns: Vec<String>,
        categorical_columns: Vec<String>,
        vocabulary: HashMap<String, Vec<String>>,
    ) -> Result<Self, ArtifactError> {
        let corrupt = |reason: String| ArtifactError::Corrupt {
            name: "schema",
            reason,
        };

        let mut seen = HashSet::new();
        for column in numeric_columns.iter().chain(categorical_columns.iter()) {
            if !seen.insert(column.as_str()) {
                return Err(corrupt(format!("duplicate column {column:?}")));
            }
        }

        for column in &categorical_columns {
            match vocabulary.get(column) {
                None => {
                    return Err(corrupt(format!(
                        "categorical column {column:?} has no vocabulary"
                    )))
                }
                Some(values) if values.is_empty() => {
                    return Err(corrupt(format!(
                        "categorical column {column:?} has an empty vocabulary"
                    )))
                }
                Some(values) => {
                    let mut unique = HashSet::new();
                    for value in values {
                        if !unique.insert(value.as_str()) {
                            return Err(corrupt(format!(
                                "vocabulary for {column:?} repeats value {value:?}"
                            )));
                        }
                    }
                }
            }
        }

        for column in vocabulary.keys() {
            if !categorical_columns.contains(column) {
                return Err(corrupt(format!(
                    "vocabulary entry for undeclared column {column:?}"
                )));
            }
        }

        Ok(Self {
            numeric_columns,
            categorical_columns,
            vocabulary,
        })
    }

    /// Numeric columns in training order.
    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    /// Categorical columns in training order.
    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical_columns
    }

    /// Ordered vocabulary of a categorical column.
    pub fn vocabulary(&self, column: &str) -> Option<&[String]> {
        self.vocabulary.get(column).map(Vec::as_slice)
    }

    /// Total width of the assembled feature vector: one slot per numeric
    /// column plus one indicator slot per vocabulary entry.
    pub fn feature_width(&self) -> usize {
        let encoded: usize = self
            .categorical_columns
            .iter()
            .filter_map(|c| self.vocabulary.get(c))
            .map(Vec::len)
            .sum();
        self.numeric_columns.len() + encoded
    }

    /// Check that every declared column is present in the input.
    ///
    /// Extra fields are ignored; a missing field is a hard error so an
    /// incomplete request can never produce a default-substituted prediction.
    pub fn validate(&self, input: &RawInput) -> Result<(), ValidationError> {
        for column in self.numeric_columns.iter().chain(&self.categorical_columns) {
            if !input.contains_key(column) {
                return Err(ValidationError::SchemaMismatch(column.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawValue;

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

    #[test]
    fn test_feature_width() {
        // 4 numeric + (3 + 2 + 2) indicator slots
        assert_eq!(car_schema().feature_width(), 11);
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let result = FeatureSchema::new(
            vec!["Year".to_string(), "Year".to_string()],
            vec![],
            HashMap::new(),
        );
        assert!(matches!(result, Err(ArtifactError::Corrupt { .. })));
    }

    #[test]
    fn test_column_shared_across_lists_rejected() {
        let result = FeatureSchema::new(
            vec!["Owner".to_string()],
            vec!["Owner".to_string()],
            HashMap::from([("Owner".to_string(), vec!["0".to_string()])]),
        );
        assert!(matches!(result, Err(ArtifactError::Corrupt { .. })));
    }

    #[test]
    fn test_missing_vocabulary_rejected() {
        let result = FeatureSchema::new(vec![], vec!["Fuel_Type".to_string()], HashMap::new());
        assert!(matches!(result, Err(ArtifactError::Corrupt { .. })));
    }

    #[test]
    fn test_empty_vocabulary_rejected() {
        let result = FeatureSchema::new(
            vec![],
            vec!["Fuel_Type".to_string()],
            HashMap::from([("Fuel_Type".to_string(), vec![])]),
        );
        assert!(matches!(result, Err(ArtifactError::Corrupt { .. })));
    }

    #[test]
    fn test_duplicate_vocabulary_value_rejected() {
        let result = FeatureSchema::new(
            vec![],
            vec!["Fuel_Type".to_string()],
            HashMap::from([(
                "Fuel_Type".to_string(),
                vec!["Petrol".to_string(), "Petrol".to_string()],
            )]),
        );
        assert!(matches!(result, Err(ArtifactError::Corrupt { .. })));
    }

    #[test]
    fn test_stray_vocabulary_rejected() {
        let result = FeatureSchema::new(
            vec!["Year".to_string()],
            vec![],
            HashMap::from([("Fuel_Type".to_string(), vec!["Petrol".to_string()])]),
        );
        assert!(matches!(result, Err(ArtifactError::Corrupt { .. })));
    }

    #[test]
    fn test_validate_accepts_complete_input() {
        let schema = car_schema();
        let input = RawInput::from([
            ("Year".to_string(), RawValue::from(2018.0)),
            ("Present_Price".to_string(), RawValue::from(5.0)),
            ("Kms_Driven".to_string(), RawValue::from(20000.0)),
            ("Owner".to_string(), RawValue::from(0.0)),
            ("Fuel_Type".to_string(), RawValue::from("Diesel")),
            ("Seller_Type".to_string(), RawValue::from("Dealer")),
            ("Transmission".to_string(), RawValue::from("Manual")),
        ]);
        assert!(schema.validate(&input).is_ok());
    }

    #[test]
    fn test_validate_ignores_extra_fields() {
        let schema = car_schema();
        let mut input = RawInput::from([
            ("Year".to_string(), RawValue::from(2018.0)),
            ("Present_Price".to_string(), RawValue::from(5.0)),
            ("Kms_Driven".to_string(), RawValue::from(20000.0)),
            ("Owner".to_string(), RawValue::from(0.0)),
            ("Fuel_Type".to_string(), RawValue::from("Diesel")),
            ("Seller_Type".to_string(), RawValue::from("Dealer")),
            ("Transmission".to_string(), RawValue::from("Manual")),
        ]);
        input.insert("Color".to_string(), RawValue::from("Red"));
        assert!(schema.validate(&input).is_ok());
    }

    #[test]
    fn test_validate_rejects_any_missing_field() {
        let schema = car_schema();
        let complete = RawInput::from([
            ("Year".to_string(), RawValue::from(2018.0)),
            ("Present_Price".to_string(), RawValue::from(5.0)),
            ("Kms_Driven".to_string(), RawValue::from(20000.0)),
            ("Owner".to_string(), RawValue::from(0.0)),
            ("Fuel_Type".to_string(), RawValue::from("Diesel")),
            ("Seller_Type".to_string(), RawValue::from("Dealer")),
            ("Transmission".to_string(), RawValue::from("Manual")),
        ]);

        for missing in complete.keys() {
            let mut input = complete.clone();
            input.remove(missing);
            match schema.validate(&input) {
                Err(ValidationError::SchemaMismatch(field)) => assert_eq!(&field, missing),
                other => panic!("expected SchemaMismatch for {missing}, got {other:?}"),
            }
        }
    }
}
