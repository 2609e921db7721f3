//! Trained artifact loading
//!
//! The training job produces five artifacts: the ONNX regression model, the
//! numeric scaler parameters, the categorical vocabulary, and the two
//! ordered column lists. They are read once at startup from a single
//! directory and validated as a set; any failure here is fatal to the
//! process. An optional manifest carries the model version and SHA256
//! checksums for tamper detection.

use crate::error::ArtifactError;
use crate::pipeline::{FeatureSchema, ScalerParams};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub const MODEL_ARTIFACT: &str = "model.onnx";
pub const SCALER_ARTIFACT: &str = "scaler.json";
pub const NUMERIC_COLUMNS_ARTIFACT: &str = "numeric_columns.json";
pub const CATEGORICAL_COLUMNS_ARTIFACT: &str = "categorical_columns.json";
pub const VOCABULARY_ARTIFACT: &str = "vocabulary.json";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Version reported when the artifact set ships without a manifest
const UNVERSIONED: &str = "unversioned";

/// Optional companion file with the model version and per-artifact checksums.
#[derive(Debug, Clone, Default, Deserialize)]
struct ArtifactManifest {
    #[serde(default)]
    model_version: Option<String>,
    #[serde(default)]
    checksums: HashMap<String, String>,
}

/// The five trained artifacts, deserialized and cross-validated.
pub struct ArtifactSet {
    pub schema: FeatureSchema,
    pub scaler: ScalerParams,
    pub model_bytes: Vec<u8>,
    pub model_version: String,
}

/// Read and validate the full artifact set from a directory.
pub fn load(dir: &Path) -> Result<ArtifactSet, ArtifactError> {
    let manifest = load_manifest(dir)?;

    let numeric_columns: Vec<String> =
        read_json(dir, NUMERIC_COLUMNS_ARTIFACT, manifest.as_ref())?;
    let categorical_columns: Vec<String> =
        read_json(dir, CATEGORICAL_COLUMNS_ARTIFACT, manifest.as_ref())?;
    let vocabulary: HashMap<String, Vec<String>> =
        read_json(dir, VOCABULARY_ARTIFACT, manifest.as_ref())?;
    let scaler: ScalerParams = read_json(dir, SCALER_ARTIFACT, manifest.as_ref())?;
    let model_bytes = read_artifact(dir, MODEL_ARTIFACT, manifest.as_ref())?;

    let schema = FeatureSchema::new(numeric_columns, categorical_columns, vocabulary)?;

    let model_version = manifest
        .and_then(|m| m.model_version)
        .unwrap_or_else(|| UNVERSIONED.to_string());

    info!(
        model_version = %model_version,
        numeric_columns = schema.numeric_columns().len(),
        categorical_columns = schema.categorical_columns().len(),
        feature_width = schema.feature_width(),
        "Artifacts loaded"
    );

    Ok(ArtifactSet {
        schema,
        scaler,
        model_bytes,
        model_version,
    })
}

/// Read the manifest if present. A missing manifest is fine; an unreadable
/// or undecodable one is not.
fn load_manifest(dir: &Path) -> Result<Option<ArtifactManifest>, ArtifactError> {
    let path = dir.join(MANIFEST_FILE);
    let content = match fs::read(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ArtifactError::Missing {
                name: MANIFEST_FILE,
                path,
                source: e,
            })
        }
    };

    let manifest = serde_json::from_slice(&content).map_err(|e| ArtifactError::Corrupt {
        name: MANIFEST_FILE,
        reason: e.to_string(),
    })?;

    Ok(Some(manifest))
}

/// Read raw artifact bytes, verifying the manifest checksum when one is
/// listed for the file.
fn read_artifact(
    dir: &Path,
    name: &'static str,
    manifest: Option<&ArtifactManifest>,
) -> Result<Vec<u8>, ArtifactError> {
    let path = dir.join(name);
    let bytes = fs::read(&path).map_err(|e| ArtifactError::Missing {
        name,
        path: path.clone(),
        source: e,
    })?;

    if let Some(expected) = manifest.and_then(|m| m.checksums.get(name)) {
        let computed = compute_checksum(&bytes);
        if !computed.eq_ignore_ascii_case(expected) {
            return Err(ArtifactError::ChecksumMismatch {
                name: name.to_string(),
                expected: expected.clone(),
                computed,
            });
        }
    }

    debug!(artifact = name, bytes = bytes.len(), "Artifact read");
    Ok(bytes)
}

fn read_json<T: DeserializeOwned>(
    dir: &Path,
    name: &'static str,
    manifest: Option<&ArtifactManifest>,
) -> Result<T, ArtifactError> {
    let bytes = read_artifact(dir, name, manifest)?;
    serde_json::from_slice(&bytes).map_err(|e| ArtifactError::Corrupt {
        name,
        reason: e.to_string(),
    })
}

/// Compute SHA256 checksum of data
fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
