//! ONNX regression inference using tract
//!
//! The trained regressor is an opaque collaborator: the pipeline hands it
//! the assembled feature vector and takes back a single scalar. Models are
//! loaded once at startup and never swapped, so the plan is shared without
//! locking.

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, warn};
use tract_onnx::prelude::*;

/// Maximum inference latency before warning (5ms target)
const MAX_INFERENCE_MS: u128 = 5;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// A pre-fitted regression model exposing a single forward pass.
pub trait Regressor: Send + Sync {
    /// Predict a scalar from the assembled feature vector.
    fn predict(&self, features: &[f32]) -> Result<f32>;

    /// Input width the model was trained for.
    fn input_width(&self) -> usize;

    /// Version string of the loaded model.
    fn version(&self) -> &str;
}

/// ONNX-backed regressor using tract for lightweight inference.
pub struct OnnxRegressor {
    model: TractModel,
    input_width: usize,
    version: String,
    inference_count: AtomicU64,
    slow_inference_count: AtomicU64,
}

impl OnnxRegressor {
    /// Parse and optimize an ONNX model from bytes, pinning the input
    /// shape to `[1, input_width]`.
    pub fn from_bytes(model_bytes: &[u8], input_width: usize, version: &str) -> Result<Self> {
        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .context("Failed to parse ONNX model")?
            .with_input_fact(0, f32::fact([1, input_width]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")?;

        Ok(Self {
            model,
            input_width,
            version: version.to_string(),
            inference_count: AtomicU64::new(0),
            slow_inference_count: AtomicU64::new(0),
        })
    }

    fn features_to_tensor(&self, features: &[f32]) -> Result<Tensor> {
        let array =
            tract_ndarray::Array2::from_shape_vec((1, self.input_width), features.to_vec())
                .context("Feature vector does not match model input shape")?;
        Ok(array.into())
    }

    /// Inference statistics since startup.
    pub fn stats(&self) -> InferenceStats {
        InferenceStats {
            total_inferences: self.inference_count.load(Ordering::Relaxed),
            slow_inferences: self.slow_inference_count.load(Ordering::Relaxed),
        }
    }
}

impl Regressor for OnnxRegressor {
    fn predict(&self, features: &[f32]) -> Result<f32> {
        let start = Instant::now();

        let input = self.features_to_tensor(features)?;
        let result = self.model.run(tvec!(input.into()))?;
        let output = result.first().context("No output from model")?;
        let value = *output
            .to_array_view::<f32>()?
            .iter()
            .next()
            .context("Model output was empty")?;

        let elapsed = start.elapsed();
        self.inference_count.fetch_add(1, Ordering::Relaxed);

        if elapsed.as_millis() > MAX_INFERENCE_MS {
            self.slow_inference_count.fetch_add(1, Ordering::Relaxed);
            warn!(
                elapsed_ms = elapsed.as_millis(),
                "Inference exceeded {}ms target", MAX_INFERENCE_MS
            );
        } else {
            debug!(elapsed_us = elapsed.as_micros(), "Inference completed");
        }

        Ok(value)
    }

    fn input_width(&self) -> usize {
        self.input_width
    }

    fn version(&self) -> &str {
        &self.version
    }
}

/// Inference statistics
#[derive(Debug, Clone)]
pub struct InferenceStats {
    pub total_inferences: u64,
    pub slow_inferences: u64,
}
