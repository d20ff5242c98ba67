//! PII Extractor - span-based entity extraction
//!
//! Implements the GLiNER span pipeline (word splitting, prompt encoding and
//! greedy span decoding) with an ONNX Runtime backend behind the `onnx`
//! feature.

pub mod decode;
pub mod encoding;
pub mod model_config;
pub mod model_files;
pub mod pipeline;
pub mod splitter;

#[cfg(feature = "onnx")]
mod onnx;
#[cfg(feature = "onnx")]
pub use onnx::{GlinerModel, OnnxBackend};

pub use model_config::GlinerConfig;
pub use model_files::ModelFiles;
pub use pipeline::{GlinerPipeline, SpanBackend};

use std::sync::Arc;

use pii_core::{EntityRecognizer, ModelConfig, PiiError};

/// Load the configured model as a shareable recognizer
#[cfg(feature = "onnx")]
pub fn load_recognizer(config: &ModelConfig) -> pii_core::Result<Arc<dyn EntityRecognizer>> {
    let model = GlinerModel::load(config).map_err(|e| PiiError::ModelLoad(format!("{e:#}")))?;
    Ok(Arc::new(model))
}

/// Load the configured model as a shareable recognizer
#[cfg(not(feature = "onnx"))]
pub fn load_recognizer(config: &ModelConfig) -> pii_core::Result<Arc<dyn EntityRecognizer>> {
    Err(PiiError::ModelLoad(format!(
        "cannot load {}: built without the `onnx` feature",
        config.model_id
    )))
}
