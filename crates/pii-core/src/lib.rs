//! PII Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions shared by the PII service:
//! - Detected entity records
//! - The entity recognizer trait implemented by model backends
//! - Common error types
//! - Configuration management

pub mod config;

pub use config::{AppConfig, ConfigError, LoggingConfig, ModelConfig, ServerConfig};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for PII operations
#[derive(Error, Debug)]
pub enum PiiError {
    #[error("Model load failed: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PiiError>;

// ============================================================================
// Prediction defaults
// ============================================================================

/// Labels used when a request does not name any.
pub const DEFAULT_LABELS: [&str; 4] = ["person", "email", "phone number", "location"];

/// Confidence cutoff used when a request does not set one.
pub const DEFAULT_THRESHOLD: f32 = 0.3;

/// Fresh owned copy of [`DEFAULT_LABELS`].
pub fn default_labels() -> Vec<String> {
    DEFAULT_LABELS.iter().map(|l| l.to_string()).collect()
}

// ============================================================================
// Entities
// ============================================================================

/// A labelled span detected in the input text.
///
/// `start` and `end` are character offsets (end-exclusive), so `text` is the
/// substring of the input covering `start..end` characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub label: String,
    pub score: f32,
}

/// Trait for named-entity recognizers.
///
/// Implementations are loaded once and shared across requests, so `predict`
/// takes `&self` and must be callable from several threads.
pub trait EntityRecognizer: Send + Sync {
    /// Detect spans of `text` matching any of `labels` with a score above `threshold`.
    fn predict(&self, text: &str, labels: &[String], threshold: f32) -> Result<Vec<Entity>>;

    /// Identifier of the underlying model, for logging.
    fn model_id(&self) -> &str;
}
