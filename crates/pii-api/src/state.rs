//! Application state management
//!
//! Author: hephaex@gmail.com

use pii_core::config::AppConfig;
use pii_core::EntityRecognizer;
use std::sync::Arc;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Entity recognizer, loaded once at startup
    pub recognizer: Arc<dyn EntityRecognizer>,
}

impl AppState {
    /// Create new application state around a loaded recognizer
    pub fn new(config: AppConfig, recognizer: Arc<dyn EntityRecognizer>) -> Self {
        Self { config, recognizer }
    }

    /// Shared handle to the recognizer
    pub fn recognizer(&self) -> Arc<dyn EntityRecognizer> {
        Arc::clone(&self.recognizer)
    }
}
