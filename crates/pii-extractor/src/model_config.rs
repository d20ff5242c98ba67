//! GLiNER model parameters read from `gliner_config.json`

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// File name of the model parameters inside a model directory
pub const CONFIG_FILE: &str = "gliner_config.json";

/// Parameters the span model was trained with.
///
/// Only the fields needed for encoding and decoding are read; the rest of
/// the file is ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GlinerConfig {
    /// Longest span, in words, the model scores
    pub max_width: usize,
    /// Maximum number of words per input
    pub max_len: usize,
    /// Marker placed before each label in the prompt
    pub ent_token: String,
    /// Marker closing the label prompt
    pub sep_token: String,
    /// Span representation mode
    pub span_mode: String,
}

impl Default for GlinerConfig {
    fn default() -> Self {
        Self {
            max_width: 12,
            max_len: 384,
            ent_token: "<<ENT>>".to_string(),
            sep_token: "<<SEP>>".to_string(),
            span_mode: "markerV0".to_string(),
        }
    }
}

impl GlinerConfig {
    /// Read the parameters file if the model has one, else use defaults
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content =
            std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("parse {}", path.display()))
    }

    /// Parse and validate the JSON parameters
    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.max_width > 0, "max_width must be positive");
        anyhow::ensure!(self.max_len > 0, "max_len must be positive");
        anyhow::ensure!(
            self.span_mode != "token_level",
            "token-level models are not supported, expected a span model"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GlinerConfig::default();
        assert_eq!(config.max_width, 12);
        assert_eq!(config.max_len, 384);
        assert_eq!(config.ent_token, "<<ENT>>");
    }

    #[test]
    fn test_parse_ignores_unknown_fields() {
        let config = GlinerConfig::from_json(
            r#"{"model_name": "microsoft/mdeberta-v3-base", "max_width": 8, "hidden_size": 768}"#,
        )
        .unwrap();

        assert_eq!(config.max_width, 8);
        assert_eq!(config.max_len, 384);
        assert_eq!(config.sep_token, "<<SEP>>");
    }

    #[test]
    fn test_rejects_token_level() {
        let result = GlinerConfig::from_json(r#"{"span_mode": "token_level"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        assert_eq!(GlinerConfig::load(None).unwrap(), GlinerConfig::default());
    }

    #[test]
    fn test_unreadable_file_is_an_error() {
        assert!(GlinerConfig::load(Some(Path::new("/nonexistent/gliner_config.json"))).is_err());
    }
}
