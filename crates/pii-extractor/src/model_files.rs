//! Locating the files of a GLiNER model
//!
//! A configured model directory that already holds the tokenizer and the ONNX
//! graph is used as is. Otherwise the files are fetched by model id.

use std::path::{Path, PathBuf};

use pii_core::ModelConfig;
use tracing::{info, warn};

use crate::model_config::CONFIG_FILE;

/// Tokenizer file name, both on disk and in a hub repository
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Locations tried, in order, for the ONNX graph when none is configured
pub const ONNX_CANDIDATES: [&str; 2] = ["model.onnx", "onnx/model.onnx"];

/// ONNX graph location inside a hub repository
pub const HUB_ONNX_FILE: &str = "onnx/model.onnx";

/// Paths of the files making up a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub tokenizer: PathBuf,
    pub onnx: PathBuf,
    /// `gliner_config.json`, when the model ships one
    pub gliner_config: Option<PathBuf>,
}

impl ModelFiles {
    /// Files already present in `model_dir`, or `None` if the tokenizer or graph is missing
    pub fn local(model_dir: &Path, onnx_file: Option<&Path>) -> Option<Self> {
        let tokenizer = model_dir.join(TOKENIZER_FILE);
        if !tokenizer.is_file() {
            return None;
        }

        let onnx = match onnx_file {
            Some(file) => Some(model_dir.join(file)).filter(|path| path.is_file()),
            None => ONNX_CANDIDATES
                .iter()
                .map(|candidate| model_dir.join(candidate))
                .find(|path| path.is_file()),
        }?;

        let gliner_config = Some(model_dir.join(CONFIG_FILE)).filter(|path| path.is_file());

        Some(Self {
            tokenizer,
            onnx,
            gliner_config,
        })
    }

    /// Use the local model directory when complete, else `fetch` each file by name
    pub fn resolve<F>(config: &ModelConfig, mut fetch: F) -> anyhow::Result<Self>
    where
        F: FnMut(&str) -> anyhow::Result<PathBuf>,
    {
        if let Some(files) = Self::local(&config.model_dir, config.onnx_file.as_deref()) {
            info!(model_dir = %config.model_dir.display(), "using local model files");
            return Ok(files);
        }

        info!(
            model_id = %config.model_id,
            model_dir = %config.model_dir.display(),
            "model files not found locally, fetching"
        );

        let onnx_file = config
            .onnx_file
            .as_ref()
            .map(|file| file.to_string_lossy().replace('\\', "/"))
            .unwrap_or_else(|| HUB_ONNX_FILE.to_string());

        let tokenizer = fetch(TOKENIZER_FILE)?;
        let onnx = fetch(&onnx_file)?;
        let gliner_config = match fetch(CONFIG_FILE) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "no {CONFIG_FILE} for model, using default parameters");
                None
            }
        };

        Ok(Self {
            tokenizer,
            onnx,
            gliner_config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, file: &str) -> PathBuf {
        let path = dir.join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, b"").unwrap();
        path
    }

    fn config_for(dir: &Path) -> ModelConfig {
        ModelConfig {
            model_dir: dir.to_path_buf(),
            ..ModelConfig::default()
        }
    }

    #[test]
    fn test_local_dir_with_nested_graph() {
        let tmp = TempDir::new().unwrap();
        let tokenizer = touch(tmp.path(), TOKENIZER_FILE);
        let onnx = touch(tmp.path(), "onnx/model.onnx");

        let files = ModelFiles::local(tmp.path(), None).unwrap();

        assert_eq!(files.tokenizer, tokenizer);
        assert_eq!(files.onnx, onnx);
        assert_eq!(files.gliner_config, None);
    }

    #[test]
    fn test_local_dir_prefers_top_level_graph() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), TOKENIZER_FILE);
        let top = touch(tmp.path(), "model.onnx");
        touch(tmp.path(), "onnx/model.onnx");
        let config = touch(tmp.path(), CONFIG_FILE);

        let files = ModelFiles::local(tmp.path(), None).unwrap();

        assert_eq!(files.onnx, top);
        assert_eq!(files.gliner_config, Some(config));
    }

    #[test]
    fn test_local_dir_incomplete() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "model.onnx");
        assert!(ModelFiles::local(tmp.path(), None).is_none());

        touch(tmp.path(), TOKENIZER_FILE);
        assert!(ModelFiles::local(tmp.path(), Some(Path::new("onnx/model_quantized.onnx"))).is_none());
    }

    #[test]
    fn test_resolve_local_never_fetches() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), TOKENIZER_FILE);
        let onnx = touch(tmp.path(), "onnx/model.onnx");

        let files = ModelFiles::resolve(&config_for(tmp.path()), |file| {
            panic!("unexpected fetch of {file}")
        })
        .unwrap();

        assert_eq!(files.onnx, onnx);
    }

    #[test]
    fn test_resolve_fetches_missing_model() {
        let tmp = TempDir::new().unwrap();
        let cache = PathBuf::from("/cache/knowledgator/gliner-pii-base-v1.0");
        let mut fetched = Vec::new();

        let files = ModelFiles::resolve(&config_for(&tmp.path().join("absent")), |file| {
            fetched.push(file.to_string());
            Ok(cache.join(file))
        })
        .unwrap();

        assert_eq!(fetched, vec![TOKENIZER_FILE, HUB_ONNX_FILE, CONFIG_FILE]);
        assert_eq!(files.tokenizer, cache.join(TOKENIZER_FILE));
        assert_eq!(files.onnx, cache.join(HUB_ONNX_FILE));
        assert_eq!(files.gliner_config, Some(cache.join(CONFIG_FILE)));
    }

    #[test]
    fn test_resolve_fetches_configured_graph() {
        let tmp = TempDir::new().unwrap();
        let config = ModelConfig {
            onnx_file: Some(PathBuf::from("onnx/model_quantized.onnx")),
            ..config_for(tmp.path())
        };
        let mut fetched = Vec::new();

        ModelFiles::resolve(&config, |file| {
            fetched.push(file.to_string());
            Ok(PathBuf::from(file))
        })
        .unwrap();

        assert_eq!(fetched[1], "onnx/model_quantized.onnx");
    }

    #[test]
    fn test_resolve_without_gliner_config() {
        let tmp = TempDir::new().unwrap();

        let files = ModelFiles::resolve(&config_for(tmp.path()), |file| {
            if file == CONFIG_FILE {
                anyhow::bail!("404 for {file}");
            }
            Ok(PathBuf::from(file))
        })
        .unwrap();

        assert_eq!(files.gliner_config, None);
    }

    #[test]
    fn test_resolve_propagates_fetch_failure() {
        let tmp = TempDir::new().unwrap();
        let result = ModelFiles::resolve(&config_for(tmp.path()), |_| anyhow::bail!("offline"));
        assert!(result.is_err());
    }
}
