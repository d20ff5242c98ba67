//! ONNX Runtime backend for GLiNER span models.
//!
//! Model files come from the configured directory when it is complete, and
//! are otherwise downloaded from the Hugging Face hub by model id into the
//! local hub cache.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use hf_hub::api::sync::ApiBuilder;
use ort::session::Session;
use ort::value::Tensor;
use pii_core::ModelConfig;
use tokenizers::Tokenizer;
use tracing::info;

use crate::decode::SpanLogits;
use crate::encoding::{EncodedPrompt, SpecialTokens};
use crate::model_config::GlinerConfig;
use crate::model_files::ModelFiles;
use crate::pipeline::{GlinerPipeline, SpanBackend};

/// GLiNER model running on ONNX Runtime
pub type GlinerModel = GlinerPipeline<OnnxBackend>;

/// Tokenizer and inference session of a loaded model.
///
/// Running the session needs exclusive access, so concurrent predictions
/// take turns on the lock.
pub struct OnnxBackend {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    special: SpecialTokens,
}

impl OnnxBackend {
    /// Load the tokenizer and ONNX graph
    pub fn load(files: &ModelFiles, intra_threads: Option<usize>) -> anyhow::Result<Self> {
        let model_path = &files.onnx;

        let mut builder = Session::builder()?;
        if let Some(threads) = intra_threads {
            builder = builder.with_intra_threads(threads)?;
        }
        let session = builder
            .commit_from_file(model_path)
            .with_context(|| format!("load ONNX model {}", model_path.display()))?;

        let tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;
        let special = SpecialTokens {
            cls: token_id(&tokenizer, &["[CLS]", "<s>"])?,
            sep: token_id(&tokenizer, &["[SEP]", "</s>"])?,
        };

        info!(model = %model_path.display(), ?special, "loaded span model");
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            special,
        })
    }
}

impl SpanBackend for OnnxBackend {
    fn special_tokens(&self) -> SpecialTokens {
        self.special
    }

    fn tokenize(&self, piece: &str) -> anyhow::Result<Vec<u32>> {
        let encoding = self
            .tokenizer
            .encode(piece, false)
            .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn score(
        &self,
        input: EncodedPrompt,
        num_labels: usize,
        max_width: usize,
    ) -> anyhow::Result<SpanLogits> {
        let seq_len = input.seq_len() as i64;
        let num_spans = input.num_spans() as i64;
        let text_length = input.text_length;

        let ids_tensor = Tensor::from_array(([1, seq_len], input.input_ids.into_boxed_slice()))?;
        let mask_tensor =
            Tensor::from_array(([1, seq_len], input.attention_mask.into_boxed_slice()))?;
        let words_tensor = Tensor::from_array(([1, seq_len], input.words_mask.into_boxed_slice()))?;
        let lengths_tensor =
            Tensor::from_array(([1i64, 1], vec![text_length as i64].into_boxed_slice()))?;
        let span_idx_tensor =
            Tensor::from_array(([1, num_spans, 2], input.span_idx.into_boxed_slice()))?;
        let span_mask_tensor =
            Tensor::from_array(([1, num_spans], input.span_mask.into_boxed_slice()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("inference session lock poisoned"))?;

        let outputs = session.run(ort::inputs![
            "input_ids" => ids_tensor,
            "attention_mask" => mask_tensor,
            "words_mask" => words_tensor,
            "text_lengths" => lengths_tensor,
            "span_idx" => span_idx_tensor,
            "span_mask" => span_mask_tensor,
        ])?;

        // Logits: [1, num_words, max_width, num_labels].
        let (output_shape, output_data) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = output_shape;
        anyhow::ensure!(
            dims.len() == 4
                && dims[0] == 1
                && dims[2] as usize == max_width
                && dims[3] as usize == num_labels,
            "unexpected output shape: {dims:?}, expected [1, {text_length}, {max_width}, {num_labels}]"
        );

        SpanLogits::new(output_data.to_vec(), dims[1] as usize, max_width, num_labels)
    }
}

impl GlinerPipeline<OnnxBackend> {
    /// Load the model described by `config`
    pub fn load(config: &ModelConfig) -> anyhow::Result<Self> {
        let files = ModelFiles::resolve(config, |file| fetch_from_hub(config, file))?;
        let gliner_config = GlinerConfig::load(files.gliner_config.as_deref())?;
        let backend = OnnxBackend::load(&files, config.intra_threads)?;

        let model = GlinerPipeline::new(config.model_id.clone(), gliner_config, backend);
        info!(
            model_id = %config.model_id,
            max_width = model.config().max_width,
            max_len = model.config().max_len,
            "GLiNER model ready"
        );
        Ok(model)
    }
}

/// Download one file of `config.model_id`, reusing the hub cache when present
fn fetch_from_hub(config: &ModelConfig, file: &str) -> anyhow::Result<PathBuf> {
    let mut builder = ApiBuilder::new().with_progress(false);
    if let Some(dir) = &config.cache_dir {
        builder = builder.with_cache_dir(dir.clone());
    }
    let repo = builder.build()?.model(config.model_id.clone());

    info!(model_id = %config.model_id, file, "fetching model file");
    repo.get(file)
        .with_context(|| format!("fetch {file} of {}", config.model_id))
}

fn token_id(tokenizer: &Tokenizer, candidates: &[&str]) -> anyhow::Result<u32> {
    candidates
        .iter()
        .find_map(|token| tokenizer.token_to_id(token))
        .ok_or_else(|| anyhow::anyhow!("tokenizer has none of {candidates:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pii_core::EntityRecognizer;

    fn model_config() -> ModelConfig {
        ModelConfig {
            model_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("..")
                .join("..")
                .join("models")
                .join("gliner-pii-base-v1.0"),
            ..ModelConfig::default()
        }
    }

    #[test]
    fn test_unloadable_graph() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("tokenizer.json"), b"{}").unwrap();
        std::fs::write(tmp.path().join("model.onnx"), b"not a graph").unwrap();

        let config = ModelConfig {
            model_dir: tmp.path().to_path_buf(),
            ..ModelConfig::default()
        };
        assert!(GlinerModel::load(&config).is_err());
    }

    #[test]
    #[ignore = "needs the model locally or network access to the hub"]
    fn test_detects_pii() {
        let model = GlinerModel::load(&model_config()).unwrap();
        let labels = pii_core::default_labels();

        let entities = model
            .predict("My name is John Smith, email john@example.com", &labels, 0.3)
            .unwrap();

        assert!(entities.iter().any(|e| e.label == "person" && e.text.contains("John")));
        assert!(entities.iter().any(|e| e.label == "email" && e.text == "john@example.com"));
    }

    #[test]
    #[ignore = "needs the model locally or network access to the hub"]
    fn test_empty_labels() {
        let model = GlinerModel::load(&model_config()).unwrap();
        let entities = model.predict("My name is John Smith", &[], 0.3).unwrap();
        assert!(entities.is_empty());
    }
}
