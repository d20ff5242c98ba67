//! GLiNER span extraction pipeline
//!
//! split words → encode prompt → score spans → greedy flat decoding.
//! The scoring model and its sub-word tokenizer sit behind [`SpanBackend`].

use std::time::Instant;

use pii_core::{Entity, EntityRecognizer, PiiError};
use tracing::{debug, warn};

use crate::decode::{candidates, greedy_flat, to_entities, SpanLogits};
use crate::encoding::{encode, prompt_pieces, EncodedPrompt, SpecialTokens};
use crate::model_config::GlinerConfig;
use crate::splitter::WordSplitter;

/// Sub-word tokenizer plus span scorer of a loaded model
pub trait SpanBackend: Send + Sync {
    /// Sequence delimiter ids
    fn special_tokens(&self) -> SpecialTokens;

    /// Sub-token ids of one piece, without special tokens
    fn tokenize(&self, piece: &str) -> anyhow::Result<Vec<u32>>;

    /// Run the model, returning logits for `[text_length, max_width, num_labels]`
    fn score(
        &self,
        input: EncodedPrompt,
        num_labels: usize,
        max_width: usize,
    ) -> anyhow::Result<SpanLogits>;
}

/// Entity recognizer over a span-scoring backend
pub struct GlinerPipeline<B> {
    model_id: String,
    config: GlinerConfig,
    splitter: WordSplitter,
    backend: B,
}

impl<B: SpanBackend> GlinerPipeline<B> {
    pub fn new(model_id: impl Into<String>, config: GlinerConfig, backend: B) -> Self {
        Self {
            model_id: model_id.into(),
            config,
            splitter: WordSplitter::new(),
            backend,
        }
    }

    pub fn config(&self) -> &GlinerConfig {
        &self.config
    }

    fn extract(&self, text: &str, labels: &[String], threshold: f32) -> anyhow::Result<Vec<Entity>> {
        if labels.is_empty() {
            return Ok(Vec::new());
        }

        let mut words = self.splitter.split(text);
        if words.is_empty() {
            return Ok(Vec::new());
        }
        if words.len() > self.config.max_len {
            warn!(
                words = words.len(),
                max_len = self.config.max_len,
                "input longer than the model window, truncating"
            );
            words.truncate(self.config.max_len);
        }

        let prompt = prompt_pieces(labels, &self.config);
        let word_texts: Vec<&str> = words.iter().map(|w| w.text).collect();
        let encoded = encode(
            &prompt,
            &word_texts,
            self.backend.special_tokens(),
            self.config.max_width,
            |piece| self.backend.tokenize(piece),
        )?;

        let logits = self
            .backend
            .score(encoded, labels.len(), self.config.max_width)?;
        anyhow::ensure!(
            logits.num_labels == labels.len(),
            "model scored {} labels, expected {}",
            logits.num_labels,
            labels.len()
        );

        let spans = greedy_flat(candidates(&logits, words.len(), threshold));
        Ok(to_entities(&spans, &words, text, labels))
    }
}

impl<B: SpanBackend> EntityRecognizer for GlinerPipeline<B> {
    fn predict(
        &self,
        text: &str,
        labels: &[String],
        threshold: f32,
    ) -> pii_core::Result<Vec<Entity>> {
        let start = Instant::now();
        let entities = self
            .extract(text, labels, threshold)
            .map_err(|e| PiiError::Inference(format!("{e:#}")))?;

        debug!(
            model = %self.model_id,
            entities = entities.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "span extraction finished"
        );
        Ok(entities)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
