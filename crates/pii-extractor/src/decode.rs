//! Span decoding
//!
//! Turns per-span label logits into a flat (non-overlapping) list of entities.

use pii_core::Entity;

use crate::splitter::Word;

/// Span logits shaped `[num_words, max_width, num_labels]`, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct SpanLogits {
    pub data: Vec<f32>,
    pub num_words: usize,
    pub max_width: usize,
    pub num_labels: usize,
}

impl SpanLogits {
    pub fn new(
        data: Vec<f32>,
        num_words: usize,
        max_width: usize,
        num_labels: usize,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(
            data.len() == num_words * max_width * num_labels,
            "logits length {} does not match shape [{num_words}, {max_width}, {num_labels}]",
            data.len()
        );
        Ok(Self {
            data,
            num_words,
            max_width,
            num_labels,
        })
    }

    fn get(&self, start: usize, width: usize, label: usize) -> f32 {
        self.data[(start * self.max_width + width) * self.num_labels + label]
    }
}

/// A scored span over words `start..=end`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub label: usize,
    pub score: f32,
}

impl Span {
    /// Same word range, or any shared word
    fn overlaps(&self, other: &Span) -> bool {
        !(self.start > other.end || other.start > self.end)
    }
}

pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Spans scoring strictly above `threshold` that end inside the text
pub fn candidates(logits: &SpanLogits, text_length: usize, threshold: f32) -> Vec<Span> {
    let mut spans = Vec::new();

    for start in 0..logits.num_words {
        for width in 0..logits.max_width {
            let end = start + width;
            if end >= text_length {
                continue;
            }
            for label in 0..logits.num_labels {
                let score = sigmoid(logits.get(start, width, label));
                if score > threshold {
                    spans.push(Span {
                        start,
                        end,
                        label,
                        score,
                    });
                }
            }
        }
    }

    spans
}

/// Greedy flat decoding: highest score first, drop anything overlapping a kept span
pub fn greedy_flat(mut spans: Vec<Span>) -> Vec<Span> {
    spans.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut kept: Vec<Span> = Vec::new();
    for span in spans {
        if !kept.iter().any(|k| k.overlaps(&span)) {
            kept.push(span);
        }
    }

    kept.sort_by_key(|s| s.start);
    kept
}

/// Map word spans back onto the original text
pub fn to_entities(spans: &[Span], words: &[Word<'_>], text: &str, labels: &[String]) -> Vec<Entity> {
    spans
        .iter()
        .map(|span| {
            let first = &words[span.start];
            let last = &words[span.end];
            Entity {
                start: first.start,
                end: last.end,
                text: text[first.byte_start..last.byte_end].to_string(),
                label: labels[span.label].clone(),
                score: span.score,
            }
        })
        .collect()
}
