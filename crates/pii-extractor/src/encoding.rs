//! Prompt encoding for the span model
//!
//! The model input is a single sequence:
//! `[CLS] <<ENT>> label_1 <<ENT>> label_2 ... <<SEP>> word_1 word_2 ... [SEP]`
//! where every piece is sub-tokenized on its own. `words_mask` marks the first
//! sub-token of each text word with its 1-based word index so the model can
//! pool sub-tokens back into words.

use crate::model_config::GlinerConfig;

/// Ids of the sequence delimiters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialTokens {
    pub cls: u32,
    pub sep: u32,
}

/// Flat model inputs for a batch of one.
///
/// `span_idx` holds `num_spans` pairs of word indices, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedPrompt {
    pub input_ids: Vec<i64>,
    pub attention_mask: Vec<i64>,
    pub words_mask: Vec<i64>,
    pub text_length: usize,
    pub span_idx: Vec<i64>,
    pub span_mask: Vec<bool>,
}

impl EncodedPrompt {
    /// Number of sub-tokens in the sequence
    pub fn seq_len(&self) -> usize {
        self.input_ids.len()
    }

    /// Number of candidate spans (valid or masked)
    pub fn num_spans(&self) -> usize {
        self.span_mask.len()
    }
}

/// Label prompt pieces: an entity marker before every label, then the separator
pub fn prompt_pieces<'a>(labels: &'a [String], config: &'a GlinerConfig) -> Vec<&'a str> {
    let mut pieces = Vec::with_capacity(labels.len() * 2 + 1);
    for label in labels {
        pieces.push(config.ent_token.as_str());
        pieces.push(label.as_str());
    }
    pieces.push(config.sep_token.as_str());
    pieces
}

/// Encode prompt pieces and text words into model inputs.
///
/// `tokenize` maps one piece to its sub-token ids, without special tokens.
pub fn encode<F>(
    prompt: &[&str],
    words: &[&str],
    special: SpecialTokens,
    max_width: usize,
    mut tokenize: F,
) -> anyhow::Result<EncodedPrompt>
where
    F: FnMut(&str) -> anyhow::Result<Vec<u32>>,
{
    let mut input_ids = vec![i64::from(special.cls)];
    let mut words_mask = vec![0i64];

    for piece in prompt {
        let ids = tokenize(piece)?;
        words_mask.extend(std::iter::repeat(0).take(ids.len()));
        input_ids.extend(ids.into_iter().map(i64::from));
    }

    for (i, word) in words.iter().enumerate() {
        let ids = tokenize(word)?;
        anyhow::ensure!(!ids.is_empty(), "word {i} produced no sub-tokens");

        words_mask.push(i as i64 + 1);
        words_mask.extend(std::iter::repeat(0).take(ids.len() - 1));
        input_ids.extend(ids.into_iter().map(i64::from));
    }

    input_ids.push(i64::from(special.sep));
    words_mask.push(0);

    let attention_mask = vec![1i64; input_ids.len()];
    let (span_idx, span_mask) = span_grid(words.len(), max_width);

    Ok(EncodedPrompt {
        input_ids,
        attention_mask,
        words_mask,
        text_length: words.len(),
        span_idx,
        span_mask,
    })
}

/// Every `(start, start + width)` pair for `width < max_width`.
///
/// Spans running past the last word are masked out and zeroed.
pub fn span_grid(num_words: usize, max_width: usize) -> (Vec<i64>, Vec<bool>) {
    let num_spans = num_words * max_width;
    let mut span_idx = Vec::with_capacity(num_spans * 2);
    let mut span_mask = Vec::with_capacity(num_spans);

    for start in 0..num_words {
        for width in 0..max_width {
            let end = start + width;
            let valid = end < num_words;
            if valid {
                span_idx.push(start as i64);
                span_idx.push(end as i64);
            } else {
                span_idx.extend([0, 0]);
            }
            span_mask.push(valid);
        }
    }

    (span_idx, span_mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPECIAL: SpecialTokens = SpecialTokens { cls: 1, sep: 2 };

    /// Markers map to single ids; other pieces get one id per 4 bytes.
    fn fake_tokenize(piece: &str) -> anyhow::Result<Vec<u32>> {
        Ok(match piece {
            "<<ENT>>" => vec![500],
            "<<SEP>>" => vec![501],
            _ => (0..piece.len().div_ceil(4))
                .map(|i| 1000 + piece.len() as u32 * 10 + i as u32)
                .collect(),
        })
    }

    #[test]
    fn test_prompt_pieces() {
        let labels = vec!["person".to_string(), "email".to_string()];
        let config = GlinerConfig::default();
        let pieces = prompt_pieces(&labels, &config);
        assert_eq!(pieces, vec!["<<ENT>>", "person", "<<ENT>>", "email", "<<SEP>>"]);
    }

    #[test]
    fn test_prompt_pieces_without_labels() {
        let config = GlinerConfig::default();
        assert_eq!(prompt_pieces(&[], &config), vec!["<<SEP>>"]);
    }

    #[test]
    fn test_encode_layout() {
        let labels = vec!["person".to_string()];
        let config = GlinerConfig::default();
        let prompt = prompt_pieces(&labels, &config);
        let words = ["Hi", "Johnathan"];

        let encoded = encode(&prompt, &words, SPECIAL, 3, fake_tokenize).unwrap();

        // [CLS] <<ENT>> person(2) <<SEP>> Hi(1) Johnathan(3) [SEP]
        assert_eq!(encoded.seq_len(), 10);
        assert_eq!(encoded.input_ids[0], 1);
        assert_eq!(encoded.input_ids[1], 500);
        assert_eq!(encoded.input_ids[4], 501);
        assert_eq!(*encoded.input_ids.last().unwrap(), 2);
        assert_eq!(encoded.words_mask, vec![0, 0, 0, 0, 0, 1, 2, 0, 0, 0]);
        assert!(encoded.attention_mask.iter().all(|&m| m == 1));
        assert_eq!(encoded.text_length, 2);
    }

    #[test]
    fn test_encode_rejects_empty_word() {
        let result = encode(&["<<SEP>>"], &["x"], SPECIAL, 2, |piece| {
            if piece == "x" {
                Ok(vec![])
            } else {
                fake_tokenize(piece)
            }
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_span_grid() {
        let (span_idx, span_mask) = span_grid(3, 2);

        assert_eq!(span_mask, vec![true, true, true, true, true, false]);
        assert_eq!(span_idx, vec![0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 0, 0]);
    }

    #[test]
    fn test_span_grid_empty() {
        let (span_idx, span_mask) = span_grid(0, 12);
        assert!(span_idx.is_empty());
        assert!(span_mask.is_empty());
    }
}
