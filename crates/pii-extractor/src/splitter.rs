//! Word splitting ahead of sub-word tokenization
//!
//! The model scores spans of whole words, so the input is first split into
//! words and each word remembers where it sits in the original text.

use regex::Regex;

/// Runs of word characters (optionally joined by `-` or `_`), or any single
/// non-space character.
const WORD_PATTERN: &str = r"\w+(?:[-_]\w+)*|\S";

/// A word of the input text.
///
/// `start`/`end` are character offsets, `byte_start`/`byte_end` index the
/// original `&str`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
    pub byte_start: usize,
    pub byte_end: usize,
}

/// Regex-based word splitter
pub struct WordSplitter {
    pattern: Regex,
}

impl WordSplitter {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(WORD_PATTERN).expect("word pattern is a valid regex"),
        }
    }

    /// Split `text` into words, in order of appearance
    pub fn split<'a>(&self, text: &'a str) -> Vec<Word<'a>> {
        let mut words = Vec::new();
        let mut char_pos = 0;
        let mut byte_pos = 0;

        for mat in self.pattern.find_iter(text) {
            char_pos += text[byte_pos..mat.start()].chars().count();
            let len = mat.as_str().chars().count();

            words.push(Word {
                text: mat.as_str(),
                start: char_pos,
                end: char_pos + len,
                byte_start: mat.start(),
                byte_end: mat.end(),
            });

            char_pos += len;
            byte_pos = mat.end();
        }

        words
    }
}

impl Default for WordSplitter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn texts(words: &[Word<'_>]) -> Vec<String> {
        words.iter().map(|w| w.text.to_string()).collect()
    }

    #[test]
    fn test_split_email_sentence() {
        let splitter = WordSplitter::new();
        let words = splitter.split("My name is John, email john@x.com");

        assert_eq!(
            texts(&words),
            vec!["My", "name", "is", "John", ",", "email", "john", "@", "x", ".", "com"]
        );
        assert_eq!((words[3].start, words[3].end), (11, 15));
    }

    #[test]
    fn test_split_joined_words() {
        let splitter = WordSplitter::new();
        let words = splitter.split("call 555-0100 or user_name");
        assert_eq!(texts(&words), vec!["call", "555-0100", "or", "user_name"]);
    }

    #[test]
    fn test_split_multibyte_offsets() {
        let splitter = WordSplitter::new();
        let text = "Zoë lives in Zürich";
        let words = splitter.split(text);

        assert_eq!(texts(&words), vec!["Zoë", "lives", "in", "Zürich"]);
        assert_eq!((words[3].start, words[3].end), (13, 19));
        assert_eq!(&text[words[3].byte_start..words[3].byte_end], "Zürich");
    }

    #[test]
    fn test_split_empty() {
        let splitter = WordSplitter::new();
        assert!(splitter.split("").is_empty());
        assert!(splitter.split("  \n\t ").is_empty());
    }

    proptest! {
        #[test]
        fn prop_offsets_match_text(text in "\\PC{0,64}") {
            let splitter = WordSplitter::new();
            let chars: Vec<char> = text.chars().collect();
            let words = splitter.split(&text);

            let mut last_end = 0;
            for word in &words {
                prop_assert!(word.start >= last_end);
                prop_assert!(word.start < word.end);
                let slice: String = chars[word.start..word.end].iter().collect();
                prop_assert_eq!(slice.as_str(), word.text);
                prop_assert_eq!(&text[word.byte_start..word.byte_end], word.text);
                last_end = word.end;
            }
        }
    }
}
