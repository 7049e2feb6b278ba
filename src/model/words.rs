//! Word lists returned by text extraction.

use serde::{Deserialize, Serialize};

/// Width of one record in a raw word list: `[word, x1, y1, x2, y2]`.
///
/// Only the first entry of each record is text. Every extractor must emit
/// this layout; selection code indexes the list with this stride and breaks
/// silently if a backend ever changes it.
pub const WORD_RECORD_STRIDE: usize = 5;

/// Raw extraction result: word records flattened into one token list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordList {
    tokens: Vec<String>,
}

impl WordList {
    /// Wrap a flat token list.
    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    /// Append one word record.
    pub fn push_word(&mut self, word: impl Into<String>, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.tokens.push(word.into());
        for coord in [x1, y1, x2, y2] {
            self.tokens.push(format!("{:.2}", coord));
        }
    }

    /// All raw tokens, metadata included.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The words: tokens at index 0, 5, 10, ...
    pub fn words(&self) -> impl Iterator<Item = &str> + '_ {
        self.tokens
            .iter()
            .step_by(WORD_RECORD_STRIDE)
            .map(String::as_str)
    }

    /// Number of words, `ceil(len / 5)`.
    pub fn word_count(&self) -> usize {
        self.tokens.len().div_ceil(WORD_RECORD_STRIDE)
    }

    /// Every word followed by a single space.
    pub fn joined(&self) -> String {
        let mut out = String::new();
        for word in self.words() {
            out.push_str(word);
            out.push(' ');
        }
        out
    }
}

impl From<Vec<String>> for WordList {
    fn from(tokens: Vec<String>) -> Self {
        Self::new(tokens)
    }
}

impl From<Vec<&str>> for WordList {
    fn from(tokens: Vec<&str>) -> Self {
        Self::new(tokens.into_iter().map(String::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stride_selection() {
        let list = WordList::from(vec![
            "你好", "POS", "POS", "POS", "POS", "世界", "POS", "POS", "POS", "POS",
        ]);
        assert_eq!(list.words().collect::<Vec<_>>(), vec!["你好", "世界"]);
        assert_eq!(list.joined(), "你好 世界 ");
    }

    #[test]
    fn test_word_count_is_ceiling() {
        for len in 0..23 {
            let list = WordList::new((0..len).map(|i| i.to_string()).collect());
            assert_eq!(list.word_count(), (len + 4) / 5);
            assert_eq!(list.words().count(), list.word_count());
        }
    }

    #[test]
    fn test_partial_trailing_record() {
        // A truncated last record still yields its word and nothing past the end.
        let list = WordList::from(vec!["a", "1", "2", "3", "4", "b", "1"]);
        assert_eq!(list.words().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_push_word_layout() {
        let mut list = WordList::default();
        list.push_word("hello", 1.0, 2.0, 3.5, 4.25);
        assert_eq!(list.tokens(), &["hello", "1.00", "2.00", "3.50", "4.25"]);
        assert_eq!(list.word_count(), 1);
    }

    #[test]
    fn test_empty() {
        let list = WordList::default();
        assert!(list.is_empty());
        assert_eq!(list.joined(), "");
    }
}
