//! Text cleanup between extraction and translation.

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::model::{WordList, WORD_RECORD_STRIDE};

/// Punctuation dropped from words during extraction.
pub const IGNORED_PUNCTUATION: &str = "&:=()!;.,\\/\"\"''";

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"(?s)<[^<>]*>").expect("tag pattern is valid"))
}

/// Reduce extracted text to plain text.
///
/// Removes inline markup tags, decodes XML/HTML entities, normalizes to NFC
/// and collapses whitespace runs. The result is trimmed.
pub fn strip_markup(text: &str) -> String {
    let without_tags = tag_regex().replace_all(text, "");
    let decoded = html_escape::decode_html_entities(&without_tags);
    let normalized: String = decoded.nfc().collect();
    normalized.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Words of a flat record list: elements 0, 5, 10, ...
pub fn select_words(tokens: &[String]) -> Vec<&str> {
    tokens
        .iter()
        .step_by(WORD_RECORD_STRIDE)
        .map(String::as_str)
        .collect()
}

/// Every word followed by one space.
pub fn join_words(words: &[&str]) -> String {
    words.iter().fold(String::new(), |mut out, word| {
        out.push_str(word);
        out.push(' ');
        out
    })
}

/// Plain text of a paragraph: selected words, space-joined, markup stripped.
pub fn paragraph_text(words: &WordList) -> String {
    strip_markup(&join_words(&select_words(words.tokens())))
}

/// Remove every character of `ignored` from `word`.
pub fn strip_ignored(word: &str, ignored: &str) -> String {
    word.chars().filter(|c| !ignored.contains(*c)).collect()
}
