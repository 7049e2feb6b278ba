//! Run configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::{AnnotationStyle, Language};
use crate::pacing::DEFAULT_MIN_INTERVAL;
use crate::text::IGNORED_PUNCTUATION;

/// Default paragraph merge sensitivity.
pub const DEFAULT_MERGE_SENSITIVITY: u32 = 5;

/// Options for one translation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslateOptions {
    /// Page to process (1-indexed)
    pub page: u32,

    /// How eagerly nearby fragments merge into one paragraph
    pub merge_sensitivity: u32,

    /// Language of the document
    pub source: Language,

    /// Language of the annotations
    pub target: Language,

    /// Minimum spacing between translation calls
    pub min_interval: Duration,

    /// Characters dropped from extracted words
    pub ignored_punctuation: String,

    /// Whether the extractor splits spans into words
    pub estimate_spaces: bool,

    /// Look of the written annotations
    pub style: AnnotationStyle,
}

impl TranslateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page to process. Page 0 is treated as page 1.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn with_merge_sensitivity(mut self, sensitivity: u32) -> Self {
        self.merge_sensitivity = sensitivity;
        self
    }

    /// Set source and target language.
    pub fn with_languages(mut self, source: Language, target: Language) -> Self {
        self.source = source;
        self.target = target;
        self
    }

    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    pub fn with_ignored_punctuation(mut self, ignored: impl Into<String>) -> Self {
        self.ignored_punctuation = ignored.into();
        self
    }

    pub fn with_estimate_spaces(mut self, estimate: bool) -> Self {
        self.estimate_spaces = estimate;
        self
    }

    pub fn with_style(mut self, style: AnnotationStyle) -> Self {
        self.style = style;
        self
    }
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            page: 1,
            merge_sensitivity: DEFAULT_MERGE_SENSITIVITY,
            source: Language::ChineseSimplified,
            target: Language::English,
            min_interval: DEFAULT_MIN_INTERVAL,
            ignored_punctuation: IGNORED_PUNCTUATION.to_string(),
            estimate_spaces: true,
            style: AnnotationStyle::default(),
        }
    }
}
