//! Run summaries.

use serde::{Deserialize, Serialize};

use super::{Language, Rect};

/// What happened to one detected paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ParagraphOutcome {
    /// Translated and annotated.
    Translated { source: String, translated: String },
    /// Extraction found no words inside the rectangle.
    NoWords,
    /// Words were found but nothing was left after markup cleanup.
    EmptyText,
}

/// Per-paragraph entry of a [`RunReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphReport {
    /// Paragraph index in document order
    pub index: usize,
    /// Paragraph rectangle
    pub rect: Rect,
    /// Outcome
    #[serde(flatten)]
    pub outcome: ParagraphOutcome,
}

/// A detected paragraph and its cleaned-up text, before translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphPreview {
    pub index: usize,
    pub rect: Rect,
    /// `None` when nothing translatable was found
    pub text: Option<String>,
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Page that was processed (1-indexed)
    pub page: u32,
    /// Source language
    pub source: Language,
    /// Target language
    pub target: Language,
    /// Detected paragraphs in document order
    pub paragraphs: Vec<ParagraphReport>,
}

impl RunReport {
    pub fn new(page: u32, source: Language, target: Language) -> Self {
        Self {
            page,
            source,
            target,
            paragraphs: Vec::new(),
        }
    }

    /// Number of paragraphs that received an annotation.
    pub fn translated_count(&self) -> usize {
        self.paragraphs
            .iter()
            .filter(|p| matches!(p.outcome, ParagraphOutcome::Translated { .. }))
            .count()
    }

    /// Number of paragraphs skipped.
    pub fn skipped_count(&self) -> usize {
        self.paragraphs.len() - self.translated_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let mut report = RunReport::new(1, Language::ChineseSimplified, Language::English);
        report.paragraphs.push(ParagraphReport {
            index: 0,
            rect: Rect::new(0, 0, 10, 10),
            outcome: ParagraphOutcome::Translated {
                source: "你好".into(),
                translated: "Hello".into(),
            },
        });
        report.paragraphs.push(ParagraphReport {
            index: 1,
            rect: Rect::new(0, 20, 10, 30),
            outcome: ParagraphOutcome::NoWords,
        });
        assert_eq!(report.translated_count(), 1);
        assert_eq!(report.skipped_count(), 1);
    }

    #[test]
    fn test_json_shape() {
        let entry = ParagraphReport {
            index: 3,
            rect: Rect::new(1, 2, 3, 4),
            outcome: ParagraphOutcome::NoWords,
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["status"], "no_words");
        assert_eq!(value["rect"]["x2"], 3);
    }
}
