//! [`DocumentBackend`] implementation on top of lopdf.

use std::path::Path;

use lopdf::Document as LopdfDocument;

use crate::detect::read_header;
use crate::error::{Error, Result};
use crate::model::{ParagraphArea, Rect, WordList};
use crate::text::strip_ignored;

use super::content::{estimate_advance, PositionedSpan, SpanCollector};
use super::editor::LopdfEditor;
use super::layout::{estimate_paragraphs, group_into_lines};
use super::{Closeable, DocumentBackend, PageDecoder};

/// Backend that decodes and edits documents with lopdf.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfBackend;

impl LopdfBackend {
    pub fn new() -> Self {
        Self
    }
}

/// Load a document, reporting every failure as [`Error::DocumentOpen`].
pub(crate) fn load_document(path: &Path) -> Result<LopdfDocument> {
    let open_error = |reason: String| Error::DocumentOpen {
        path: path.display().to_string(),
        reason,
    };

    let header = read_header(path).map_err(|e| open_error(e.to_string()))?;
    let doc = LopdfDocument::load(path).map_err(|e| open_error(e.to_string()))?;

    if doc.is_encrypted() {
        log::warn!("{} is encrypted; text may not decode", path.display());
    }
    log::debug!("Loaded {} ({}, {} pages)", path.display(), header, doc.get_pages().len());
    Ok(doc)
}

impl DocumentBackend for LopdfBackend {
    type Decoder = LopdfDecoder;
    type Editor = LopdfEditor;

    fn open(&self, path: &Path) -> Result<LopdfDecoder> {
        Ok(LopdfDecoder {
            doc: Some(load_document(path)?),
            decoded: None,
        })
    }

    fn load_for_edit(&self, path: &Path) -> Result<LopdfEditor> {
        Ok(LopdfEditor::new(load_document(path)?))
    }
}

/// Read-side document model.
pub struct LopdfDecoder {
    doc: Option<LopdfDocument>,
    decoded: Option<DecodedPage>,
}

struct DecodedPage {
    number: u32,
    spans: Vec<PositionedSpan>,
}

impl LopdfDecoder {
    /// Number of pages, or 0 once closed.
    pub fn page_count(&self) -> u32 {
        self.doc.as_ref().map_or(0, |d| d.get_pages().len() as u32)
    }

    /// Spans of the decoded page.
    pub fn spans(&self, page: u32) -> Result<&[PositionedSpan]> {
        match &self.decoded {
            Some(decoded) if decoded.number == page => Ok(&decoded.spans),
            _ => Err(Error::PageDecode {
                page,
                reason: "page has not been decoded".to_string(),
            }),
        }
    }
}

impl Closeable for LopdfDecoder {
    fn close(&mut self) {
        if self.doc.take().is_some() {
            log::debug!("Closed decode model");
        }
        self.decoded = None;
    }
}

impl PageDecoder for LopdfDecoder {
    fn decode_page(&mut self, page: u32) -> Result<()> {
        let doc = self.doc.as_ref().ok_or_else(|| Error::PageDecode {
            page,
            reason: "document is closed".to_string(),
        })?;
        let spans = SpanCollector::new(doc).collect_page(page)?;
        self.decoded = Some(DecodedPage {
            number: page,
            spans,
        });
        Ok(())
    }

    fn paragraph_areas(&self, page: u32, merge_sensitivity: u32) -> Result<Vec<ParagraphArea>> {
        Ok(estimate_paragraphs(self.spans(page)?, merge_sensitivity))
    }

    fn extract_words(
        &self,
        rect: Rect,
        page: u32,
        estimate_spaces: bool,
        ignored: &str,
    ) -> Result<Option<WordList>> {
        let inside: Vec<PositionedSpan> = self
            .spans(page)?
            .iter()
            .filter(|span| {
                let (cx, cy) = span.center();
                rect.contains(cx, cy)
            })
            .cloned()
            .collect();

        let mut words = WordList::default();
        for line in group_into_lines(&inside) {
            for span in &line.spans {
                push_span_words(&mut words, span, estimate_spaces, ignored);
            }
        }

        Ok(if words.is_empty() { None } else { Some(words) })
    }
}

/// Append the word records of one span.
fn push_span_words(words: &mut WordList, span: &PositionedSpan, split: bool, ignored: &str) {
    let bottom = span.bottom();
    let top = span.top();

    if !split {
        let word = strip_ignored(span.text.trim(), ignored);
        if !word.is_empty() {
            words.push_word(word, span.x, bottom, span.right(), top);
        }
        return;
    }

    let text = span.text.as_str();
    let estimated = estimate_advance(text, span.font_size);
    let scale = if estimated > 0.0 { span.width / estimated } else { 0.0 };
    let offset = |byte: usize| span.x + estimate_advance(&text[..byte], span.font_size) * scale;

    let mut start: Option<usize> = None;
    let ends = text
        .char_indices()
        .chain(std::iter::once((text.len(), ' ')));
    for (i, c) in ends {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                let word = strip_ignored(&text[s..i], ignored);
                if !word.is_empty() {
                    words.push_word(word, offset(s), bottom, offset(i), top);
                }
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::IGNORED_PUNCTUATION;

    fn decoder_with(spans: Vec<PositionedSpan>) -> LopdfDecoder {
        LopdfDecoder {
            doc: None,
            decoded: Some(DecodedPage { number: 1, spans }),
        }
    }

    #[test]
    fn test_push_span_words_splits_on_whitespace() {
        let span = PositionedSpan::new("Hello, world", 100.0, 700.0, 72.0, 12.0);
        let mut words = WordList::default();
        push_span_words(&mut words, &span, true, IGNORED_PUNCTUATION);
        assert_eq!(words.words().collect::<Vec<_>>(), vec!["Hello", "world"]);
        assert_eq!(words.tokens()[1], "100.00");
        // "Hello, " is 7 chars of 6pt
        assert_eq!(words.tokens()[6], "142.00");
    }

    #[test]
    fn test_push_span_words_unsplit() {
        let span = PositionedSpan::new("你好 世界", 0.0, 0.0, 54.0, 12.0);
        let mut words = WordList::default();
        push_span_words(&mut words, &span, false, IGNORED_PUNCTUATION);
        assert_eq!(words.words().collect::<Vec<_>>(), vec!["你好 世界"]);
    }

    #[test]
    fn test_extract_words_filters_by_rect() {
        let decoder = decoder_with(vec![
            PositionedSpan::new("inside", 100.0, 700.0, 36.0, 12.0),
            PositionedSpan::new("outside", 100.0, 400.0, 42.0, 12.0),
        ]);
        let words = decoder
            .extract_words(Rect::new(90, 690, 200, 720), 1, true, IGNORED_PUNCTUATION)
            .unwrap()
            .unwrap();
        assert_eq!(words.words().collect::<Vec<_>>(), vec!["inside"]);
    }

    #[test]
    fn test_extract_words_nothing_found() {
        let decoder = decoder_with(vec![PositionedSpan::new("far", 500.0, 100.0, 18.0, 12.0)]);
        let result = decoder
            .extract_words(Rect::new(0, 600, 100, 800), 1, true, IGNORED_PUNCTUATION)
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_extract_words_only_punctuation_is_nothing() {
        let decoder = decoder_with(vec![PositionedSpan::new("(...)", 10.0, 10.0, 30.0, 12.0)]);
        let result = decoder
            .extract_words(Rect::new(0, 0, 100, 100), 1, true, IGNORED_PUNCTUATION)
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_undecoded_page_is_an_error() {
        let decoder = decoder_with(Vec::new());
        let result = decoder.paragraph_areas(2, 5);
        assert!(matches!(result, Err(Error::PageDecode { page: 2, .. })));
    }

    #[test]
    fn test_close_releases_document() {
        let mut decoder = decoder_with(Vec::new());
        decoder.close();
        assert_eq!(decoder.page_count(), 0);
        assert!(decoder.spans(1).is_err());
    }

    #[test]
    fn test_open_missing_file() {
        let result = LopdfBackend::new().open(Path::new("no/such/file.pdf"));
        assert!(matches!(result, Err(Error::DocumentOpen { .. })));
    }
}
