//! # pdfgloss
//!
//! Translate the paragraphs of a PDF page and write each translation back
//! into the document as a FreeText annotation over the source paragraph.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfgloss::translate_file;
//!
//! fn main() -> pdfgloss::Result<()> {
//!     let report = translate_file("paper.pdf", "paper_translated.pdf")?;
//!     println!("{} paragraphs translated", report.translated_count());
//!     Ok(())
//! }
//! ```
//!
//! ## How it works
//!
//! - The page is decoded and split into coarse paragraph areas
//! - Words inside each area are cleaned up into one line of plain text
//! - Each text goes to a [`Translator`], at most one call per 250 ms by default
//! - Translations become FreeText annotations in a copy of the document
//!
//! The PDF engine and the translation service sit behind traits
//! ([`DocumentBackend`], [`Translator`]) so either can be replaced.

pub mod backend;
pub mod detect;
pub mod error;
pub mod model;
pub mod options;
pub mod pacing;
pub mod pipeline;
pub mod text;
pub mod translate;

// Re-export commonly used types
pub use backend::{
    AnnotationEditor, CloseOnDrop, Closeable, DocumentBackend, LopdfBackend, PageDecoder,
};
pub use detect::{read_header, PdfHeader};
pub use error::{Error, Result};
pub use model::{
    AnnotationFlags, AnnotationStyle, BaseFont, FreeTextAnnotation, Language, ParagraphArea,
    ParagraphOutcome, ParagraphPreview, ParagraphReport, Quadding, Rect, RunReport, WordList,
    WORD_RECORD_STRIDE,
};
pub use options::TranslateOptions;
pub use pacing::{Interrupt, Pacer, Sleeper, ThreadSleeper};
pub use pipeline::{preview_paragraphs, Pipeline};
pub use text::{strip_markup, IGNORED_PUNCTUATION};
#[cfg(feature = "google")]
pub use translate::GoogleTranslator;
pub use translate::{Translation, Translator};

use std::path::Path;
#[cfg(feature = "google")]
use std::time::Duration;

/// Translate page 1 of `input` from Simplified Chinese to English and
/// write the annotated document to `output`.
///
/// # Example
///
/// ```no_run
/// let report = pdfgloss::translate_file("in.pdf", "out.pdf").unwrap();
/// assert_eq!(report.page, 1);
/// ```
#[cfg(feature = "google")]
pub fn translate_file<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<RunReport> {
    PdfGloss::new().translate(input, output)
}

/// List the paragraphs detected on page 1 with their extracted text.
pub fn list_paragraphs<P: AsRef<Path>>(input: P) -> Result<Vec<ParagraphPreview>> {
    PdfGloss::new().paragraphs(input)
}

/// Builder for translation runs with the bundled lopdf backend.
///
/// # Example
///
/// ```no_run
/// use pdfgloss::{Language, PdfGloss};
/// use std::time::Duration;
///
/// let report = PdfGloss::new()
///     .with_page(2)
///     .with_languages(Language::Japanese, Language::English)
///     .with_min_interval(Duration::from_millis(500))
///     .translate("in.pdf", "out.pdf")?;
/// # Ok::<(), pdfgloss::Error>(())
/// ```
pub struct PdfGloss {
    options: TranslateOptions,
    interrupt: Interrupt,
    #[cfg(feature = "google")]
    endpoint: Option<String>,
    #[cfg(feature = "google")]
    timeout: Duration,
}

impl PdfGloss {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self {
            options: TranslateOptions::default(),
            interrupt: Interrupt::new(),
            #[cfg(feature = "google")]
            endpoint: None,
            #[cfg(feature = "google")]
            timeout: translate::DEFAULT_TIMEOUT,
        }
    }

    /// Replace all options at once.
    pub fn with_options(mut self, options: TranslateOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the page to translate (1-indexed).
    pub fn with_page(mut self, page: u32) -> Self {
        self.options = self.options.with_page(page);
        self
    }

    /// Set source and target language.
    pub fn with_languages(mut self, source: Language, target: Language) -> Self {
        self.options = self.options.with_languages(source, target);
        self
    }

    /// Set paragraph merge sensitivity.
    pub fn with_merge_sensitivity(mut self, sensitivity: u32) -> Self {
        self.options = self.options.with_merge_sensitivity(sensitivity);
        self
    }

    /// Set the minimum interval between translation calls.
    pub fn with_min_interval(mut self, interval: std::time::Duration) -> Self {
        self.options = self.options.with_min_interval(interval);
        self
    }

    /// Set the annotation style.
    pub fn with_style(mut self, style: AnnotationStyle) -> Self {
        self.options = self.options.with_style(style);
        self
    }

    /// Share an interruption flag, e.g. with a Ctrl-C handler.
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Send translation requests to another endpoint.
    #[cfg(feature = "google")]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the per-request timeout.
    #[cfg(feature = "google")]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn options(&self) -> &TranslateOptions {
        &self.options
    }

    /// Translate with the Google web translator.
    #[cfg(feature = "google")]
    pub fn translate<P: AsRef<Path>, Q: AsRef<Path>>(self, input: P, output: Q) -> Result<RunReport> {
        self.translate_with_progress(input, output, |_, _| {})
    }

    /// Translate with the Google web translator, reporting `(done, total)`.
    #[cfg(feature = "google")]
    pub fn translate_with_progress<P, Q, F>(self, input: P, output: Q, mut progress: F) -> Result<RunReport>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
        F: FnMut(usize, usize),
    {
        let endpoint = self
            .endpoint
            .as_deref()
            .unwrap_or(translate::DEFAULT_ENDPOINT);
        let translator = GoogleTranslator::with_endpoint(endpoint, self.timeout)?;
        self.translate_with(translator, input, output, &mut progress)
    }

    /// Translate with any [`Translator`].
    pub fn translate_with<T, P, Q>(
        self,
        translator: T,
        input: P,
        output: Q,
        progress: &mut dyn FnMut(usize, usize),
    ) -> Result<RunReport>
    where
        T: Translator,
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        Pipeline::new(LopdfBackend::new(), translator)
            .with_options(self.options)
            .with_interrupt(self.interrupt)
            .run_with_progress(input, output, progress)
    }

    /// Detected paragraphs and their text, without translating.
    pub fn paragraphs<P: AsRef<Path>>(&self, input: P) -> Result<Vec<ParagraphPreview>> {
        preview_paragraphs(&LopdfBackend::new(), input, &self.options)
    }
}

impl Default for PdfGloss {
    fn default() -> Self {
        Self::new()
    }
}
