//! Single-page paragraph translation.
//!
//! A run opens the input twice: a decode model to find paragraph areas and
//! their words, and an edit model that receives one FreeText annotation per
//! translated paragraph before being written to the output path. Both
//! handles are closed on every exit path, the edit model first.

use std::path::Path;

use crate::backend::{AnnotationEditor, CloseOnDrop, DocumentBackend, PageDecoder};
use crate::error::Result;
use crate::model::{
    FreeTextAnnotation, ParagraphOutcome, ParagraphPreview, ParagraphReport, Rect, RunReport,
};
use crate::options::TranslateOptions;
use crate::pacing::{Interrupt, Pacer, Sleeper, ThreadSleeper};
use crate::text::paragraph_text;
use crate::translate::Translator;

/// Detect the paragraphs of the configured page and their text, without
/// translating or writing anything.
pub fn preview_paragraphs<B: DocumentBackend>(
    backend: &B,
    input: impl AsRef<Path>,
    options: &TranslateOptions,
) -> Result<Vec<ParagraphPreview>> {
    let page = options.page;
    let mut decoder = CloseOnDrop::new(backend.open(input.as_ref())?);
    decoder.decode_page(page)?;

    let areas = decoder.paragraph_areas(page, options.merge_sensitivity)?;
    let mut previews = Vec::with_capacity(areas.len());
    for (index, area) in areas.into_iter().enumerate() {
        let rect = area.to_rect();
        let text = decoder
            .extract_words(rect, page, options.estimate_spaces, &options.ignored_punctuation)?
            .map(|words| paragraph_text(&words))
            .filter(|text| !text.is_empty());
        previews.push(ParagraphPreview { index, rect, text });
    }
    Ok(previews)
}

/// Translates the paragraphs of one page into annotations.
pub struct Pipeline<B, T, S = ThreadSleeper> {
    backend: B,
    translator: T,
    sleeper: S,
    options: TranslateOptions,
    interrupt: Interrupt,
}

impl<B, T> Pipeline<B, T, ThreadSleeper>
where
    B: DocumentBackend,
    T: Translator,
{
    /// Create a pipeline that paces calls on the current thread.
    pub fn new(backend: B, translator: T) -> Self {
        Self::with_sleeper(backend, translator, ThreadSleeper::new())
    }
}

impl<B, T, S> Pipeline<B, T, S>
where
    B: DocumentBackend,
    T: Translator,
    S: Sleeper,
{
    pub fn with_sleeper(backend: B, translator: T, sleeper: S) -> Self {
        Self {
            backend,
            translator,
            sleeper,
            options: TranslateOptions::default(),
            interrupt: Interrupt::new(),
        }
    }

    pub fn with_options(mut self, options: TranslateOptions) -> Self {
        self.options = options;
        self
    }

    /// Share an interruption flag with a supervisor.
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn options(&self) -> &TranslateOptions {
        &self.options
    }

    /// Handle to this pipeline's interruption flag.
    pub fn interrupt(&self) -> Interrupt {
        self.interrupt.clone()
    }

    /// Translate the configured page of `input` and write the annotated
    /// document to `output`.
    pub fn run(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<RunReport> {
        self.run_with_progress(input, output, &mut |_, _| {})
    }

    /// Like [`Pipeline::run`], calling `progress(done, total)` after each
    /// paragraph.
    pub fn run_with_progress(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        progress: &mut dyn FnMut(usize, usize),
    ) -> Result<RunReport> {
        let input = input.as_ref();
        let output = output.as_ref();
        let options = &self.options;
        let page = options.page;

        log::info!(
            "Translating page {} of {} ({} -> {}, {})",
            page,
            input.display(),
            options.source.code(),
            options.target.code(),
            self.translator.name()
        );

        // Declared first so it is dropped after the editor.
        let mut decoder = CloseOnDrop::new(self.backend.open(input)?);
        decoder.decode_page(page)?;

        let rects: Vec<Rect> = decoder
            .paragraph_areas(page, options.merge_sensitivity)?
            .into_iter()
            .map(|area| area.to_rect())
            .collect();
        log::debug!("Found {} paragraph areas", rects.len());

        let mut editor = CloseOnDrop::new(self.backend.load_for_edit(input)?);
        let mut pacer = Pacer::new(&self.sleeper, options.min_interval);
        let mut report = RunReport::new(page, options.source, options.target);

        let total = rects.len();
        for (index, rect) in rects.into_iter().enumerate() {
            let outcome = self.translate_area(&*decoder, &mut *editor, &mut pacer, rect)?;
            report.paragraphs.push(ParagraphReport {
                index,
                rect,
                outcome,
            });
            progress(index + 1, total);
        }

        // A request made during the last translation call still stops the run.
        self.interrupt.check()?;

        editor.apply()?;
        editor.write(output)?;

        log::info!(
            "Annotated {} of {} paragraphs into {}",
            report.translated_count(),
            total,
            output.display()
        );
        Ok(report)
    }

    fn translate_area(
        &self,
        decoder: &B::Decoder,
        editor: &mut B::Editor,
        pacer: &mut Pacer<&S>,
        rect: Rect,
    ) -> Result<ParagraphOutcome> {
        let options = &self.options;

        let words = match decoder.extract_words(
            rect,
            options.page,
            options.estimate_spaces,
            &options.ignored_punctuation,
        )? {
            Some(words) if !words.is_empty() => words,
            _ => {
                log::debug!("No words in {:?}, skipping", rect);
                return Ok(ParagraphOutcome::NoWords);
            }
        };

        let text = paragraph_text(&words);
        if text.is_empty() {
            log::debug!("Nothing left after cleanup in {:?}, skipping", rect);
            return Ok(ParagraphOutcome::EmptyText);
        }

        pacer.wait(&self.interrupt)?;
        let result = self.translator.translate(&text, options.source, options.target);
        pacer.mark();
        let translation = result?;

        log::debug!("{:?}: {} -> {}", rect, text, translation.text);
        editor.add_annotation(
            options.page,
            FreeTextAnnotation::new(rect, translation.text.clone(), options.style.clone()),
        )?;

        Ok(ParagraphOutcome::Translated {
            source: text,
            translated: translation.text,
        })
    }
}
