//! Document backend abstraction layer.
//!
//! The pipeline talks to PDF engines only through these traits: one
//! read-side model that decodes a page, estimates paragraph areas and
//! extracts words, and one edit-side model that collects annotations and
//! serializes a new document. [`LopdfBackend`] is the bundled implementation.

mod content;
mod editor;
mod layout;
mod lopdf_backend;

use std::ops::{Deref, DerefMut};
use std::path::Path;

use crate::error::Result;
use crate::model::{FreeTextAnnotation, ParagraphArea, Rect, WordList};

pub use content::{PositionedSpan, SpanCollector};
pub use editor::LopdfEditor;
pub use layout::{estimate_paragraphs, TextLine};
pub use lopdf_backend::{LopdfBackend, LopdfDecoder};

/// Something with a `close` that must run on every exit path.
pub trait Closeable {
    /// Release the underlying document. Called exactly once.
    fn close(&mut self);
}

/// Read-side view of an open document.
pub trait PageDecoder: Closeable {
    /// Decode the content of `page` (1-indexed). Must be called before
    /// [`PageDecoder::paragraph_areas`] or [`PageDecoder::extract_words`].
    fn decode_page(&mut self, page: u32) -> Result<()>;

    /// Coarse paragraph areas on a decoded page, in document order.
    ///
    /// `merge_sensitivity` tunes how eagerly nearby fragments are merged:
    /// smaller values over-split, larger values over-merge.
    fn paragraph_areas(&self, page: u32, merge_sensitivity: u32) -> Result<Vec<ParagraphArea>>;

    /// Word records inside `rect`, laid out as described on
    /// [`crate::model::WORD_RECORD_STRIDE`]. Characters in `ignored` are
    /// dropped from every word. `None` means nothing was found.
    fn extract_words(
        &self,
        rect: Rect,
        page: u32,
        estimate_spaces: bool,
        ignored: &str,
    ) -> Result<Option<WordList>>;
}

/// Edit-side view of a document.
pub trait AnnotationEditor: Closeable {
    /// Queue an annotation for `page` (1-indexed).
    fn add_annotation(&mut self, page: u32, annotation: FreeTextAnnotation) -> Result<()>;

    /// Write queued annotations into the in-memory document.
    fn apply(&mut self) -> Result<()>;

    /// Serialize the document to `path`.
    fn write(&mut self, path: &Path) -> Result<()>;
}

/// Factory for the two document models.
pub trait DocumentBackend {
    type Decoder: PageDecoder;
    type Editor: AnnotationEditor;

    /// Open a document for decoding.
    fn open(&self, path: &Path) -> Result<Self::Decoder>;

    /// Load a document for editing.
    fn load_for_edit(&self, path: &Path) -> Result<Self::Editor>;
}

/// Closes the wrapped handle when dropped.
pub struct CloseOnDrop<H: Closeable> {
    handle: H,
}

impl<H: Closeable> CloseOnDrop<H> {
    pub fn new(handle: H) -> Self {
        Self { handle }
    }
}

impl<H: Closeable> Deref for CloseOnDrop<H> {
    type Target = H;

    fn deref(&self) -> &H {
        &self.handle
    }
}

impl<H: Closeable> DerefMut for CloseOnDrop<H> {
    fn deref_mut(&mut self) -> &mut H {
        &mut self.handle
    }
}

impl<H: Closeable> Drop for CloseOnDrop<H> {
    fn drop(&mut self) {
        self.handle.close();
    }
}
