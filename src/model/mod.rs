//! Data types shared by the pipeline, the backends and the translators.

mod annotation;
mod geometry;
mod language;
mod report;
mod words;

pub use annotation::{AnnotationFlags, AnnotationStyle, BaseFont, FreeTextAnnotation, Quadding};
pub use geometry::{convert_rectangles, ParagraphArea, Rect};
pub use language::Language;
pub use report::{ParagraphOutcome, ParagraphPreview, ParagraphReport, RunReport};
pub use words::{WordList, WORD_RECORD_STRIDE};
