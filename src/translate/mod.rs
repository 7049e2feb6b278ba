//! Machine translation clients.
//!
//! The pipeline only needs one blocking call per paragraph, so the seam is a
//! small synchronous trait. Results are never cached or retried here.

#[cfg(feature = "google")]
mod google;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::Language;

#[cfg(feature = "google")]
pub use google::{parse_response, GoogleTranslator, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};

/// Result of one translation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub source: Language,
    pub target: Language,
    /// Text that was sent
    pub original: String,
    /// Text that came back
    pub text: String,
}

/// A blocking translation service.
pub trait Translator {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Translate `text` from `from` into `to`.
    fn translate(&self, text: &str, from: Language, to: Language) -> Result<Translation>;
}

impl<T: Translator + ?Sized> Translator for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn translate(&self, text: &str, from: Language, to: Language) -> Result<Translation> {
        (**self).translate(text, from, to)
    }
}

impl<T: Translator + ?Sized> Translator for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn translate(&self, text: &str, from: Language, to: Language) -> Result<Translation> {
        (**self).translate(text, from, to)
    }
}
