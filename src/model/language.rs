//! Languages understood by the translation backends.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A source or target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Language {
    ChineseSimplified,
    ChineseTraditional,
    English,
    Japanese,
    Korean,
    French,
    German,
    Spanish,
    Italian,
    Portuguese,
    Russian,
}

impl Language {
    /// All supported languages.
    pub const ALL: [Language; 11] = [
        Language::ChineseSimplified,
        Language::ChineseTraditional,
        Language::English,
        Language::Japanese,
        Language::Korean,
        Language::French,
        Language::German,
        Language::Spanish,
        Language::Italian,
        Language::Portuguese,
        Language::Russian,
    ];

    /// Language code sent to translation services.
    pub fn code(&self) -> &'static str {
        match self {
            Language::ChineseSimplified => "zh-CN",
            Language::ChineseTraditional => "zh-TW",
            Language::English => "en",
            Language::Japanese => "ja",
            Language::Korean => "ko",
            Language::French => "fr",
            Language::German => "de",
            Language::Spanish => "es",
            Language::Italian => "it",
            Language::Portuguese => "pt",
            Language::Russian => "ru",
        }
    }

    /// Human-readable English name.
    pub fn name(&self) -> &'static str {
        match self {
            Language::ChineseSimplified => "Chinese (Simplified)",
            Language::ChineseTraditional => "Chinese (Traditional)",
            Language::English => "English",
            Language::Japanese => "Japanese",
            Language::Korean => "Korean",
            Language::French => "French",
            Language::German => "German",
            Language::Spanish => "Spanish",
            Language::Italian => "Italian",
            Language::Portuguese => "Portuguese",
            Language::Russian => "Russian",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = Error;

    /// Accepts a language code (`zh-CN`, `en`, ...) or an English name,
    /// case-insensitively. `zh` alone means Simplified Chinese.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        if wanted == "zh" || wanted == "chinese" {
            return Ok(Language::ChineseSimplified);
        }
        Language::ALL
            .iter()
            .copied()
            .find(|lang| {
                lang.code().to_lowercase() == wanted || lang.name().to_lowercase() == wanted
            })
            .ok_or_else(|| Error::Other(format!("Unsupported language: {}", s)))
    }
}
