//! Google Translate over the public `translate_a/single` web endpoint.
//!
//! One blocking GET per paragraph; the response is a nested JSON array whose
//! first element holds the translated segments.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::Language;

use super::{Translation, Translator};

/// Public web endpoint of Google Translate.
pub const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Translator backed by the Google Translate web endpoint.
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new() -> Result<Self> {
        Self::with_endpoint(DEFAULT_ENDPOINT, DEFAULT_TIMEOUT)
    }

    /// Use a different endpoint, e.g. a proxy or a local mock.
    pub fn with_endpoint(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pdfgloss/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Translator for GoogleTranslator {
    fn name(&self) -> &str {
        "google"
    }

    fn translate(&self, text: &str, from: Language, to: Language) -> Result<Translation> {
        let body = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", from.code()),
                ("tl", to.code()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()?
            .error_for_status()?
            .text()?;

        Ok(Translation {
            source: from,
            target: to,
            original: text.to_string(),
            text: parse_response(&body)?,
        })
    }
}

/// Concatenate the translated segments of a response body.
///
/// The body is a nested array whose first element lists segments as
/// `["translated", "original", ...]`.
pub fn parse_response(body: &str) -> Result<String> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| Error::Translation(format!("malformed response: {}", e)))?;

    let segments = value
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Translation("response has no segments".to_string()))?;

    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if text.is_empty() && !segments.is_empty() {
        return Err(Error::Translation("response segments carry no text".to_string()));
    }
    Ok(text)
}
