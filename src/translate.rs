//! Translation between the supported languages.
//!
//! Two concerns live here:
//! - Machine translation of article text into English before classification,
//!   behind the [`Translator`] trait. [`TranslationAdapter`] wraps any translator
//!   and never fails: on error the original text is returned unchanged.
//! - Localization of the fixed output vocabulary (labels, tiers) through a static
//!   lookup table, see [`localize`]. This never goes over the network.

use crate::models::{LanguageCode, Verdict};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("no translation endpoint configured")]
    NotConfigured,
    #[error("translation request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid translation endpoint: {0}")]
    Url(#[from] url::ParseError),
    #[error("translation service returned an empty result")]
    Empty,
}

/// A machine translation service.
pub trait Translator {
    async fn translate(
        &self,
        text: &str,
        source: LanguageCode,
        target: LanguageCode,
    ) -> Result<String, TranslateError>;
}

/// Client for a LibreTranslate-compatible `POST /translate` endpoint.
///
/// Constructed without an endpoint it reports [`TranslateError::NotConfigured`]
/// for every call, which the adapter turns into a pass-through.
#[derive(Debug, Clone)]
pub struct HttpTranslator {
    client: Client,
    endpoint: Option<Url>,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
}

impl HttpTranslator {
    pub fn new(base_url: Option<&str>, timeout: Duration) -> Result<Self, TranslateError> {
        let endpoint = match base_url {
            Some(base) => Some(Url::parse(base)?.join("translate")?),
            None => None,
        };
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

impl Translator for HttpTranslator {
    #[instrument(level = "debug", skip(self, text), fields(%source, %target))]
    async fn translate(
        &self,
        text: &str,
        source: LanguageCode,
        target: LanguageCode,
    ) -> Result<String, TranslateError> {
        let endpoint = self.endpoint.as_ref().ok_or(TranslateError::NotConfigured)?;
        let body = TranslateRequest {
            q: text,
            source: source.as_str(),
            target: target.as_str(),
            format: "text",
        };
        let response: TranslateResponse = self
            .client
            .post(endpoint.clone())
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.translated_text.trim().is_empty() {
            return Err(TranslateError::Empty);
        }
        Ok(response.translated_text)
    }
}

/// Wraps a [`Translator`] so callers always get usable text back.
#[derive(Debug, Clone)]
pub struct TranslationAdapter<T> {
    inner: T,
}

impl<T: Translator> TranslationAdapter<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Translate `text` written in `source` into English.
    ///
    /// English input is returned as is. Any failure returns the input unchanged.
    pub async fn to_english(&self, text: &str, source: LanguageCode) -> String {
        if source == LanguageCode::En {
            return text.to_string();
        }
        match self.inner.translate(text, source, LanguageCode::En).await {
            Ok(translated) => {
                debug!(%source, "Translated article to English");
                translated
            }
            Err(TranslateError::NotConfigured) => {
                debug!(%source, "No translator configured; classifying original text");
                text.to_string()
            }
            Err(e) => {
                warn!(%source, error = %e, "Translation failed; classifying original text");
                text.to_string()
            }
        }
    }
}

/// Look up the fixed translation of an output term.
///
/// Known keys are `Real News`, `Fake News`, `High`, `Medium`, `Low`,
/// `Confidence` and `Reliability`. Unknown keys come back unchanged.
pub fn localize(key: &str, lang: LanguageCode) -> &str {
    let translated = match (key, lang) {
        (_, LanguageCode::En) => None,
        ("Fake News", LanguageCode::Hi) => Some("फर्जी खबर"),
        ("Fake News", LanguageCode::Gu) => Some("ખોટા સમાચાર"),
        ("Real News", LanguageCode::Hi) => Some("सच्ची खबर"),
        ("Real News", LanguageCode::Gu) => Some("સાચા સમાચાર"),
        ("High", LanguageCode::Hi) => Some("उच्च"),
        ("High", LanguageCode::Gu) => Some("ઉચ્ચ"),
        ("Medium", LanguageCode::Hi) => Some("मध्यम"),
        ("Medium", LanguageCode::Gu) => Some("મધ્યમ"),
        ("Low", LanguageCode::Hi) => Some("कम"),
        ("Low", LanguageCode::Gu) => Some("નીચું"),
        ("Confidence", LanguageCode::Hi) => Some("विश्वास"),
        ("Confidence", LanguageCode::Gu) => Some("વિશ્વાસ"),
        ("Reliability", LanguageCode::Hi) => Some("विश्वसनीयता"),
        ("Reliability", LanguageCode::Gu) => Some("વિશ્વસનીયતા"),
        _ => None,
    };
    translated.unwrap_or(key)
}

/// A verdict with its label and tier rendered in the reader's language.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalizedVerdict {
    pub label: String,
    pub reliability: String,
    pub confidence: Option<f64>,
    pub language: LanguageCode,
    pub verdict: Verdict,
}

impl LocalizedVerdict {
    pub fn new(verdict: Verdict, lang: LanguageCode) -> Self {
        Self {
            label: localize(verdict.label.as_str(), lang).to_string(),
            reliability: localize(verdict.reliability_tier.as_str(), lang).to_string(),
            confidence: verdict.confidence,
            language: lang,
            verdict,
        }
    }
}
