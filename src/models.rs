//! Data models for fetched articles and the verdicts produced for them.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Article`]: A fetched news item, immutable once created
//! - [`Verdict`]: The Real/Fake decision for one article plus reliability metadata
//! - [`NewsFeed`] / [`FeedReport`]: The aggregated result of one `aggregate` call
//!
//! Every article that reaches the decision engine yields exactly one verdict, so
//! the feed stores them side by side in a single [`FeedEntry`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Languages the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    #[default]
    En,
    Hi,
    Gu,
}

impl LanguageCode {
    /// Two-letter code as used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            LanguageCode::En => "en",
            LanguageCode::Hi => "hi",
            LanguageCode::Gu => "gu",
        }
    }

    /// Human-readable language name.
    pub fn name(self) -> &'static str {
        match self {
            LanguageCode::En => "English",
            LanguageCode::Hi => "Hindi",
            LanguageCode::Gu => "Gujarati",
        }
    }

    /// Parse a two-letter code or a language name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Some(LanguageCode::En),
            "hi" | "hindi" => Some(LanguageCode::Hi),
            "gu" | "gujarati" => Some(LanguageCode::Gu),
            _ => None,
        }
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an article was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// HTML scraped from a routed news site.
    Scrape,
    /// NewsAPI search results.
    ApiA,
    /// NewsData search results.
    ApiB,
}

/// A fetched news item.
///
/// Created when fetched and never mutated; it is dropped once its verdict has
/// been produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    /// The article text as extracted from the source.
    pub raw_text: String,
    /// Short label for the source, e.g. `India`, `Ahmedabad` or `NewsAPI`.
    pub source_label: String,
    /// Language the text is written in.
    pub detected_language: LanguageCode,
    /// Which fetch path produced the article.
    pub origin: Origin,
}

impl Article {
    /// Text shown to readers: scraped items are prefixed with their source label.
    pub fn display_text(&self) -> String {
        match self.origin {
            Origin::Scrape if !self.source_label.is_empty() => {
                format!("[{}] {}", self.source_label, self.raw_text)
            }
            _ => self.raw_text.clone(),
        }
    }
}

/// The binary outcome of classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Real,
    Fake,
}

impl Label {
    /// Canonical English label used in reports and as the localization key.
    pub fn as_str(self) -> &'static str {
        match self {
            Label::Real => "Real News",
            Label::Fake => "Fake News",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse bucket of how much the verdict can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReliabilityTier {
    High,
    Medium,
    Low,
}

impl ReliabilityTier {
    /// Bucket a model confidence: above 0.85 is High, above 0.70 is Medium.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence > 0.85 {
            ReliabilityTier::High
        } else if confidence > 0.70 {
            ReliabilityTier::Medium
        } else {
            ReliabilityTier::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReliabilityTier::High => "High",
            ReliabilityTier::Medium => "Medium",
            ReliabilityTier::Low => "Low",
        }
    }
}

/// The decision for one article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub label: Label,
    /// Confidence in `[0, 1]`; absent when no model or rule produced one.
    pub confidence: Option<f64>,
    pub reliability_tier: ReliabilityTier,
    /// Short explanation of the decision path.
    pub rationale: String,
}

impl Verdict {
    /// A short-circuit rule outcome: full confidence, High tier.
    pub fn definite(label: Label, rationale: impl Into<String>) -> Self {
        Self {
            label,
            confidence: Some(1.0),
            reliability_tier: ReliabilityTier::High,
            rationale: rationale.into(),
        }
    }

    /// A decision backed by model confidence.
    pub fn scored(label: Label, confidence: f64, rationale: impl Into<String>) -> Self {
        let confidence = confidence.clamp(0.0, 1.0);
        Self {
            label,
            confidence: Some(confidence),
            reliability_tier: ReliabilityTier::from_confidence(confidence),
            rationale: rationale.into(),
        }
    }

    /// The benefit-of-doubt default used when there is no usable signal.
    pub fn safe_default(rationale: impl Into<String>) -> Self {
        Self {
            label: Label::Real,
            confidence: None,
            reliability_tier: ReliabilityTier::Low,
            rationale: rationale.into(),
        }
    }
}

/// One row of an aggregated feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    /// Text shown to readers (see [`Article::display_text`]).
    pub text: String,
    pub language: LanguageCode,
    /// `None` for the synthetic "no results" entry.
    pub origin: Option<Origin>,
    pub verdict: Verdict,
}

impl FeedEntry {
    pub fn from_article(article: &Article, verdict: Verdict) -> Self {
        Self {
            text: article.display_text(),
            language: article.detected_language,
            origin: Some(article.origin),
            verdict,
        }
    }

    /// Placeholder returned instead of an empty feed.
    pub fn no_results(message: String) -> Self {
        Self {
            text: message,
            language: LanguageCode::En,
            origin: None,
            verdict: Verdict::safe_default("no articles survived the pipeline"),
        }
    }
}

/// The aggregated result of one query. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsFeed {
    pub entries: Vec<FeedEntry>,
}

impl NewsFeed {
    /// Flatten into parallel lists, the shape callers consume.
    pub fn to_report(&self) -> FeedReport {
        FeedReport {
            news: self.entries.iter().map(|e| e.text.clone()).collect(),
            predictions: self
                .entries
                .iter()
                .map(|e| e.verdict.label.as_str().to_string())
                .collect(),
            languages: self.entries.iter().map(|e| e.language).collect(),
            verdicts: self.entries.iter().map(|e| e.verdict.clone()).collect(),
        }
    }
}

/// Serialized form of a [`NewsFeed`]: four lists of equal length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedReport {
    pub news: Vec<String>,
    pub predictions: Vec<String>,
    pub languages: Vec<LanguageCode>,
    pub verdicts: Vec<Verdict>,
}
