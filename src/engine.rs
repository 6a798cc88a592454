//! The per-article decision engine.
//!
//! [`DecisionEngine::classify`] combines the rule table with the statistical
//! models:
//!
//! 1. Texts with under 10 characters of content are Real (too little signal).
//! 2. A definite rule outcome is returned as is with confidence 1.0.
//! 3. Otherwise the normalized text goes to the headline model (under 300
//!    characters) or the article model, each falling back to the other tier.
//! 4. The model output is filtered through a confidence-tiered policy that
//!    leans towards Real on borderline content.
//!
//! `classify` is total: every failure path ends in a Real verdict.

use crate::classifier::{ClassifierBundle, ModelError, TextClassifier, CLASS_FAKE, argmax};
use crate::models::{Label, Verdict};
use crate::normalize::{normalize, strip_noise};
use crate::rules::{self, RuleSignals, RuleVerdict, is_upper_token};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, instrument};

/// Cleaned texts shorter than this are not classified.
pub const MIN_CONTENT_CHARS: usize = 10;
/// Cleaned texts shorter than this prefer the headline model.
pub const HEADLINE_MAX_CHARS: usize = 300;

const HIGH_CONFIDENCE: f64 = 0.85;
const MEDIUM_CONFIDENCE: f64 = 0.70;

/// Which model tier handled a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    Headline,
    Article,
}

impl ModelTier {
    fn as_str(self) -> &'static str {
        match self {
            ModelTier::Headline => "headline",
            ModelTier::Article => "article",
        }
    }
}

#[derive(Debug, Default)]
pub struct DecisionEngine {
    models: ClassifierBundle,
}

impl DecisionEngine {
    pub fn new(models: ClassifierBundle) -> Self {
        Self { models }
    }

    /// Classify one text. Never panics on any input and never fails.
    #[instrument(level = "debug", skip_all, fields(chars = raw_text.chars().count()))]
    pub fn classify(&self, raw_text: &str) -> Verdict {
        let cleaned = strip_noise(raw_text);
        let content_chars = cleaned.chars().count();
        if content_chars < MIN_CONTENT_CHARS {
            return Verdict::safe_default("too little content to judge");
        }

        match rules::evaluate(raw_text) {
            RuleVerdict::DefiniteFake { rule } => {
                debug!(rule, "Rule decided Fake");
                Verdict::definite(Label::Fake, format!("definite rule: {rule}"))
            }
            RuleVerdict::DefiniteReal { rule } => {
                debug!(rule, "Rule decided Real");
                Verdict::definite(Label::Real, format!("definite rule: {rule}"))
            }
            RuleVerdict::Inconclusive(signals) => self.ensemble(raw_text, content_chars, &signals),
        }
    }

    /// Pick the model tier by cleaned length, falling back to the other tier.
    pub fn select_model(&self, content_chars: usize) -> Option<(ModelTier, &(dyn TextClassifier + Send + Sync))> {
        let headline = self.models.headline.as_deref().map(|m| (ModelTier::Headline, m));
        let article = self.models.article.as_deref().map(|m| (ModelTier::Article, m));
        if content_chars < HEADLINE_MAX_CHARS {
            headline.or(article)
        } else {
            article.or(headline)
        }
    }

    fn ensemble(&self, raw_text: &str, content_chars: usize, signals: &RuleSignals) -> Verdict {
        let Some((tier, model)) = self.select_model(content_chars) else {
            return Verdict::safe_default("no model loaded");
        };

        let normalized = normalize(raw_text);
        let (predicted, confidence) = match invoke(model, &normalized) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(tier = tier.as_str(), error = %e, "Model prediction failed; defaulting to Real");
                return Verdict::safe_default(format!("{} model failed", tier.as_str()));
            }
        };

        let model_label = if predicted == CLASS_FAKE { Label::Fake } else { Label::Real };
        debug!(tier = tier.as_str(), ?model_label, confidence, "Model prediction");

        if confidence > HIGH_CONFIDENCE {
            Verdict::scored(
                model_label,
                confidence,
                format!("{} model, high confidence", tier.as_str()),
            )
        } else if confidence > MEDIUM_CONFIDENCE {
            if model_label == Label::Fake && signals.professional_score >= 2 {
                Verdict::scored(
                    Label::Real,
                    confidence,
                    format!(
                        "{} model leaned Fake at medium confidence; overridden by professional signals",
                        tier.as_str()
                    ),
                )
            } else {
                Verdict::scored(
                    model_label,
                    confidence,
                    format!("{} model, medium confidence", tier.as_str()),
                )
            }
        } else if signals.punctuation_excess || shouting_lead(&signals.tokens) {
            Verdict::scored(
                Label::Fake,
                confidence,
                "low model confidence; sensational formatting",
            )
        } else {
            Verdict::scored(
                Label::Real,
                confidence,
                "low model confidence; benefit of the doubt",
            )
        }
    }
}

/// Any of the first five tokens is uppercase and longer than five characters.
fn shouting_lead(tokens: &[String]) -> bool {
    tokens
        .iter()
        .take(5)
        .any(|t| t.chars().count() > 5 && is_upper_token(t))
}

/// Run the classifier, mapping errors, panics and garbage output to `ModelError`.
fn invoke(model: &(dyn TextClassifier + Send + Sync), text: &str) -> Result<(usize, f64), ModelError> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let predicted = model.predict(text)?;
        let proba = model.predict_proba(text)?;
        Ok::<_, ModelError>((predicted, proba))
    }))
    .map_err(|_| ModelError::Panicked)??;

    let (predicted, proba) = outcome;
    let best = argmax(&proba).ok_or(ModelError::BadProbabilities)?;
    let confidence = proba[best];
    if !(0.0..=1.0).contains(&confidence) {
        return Err(ModelError::BadProbabilities);
    }
    Ok((predicted, confidence))
}
