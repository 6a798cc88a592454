//! Statistical text classifiers consumed by the decision engine.
//!
//! The engine treats a classifier as a black box mapping normalized text to a
//! per-class probability vector (index 0 = Fake, index 1 = Real). Two size tiers
//! are used, one tuned for headlines and one for full articles; either may be
//! absent.
//!
//! Models are loaded once, up front, into an immutable [`ClassifierBundle`]
//! that is handed to [`crate::engine::DecisionEngine::new`].

pub mod linear;

use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

pub use linear::LinearTextModel;

/// Class index for Fake.
pub const CLASS_FAKE: usize = 0;
/// Class index for Real.
#[cfg(test)]
pub const CLASS_REAL: usize = 1;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode model artifact: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("inconsistent model artifact: {0}")]
    Invalid(String),
    #[error("classifier produced an unusable probability vector")]
    BadProbabilities,
    #[error("classifier panicked during prediction")]
    Panicked,
}

/// A trained binary text classifier.
pub trait TextClassifier {
    /// Per-class probabilities for already-normalized text.
    fn predict_proba(&self, text: &str) -> Result<Vec<f64>, ModelError>;

    /// Most likely class index.
    fn predict(&self, text: &str) -> Result<usize, ModelError> {
        let proba = self.predict_proba(text)?;
        argmax(&proba).ok_or(ModelError::BadProbabilities)
    }
}

/// Index of the largest finite probability.
pub fn argmax(proba: &[f64]) -> Option<usize> {
    if proba.is_empty() || proba.iter().any(|p| !p.is_finite()) {
        return None;
    }
    proba
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
}

pub type BoxedClassifier = Box<dyn TextClassifier + Send + Sync>;

/// The two model tiers, both optional. Read-only once built.
#[derive(Default)]
pub struct ClassifierBundle {
    pub headline: Option<BoxedClassifier>,
    pub article: Option<BoxedClassifier>,
}

impl ClassifierBundle {
    pub fn new(headline: Option<BoxedClassifier>, article: Option<BoxedClassifier>) -> Self {
        Self { headline, article }
    }

    /// Load whichever model artifacts are configured.
    ///
    /// A path that cannot be loaded is logged and left empty; the engine
    /// degrades to the other tier or to its safe default.
    pub fn load(headline_path: Option<&Path>, article_path: Option<&Path>) -> Self {
        Self {
            headline: load_tier("headline", headline_path),
            article: load_tier("article", article_path),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.headline.is_none() && self.article.is_none()
    }
}

impl std::fmt::Debug for ClassifierBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierBundle")
            .field("headline", &self.headline.is_some())
            .field("article", &self.article.is_some())
            .finish()
    }
}

fn load_tier(tier: &str, path: Option<&Path>) -> Option<BoxedClassifier> {
    let path = path?;
    match LinearTextModel::from_path(path) {
        Ok(model) => {
            info!(tier, path = %path.display(), features = model.feature_count(), "Loaded model");
            Some(Box::new(model))
        }
        Err(e) => {
            warn!(tier, path = %path.display(), error = %e, "Failed to load model; tier disabled");
            None
        }
    }
}
