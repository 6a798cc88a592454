//! TF-IDF + logistic regression model loaded from a JSON artifact.
//!
//! The artifact is the exported state of a word n-gram TF-IDF vectorizer
//! followed by a binary logistic regression:
//!
//! ```json
//! {
//!   "vocabulary": { "election": 0, "miracle cure": 1 },
//!   "idf": [1.7, 3.2],
//!   "coefficients": [0.9, -2.4],
//!   "intercept": 0.1,
//!   "ngram_range": [1, 2],
//!   "sublinear_tf": false
//! }
//! ```
//!
//! Feature vectors are l2-normalized before the dot product. The positive class
//! (index 1) is Real.

use super::{ModelError, TextClassifier};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct LinearTextModel {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    coefficients: Vec<f64>,
    intercept: f64,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default)]
    sublinear_tf: bool,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

impl LinearTextModel {
    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        let model: Self = serde_json::from_str(raw)?;
        model.validate()?;
        Ok(model)
    }

    pub fn feature_count(&self) -> usize {
        self.idf.len()
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.idf.len() != self.coefficients.len() {
            return Err(ModelError::Invalid(format!(
                "idf has {} entries but coefficients has {}",
                self.idf.len(),
                self.coefficients.len()
            )));
        }
        if let Some((term, idx)) = self.vocabulary.iter().find(|(_, idx)| **idx >= self.idf.len()) {
            return Err(ModelError::Invalid(format!(
                "term {term:?} maps to feature {idx} outside {} features",
                self.idf.len()
            )));
        }
        let (lo, hi) = self.ngram_range;
        if lo == 0 || lo > hi {
            return Err(ModelError::Invalid(format!("bad ngram range ({lo}, {hi})")));
        }
        Ok(())
    }

    /// Sparse l2-normalized TF-IDF vector of `text`.
    fn vectorize(&self, text: &str) -> HashMap<usize, f64> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let (lo, hi) = self.ngram_range;

        let mut counts: HashMap<usize, f64> = HashMap::new();
        for n in lo..=hi {
            for window in tokens.windows(n) {
                let gram = window.join(" ");
                if let Some(&idx) = self.vocabulary.get(&gram) {
                    *counts.entry(idx).or_insert(0.0) += 1.0;
                }
            }
        }

        for (idx, value) in counts.iter_mut() {
            let tf = if self.sublinear_tf { 1.0 + value.ln() } else { *value };
            *value = tf * self.idf[*idx];
        }

        let norm = counts.values().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in counts.values_mut() {
                *value /= norm;
            }
        }
        counts
    }
}

impl TextClassifier for LinearTextModel {
    fn predict_proba(&self, text: &str) -> Result<Vec<f64>, ModelError> {
        let features = self.vectorize(text);
        let z = self.intercept
            + features
                .iter()
                .map(|(idx, value)| self.coefficients[*idx] * value)
                .sum::<f64>();
        let p_real = 1.0 / (1.0 + (-z).exp());
        if !p_real.is_finite() {
            return Err(ModelError::BadProbabilities);
        }
        Ok(vec![1.0 - p_real, p_real])
    }
}
