//! Sanitation and validation of user-supplied text before classification.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

pub const MIN_TEXT_CHARS: usize = 10;
pub const MAX_TEXT_CHARS: usize = 10_000;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Text is required")]
    Empty,
    #[error("Text too short (minimum {min} characters)")]
    TooShort { min: usize },
    #[error("Text too long (maximum {max} characters)")]
    TooLong { max: usize },
    #[error("Text must contain meaningful content")]
    NoContent,
}

/// Remove null bytes, collapse whitespace runs to one space and trim.
pub fn sanitize_input(text: &str) -> String {
    let without_nulls = text.replace('\0', "");
    WHITESPACE_RE
        .replace_all(&without_nulls, " ")
        .trim()
        .to_string()
}

/// Check that `text` is worth classifying.
///
/// Lengths are counted in characters after trimming. At least half of
/// `min_chars` must be alphanumeric.
pub fn validate_text_input(text: &str, min_chars: usize, max_chars: usize) -> Result<(), ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::Empty);
    }
    let chars = text.chars().count();
    if chars < min_chars {
        return Err(ValidationError::TooShort { min: min_chars });
    }
    if chars > max_chars {
        return Err(ValidationError::TooLong { max: max_chars });
    }
    let alphanumeric = text.chars().filter(|c| c.is_alphanumeric()).count();
    if (alphanumeric as f64) < min_chars as f64 / 2.0 {
        return Err(ValidationError::NoContent);
    }
    Ok(())
}
