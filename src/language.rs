//! Language detection for article text.
//!
//! Script detection comes first and needs no model: Gujarati characters win over
//! Devanagari characters, which win over everything else. Latin-script text is
//! handed to a `lingua` detector that also knows the common European languages
//! found in international feeds. Those, and anything the detector cannot
//! place, are treated as English so that they skip translation.

use crate::models::LanguageCode;
use lingua::{Language, LanguageDetector, LanguageDetectorBuilder};
use once_cell::sync::Lazy;
use tracing::debug;

/// Gujarati Unicode block.
const GUJARATI_BLOCK: std::ops::RangeInclusive<char> = '\u{0A80}'..='\u{0AFF}';
/// Devanagari Unicode block (Hindi).
const DEVANAGARI_BLOCK: std::ops::RangeInclusive<char> = '\u{0900}'..='\u{097F}';

/// Below this many non-whitespace characters the statistical detector is not consulted.
const MIN_DETECT_CHARS: usize = 3;

/// Hindi and Gujarati are only reported here for Latin text the script check
/// did not catch. The European languages make the debug output say what a
/// non-English Latin text actually was.
static DETECTOR: Lazy<LanguageDetector> = Lazy::new(|| {
    LanguageDetectorBuilder::from_languages(&[
        Language::English,
        Language::Hindi,
        Language::Gujarati,
        Language::French,
        Language::German,
        Language::Spanish,
        Language::Portuguese,
    ])
    .build()
});

/// Map a detector result onto the supported codes.
fn supported_code(detected: Option<Language>) -> LanguageCode {
    match detected {
        Some(Language::Hindi) => LanguageCode::Hi,
        Some(Language::Gujarati) => LanguageCode::Gu,
        Some(Language::English) | None => LanguageCode::En,
        Some(other) => {
            debug!(language = ?other, "Unsupported Latin-script language; treating as English");
            LanguageCode::En
        }
    }
}

/// Return the non-Latin script language of `text`, if any.
///
/// Gujarati is checked before Devanagari; this precedence is relied on by the
/// rule engine and must not be reordered.
pub fn script_language(text: &str) -> Option<LanguageCode> {
    if text.chars().any(|c| GUJARATI_BLOCK.contains(&c)) {
        Some(LanguageCode::Gu)
    } else if text.chars().any(|c| DEVANAGARI_BLOCK.contains(&c)) {
        Some(LanguageCode::Hi)
    } else {
        None
    }
}

/// Detect the language of `text`. Always returns a supported code.
pub fn detect(text: &str) -> LanguageCode {
    if let Some(lang) = script_language(text) {
        return lang;
    }

    let significant = text.chars().filter(|c| !c.is_whitespace()).count();
    if significant < MIN_DETECT_CHARS {
        return LanguageCode::En;
    }

    let detected = DETECTOR.detect_language_of(text);
    let code = supported_code(detected);
    debug!(?detected, %code, "Statistical language detection");
    code
}
