//! Deterministic heuristics that can decide a verdict before any model runs.
//!
//! Signals are computed once per text into [`RuleSignals`], then an ordered
//! table of rules is walked and the first rule that returns a label wins. The
//! table is ordered by descending precision:
//!
//! | # | Rule | Outcome |
//! |---|------|---------|
//! | 1 | clickbait phrase | Fake |
//! | 2 | `!!!` or `???` | Fake |
//! | 3 | more than 60% shouting tokens (over 5 tokens) | Fake |
//! | 4 | reputable source named | Real |
//! | 5 | professional score >= 3 | Real |
//! | 6 | Gujarati/Devanagari script sub-branch | Real or Fake, always terminal |
//!
//! When nothing fires the signals are handed back as [`RuleVerdict::Inconclusive`]
//! for the ensemble step.

use crate::language::script_language;
use crate::models::{Label, LanguageCode};
use once_cell::sync::Lazy;
use regex::Regex;

const CLICKBAIT_PHRASES: &[&str] = &[
    "you won't believe",
    "doctors hate this",
    "one weird trick",
    "click here now",
    "miracle cure",
    "what happens next will shock",
    "number 7 will",
    "share before deleted",
    "they don't want you to know",
];

const REPUTABLE_SOURCES: &[&str] = &[
    "reuters",
    "ap news",
    "associated press",
    "bbc",
    "cnn",
    "nbc",
    "times of india",
    "indian express",
    "hindustan times",
    "the hindu",
    "ndtv",
    "india today",
    "economic times",
    "bloomberg",
    "guardian",
    "washington post",
    "new york times",
    "wall street journal",
];

const PROFESSIONAL_MARKERS: &[&str] = &[
    "according to",
    "said in a statement",
    "reported by",
    "sources said",
    "announced today",
    "in an interview",
    "press release",
    "official statement",
];

/// Source names and attribution phrases written in Hindi and Gujarati.
const LOCALE_SOURCE_MARKERS: &[&str] = &[
    "वॉशिंगटन",
    "रॉयटर्स",
    "एनडीटीवी",
    "ने कहा",
    "के अनुसार",
    "રોઇટર્સ",
    "એનડીટીવી",
    "અનુસાર",
];

/// Share of shouting tokens above which a text is considered sensational.
const CAPS_RATIO_THRESHOLD: f64 = 0.6;

static TRIPLE_PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!{3,}|\?{3,}").unwrap());
static DOUBLE_BANG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!{2,}").unwrap());
static DIGIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").unwrap());
static PROPER_NOUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z][a-z]+\b").unwrap());

/// True when a token has at least one cased letter and no lowercase letters.
pub fn is_upper_token(token: &str) -> bool {
    token.chars().any(char::is_uppercase) && !token.chars().any(char::is_lowercase)
}

/// Per-text features computed once and discarded after the verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSignals {
    pub has_clickbait_phrase: bool,
    /// Three or more consecutive `!` or `?`.
    pub punctuation_burst: bool,
    /// Two or more consecutive `!`.
    pub punctuation_excess: bool,
    /// Uppercase tokens longer than 2 characters divided by all tokens.
    pub caps_ratio: f64,
    pub is_reputable_source: bool,
    pub has_professional_language: bool,
    pub has_numbers: bool,
    pub has_proper_nouns: bool,
    /// Number of true values among the four professional signals.
    pub professional_score: u8,
    /// Non-Latin script found in the text, if any.
    pub script: Option<LanguageCode>,
    pub has_locale_source_marker: bool,
    /// Whitespace-separated tokens of the raw text.
    pub tokens: Vec<String>,
}

impl RuleSignals {
    pub fn compute(raw_text: &str) -> Self {
        let lower = raw_text.to_lowercase();
        let tokens: Vec<String> = raw_text.split_whitespace().map(str::to_string).collect();

        let caps_tokens = tokens
            .iter()
            .filter(|t| t.chars().count() > 2 && is_upper_token(t))
            .count();
        let caps_ratio = if tokens.is_empty() {
            0.0
        } else {
            caps_tokens as f64 / tokens.len() as f64
        };

        let punctuation_excess = DOUBLE_BANG_RE.is_match(raw_text);
        let has_professional_language = PROFESSIONAL_MARKERS.iter().any(|m| lower.contains(m));
        let has_numbers = DIGIT_RE.is_match(raw_text);
        let has_proper_nouns = PROPER_NOUN_RE.is_match(raw_text);
        let professional_score = [
            has_professional_language,
            has_numbers,
            has_proper_nouns,
            !punctuation_excess,
        ]
        .iter()
        .filter(|b| **b)
        .count() as u8;

        Self {
            has_clickbait_phrase: CLICKBAIT_PHRASES.iter().any(|p| lower.contains(p)),
            punctuation_burst: TRIPLE_PUNCT_RE.is_match(raw_text),
            punctuation_excess,
            caps_ratio,
            is_reputable_source: REPUTABLE_SOURCES.iter().any(|s| lower.contains(s)),
            has_professional_language,
            has_numbers,
            has_proper_nouns,
            professional_score,
            script: script_language(raw_text),
            has_locale_source_marker: LOCALE_SOURCE_MARKERS.iter().any(|m| lower.contains(m)),
            tokens,
        }
    }

    fn is_shouting(&self) -> bool {
        self.tokens.len() > 5 && self.caps_ratio > CAPS_RATIO_THRESHOLD
    }
}

/// Outcome of the rule pass.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleVerdict {
    DefiniteFake { rule: &'static str },
    DefiniteReal { rule: &'static str },
    Inconclusive(RuleSignals),
}

/// One entry of the rule table.
pub struct Rule {
    pub name: &'static str,
    pub decide: fn(&RuleSignals) -> Option<Label>,
}

fn when(condition: bool, label: Label) -> Option<Label> {
    condition.then_some(label)
}

#[allow(clippy::if_same_then_else)]
fn locale_script_branch(s: &RuleSignals) -> Option<Label> {
    s.script?;
    let label = if s.has_locale_source_marker {
        Label::Real
    } else if s.has_numbers && !s.punctuation_excess {
        Label::Real
    } else if s.punctuation_excess {
        Label::Fake
    } else {
        Label::Real
    };
    Some(label)
}

/// The rule table, in evaluation order.
pub static RULES: &[Rule] = &[
    Rule {
        name: "clickbait phrase",
        decide: |s| when(s.has_clickbait_phrase, Label::Fake),
    },
    Rule {
        name: "punctuation burst",
        decide: |s| when(s.punctuation_burst, Label::Fake),
    },
    Rule {
        name: "all-caps sensationalism",
        decide: |s| when(s.is_shouting(), Label::Fake),
    },
    Rule {
        name: "reputable source",
        decide: |s| when(s.is_reputable_source, Label::Real),
    },
    Rule {
        name: "professional language",
        decide: |s| when(s.professional_score >= 3, Label::Real),
    },
    Rule {
        name: "regional script",
        decide: locale_script_branch,
    },
];

/// Run the rule table against the raw (uncleaned) text.
pub fn evaluate(raw_text: &str) -> RuleVerdict {
    let signals = RuleSignals::compute(raw_text);
    for rule in RULES {
        match (rule.decide)(&signals) {
            Some(Label::Fake) => return RuleVerdict::DefiniteFake { rule: rule.name },
            Some(Label::Real) => return RuleVerdict::DefiniteReal { rule: rule.name },
            None => {}
        }
    }
    RuleVerdict::Inconclusive(signals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fired(text: &str) -> Option<&'static str> {
        match evaluate(text) {
            RuleVerdict::DefiniteFake { rule } | RuleVerdict::DefiniteReal { rule } => Some(rule),
            RuleVerdict::Inconclusive(_) => None,
        }
    }

    #[test]
    fn test_clickbait_phrase_is_fake() {
        assert_eq!(
            evaluate("You won't BELIEVE what happened!!!"),
            RuleVerdict::DefiniteFake { rule: "clickbait phrase" }
        );
        assert_eq!(
            evaluate("Doctors hate this simple kitchen remedy"),
            RuleVerdict::DefiniteFake { rule: "clickbait phrase" }
        );
    }

    #[test]
    fn test_punctuation_burst_is_fake() {
        assert_eq!(fired("Is the government hiding this???"), Some("punctuation burst"));
        assert_eq!(fired("Reuters reports record turnout!!!"), Some("punctuation burst"));
    }

    #[test]
    fn test_clickbait_checked_before_punctuation() {
        assert_eq!(fired("miracle cure found!!!"), Some("clickbait phrase"));
    }

    #[test]
    fn test_all_caps_sensationalism() {
        assert_eq!(
            fired("SHOCKING NEWS ABOUT THE ELECTION RESULTS today"),
            Some("all-caps sensationalism")
        );
        // Five tokens or fewer never trips the caps rule.
        assert_ne!(fired("SHOCKING NEWS ABOUT THE ELECTION"), Some("all-caps sensationalism"));
    }

    #[test]
    fn test_reputable_source_is_real() {
        assert_eq!(
            evaluate("Reuters: Markets close higher as GDP data beats forecasts."),
            RuleVerdict::DefiniteReal { rule: "reputable source" }
        );
    }

    #[test]
    fn test_professional_score_is_real() {
        // marker + digit + capitalized word + no "!!"
        assert_eq!(
            fired("According to officials, 12 people were rescued in Surat"),
            Some("professional language")
        );
    }

    #[test]
    fn test_professional_score_counts() {
        let s = RuleSignals::compute("the sky is green!! today");
        assert_eq!(s.professional_score, 0);
        let s = RuleSignals::compute("the sky is green today");
        assert_eq!(s.professional_score, 1);
        let s = RuleSignals::compute("Prices rose 4 percent");
        assert_eq!(s.professional_score, 3);
    }

    #[test]
    fn test_regional_script_branch() {
        assert_eq!(
            evaluate("पुलिस के अनुसार हादसा सुबह हुआ"),
            RuleVerdict::DefiniteReal { rule: "regional script" }
        );
        assert_eq!(
            evaluate("ચોંકાવનારો ખુલાસો!!"),
            RuleVerdict::DefiniteFake { rule: "regional script" }
        );
        assert_eq!(
            evaluate("શહેરમાં વરસાદ"),
            RuleVerdict::DefiniteReal { rule: "regional script" }
        );
    }

    #[test]
    fn test_inconclusive_carries_signals() {
        match evaluate("aliens secretly control the weather!! everyone knows") {
            RuleVerdict::Inconclusive(signals) => {
                assert_eq!(signals.professional_score, 0);
                assert!(signals.punctuation_excess);
                assert_eq!(signals.tokens.len(), 7);
            }
            other => panic!("expected inconclusive, got {other:?}"),
        }
    }

    #[test]
    fn test_rule_table_order() {
        let names: Vec<_> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "clickbait phrase",
                "punctuation burst",
                "all-caps sensationalism",
                "reputable source",
                "professional language",
                "regional script",
            ]
        );
    }

    #[test]
    fn test_empty_text_is_inconclusive() {
        assert!(matches!(evaluate(""), RuleVerdict::Inconclusive(_)));
    }
}
