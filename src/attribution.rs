//! Best-effort lookup of where a piece of news text was published.
//!
//! The first 16 words of the text are sent to NewsAPI as a search query and
//! every hit is scored by word overlap with the input. The best hit is reported
//! when at least a quarter of the input's long words appear in it.

use crate::scrapers::{ApiCandidate, HttpFetcher};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

const SNIPPET_WORDS: usize = 16;
const SNIPPET_CHARS: usize = 200;
const CANDIDATE_PAGE_SIZE: usize = 5;
/// Words this short or shorter are ignored when scoring.
const MIN_WORD_CHARS: usize = 3;
pub const MIN_OVERLAP_SCORE: f64 = 0.25;
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// The attributed source of a text, or `Unknown` in every field but `url`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceMatch {
    pub title: String,
    pub source: String,
    pub url: String,
}

impl SourceMatch {
    pub fn unknown() -> Self {
        Self {
            title: "Unknown".to_string(),
            source: "Unknown".to_string(),
            url: String::new(),
        }
    }

    fn from_candidate(candidate: &ApiCandidate) -> Self {
        let or_unknown = |s: &str| {
            if s.is_empty() {
                "Unknown".to_string()
            } else {
                s.to_string()
            }
        };
        Self {
            title: or_unknown(&candidate.title),
            source: or_unknown(&candidate.source),
            url: candidate.url.clone(),
        }
    }
}

/// Search query built from the start of `text`.
pub fn snippet(text: &str) -> String {
    let cleaned = WHITESPACE_RE.replace_all(text.trim(), " ");
    let words: Vec<&str> = cleaned.split(' ').collect();
    let head = if words.len() > SNIPPET_WORDS {
        words[..SNIPPET_WORDS].join(" ")
    } else {
        cleaned.to_string()
    };
    head.chars().take(SNIPPET_CHARS).collect()
}

fn long_words(text: &str) -> HashSet<String> {
    WORD_RE
        .find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .filter(|w| w.chars().count() > MIN_WORD_CHARS)
        .collect()
}

/// Share of the text's long words that also appear in `candidate_text`.
pub fn overlap_score(text: &str, candidate_text: &str) -> f64 {
    let text_words = long_words(text);
    let candidate_words = long_words(candidate_text);
    if text_words.is_empty() || candidate_words.is_empty() {
        return 0.0;
    }
    text_words.intersection(&candidate_words).count() as f64 / text_words.len() as f64
}

/// The highest scoring candidate, if it clears [`MIN_OVERLAP_SCORE`]. Ties keep the earlier one.
pub fn best_match<'a>(text: &str, candidates: &'a [ApiCandidate]) -> Option<(&'a ApiCandidate, f64)> {
    let mut best: Option<(&ApiCandidate, f64)> = None;
    for candidate in candidates {
        let candidate_text = format!("{}. {}", candidate.title, candidate.description);
        let score = overlap_score(text, &candidate_text);
        if score > best.map_or(0.0, |(_, s)| s) {
            best = Some((candidate, score));
        }
    }
    best.filter(|(_, score)| *score >= MIN_OVERLAP_SCORE)
}

/// Look up the likely publisher of `text`. Any failure yields [`SourceMatch::unknown`].
#[instrument(level = "info", skip_all)]
pub async fn attribute(fetcher: &HttpFetcher, text: &str) -> SourceMatch {
    if text.trim().is_empty() {
        return SourceMatch::unknown();
    }
    let query = snippet(text);
    let candidates = match timeout(LOOKUP_TIMEOUT, fetcher.candidates(&query, CANDIDATE_PAGE_SIZE)).await {
        Ok(Ok(candidates)) => candidates,
        Ok(Err(e)) => {
            warn!(error = %e, "Source lookup failed");
            return SourceMatch::unknown();
        }
        Err(_) => {
            warn!(timeout = ?LOOKUP_TIMEOUT, "Source lookup timed out");
            return SourceMatch::unknown();
        }
    };
    debug!(count = candidates.len(), %query, "Scoring attribution candidates");

    match best_match(text, &candidates) {
        Some((candidate, score)) => {
            info!(source = %candidate.source, score, "Attributed source");
            SourceMatch::from_candidate(candidate)
        }
        None => SourceMatch::unknown(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::FetcherConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn candidate(title: &str, description: &str, source: &str) -> ApiCandidate {
        ApiCandidate {
            title: title.to_string(),
            description: description.to_string(),
            source: source.to_string(),
            url: format!("https://example.com/{}", source.to_lowercase()),
        }
    }

    #[test]
    fn test_snippet_limits_words_and_chars() {
        let text = "one  two\tthree four five six seven eight nine ten eleven twelve thirteen fourteen fifteen sixteen seventeen";
        assert_eq!(
            snippet(text),
            "one two three four five six seven eight nine ten eleven twelve thirteen fourteen fifteen sixteen"
        );
        assert_eq!(snippet(&"x".repeat(300)).chars().count(), 200);
    }

    #[test]
    fn test_overlap_score_ignores_short_words() {
        // long words: "monsoon", "arrives", "early", "kerala"
        let score = overlap_score("The monsoon arrives early in Kerala", "Kerala monsoon update");
        assert!((score - 0.5).abs() < 1e-9);
        assert_eq!(overlap_score("a an the", "a an the"), 0.0);
    }

    #[test]
    fn test_best_match_picks_highest_score() {
        let candidates = vec![
            candidate("Cricket league opens", "Fans throng stadium", "ESPN"),
            candidate("Monsoon arrives early in Kerala", "IMD confirms onset", "The Hindu"),
        ];
        let (best, score) = best_match("Monsoon arrives early in Kerala, says IMD", &candidates).unwrap();
        assert_eq!(best.source, "The Hindu");
        assert!(score >= MIN_OVERLAP_SCORE);
    }

    #[test]
    fn test_best_match_below_threshold() {
        let candidates = vec![candidate("Markets rally", "Sensex gains", "Mint")];
        assert!(best_match("Monsoon arrives early in Kerala this year", &candidates).is_none());
        assert!(best_match("anything at all", &[]).is_none());
    }

    #[tokio::test]
    async fn test_attribute_via_api() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "articles": [{
                    "source": { "name": "Reuters" },
                    "title": "Central bank holds repo rate steady",
                    "description": "Policy committee keeps rates unchanged for fifth meeting",
                    "url": "https://example.com/repo"
                }]
            })))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(FetcherConfig {
            newsapi_key: Some("key".to_string()),
            newsapi_base: format!("{}/", server.uri()),
            ..Default::default()
        })
        .unwrap();
        let found = attribute(&fetcher, "Central bank holds repo rate steady at policy meeting").await;
        assert_eq!(
            found,
            SourceMatch {
                title: "Central bank holds repo rate steady".to_string(),
                source: "Reuters".to_string(),
                url: "https://example.com/repo".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_attribute_without_key_is_unknown() {
        let fetcher = HttpFetcher::new(FetcherConfig::default()).unwrap();
        assert_eq!(attribute(&fetcher, "Some news text here").await, SourceMatch::unknown());
        assert_eq!(attribute(&fetcher, "   ").await, SourceMatch::unknown());
    }
}
