//! Text cleaning for model input.
//!
//! Two levels of cleaning are provided:
//! - [`strip_noise`]: lowercases and removes URLs, HTML tags and email addresses.
//!   Used for the length floor and model selection.
//! - [`normalize`]: the full pipeline fed to the statistical models, which also
//!   drops anything outside `a-z`, stopwords and tokens shorter than 3 characters.
//!
//! Both are pure and total: empty input yields an empty string.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+|www\.\S+").unwrap());
static HTML_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<.*?>").unwrap());
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+@\S+").unwrap());
static NON_ALPHA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z\s]").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

const STOPWORD_LIST: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his",
    "himself", "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself",
    "they", "them", "their", "theirs", "themselves", "what", "which", "who", "whom", "this",
    "that", "that'll", "these", "those", "am", "is", "are", "was", "were", "be", "been",
    "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an", "the",
    "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by", "for",
    "with", "about", "against", "between", "into", "through", "during", "before", "after",
    "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under",
    "again", "further", "then", "once",
];

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| STOPWORD_LIST.iter().copied().collect());

/// Lowercase and strip URLs, HTML tags and email addresses, then trim.
///
/// Punctuation, digits and non-Latin letters survive, so the result is suitable
/// for measuring how much real content a text carries.
pub fn strip_noise(text: &str) -> String {
    let lower = text.to_lowercase();
    let no_urls = URL_RE.replace_all(&lower, "");
    let no_emails = EMAIL_RE.replace_all(&no_urls, "");
    let no_html = HTML_RE.replace_all(&no_emails, "");
    no_html.trim().to_string()
}

/// Full normalization for the statistical models.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize("This is a TEST!"), "test");
/// assert_eq!(normalize("Visit www.example.com for more"), "visit more");
/// ```
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let lower = text.to_lowercase();
    let no_urls = URL_RE.replace_all(&lower, "");
    let no_html = HTML_RE.replace_all(&no_urls, "");
    let no_emails = EMAIL_RE.replace_all(&no_html, "");
    let letters_only = NON_ALPHA_RE.replace_all(&no_emails, " ");
    let collapsed = WHITESPACE_RE.replace_all(&letters_only, " ");

    collapsed
        .split_whitespace()
        .filter(|word| word.chars().count() > 2 && !STOPWORDS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}
