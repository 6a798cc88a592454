//! Small helpers shared across the application.
//!
//! - Edition (time of day) classification for report file names
//! - Char-safe truncation for logging article text
//! - Slugs for file names and capitalization for city URLs
//! - File system validation for output directories

use chrono::{Local, Timelike};
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, instrument};

/// Classify an hour of the day into an edition name.
///
/// - **morning**: 00:00 - 08:00
/// - **afternoon**: 08:00 - 16:00
/// - **evening**: 16:00 - 24:00
pub fn edition_for_hour(hour: u32) -> &'static str {
    match hour {
        0..=7 => "morning",
        8..=15 => "afternoon",
        _ => "evening",
    }
}

/// Edition name for the current local time.
pub fn time_of_day() -> String {
    let hour = Local::now().hour();
    let which = edition_for_hour(hour);
    debug!(hour, %which, "Computed time_of_day");
    which.to_string()
}

/// Truncate a string for logging purposes.
///
/// Strings longer than `max` characters are cut at a character boundary and
/// suffixed with an ellipsis and the number of characters dropped.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("અમદાવાદ", 3), "અમદ…(+4 chars)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let total = s.chars().count();
    if total <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{head}…(+{} chars)", total - max)
    }
}

/// Convert free text to a lowercase, hyphenated slug.
///
/// Non-alphanumeric characters other than spaces and hyphens are removed and
/// whitespace runs become a single hyphen. Letters in any script are kept.
pub fn slugify_title(title: &str) -> String {
    title
        .to_lowercase()
        .replace(|c: char| !c.is_alphanumeric() && !c.is_whitespace() && c != '-', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// City slug as it appears in a `{Slug}` URL template.
///
/// ```ignore
/// let url = "https://www.thehindu.com/news/cities/{Slug}/".replace("{Slug}", &upcase("kochi"));
/// assert_eq!(url, "https://www.thehindu.com/news/cities/Kochi/");
/// ```
pub fn upcase(slug: &str) -> String {
    let mut chars = slug.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable
/// (permission denied, read-only filesystem, etc.).
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let probe = path.join("..__probe_write__");
    fs::write(&probe, b"").await?;
    let _ = fs::remove_file(&probe).await;
    info!("Output directory is writable");
    Ok(())
}
