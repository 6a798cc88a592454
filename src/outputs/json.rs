//! JSON report files.
//!
//! Reports are grouped in one directory per local date and named after the
//! query and the time of day the feed was built, so repeated runs of the same
//! query on one day keep one file per edition.

use crate::models::FeedReport;
use crate::utils::{slugify_title, time_of_day};
use chrono::Local;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// File name stem used when the query slug is empty.
const FALLBACK_STEM: &str = "feed";

/// File name for a report on `query` built at `edition` (morning/afternoon/evening).
pub fn report_file_name(query: &str, edition: &str) -> String {
    let slug = slugify_title(query.trim());
    let stem = if slug.is_empty() { FALLBACK_STEM } else { slug.as_str() };
    format!("{stem}_{edition}.json")
}

/// Write `report` as pretty JSON under `{output_dir}/{date}/`.
///
/// # Arguments
///
/// * `report` - The aggregated feed
/// * `output_dir` - Base directory for reports
/// * `query` - The query the feed answers, used for the file name
///
/// # Returns
///
/// The path of the written file.
#[instrument(level = "info", skip(report), fields(output_dir = %output_dir.display()))]
pub async fn write_report(report: &FeedReport, output_dir: &Path, query: &str) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(report)?;

    let date_dir = output_dir.join(Local::now().date_naive().to_string());
    if let Err(e) = fs::create_dir_all(&date_dir).await {
        error!(dir = %date_dir.display(), error = %e, "Failed to create report dir");
        return Err(e.into());
    }

    let path = date_dir.join(report_file_name(query, &time_of_day()));
    fs::write(&path, json).await?;
    info!(path = %path.display(), entries = report.news.len(), "Wrote JSON report");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeedEntry, NewsFeed};

    #[test]
    fn test_report_file_name() {
        assert_eq!(report_file_name("Monsoon floods", "evening"), "monsoon-floods_evening.json");
        assert_eq!(report_file_name("", "morning"), "feed_morning.json");
    }

    #[tokio::test]
    async fn test_write_report_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let report = NewsFeed {
            entries: vec![FeedEntry::no_results("nothing here".to_string())],
        }
        .to_report();

        let path = write_report(&report, dir.path(), "latest").await.unwrap();
        assert!(path.starts_with(dir.path()));
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("latest_"));

        let written: FeedReport = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, report);
    }
}
