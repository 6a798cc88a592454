//! Command-line interface definitions for TruthGuard.
//!
//! All global options can be provided via command-line flags or environment
//! variables. Two subcommands are offered: `classify` for a single text and
//! `aggregate` for a locale-filtered, classified news feed.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for TruthGuard.
///
/// # Examples
///
/// ```sh
/// # Classify one headline
/// truthguard --headline-model models/headline.json classify --text "Reuters: Markets close higher"
///
/// # Classify text from stdin, with source attribution
/// echo "..." | truthguard --newsapi-key KEY classify --attribute
///
/// # Classified city news in Gujarati, also written to disk
/// truthguard aggregate --city Surat --state Gujarat --language gu --json-output-dir ./reports
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Model artifact for short texts (headlines)
    #[arg(long, global = true, env = "TRUTHGUARD_HEADLINE_MODEL")]
    pub headline_model: Option<PathBuf>,

    /// Model artifact for full articles
    #[arg(long, global = true, env = "TRUTHGUARD_ARTICLE_MODEL")]
    pub article_model: Option<PathBuf>,

    /// Source routing table replacing the built-in one
    #[arg(long, global = true, env = "TRUTHGUARD_ROUTES")]
    pub routes: Option<PathBuf>,

    /// NewsAPI key
    #[arg(long, global = true, env = "NEWSAPI_KEY", hide_env_values = true)]
    pub newsapi_key: Option<String>,

    /// NewsData key
    #[arg(long, global = true, env = "NEWSDATA_KEY", hide_env_values = true)]
    pub newsdata_key: Option<String>,

    /// Base URL of a LibreTranslate-compatible service
    #[arg(long, global = true, env = "TRANSLATE_URL")]
    pub translate_url: Option<String>,

    /// Per-source fetch timeout in seconds
    #[arg(long, global = true, default_value_t = 15)]
    pub source_timeout_secs: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify a single news text as Real or Fake
    Classify(ClassifyArgs),
    /// Fetch, filter and classify news for a query and locale
    Aggregate(AggregateArgs),
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Text to classify; read from stdin when absent
    #[arg(short, long)]
    pub text: Option<String>,

    /// Language for the printed labels (en, hi, gu)
    #[arg(short, long, default_value = "en")]
    pub language: String,

    /// Also look up the likely publisher via NewsAPI
    #[arg(long)]
    pub attribute: bool,
}

#[derive(Args, Debug)]
pub struct AggregateArgs {
    /// Search query; "latest" asks for general news
    #[arg(short, long, default_value = "latest")]
    pub query: String,

    /// Region: gujarat, india or international
    #[arg(short, long, default_value = "")]
    pub region: String,

    /// City to focus on
    #[arg(short, long, default_value = "")]
    pub city: String,

    /// State the city belongs to
    #[arg(short, long, default_value = "")]
    pub state: String,

    /// Preferred article language (en, hi, gu)
    #[arg(short, long, default_value = "en")]
    pub language: String,

    /// Directory to also write the report JSON into
    #[arg(short, long)]
    pub json_output_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_parsing() {
        let cli = Cli::parse_from([
            "truthguard",
            "--headline-model",
            "/models/headline.json",
            "classify",
            "--text",
            "Reuters: Markets close higher",
            "--attribute",
        ]);
        assert_eq!(cli.headline_model, Some(PathBuf::from("/models/headline.json")));
        assert_eq!(cli.source_timeout_secs, 15);
        match cli.command {
            Command::Classify(args) => {
                assert_eq!(args.text.as_deref(), Some("Reuters: Markets close higher"));
                assert_eq!(args.language, "en");
                assert!(args.attribute);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_aggregate_defaults() {
        let cli = Cli::parse_from(["truthguard", "aggregate"]);
        match cli.command {
            Command::Aggregate(args) => {
                assert_eq!(args.query, "latest");
                assert_eq!(args.region, "");
                assert_eq!(args.city, "");
                assert_eq!(args.language, "en");
                assert!(args.json_output_dir.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_aggregate_short_flags_and_global_after_subcommand() {
        let cli = Cli::parse_from([
            "truthguard",
            "aggregate",
            "-c",
            "Surat",
            "-s",
            "Gujarat",
            "-l",
            "gu",
            "-j",
            "/tmp/reports",
            "--source-timeout-secs",
            "5",
        ]);
        assert_eq!(cli.source_timeout_secs, 5);
        match cli.command {
            Command::Aggregate(args) => {
                assert_eq!(args.city, "Surat");
                assert_eq!(args.state, "Gujarat");
                assert_eq!(args.language, "gu");
                assert_eq!(args.json_output_dir, Some(PathBuf::from("/tmp/reports")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
