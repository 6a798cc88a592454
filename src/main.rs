//! # TruthGuard
//!
//! Fake news detection for English, Hindi and Gujarati news.
//!
//! ## Features
//!
//! - Classifies a single text as Real or Fake with a reliability tier and a
//!   short rationale, combining deterministic rules with optional statistical
//!   models (one for headlines, one for full articles)
//! - Aggregates news for a query, region, city and language from routed news
//!   sites and two news search APIs, then classifies every article
//! - Prints labels in the reader's language and can write report JSON to disk
//!
//! ## Usage
//!
//! ```sh
//! truthguard classify --text "Reuters: Markets close higher as GDP data beats forecasts."
//! truthguard aggregate --city Surat --state Gujarat --language gu -j ./reports
//! ```
//!
//! ## Architecture
//!
//! 1. **Startup**: load model artifacts and the source routing table once
//! 2. **Fetching**: search APIs, then scrape routed sites, each under a timeout
//! 3. **Filtering**: validity window, locale relevance, merge, dedupe, cap
//! 4. **Classification**: translate to English, rules, then the model ensemble
//! 5. **Output**: JSON on stdout, optionally a report file

use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregator;
mod attribution;
mod classifier;
mod cli;
mod engine;
mod language;
mod models;
mod normalize;
mod outputs;
mod routing;
mod rules;
mod scrapers;
mod translate;
mod utils;
mod validators;

use aggregator::{Aggregator, LocaleQuery};
use attribution::{SourceMatch, attribute};
use classifier::ClassifierBundle;
use cli::{AggregateArgs, ClassifyArgs, Cli, Command};
use engine::DecisionEngine;
use models::LanguageCode;
use outputs::json;
use routing::RoutingTable;
use scrapers::{FetcherConfig, HttpFetcher};
use serde::Serialize;
use translate::{HttpTranslator, LocalizedVerdict, TranslationAdapter};
use utils::ensure_writable_dir;
use validators::{MAX_TEXT_CHARS, MIN_TEXT_CHARS, sanitize_input, validate_text_input};

/// What `classify` prints.
#[derive(Debug, Serialize)]
struct ClassifyOutput {
    text_language: LanguageCode,
    #[serde(flatten)]
    verdict: LocalizedVerdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<SourceMatch>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args.headline_model, ?args.article_model, ?args.routes, "Parsed CLI arguments");

    let models = ClassifierBundle::load(args.headline_model.as_deref(), args.article_model.as_deref());
    if models.is_empty() {
        warn!("No model loaded; verdicts rely on rules and safe defaults");
    }
    let engine = DecisionEngine::new(models);

    let timeout = Duration::from_secs(args.source_timeout_secs);
    let fetcher = HttpFetcher::new(FetcherConfig {
        newsapi_key: args.newsapi_key.clone(),
        newsdata_key: args.newsdata_key.clone(),
        timeout,
        ..Default::default()
    })?;
    let translator = HttpTranslator::new(args.translate_url.as_deref(), timeout)?;

    match args.command {
        Command::Classify(ref cmd) => run_classify(cmd, engine, fetcher, translator).await?,
        Command::Aggregate(ref cmd) => {
            let routes = match &args.routes {
                Some(path) => RoutingTable::from_path(path)?,
                None => RoutingTable::builtin()?,
            };
            run_aggregate(cmd, Aggregator::new(fetcher, translator, engine, routes, timeout)).await?
        }
    }

    info!(elapsed = ?start_time.elapsed(), "truthguard finished");
    Ok(())
}

fn parse_language(raw: &str) -> LanguageCode {
    LanguageCode::parse(raw).unwrap_or_else(|| {
        warn!(language = raw, "Unsupported language; using English");
        LanguageCode::En
    })
}

#[instrument(level = "info", skip_all)]
async fn run_classify(
    cmd: &ClassifyArgs,
    engine: DecisionEngine,
    fetcher: HttpFetcher,
    translator: HttpTranslator,
) -> Result<(), Box<dyn Error>> {
    let raw = match &cmd.text {
        Some(text) => text.clone(),
        None => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };

    let text = sanitize_input(&raw);
    if let Err(e) = validate_text_input(&text, MIN_TEXT_CHARS, MAX_TEXT_CHARS) {
        error!(error = %e, "Rejected input");
        return Err(e.into());
    }

    let text_language = language::detect(&text);
    info!(language = text_language.name(), chars = text.chars().count(), "Classifying text");
    let english = TranslationAdapter::new(translator)
        .to_english(&text, text_language)
        .await;
    let verdict = engine.classify(&english);

    let source = if cmd.attribute {
        Some(attribute(&fetcher, &text).await)
    } else {
        None
    };

    let output = ClassifyOutput {
        text_language,
        verdict: LocalizedVerdict::new(verdict, parse_language(&cmd.language)),
        source,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[instrument(level = "info", skip_all)]
async fn run_aggregate(
    cmd: &AggregateArgs,
    aggregator: Aggregator<HttpFetcher, HttpTranslator>,
) -> Result<(), Box<dyn Error>> {
    // Fail before fetching anything if the report cannot be written.
    if let Some(dir) = &cmd.json_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir.display(),
                error = %e,
                "JSON output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    let query = LocaleQuery::new(
        &cmd.query,
        &cmd.region,
        &cmd.city,
        &cmd.state,
        parse_language(&cmd.language),
    );
    let report = aggregator.aggregate(&query).await.to_report();
    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(dir) = &cmd.json_output_dir {
        let path = json::write_report(&report, dir, &query.query).await?;
        info!(path = %path.display(), "Report saved");
    }
    Ok(())
}
