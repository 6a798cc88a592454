//! Article fetching from routed news sites and news search APIs.
//!
//! Everything the aggregator needs from the network goes through the
//! [`NewsFetcher`] trait, so the pipeline can be driven by a mock in tests.
//! [`HttpFetcher`] is the production implementation:
//!
//! | Path | Module | Method | Notes |
//! |------|--------|--------|-------|
//! | Routed sites | [`html`] | HTML scraping | One headline per CSS selector match |
//! | NewsAPI | [`newsapi`] | `v2/everything` | Requires API key |
//! | NewsData | [`newsapi`] | `api/1/news` | Requires API key, India only |
//!
//! Fetchers return raw texts only. Caps, validity filtering and locale filtering
//! are the aggregator's business.

pub mod html;
pub mod newsapi;

use crate::routing::SourceEndpoint;
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;
use thiserror::Error;

pub use newsapi::{ApiCandidate, NewsApi};

pub const DEFAULT_NEWSAPI_BASE: &str = "https://newsapi.org/";
pub const DEFAULT_NEWSDATA_BASE: &str = "https://newsdata.io/";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid selector {selector:?}")]
    Selector { selector: String },
    #[error("{api} returned status {status:?}: {message}")]
    Api {
        api: &'static str,
        status: String,
        message: String,
    },
    #[error("no API key configured for {0}")]
    MissingKey(&'static str),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// The fetch primitive the aggregator is built on.
pub trait NewsFetcher {
    /// Raw headline texts from one routed site, in page order.
    async fn scrape(&self, endpoint: &SourceEndpoint) -> Result<Vec<String>, FetchError>;

    /// Combined article texts from a news search API for `query`.
    async fn search(&self, api: NewsApi, query: &str) -> Result<Vec<String>, FetchError>;
}

/// Keys and base URLs for the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub newsapi_key: Option<String>,
    pub newsdata_key: Option<String>,
    pub newsapi_base: String,
    pub newsdata_base: String,
    pub timeout: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            newsapi_key: None,
            newsdata_key: None,
            newsapi_base: DEFAULT_NEWSAPI_BASE.to_string(),
            newsdata_base: DEFAULT_NEWSDATA_BASE.to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Production [`NewsFetcher`] over one shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    config: FetcherConfig,
}

impl HttpFetcher {
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    /// Whole NewsAPI hits for `query`, used for source attribution.
    pub async fn candidates(&self, query: &str, page_size: usize) -> Result<Vec<ApiCandidate>, FetchError> {
        newsapi::candidates(&self.client, &self.config, query, page_size).await
    }
}

impl NewsFetcher for HttpFetcher {
    async fn scrape(&self, endpoint: &SourceEndpoint) -> Result<Vec<String>, FetchError> {
        html::scrape_headlines(&self.client, endpoint).await
    }

    async fn search(&self, api: NewsApi, query: &str) -> Result<Vec<String>, FetchError> {
        newsapi::search(&self.client, &self.config, api, query).await
    }
}
