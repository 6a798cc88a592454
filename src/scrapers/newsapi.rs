//! Clients for the two JSON news search APIs.
//!
//! - **NewsAPI** (`v2/everything`): worldwide English search, 15 hits per call,
//!   `status == "ok"` on success.
//! - **NewsData** (`api/1/news`): English results restricted to India,
//!   `status == "success"` on success.
//!
//! Hits are flattened into one text each, `"{source}: {title}. {description}"`
//! plus the start of the body when the API provides one, so the classifier sees
//! the outlet name and enough context.

use crate::models::Origin;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::{FetchError, FetcherConfig};

/// Body characters appended to a combined hit.
const CONTENT_PREFIX_CHARS: usize = 200;
/// Combined hits this short carry too little to classify.
const MIN_COMBINED_CHARS: usize = 50;
const NEWSAPI_PAGE_SIZE: &str = "15";

/// Which search API to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsApi {
    NewsApi,
    NewsData,
}

impl NewsApi {
    pub fn name(self) -> &'static str {
        match self {
            NewsApi::NewsApi => "NewsAPI",
            NewsApi::NewsData => "NewsData",
        }
    }

    pub fn origin(self) -> Origin {
        match self {
            NewsApi::NewsApi => Origin::ApiA,
            NewsApi::NewsData => Origin::ApiB,
        }
    }

    fn success_status(self) -> &'static str {
        match self {
            NewsApi::NewsApi => "ok",
            NewsApi::NewsData => "success",
        }
    }

    fn hits_field(self) -> &'static str {
        match self {
            NewsApi::NewsApi => "articles",
            NewsApi::NewsData => "results",
        }
    }
}

/// Add Indian context to a query; bare "latest"/"news" becomes "India".
pub fn enhance_query(api: NewsApi, query: &str) -> String {
    let q = query.trim();
    if matches!(q.to_lowercase().as_str(), "latest" | "news") {
        return "India".to_string();
    }
    match api {
        NewsApi::NewsApi => format!("{q} India OR Gujarat"),
        NewsApi::NewsData => format!("{q} India Gujarat"),
    }
}

#[derive(Debug, Default, Deserialize)]
struct HitSource {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiHit {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, alias = "link")]
    url: Option<String>,
    #[serde(default)]
    source: Option<HitSource>,
    #[serde(default)]
    source_id: Option<String>,
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ApiHit {
    fn source_name(&self) -> &str {
        self.source
            .as_ref()
            .and_then(|s| non_empty(&s.name))
            .or_else(|| non_empty(&self.source_id))
            .unwrap_or("")
    }

    /// The flattened article text, or `None` when the hit is unusable.
    fn combined(&self) -> Option<String> {
        let title = non_empty(&self.title)?;
        let description = non_empty(&self.description)?;
        let mut text = format!("{}: {title}. {description}", self.source_name());
        if let Some(content) = non_empty(&self.content) {
            text.push(' ');
            text.extend(content.chars().take(CONTENT_PREFIX_CHARS));
        }
        (text.chars().count() > MIN_COMBINED_CHARS).then_some(text)
    }
}

/// A search hit kept whole, for source attribution.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCandidate {
    pub title: String,
    pub description: String,
    pub source: String,
    pub url: String,
}

impl From<ApiHit> for ApiCandidate {
    fn from(hit: ApiHit) -> Self {
        Self {
            source: hit.source_name().to_string(),
            title: hit.title.unwrap_or_default().trim().to_string(),
            description: hit.description.unwrap_or_default().trim().to_string(),
            url: hit.url.unwrap_or_default(),
        }
    }
}

fn build_url(config: &FetcherConfig, api: NewsApi, query: &str, page_size: &str) -> Result<Url, FetchError> {
    let key = match api {
        NewsApi::NewsApi => config.newsapi_key.as_deref(),
        NewsApi::NewsData => config.newsdata_key.as_deref(),
    }
    .filter(|k| !k.is_empty())
    .ok_or(FetchError::MissingKey(api.name()))?;

    let mut url = match api {
        NewsApi::NewsApi => Url::parse(&config.newsapi_base)?.join("v2/everything")?,
        NewsApi::NewsData => Url::parse(&config.newsdata_base)?.join("api/1/news")?,
    };
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("q", query);
        match api {
            NewsApi::NewsApi => {
                pairs
                    .append_pair("apiKey", key)
                    .append_pair("pageSize", page_size)
                    .append_pair("language", "en")
                    .append_pair("sortBy", "publishedAt");
            }
            NewsApi::NewsData => {
                pairs
                    .append_pair("apikey", key)
                    .append_pair("language", "en")
                    .append_pair("country", "in");
            }
        }
    }
    Ok(url)
}

async fn fetch_hits(client: &Client, api: NewsApi, url: Url) -> Result<Vec<ApiHit>, FetchError> {
    let mut body: Value = client.get(url).send().await?.error_for_status()?.json().await?;

    let status = body
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if status != api.success_status() {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| body.pointer("/results/message").and_then(Value::as_str))
            .unwrap_or("Unknown error")
            .to_string();
        return Err(FetchError::Api {
            api: api.name(),
            status,
            message,
        });
    }

    let hits = match body.get_mut(api.hits_field()).map(Value::take) {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<ApiHit>(item).ok())
            .collect(),
        _ => Vec::new(),
    };
    Ok(hits)
}

/// Search `api` for `query` and flatten the hits into article texts.
///
/// A missing key is logged and yields no articles.
#[instrument(level = "info", skip(client, config, api), fields(api = api.name()))]
pub async fn search(
    client: &Client,
    config: &FetcherConfig,
    api: NewsApi,
    query: &str,
) -> Result<Vec<String>, FetchError> {
    let enhanced = enhance_query(api, query);
    let url = match build_url(config, api, &enhanced, NEWSAPI_PAGE_SIZE) {
        Ok(url) => url,
        Err(FetchError::MissingKey(name)) => {
            warn!(api = name, "API key not configured; skipping");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let hits = fetch_hits(client, api, url).await?;
    let total = hits.len();
    let texts: Vec<String> = hits.iter().filter_map(ApiHit::combined).collect();
    info!(total, kept = texts.len(), %enhanced, "Fetched API articles");
    Ok(texts)
}

/// Raw search hits for `query`, unmodified, from NewsAPI.
#[instrument(level = "debug", skip(client, config))]
pub async fn candidates(
    client: &Client,
    config: &FetcherConfig,
    query: &str,
    page_size: usize,
) -> Result<Vec<ApiCandidate>, FetchError> {
    let url = build_url(config, NewsApi::NewsApi, query, &page_size.to_string())?;
    let hits = fetch_hits(client, NewsApi::NewsApi, url).await?;
    debug!(count = hits.len(), "Fetched attribution candidates");
    Ok(hits.into_iter().map(ApiCandidate::from).collect())
}
