//! Headline scraper for routed news sites.
//!
//! Each routed endpoint names a page and a CSS selector. Every element matching
//! the selector is one candidate article; its text nodes are joined and trimmed.
//! Relative links are never followed, the headline text is the article.

use crate::routing::SourceEndpoint;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument};

use super::FetchError;

/// Fetch `endpoint.url` and extract the text of every selector match.
///
/// # Returns
///
/// Non-empty texts in document order, or an error if the page could not be
/// fetched or the selector does not parse.
#[instrument(level = "info", skip_all, fields(url = %endpoint.url))]
pub async fn scrape_headlines(client: &Client, endpoint: &SourceEndpoint) -> Result<Vec<String>, FetchError> {
    let selector = Selector::parse(&endpoint.selector).map_err(|_| FetchError::Selector {
        selector: endpoint.selector.clone(),
    })?;

    let body = client
        .get(&endpoint.url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let headlines = extract_headlines(&body, &selector);
    info!(count = headlines.len(), "Scraped headlines");
    debug!(headlines = ?headlines, "Scraped texts");
    Ok(headlines)
}

/// Text of every element matching `selector`, whitespace-joined and trimmed.
pub fn extract_headlines(html: &str, selector: &Selector) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(selector)
        .map(|element| {
            element
                .text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|text| !text.is_empty())
        .collect()
}
