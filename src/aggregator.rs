//! The news aggregation pipeline.
//!
//! [`Aggregator::aggregate`] is the batch driver around the decision engine:
//!
//! 1. Search both news APIs (city-narrowed when a city is given).
//! 2. Scrape the routed sites when the query is generic or the APIs came back
//!    thin. At most 5 items per site are considered, then the 20..500 character
//!    validity window and the locale filter are applied.
//! 3. Merge the two pools by query shape (city, region, specific, generic).
//! 4. De-duplicate on the first 100 characters, case-insensitively, and cap at 20.
//! 5. Translate each survivor to English and classify it.
//!
//! Every source is fetched sequentially under its own timeout and a failing
//! source is logged and skipped. The result is never empty: when nothing
//! survives, a single explanatory entry labelled Real is returned.

use crate::engine::DecisionEngine;
use crate::language;
use crate::models::{Article, FeedEntry, Label, LanguageCode, NewsFeed, Origin, Verdict};
use crate::routing::{ExclusionTable, LocaleKey, RoutingTable, SourceEndpoint};
use crate::scrapers::{FetchError, NewsApi, NewsFetcher};
use crate::translate::{TranslationAdapter, Translator};
use crate::utils::truncate_for_log;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};

/// Items considered from each scraped site.
pub const PER_SOURCE_CAP: usize = 5;
/// Maximum entries in a feed.
pub const FEED_CAP: usize = 20;
/// Scraped texts must be strictly longer than this...
const MIN_ARTICLE_CHARS: usize = 20;
/// ...and strictly shorter than this.
const MAX_ARTICLE_CHARS: usize = 500;
/// Leading characters compared when de-duplicating.
const DEDUPE_PREFIX_CHARS: usize = 100;
/// Below this many API articles the scrapers are consulted even for specific queries.
const API_SUFFICIENT: usize = 5;
/// API hits kept when none mention the requested city.
const CITY_FALLBACK_HITS: usize = 5;

const GENERIC_QUERIES: &[&str] = &["latest", "news", "india", "indian", "gujarat", "international", ""];

/// One aggregation request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleQuery {
    pub query: String,
    pub region: String,
    pub city: String,
    pub state: String,
    pub language: LanguageCode,
}

impl LocaleQuery {
    pub fn new(query: &str, region: &str, city: &str, state: &str, language: LanguageCode) -> Self {
        Self {
            query: query.trim().to_string(),
            region: region.trim().to_string(),
            city: city.trim().to_string(),
            state: state.trim().to_string(),
            language,
        }
    }

    /// True for queries that only ask for "the news" rather than a topic.
    pub fn is_generic(&self) -> bool {
        GENERIC_QUERIES.contains(&self.query.to_lowercase().as_str())
    }

    /// Query sent to the search APIs: city and state are appended when a city is set.
    pub fn api_query(&self) -> String {
        if self.city.is_empty() {
            self.query.clone()
        } else {
            format!("{} {} {}", self.query, self.city, self.state)
                .trim()
                .to_string()
        }
    }

    /// "City, State" when a city is set, else the region.
    pub fn location(&self) -> String {
        if self.city.is_empty() {
            self.region.clone()
        } else {
            format!("{}, {}", self.city, self.state)
        }
    }

    pub fn no_results_message(&self) -> String {
        format!(
            "No news found for '{}' in {}. Try a different search term like 'technology', 'politics', 'health', or 'sports'.",
            self.query,
            self.location()
        )
    }

    pub fn locale_key(&self) -> LocaleKey {
        LocaleKey::new(&self.region, &self.city, &self.state, self.language)
    }
}

/// Decides whether a scraped text is relevant to the requested city.
///
/// A text naming the city or state is accepted. For cities without dedicated
/// coverage a text is also accepted when it names no other known city or state.
#[derive(Debug, Clone)]
pub struct LocaleFilter<'a> {
    city: String,
    state: String,
    major_city: bool,
    other_cities: Vec<&'a str>,
    other_states: Vec<&'a str>,
}

impl<'a> LocaleFilter<'a> {
    pub fn new(query: &LocaleQuery, routes: &'a RoutingTable) -> Self {
        Self::with_exclusions(query, routes.is_major_city(&query.city), routes.exclusions())
    }

    pub fn with_exclusions(query: &LocaleQuery, major_city: bool, exclusions: &'a ExclusionTable) -> Self {
        let city = query.city.to_lowercase();
        let state = query.state.to_lowercase();
        let other_cities = exclusions
            .cities
            .iter()
            .map(String::as_str)
            .filter(|c| *c != city)
            .collect();
        let other_states = exclusions
            .states
            .iter()
            .map(String::as_str)
            .filter(|s| state.is_empty() || !(state.contains(s) || s.contains(state.as_str())))
            .collect();
        Self {
            city,
            state,
            major_city,
            other_cities,
            other_states,
        }
    }

    pub fn accepts(&self, text: &str) -> bool {
        if self.city.is_empty() {
            return true;
        }
        let lower = text.to_lowercase();
        if lower.contains(&self.city) || (!self.state.is_empty() && lower.contains(&self.state)) {
            return true;
        }
        if self.major_city {
            return false;
        }
        let elsewhere = self
            .other_cities
            .iter()
            .chain(self.other_states.iter())
            .any(|place| lower.contains(place));
        !elsewhere
    }
}

/// Strictly between 20 and 500 characters.
pub fn is_valid_article(text: &str) -> bool {
    let chars = text.chars().count();
    chars > MIN_ARTICLE_CHARS && chars < MAX_ARTICLE_CHARS
}

fn mentions(article: &Article, needle_lower: &str) -> bool {
    article.raw_text.to_lowercase().contains(needle_lower)
}

/// Keep hits naming the city; if none do, keep the first few.
fn narrow_to_city(texts: Vec<String>, city: &str) -> Vec<String> {
    if city.is_empty() {
        return texts;
    }
    let city = city.to_lowercase();
    let (matching, rest): (Vec<String>, Vec<String>) =
        texts.into_iter().partition(|t| t.to_lowercase().contains(&city));
    if matching.is_empty() {
        rest.into_iter().take(CITY_FALLBACK_HITS).collect()
    } else {
        matching
    }
}

/// Order the API and scraped pools according to the shape of the query.
pub fn merge(query: &LocaleQuery, api: Vec<Article>, scraped: Vec<Article>) -> Vec<Article> {
    if !query.city.is_empty() {
        let city = query.city.to_lowercase();
        let (city_scraped, other_scraped): (Vec<_>, Vec<_>) =
            scraped.into_iter().partition(|a| mentions(a, &city));
        let (city_api, other_api): (Vec<_>, Vec<_>) = api.into_iter().partition(|a| mentions(a, &city));
        debug!(
            city_scraped = city_scraped.len(),
            city_api = city_api.len(),
            "Using city-prioritized merge"
        );
        city_scraped
            .into_iter()
            .take(10)
            .chain(city_api.into_iter().take(5))
            .chain(other_scraped.into_iter().take(3))
            .chain(other_api.into_iter().take(2))
            .collect()
    } else if !query.region.is_empty() {
        let region = query.region.to_lowercase();
        let (regional_api, other_api): (Vec<_>, Vec<_>) = api.into_iter().partition(|a| mentions(a, &region));
        debug!(regional_api = regional_api.len(), "Using region-prioritized merge");
        scraped
            .into_iter()
            .take(10)
            .chain(regional_api.into_iter().take(5))
            .chain(other_api.into_iter().take(5))
            .collect()
    } else if !query.is_generic() && !api.is_empty() {
        debug!("Using API-prioritized merge");
        api.into_iter().take(15).chain(scraped.into_iter().take(5)).collect()
    } else {
        debug!("Using mixed merge");
        api.into_iter().chain(scraped).collect()
    }
}

/// Drop later articles whose first 100 characters repeat an earlier one, then cap.
pub fn dedupe_and_cap(articles: Vec<Article>) -> Vec<Article> {
    articles
        .into_iter()
        .unique_by(|a| {
            a.raw_text
                .chars()
                .take(DEDUPE_PREFIX_CHARS)
                .collect::<String>()
                .to_lowercase()
        })
        .take(FEED_CAP)
        .collect()
}

/// Fetches, filters, merges and classifies news for a locale.
pub struct Aggregator<F, T> {
    fetcher: F,
    translator: TranslationAdapter<T>,
    engine: DecisionEngine,
    routes: RoutingTable,
    source_timeout: Duration,
}

impl<F: NewsFetcher, T: Translator> Aggregator<F, T> {
    pub fn new(
        fetcher: F,
        translator: T,
        engine: DecisionEngine,
        routes: RoutingTable,
        source_timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            translator: TranslationAdapter::new(translator),
            engine,
            routes,
            source_timeout,
        }
    }

    /// Run the whole pipeline for `query`. Never fails and never returns an empty feed.
    #[instrument(level = "info", skip_all, fields(query = %query.query, region = %query.region, city = %query.city, state = %query.state, language = %query.language))]
    pub async fn aggregate(&self, query: &LocaleQuery) -> NewsFeed {
        let api = self.fetch_api(query).await;
        let scraped = if query.is_generic() || api.len() < API_SUFFICIENT {
            self.fetch_scraped(query).await
        } else {
            info!(api = api.len(), "Enough API articles for a specific query; not scraping");
            Vec::new()
        };
        info!(api = api.len(), scraped = scraped.len(), "Collected candidate articles");

        let articles = dedupe_and_cap(merge(query, api, scraped));
        if articles.is_empty() {
            warn!(location = %query.location(), "No news articles survived the pipeline");
            return NewsFeed {
                entries: vec![FeedEntry::no_results(query.no_results_message())],
            };
        }

        let entries: Vec<FeedEntry> = stream::iter(articles)
            .then(|article| async move {
                let verdict = self.classify_article(&article).await;
                FeedEntry::from_article(&article, verdict)
            })
            .collect()
            .await;

        let fake = entries.iter().filter(|e| e.verdict.label == Label::Fake).count();
        let languages = entries.iter().map(|e| e.language.as_str()).unique().join(",");
        info!(
            total = entries.len(),
            real = entries.len() - fake,
            fake,
            %languages,
            "Classified feed"
        );
        NewsFeed { entries }
    }

    /// Translate to English when needed, then classify.
    ///
    /// The translation source is detected from the text itself. An article's
    /// declared language follows its source and may not match its script.
    pub async fn classify_article(&self, article: &Article) -> Verdict {
        let source = language::detect(&article.raw_text);
        let text = self.translator.to_english(&article.raw_text, source).await;
        let verdict = self.engine.classify(&text);
        debug!(
            text = %truncate_for_log(&article.raw_text, 80),
            label = %verdict.label,
            rationale = %verdict.rationale,
            "Classified article"
        );
        verdict
    }

    /// Await a fetch under the per-source timeout; failures are logged and become `None`.
    async fn guarded<Fut>(&self, source: &str, fetch: Fut) -> Option<Vec<String>>
    where
        Fut: Future<Output = Result<Vec<String>, FetchError>>,
    {
        match timeout(self.source_timeout, fetch).await {
            Ok(Ok(texts)) => Some(texts),
            Ok(Err(e)) => {
                error!(%source, error = %e, "Source fetch failed; skipping");
                None
            }
            Err(_) => {
                let e = FetchError::Timeout(self.source_timeout);
                warn!(%source, error = %e, "Source fetch timed out; skipping");
                None
            }
        }
    }

    async fn fetch_api(&self, query: &LocaleQuery) -> Vec<Article> {
        let api_query = query.api_query();
        let mut articles = Vec::new();
        for api in [NewsApi::NewsApi, NewsApi::NewsData] {
            let Some(texts) = self.guarded(api.name(), self.fetcher.search(api, &api_query)).await else {
                continue;
            };
            let returned = texts.len();
            let kept = narrow_to_city(texts, &query.city);
            info!(api = api.name(), returned, kept = kept.len(), %api_query, "API articles");
            articles.extend(kept.into_iter().map(|text| Article {
                detected_language: language::detect(&text),
                source_label: api.name().to_string(),
                origin: api.origin(),
                raw_text: text,
            }));
        }
        articles
    }

    async fn fetch_scraped(&self, query: &LocaleQuery) -> Vec<Article> {
        let route = self.routes.resolve(&query.locale_key());
        info!(scope = ?route.scope, endpoints = route.endpoints.len(), "Scraping routed sources");
        let filter = LocaleFilter::new(query, &self.routes);

        let per_source: Vec<Vec<Article>> = stream::iter(route.endpoints.iter())
            .then(|endpoint| {
                let filter = &filter;
                async move { self.scrape_endpoint(query, endpoint, filter).await }
            })
            .collect()
            .await;
        per_source.into_iter().flatten().collect()
    }

    async fn scrape_endpoint(
        &self,
        query: &LocaleQuery,
        endpoint: &SourceEndpoint,
        filter: &LocaleFilter<'_>,
    ) -> Vec<Article> {
        let Some(texts) = self.guarded(&endpoint.url, self.fetcher.scrape(endpoint)).await else {
            return Vec::new();
        };
        let label = if query.city.is_empty() {
            endpoint.label.clone()
        } else {
            query.city.clone()
        };
        let language = endpoint.language.unwrap_or(query.language);

        let articles: Vec<Article> = texts
            .into_iter()
            .take(PER_SOURCE_CAP)
            .map(|t| t.trim().to_string())
            .filter(|t| is_valid_article(t) && filter.accepts(t))
            .map(|raw_text| Article {
                raw_text,
                source_label: label.clone(),
                detected_language: language,
                origin: Origin::Scrape,
            })
            .collect();
        debug!(url = %endpoint.url, kept = articles.len(), "Scraped articles");
        articles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::TranslateError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ROUTES: &str = r#"
groups:
  india:
    - { url: "https://india.test/1", selector: "h2", label: "India" }
    - { url: "https://india.test/2", selector: "h2", label: "India" }
  gujarati:
    - { url: "https://gu.test/", selector: "h3", label: "Gujarat-ગુજરાત", language: gu }
major_cities:
  surat: { slug: surat, state: gujarat }
city_templates:
  - { url: "https://city.test/{slug}", selector: "h2", label: "India" }
city_default: { groups: [india] }
regions:
  gujarat: { groups: [gujarati, india] }
generic: { groups: [india] }
exclusions:
  cities: [mumbai, surat, delhi]
  states: [maharashtra, gujarat, bihar]
"#;

    #[derive(Default)]
    struct MockFetcher {
        pages: HashMap<String, Vec<String>>,
        newsapi: Option<Vec<String>>,
        newsdata: Option<Vec<String>>,
        delay: Option<Duration>,
        scrapes: AtomicUsize,
    }

    impl MockFetcher {
        fn page(mut self, url: &str, texts: &[&str]) -> Self {
            self.pages
                .insert(url.to_string(), texts.iter().map(|t| t.to_string()).collect());
            self
        }
    }

    fn down(source: &str) -> FetchError {
        FetchError::Api {
            api: "mock",
            status: "down".to_string(),
            message: source.to_string(),
        }
    }

    impl NewsFetcher for MockFetcher {
        async fn scrape(&self, endpoint: &SourceEndpoint) -> Result<Vec<String>, FetchError> {
            self.scrapes.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.pages.get(&endpoint.url).cloned().ok_or_else(|| down(&endpoint.url))
        }

        async fn search(&self, api: NewsApi, _query: &str) -> Result<Vec<String>, FetchError> {
            let hits = match api {
                NewsApi::NewsApi => &self.newsapi,
                NewsApi::NewsData => &self.newsdata,
            };
            hits.clone().ok_or_else(|| down(api.name()))
        }
    }

    struct NoTranslator;

    impl Translator for NoTranslator {
        async fn translate(&self, _: &str, _: LanguageCode, _: LanguageCode) -> Result<String, TranslateError> {
            Err(TranslateError::NotConfigured)
        }
    }

    /// Pretends every text translates to a wire report.
    struct WireTranslator;

    impl Translator for WireTranslator {
        async fn translate(&self, _: &str, _: LanguageCode, _: LanguageCode) -> Result<String, TranslateError> {
            Ok("Reuters confirms the bridge reopened to traffic".to_string())
        }
    }

    /// Counts calls and turns everything into clickbait.
    #[derive(Default)]
    struct RecordingTranslator {
        calls: Arc<AtomicUsize>,
    }

    impl Translator for RecordingTranslator {
        async fn translate(&self, _: &str, _: LanguageCode, _: LanguageCode) -> Result<String, TranslateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("you won't believe this".to_string())
        }
    }

    fn aggregator<T: Translator>(fetcher: MockFetcher, translator: T) -> Aggregator<MockFetcher, T> {
        Aggregator::new(
            fetcher,
            translator,
            DecisionEngine::default(),
            RoutingTable::from_yaml(ROUTES).unwrap(),
            Duration::from_millis(200),
        )
    }

    fn sentence(i: usize) -> String {
        format!("Story number {i} about the municipal budget and roads")
    }

    #[tokio::test]
    async fn test_all_sources_failing_yields_single_entry() {
        let agg = aggregator(MockFetcher::default(), NoTranslator);
        let report = agg
            .aggregate(&LocaleQuery::new("latest", "", "", "", LanguageCode::En))
            .await
            .to_report();
        assert_eq!(
            report.news,
            vec!["No news found for 'latest' in . Try a different search term like 'technology', 'politics', 'health', or 'sports'.".to_string()]
        );
        assert_eq!(report.predictions, vec!["Real News".to_string()]);
        assert_eq!(report.languages, vec![LanguageCode::En]);
        assert_eq!(report.verdicts.len(), 1);
    }

    #[tokio::test]
    async fn test_no_results_message_names_city_and_state() {
        let agg = aggregator(MockFetcher::default(), NoTranslator);
        let feed = agg
            .aggregate(&LocaleQuery::new("floods", "", "Somnath", "Gujarat", LanguageCode::En))
            .await;
        assert_eq!(feed.entries.len(), 1);
        assert!(feed.entries[0].text.starts_with("No news found for 'floods' in Somnath, Gujarat."));
        assert_eq!(feed.entries[0].origin, None);
    }

    #[tokio::test]
    async fn test_duplicates_are_dropped_case_insensitively() {
        let fetcher = MockFetcher::default().page(
            "https://india.test/1",
            &[
                "Heavy rain lashes the coast as schools stay shut",
                "HEAVY RAIN LASHES THE COAST as schools stay shut",
                "Metro ridership crosses one lakh on opening weekend",
            ],
        );
        let feed = aggregator(fetcher, NoTranslator)
            .aggregate(&LocaleQuery::new("latest", "", "", "", LanguageCode::En))
            .await;
        let texts: Vec<&str> = feed.entries.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "[India] Heavy rain lashes the coast as schools stay shut",
                "[India] Metro ridership crosses one lakh on opening weekend",
            ]
        );
    }

    #[tokio::test]
    async fn test_feed_is_capped_and_lists_stay_aligned() {
        let hits: Vec<String> = (0..30).map(sentence).collect();
        let fetcher = MockFetcher {
            newsapi: Some(hits),
            ..Default::default()
        };
        let report = aggregator(fetcher, NoTranslator)
            .aggregate(&LocaleQuery::new("latest", "", "", "", LanguageCode::En))
            .await
            .to_report();
        assert_eq!(report.news.len(), FEED_CAP);
        assert_eq!(report.predictions.len(), FEED_CAP);
        assert_eq!(report.languages.len(), FEED_CAP);
        assert_eq!(report.verdicts.len(), FEED_CAP);
    }

    #[tokio::test]
    async fn test_per_source_cap_applies_before_validity_filter() {
        let fetcher = MockFetcher::default().page(
            "https://india.test/1",
            &[
                "too short",
                &sentence(1),
                &sentence(2),
                &sentence(3),
                &sentence(4),
                &sentence(5),
                &sentence(6),
            ],
        );
        let feed = aggregator(fetcher, NoTranslator)
            .aggregate(&LocaleQuery::new("latest", "", "", "", LanguageCode::En))
            .await;
        assert_eq!(feed.entries.len(), 4);
    }

    #[tokio::test]
    async fn test_failing_source_does_not_abort_batch() {
        // india.test/1 is unknown to the mock and fails.
        let fetcher = MockFetcher::default().page("https://india.test/2", &[&sentence(1)]);
        let feed = aggregator(fetcher, NoTranslator)
            .aggregate(&LocaleQuery::new("latest", "", "", "", LanguageCode::En))
            .await;
        assert_eq!(feed.entries.len(), 1);
        assert_eq!(feed.entries[0].origin, Some(Origin::Scrape));
    }

    #[tokio::test]
    async fn test_slow_source_times_out() {
        let fetcher = MockFetcher {
            delay: Some(Duration::from_secs(5)),
            newsapi: Some(vec![sentence(1)]),
            ..Default::default()
        }
        .page("https://india.test/1", &[&sentence(2)]);
        let feed = aggregator(fetcher, NoTranslator)
            .aggregate(&LocaleQuery::new("latest", "", "", "", LanguageCode::En))
            .await;
        assert_eq!(feed.entries.len(), 1);
        assert_eq!(feed.entries[0].origin, Some(Origin::ApiA));
    }

    #[tokio::test]
    async fn test_city_matches_come_first() {
        let fetcher = MockFetcher {
            newsapi: Some(vec![
                "NDTV: Surat diamond exports rise for the third month running".to_string(),
                "NDTV: Parliament session to begin next week in the capital".to_string(),
            ]),
            newsdata: Some(vec![
                "toi: National highway toll rates revised from Monday".to_string(),
            ]),
            ..Default::default()
        }
        .page(
            "https://city.test/surat",
            &[
                "Surat civic body approves new budget for roads",
                "Flooding reported in low lying parts of the district",
                "Gujarat cabinet approves new textile policy today",
            ],
        );
        let feed = aggregator(fetcher, NoTranslator)
            .aggregate(&LocaleQuery::new("latest", "", "Surat", "Gujarat", LanguageCode::En))
            .await;
        let texts: Vec<&str> = feed.entries.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "[Surat] Surat civic body approves new budget for roads",
                "NDTV: Surat diamond exports rise for the third month running",
                "[Surat] Gujarat cabinet approves new textile policy today",
                "toi: National highway toll rates revised from Monday",
            ]
        );
    }

    #[tokio::test]
    async fn test_region_merge_puts_scraped_first() {
        let fetcher = MockFetcher {
            newsapi: Some(vec![
                "NDTV: Elections announced across five states this spring".to_string(),
                "NDTV: Gujarat records highest rainfall in a decade".to_string(),
            ]),
            ..Default::default()
        }
        .page("https://gu.test/", &["અમદાવાદમાં ભારે વરસાદથી જનજીવન ખોરવાયું"]);
        let feed = aggregator(fetcher, NoTranslator)
            .aggregate(&LocaleQuery::new("latest", "Gujarat", "", "", LanguageCode::En))
            .await;
        assert_eq!(feed.entries[0].origin, Some(Origin::Scrape));
        assert_eq!(feed.entries[0].language, LanguageCode::Gu);
        assert!(feed.entries[0].text.starts_with("[Gujarat-ગુજરાત] "));
        assert_eq!(feed.entries[1].text, "NDTV: Gujarat records highest rainfall in a decade");
        assert_eq!(feed.entries.len(), 3);
    }

    #[tokio::test]
    async fn test_small_city_uses_exclusion_fallback() {
        let fetcher = MockFetcher::default().page(
            "https://india.test/1",
            &[
                "Temple town prepares for the annual fair this week",
                "Mumbai local trains disrupted by heavy rain",
                "Gujarat government announces relief package",
                "Bihar assembly passes the new land reform bill",
            ],
        );
        let feed = aggregator(fetcher, NoTranslator)
            .aggregate(&LocaleQuery::new("latest", "", "Somnath", "Gujarat", LanguageCode::En))
            .await;
        let texts: Vec<&str> = feed.entries.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "[Somnath] Temple town prepares for the annual fair this week",
                "[Somnath] Gujarat government announces relief package",
            ]
        );
    }

    #[tokio::test]
    async fn test_specific_query_with_enough_api_hits_skips_scraping() {
        let fetcher = MockFetcher {
            newsapi: Some((0..6).map(sentence).collect()),
            ..Default::default()
        }
        .page("https://india.test/1", &[&sentence(99)]);
        let agg = aggregator(fetcher, NoTranslator);
        let feed = agg
            .aggregate(&LocaleQuery::new("budget", "", "", "", LanguageCode::En))
            .await;
        assert_eq!(feed.entries.len(), 6);
        assert_eq!(agg.fetcher.scrapes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_specific_query_puts_api_first() {
        let fetcher = MockFetcher {
            newsapi: Some(vec![sentence(1), sentence(2)]),
            ..Default::default()
        }
        .page("https://india.test/1", &[&sentence(3)]);
        let feed = aggregator(fetcher, NoTranslator)
            .aggregate(&LocaleQuery::new("budget", "", "", "", LanguageCode::En))
            .await;
        let origins: Vec<_> = feed.entries.iter().map(|e| e.origin).collect();
        assert_eq!(
            origins,
            vec![Some(Origin::ApiA), Some(Origin::ApiA), Some(Origin::Scrape)]
        );
    }

    #[tokio::test]
    async fn test_non_english_articles_are_translated_before_classification() {
        let fetcher = MockFetcher::default().page("https://gu.test/", &["પુલ ફરી ખુલ્યો, વાહનવ્યવહાર શરૂ!!"]);
        let text = "પુલ ફરી ખુલ્યો, વાહનવ્યવહાર શરૂ!!";

        let untranslated = aggregator(fetcher, NoTranslator);
        let article = Article {
            raw_text: text.to_string(),
            source_label: String::new(),
            detected_language: LanguageCode::Gu,
            origin: Origin::Scrape,
        };
        assert_eq!(untranslated.classify_article(&article).await.label, Label::Fake);

        let translated = aggregator(MockFetcher::default(), WireTranslator);
        let verdict = translated.classify_article(&article).await;
        assert_eq!(verdict.label, Label::Real);
        assert_eq!(verdict.rationale, "definite rule: reputable source");
    }

    #[test]
    fn test_query_shapes() {
        assert!(LocaleQuery::new("Latest", "", "", "", LanguageCode::En).is_generic());
        assert!(LocaleQuery::new("", "", "", "", LanguageCode::En).is_generic());
        assert!(!LocaleQuery::new("cricket", "", "", "", LanguageCode::En).is_generic());
        assert_eq!(
            LocaleQuery::new("floods", "", "Surat", "Gujarat", LanguageCode::En).api_query(),
            "floods Surat Gujarat"
        );
        assert_eq!(
            LocaleQuery::new("floods", "", "Surat", "", LanguageCode::En).api_query(),
            "floods Surat"
        );
    }

    #[test]
    fn test_validity_window() {
        assert!(!is_valid_article(&"a".repeat(20)));
        assert!(is_valid_article(&"a".repeat(21)));
        assert!(is_valid_article(&"a".repeat(499)));
        assert!(!is_valid_article(&"a".repeat(500)));
    }

    #[test]
    fn test_narrow_to_city() {
        let texts: Vec<String> = (0..8).map(sentence).collect();
        assert_eq!(narrow_to_city(texts.clone(), "").len(), 8);
        assert_eq!(narrow_to_city(texts.clone(), "Vapi").len(), 5);
        let mut with_city = texts;
        with_city.push("Vapi industrial estate expands".to_string());
        assert_eq!(narrow_to_city(with_city, "vapi"), vec!["Vapi industrial estate expands".to_string()]);
    }

    #[test]
    fn test_locale_filter_drops_own_state_from_exclusions() {
        let exclusions = ExclusionTable {
            cities: vec!["mumbai".to_string(), "dwarka".to_string()],
            states: vec!["gujarat".to_string(), "bihar".to_string()],
        };
        let query = LocaleQuery::new("latest", "", "Dwarka", "", LanguageCode::En);
        let filter = LocaleFilter::with_exclusions(&query, false, &exclusions);
        assert!(filter.accepts("Dwarka temple corridor work begins"));
        assert!(!filter.accepts("Bihar floods displace thousands"));

        let query = LocaleQuery::new("latest", "", "Morbi", "Gujarat", LanguageCode::En);
        let filter = LocaleFilter::with_exclusions(&query, false, &exclusions);
        assert!(filter.accepts("Ceramic exporters seek lower freight rates"));
        assert!(!filter.accepts("Mumbai port congestion eases"));

        let filter = LocaleFilter::with_exclusions(&query, true, &exclusions);
        assert!(!filter.accepts("Ceramic exporters seek lower freight rates"));
    }

    #[tokio::test]
    async fn test_english_article_on_hindi_route_is_not_translated() {
        let fetcher = MockFetcher::default().page(
            "https://india.test/1",
            &["parliament passes the budget bill after a long debate"],
        );
        let translator = RecordingTranslator::default();
        let calls = Arc::clone(&translator.calls);
        let feed = aggregator(fetcher, translator)
            .aggregate(&LocaleQuery::new("latest", "", "", "", LanguageCode::Hi))
            .await;
        assert_eq!(feed.entries.len(), 1);
        assert_eq!(feed.entries[0].language, LanguageCode::Hi);
        assert_eq!(feed.entries[0].verdict.label, Label::Real);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
