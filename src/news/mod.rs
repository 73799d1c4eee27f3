//! News retrieval: query batching, domain filtering, and caching.
//!
//! [`NewsRetriever`] turns a company's query list into a bounded set of
//! articles:
//!
//! 1. Queries are grouped into batches of [`QUERY_BATCH_SIZE`] and each batch
//!    is joined with `OR` into a single provider call, amortizing call
//!    overhead against provider rate limits.
//! 2. When an allowed-domain list is supplied, each batch is filtered by
//!    normalized source domain; a batch whose filter comes up empty keeps the
//!    first raw result instead, so a query group is never silently dropped.
//! 3. Kept articles are concatenated in batch order, deduplicated by link,
//!    and truncated to the `max_articles` cap for the whole call.
//!
//! Results are cached for one hour keyed by the full request, since the same
//! company/window/query tuple tends to recur within a session. A provider
//! failure anywhere in the call surfaces as an error; the caller degrades it
//! to "no articles" rather than aborting the run.

pub mod google;

use std::sync::Arc;

use chrono::NaiveDate;
use itertools::Itertools;
use tracing::{debug, info, instrument};
use url::Url;

use crate::cache::TtlCache;
use crate::error::Result;
use crate::models::NewsArticle;
use crate::utils::truncate_for_log;

/// How many queries are ORed together into one provider call.
pub const QUERY_BATCH_SIZE: usize = 3;

/// A news-search backend queried once per batch over an inclusive date
/// window. Implemented by [`google::GoogleNewsClient`] and by test doubles.
pub trait NewsSearch {
    async fn search(&self, query: &str, from: NaiveDate, to: NaiveDate)
    -> Result<Vec<NewsArticle>>;
}

/// One retrieval call's full argument tuple; doubles as the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchRequest {
    /// Company the articles are fetched for.
    pub company: String,
    /// Start of the inclusive search window.
    pub from: NaiveDate,
    /// End of the inclusive search window.
    pub to: NaiveDate,
    /// Cap on the total number of returned articles.
    pub max_articles: usize,
    /// Search queries; an empty list falls back to the bare company name.
    pub queries: Vec<String>,
    /// Allowed source domains; an empty list disables filtering.
    pub allowed_domains: Vec<String>,
}

/// Normalize a domain or URL for filtering: keep the host, drop the scheme
/// and a leading `www.`, and lower-case the result.
///
/// Applied identically to the configured allowed-domain table and to each
/// article's source URL, so mixed-case or `www.`-prefixed entries cannot
/// cause false negatives.
pub fn normalize_domain(raw: &str) -> String {
    let trimmed = raw.trim();
    let host = Url::parse(trimmed)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| {
            // Bare domains carry no scheme and don't parse as URLs.
            let without_scheme = trimmed.split("://").last().unwrap_or(trimmed);
            without_scheme
                .split('/')
                .next()
                .unwrap_or_default()
                .to_string()
        });
    host.to_ascii_lowercase()
        .trim_start_matches("www.")
        .to_string()
}

/// Fetches, filters, and caches news articles for one company at a time.
pub struct NewsRetriever<S> {
    provider: S,
    cache: Arc<TtlCache<FetchRequest, Vec<NewsArticle>>>,
    batch_size: usize,
}

impl<S> NewsRetriever<S>
where
    S: NewsSearch,
{
    pub fn new(provider: S, cache: Arc<TtlCache<FetchRequest, Vec<NewsArticle>>>) -> Self {
        Self {
            provider,
            cache,
            batch_size: QUERY_BATCH_SIZE,
        }
    }

    /// Fetch articles for one request.
    ///
    /// # Errors
    ///
    /// Fails when any provider call in the batch sequence fails; partial
    /// results from earlier batches are discarded and nothing is cached.
    #[instrument(level = "info", skip_all, fields(company = %request.company))]
    pub async fn fetch(&self, request: &FetchRequest) -> Result<Vec<NewsArticle>> {
        if let Some(articles) = self.cache.get(request) {
            debug!(count = articles.len(), "News cache hit");
            return Ok(articles);
        }

        let default_queries;
        let queries = if request.queries.is_empty() {
            default_queries = vec![request.company.clone()];
            &default_queries
        } else {
            &request.queries
        };
        let allowed: Vec<String> = request
            .allowed_domains
            .iter()
            .map(|domain| normalize_domain(domain))
            .collect();

        info!(
            queries = queries.len(),
            batches = queries.len().div_ceil(self.batch_size),
            from = %request.from,
            to = %request.to,
            "Fetching news"
        );

        let mut kept: Vec<NewsArticle> = Vec::new();
        for (batch_index, batch) in queries.chunks(self.batch_size).enumerate() {
            let combined_query = batch.join(" OR ");
            let raw = self
                .provider
                .search(&combined_query, request.from, request.to)
                .await?;
            let raw_count = raw.len();

            let batch_kept = if allowed.is_empty() {
                raw
            } else {
                let filtered: Vec<NewsArticle> = raw
                    .iter()
                    .filter(|article| {
                        let domain = article.source_domain();
                        allowed.iter().any(|entry| domain.contains(entry.as_str()))
                    })
                    .cloned()
                    .collect();
                if filtered.is_empty() && !raw.is_empty() {
                    // Keep one signal per query group instead of dropping it.
                    debug!(batch = batch_index, "No allowed-domain match; keeping first raw result");
                    vec![raw[0].clone()]
                } else {
                    filtered
                }
            };

            debug!(
                batch = batch_index,
                raw = raw_count,
                kept = batch_kept.len(),
                query = %truncate_for_log(&combined_query, 120),
                "Processed query batch"
            );
            kept.extend(batch_kept);
        }

        let mut articles: Vec<NewsArticle> = kept
            .into_iter()
            .unique_by(|article| article.link.clone())
            .collect();
        articles.truncate(request.max_articles);

        info!(count = articles.len(), "Retrieved articles");
        self.cache.insert(request.clone(), articles.clone());
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DEFAULT_TTL;
    use crate::error::Error;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubSearch {
        responses: Mutex<VecDeque<Vec<NewsArticle>>>,
        seen_queries: Mutex<Vec<String>>,
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubSearch {
        fn with_batches(batches: Vec<Vec<NewsArticle>>) -> Self {
            Self {
                responses: Mutex::new(batches.into()),
                seen_queries: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            let mut stub = Self::with_batches(vec![]);
            stub.fail = true;
            stub
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn seen_queries(&self) -> Vec<String> {
            self.seen_queries.lock().unwrap().clone()
        }
    }

    impl NewsSearch for &StubSearch {
        async fn search(
            &self,
            query: &str,
            _from: NaiveDate,
            _to: NaiveDate,
        ) -> Result<Vec<NewsArticle>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_queries.lock().unwrap().push(query.to_string());
            if self.fail {
                return Err(Error::NewsSearch("stubbed outage".to_string()));
            }
            Ok(self.responses.lock().unwrap().pop_front().unwrap_or_default())
        }
    }

    fn article(link: &str, source_url: &str) -> NewsArticle {
        NewsArticle {
            title: format!("Headline for {link}"),
            link: link.to_string(),
            summary: "A summary".to_string(),
            source_url: source_url.to_string(),
            published: None,
        }
    }

    fn request(queries: Vec<&str>, allowed: Vec<&str>, max_articles: usize) -> FetchRequest {
        FetchRequest {
            company: "Acme".to_string(),
            from: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2025, 7, 30).unwrap(),
            max_articles,
            queries: queries.into_iter().map(str::to_string).collect(),
            allowed_domains: allowed.into_iter().map(str::to_string).collect(),
        }
    }

    #[test]
    fn test_normalize_domain_strips_scheme_and_www() {
        assert_eq!(
            normalize_domain("https://www.economictimes.indiatimes.com/x"),
            "economictimes.indiatimes.com"
        );
    }

    #[test]
    fn test_normalize_domain_accepts_bare_domains() {
        assert_eq!(normalize_domain("livemint.com"), "livemint.com");
        assert_eq!(normalize_domain("www.livemint.com"), "livemint.com");
        assert_eq!(normalize_domain("Taxscan.in"), "taxscan.in");
        assert_eq!(normalize_domain(""), "");
    }

    #[tokio::test]
    async fn test_batches_are_joined_with_or() {
        let stub = StubSearch::with_batches(vec![]);
        let retriever = NewsRetriever::new(&stub, Arc::new(TtlCache::new(DEFAULT_TTL)));
        let req = request(vec!["a", "b", "c", "d"], vec![], 10);

        retriever.fetch(&req).await.unwrap();

        assert_eq!(stub.seen_queries(), vec!["a OR b OR c", "d"]);
    }

    #[tokio::test]
    async fn test_empty_query_list_falls_back_to_company_name() {
        let stub = StubSearch::with_batches(vec![]);
        let retriever = NewsRetriever::new(&stub, Arc::new(TtlCache::new(DEFAULT_TTL)));
        let req = request(vec![], vec![], 10);

        retriever.fetch(&req).await.unwrap();

        assert_eq!(stub.seen_queries(), vec!["Acme"]);
    }

    #[tokio::test]
    async fn test_domain_filter_keeps_matching_articles() {
        let stub = StubSearch::with_batches(vec![vec![
            article("https://x/1", "https://www.livemint.com"),
            article("https://x/2", "https://blog.example.org"),
            article("https://x/3", "https://moneycontrol.com"),
        ]]);
        let retriever = NewsRetriever::new(&stub, Arc::new(TtlCache::new(DEFAULT_TTL)));
        let req = request(vec!["q"], vec!["livemint.com", "moneycontrol.com"], 10);

        let articles = retriever.fetch(&req).await.unwrap();

        let links: Vec<&str> = articles.iter().map(|a| a.link.as_str()).collect();
        assert_eq!(links, vec!["https://x/1", "https://x/3"]);
    }

    #[tokio::test]
    async fn test_filtered_out_batch_falls_back_to_first_raw_result() {
        let stub = StubSearch::with_batches(vec![vec![
            article("https://x/1", "https://unrelated.org"),
            article("https://x/2", "https://alsounrelated.org"),
        ]]);
        let retriever = NewsRetriever::new(&stub, Arc::new(TtlCache::new(DEFAULT_TTL)));
        let req = request(vec!["q"], vec!["example.com"], 10);

        let articles = retriever.fetch(&req).await.unwrap();

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].link, "https://x/1");
    }

    #[tokio::test]
    async fn test_truncation_applies_to_the_whole_call_not_per_batch() {
        let batches = (0..3)
            .map(|b| {
                (0..3)
                    .map(|i| {
                        article(
                            &format!("https://x/{b}/{i}"),
                            "https://www.livemint.com",
                        )
                    })
                    .collect()
            })
            .collect();
        let stub = StubSearch::with_batches(batches);
        let retriever = NewsRetriever::new(&stub, Arc::new(TtlCache::new(DEFAULT_TTL)));
        let req = request(
            vec!["q1", "q2", "q3", "q4", "q5", "q6", "q7", "q8", "q9"],
            vec!["livemint.com"],
            5,
        );

        let articles = retriever.fetch(&req).await.unwrap();

        let links: Vec<&str> = articles.iter().map(|a| a.link.as_str()).collect();
        assert_eq!(
            links,
            vec![
                "https://x/0/0",
                "https://x/0/1",
                "https://x/0/2",
                "https://x/1/0",
                "https://x/1/1",
            ]
        );
    }

    #[tokio::test]
    async fn test_duplicate_links_across_batches_are_dropped() {
        let stub = StubSearch::with_batches(vec![
            vec![article("https://x/1", "https://livemint.com")],
            vec![
                article("https://x/1", "https://livemint.com"),
                article("https://x/2", "https://livemint.com"),
            ],
        ]);
        let retriever = NewsRetriever::new(&stub, Arc::new(TtlCache::new(DEFAULT_TTL)));
        let req = request(vec!["a", "b", "c", "d"], vec![], 10);

        let articles = retriever.fetch(&req).await.unwrap();

        let links: Vec<&str> = articles.iter().map(|a| a.link.as_str()).collect();
        assert_eq!(links, vec!["https://x/1", "https://x/2"]);
    }

    #[tokio::test]
    async fn test_second_fetch_is_served_from_cache() {
        let stub = StubSearch::with_batches(vec![vec![article(
            "https://x/1",
            "https://livemint.com",
        )]]);
        let retriever = NewsRetriever::new(&stub, Arc::new(TtlCache::new(DEFAULT_TTL)));
        let req = request(vec!["q"], vec![], 10);

        let first = retriever.fetch(&req).await.unwrap();
        let second = retriever.fetch(&req).await.unwrap();

        assert_eq!(stub.calls(), 1);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].link, second[0].link);
    }

    #[tokio::test]
    async fn test_changed_window_misses_the_cache() {
        let stub = StubSearch::with_batches(vec![vec![], vec![]]);
        let retriever = NewsRetriever::new(&stub, Arc::new(TtlCache::new(DEFAULT_TTL)));
        let mut req = request(vec!["q"], vec![], 10);

        retriever.fetch(&req).await.unwrap();
        req.from = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        retriever.fetch(&req).await.unwrap();

        assert_eq!(stub.calls(), 2);
    }

    #[tokio::test]
    async fn test_provider_failure_surfaces_and_caches_nothing() {
        let stub = StubSearch::failing();
        let cache = Arc::new(TtlCache::new(DEFAULT_TTL));
        let retriever = NewsRetriever::new(&stub, Arc::clone(&cache));
        let req = request(vec!["q"], vec![], 10);

        let result = retriever.fetch(&req).await;

        assert!(matches!(result, Err(Error::NewsSearch(_))));
        assert!(cache.is_empty());
    }
}
