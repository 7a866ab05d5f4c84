use std::sync::Arc;

use tracing::warn;

use crate::cache::{Clock, Expiry, Storage, TtlCache};
use crate::config::AppConfig;
use crate::http::NewsSource;

pub const MISSING_KEY_TICKER: &str =
    "Please add your NewsData.io API key to the .env file • Visit newsdata.io to get your free API key • ";
pub const UNAVAILABLE_TICKER: &str = "Unable to fetch news • Please try again later • ";
pub const FETCH_ERROR_TICKER: &str = "Error fetching news • Please check your connection • ";
pub const NO_NEWS_TICKER: &str = "No news available at the moment • ";

const TICKER_KEY: &str = "ticker";
const HEADLINE_SEPARATOR: &str = " • ";
const MIN_TITLE_CHARS: usize = 10;
const MAX_HEADLINES: usize = 10;

pub struct NewsTicker {
    source: Arc<dyn NewsSource>,
    cache: TtlCache<String>,
    config: AppConfig,
}

impl NewsTicker {
    pub fn new(
        source: Arc<dyn NewsSource>,
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
        config: AppConfig,
    ) -> Self {
        let cache = TtlCache::new(storage, clock, "news", Expiry::CalendarDay);
        Self {
            source,
            cache,
            config,
        }
    }

    /// One joined headline string for the scrolling ticker. Every outcome,
    /// fallback text included, is cached for the rest of the calendar day.
    pub async fn ticker(&self) -> String {
        if let Some(text) = self.cache.get(TICKER_KEY) {
            return text;
        }

        let text = self.fetch().await;
        self.cache.set(TICKER_KEY, &text);
        text
    }

    async fn fetch(&self) -> String {
        let Some(api_key) = &self.config.news_api_key else {
            return MISSING_KEY_TICKER.to_string();
        };

        let response = match self
            .source
            .latest(api_key, &self.config.news_country, &self.config.news_language)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("news fetch failed: {e}");
                return FETCH_ERROR_TICKER.to_string();
            }
        };

        if response.status != "success" || response.results.is_empty() {
            return UNAVAILABLE_TICKER.to_string();
        }

        let text = response
            .results
            .iter()
            .map(|article| article.title.as_str())
            .filter(|title| title.chars().count() > MIN_TITLE_CHARS)
            .take(MAX_HEADLINES)
            .collect::<Vec<_>>()
            .join(HEADLINE_SEPARATOR);

        if text.is_empty() {
            NO_NEWS_TICKER.to_string()
        } else {
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStorage;
    use crate::http::{HttpError, NewsArticle, NewsResponse};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedClock;

    impl Clock for FixedClock {
        fn today(&self) -> NaiveDate {
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        }

        fn now_millis(&self) -> u64 {
            0
        }
    }

    struct ScriptedNews {
        response: Option<NewsResponse>,
        calls: AtomicUsize,
    }

    impl ScriptedNews {
        fn returning(response: NewsResponse) -> Arc<Self> {
            Arc::new(Self {
                response: Some(response),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                response: None,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl NewsSource for ScriptedNews {
        async fn latest(
            &self,
            _api_key: &str,
            _country: &str,
            _language: &str,
        ) -> Result<NewsResponse, HttpError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.response {
                Some(response) => Ok(response.clone()),
                None => Err(HttpError::Status(reqwest::StatusCode::FORBIDDEN)),
            }
        }
    }

    fn ticker_with(source: Arc<ScriptedNews>, api_key: Option<&str>) -> NewsTicker {
        let config = AppConfig {
            news_api_key: api_key.map(str::to_string),
            ..AppConfig::default()
        };
        NewsTicker::new(
            source,
            Arc::new(MemoryStorage::new()),
            Arc::new(FixedClock),
            config,
        )
    }

    fn articles(titles: &[&str]) -> NewsResponse {
        NewsResponse {
            status: "success".to_string(),
            results: titles
                .iter()
                .map(|t| NewsArticle {
                    title: t.to_string(),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn missing_api_key_yields_the_instructional_string() {
        let source = ScriptedNews::returning(articles(&["a long enough headline"]));
        let ticker = ticker_with(source.clone(), None);

        assert_eq!(ticker.ticker().await, MISSING_KEY_TICKER);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn short_titles_are_dropped_and_headlines_capped() {
        let mut titles: Vec<String> =
            (0..15).map(|i| format!("headline number {i} today")).collect();
        titles.insert(0, "tiny".to_string());
        let refs: Vec<&str> = titles.iter().map(String::as_str).collect();

        let ticker = ticker_with(ScriptedNews::returning(articles(&refs)), Some("key"));
        let text = ticker.ticker().await;

        assert!(!text.contains("tiny"));
        assert_eq!(text.split(" • ").count(), 10);
    }

    #[tokio::test]
    async fn unsuccessful_status_yields_the_fallback_string() {
        let response = NewsResponse {
            status: "error".to_string(),
            results: vec![],
        };
        let ticker = ticker_with(ScriptedNews::returning(response), Some("key"));
        assert_eq!(ticker.ticker().await, UNAVAILABLE_TICKER);
    }

    #[tokio::test]
    async fn fetch_error_yields_the_connection_string() {
        let ticker = ticker_with(ScriptedNews::failing(), Some("key"));
        assert_eq!(ticker.ticker().await, FETCH_ERROR_TICKER);
    }

    #[tokio::test]
    async fn only_short_titles_yields_the_no_news_string() {
        let ticker = ticker_with(ScriptedNews::returning(articles(&["short", "also"])), Some("key"));
        assert_eq!(ticker.ticker().await, NO_NEWS_TICKER);
    }

    #[tokio::test]
    async fn second_call_same_day_is_served_from_cache() {
        let source = ScriptedNews::returning(articles(&["a long enough headline"]));
        let ticker = ticker_with(source.clone(), Some("key"));

        let first = ticker.ticker().await;
        let second = ticker.ticker().await;

        assert_eq!(first, second);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
