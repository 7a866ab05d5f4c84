use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use crate::catalog::StationCandidate;

const RADIO_DIRECTORY_BASE: &str = "https://de1.api.radio-browser.info";
const NEWS_BASE: &str = "https://newsdata.io/api/1/latest";
const CHANNEL_FEED_BASE: &str = "https://www.youtube.com/feeds/videos.xml";

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status: {0}")]
    Status(StatusCode),
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub results: Vec<NewsArticle>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsArticle {
    #[serde(default)]
    pub title: String,
}

#[async_trait]
pub trait StationDirectory: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<StationCandidate>, HttpError>;
}

#[async_trait]
pub trait ChannelFeed: Send + Sync {
    async fn fetch(&self, channel_id: &str) -> Result<String, HttpError>;
}

#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn latest(
        &self,
        api_key: &str,
        country: &str,
        language: &str,
    ) -> Result<NewsResponse, HttpError>;
}

pub struct HttpService {
    pub client: Client,
    radio_base: String,
    news_base: String,
    feed_base: String,
}

impl HttpService {
    pub fn new() -> color_eyre::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            radio_base: RADIO_DIRECTORY_BASE.to_string(),
            news_base: NEWS_BASE.to_string(),
            feed_base: CHANNEL_FEED_BASE.to_string(),
        })
    }

    async fn get_checked(&self, url: &str) -> Result<reqwest::Response, HttpError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(HttpError::Status(response.status()));
        }
        Ok(response)
    }
}

#[async_trait]
impl StationDirectory for HttpService {
    async fn search(&self, query: &str) -> Result<Vec<StationCandidate>, HttpError> {
        let url = format!("{}/json/stations/search?{query}", self.radio_base);
        Ok(self.get_checked(&url).await?.json().await?)
    }
}

#[async_trait]
impl ChannelFeed for HttpService {
    async fn fetch(&self, channel_id: &str) -> Result<String, HttpError> {
        let url = format!("{}?channel_id={channel_id}", self.feed_base);
        Ok(self.get_checked(&url).await?.text().await?)
    }
}

#[async_trait]
impl NewsSource for HttpService {
    async fn latest(
        &self,
        api_key: &str,
        country: &str,
        language: &str,
    ) -> Result<NewsResponse, HttpError> {
        let url = format!(
            "{}?apikey={api_key}&country={country}&language={language}&removeduplicate=1",
            self.news_base
        );
        Ok(self.get_checked(&url).await?.json().await?)
    }
}
