use std::time::Duration;

pub const NEWS_KEY_VAR: &str = "NEWSDATA_API_KEY";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub volume: u8,
    pub volume_step: u8,
    /// Result cap for the general shuffle query.
    pub shuffle_limit: usize,
    /// Result cap for the tag-filtered query.
    pub tag_limit: usize,
    pub min_bitrate: u32,
    pub channel_feed_ttl: Duration,
    pub news_country: String,
    pub news_language: String,
    pub news_api_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            volume: 50,
            volume_step: 10,
            shuffle_limit: 50,
            tag_limit: 30,
            min_bitrate: 64,
            channel_feed_ttl: Duration::from_secs(60 * 60),
            news_country: "id".to_string(),
            news_language: "id".to_string(),
            news_api_key: None,
        }
    }
}

impl AppConfig {
    /// Loads the default configuration with the news API key taken from the
    /// environment (reading a `.env` file when present).
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let news_api_key = std::env::var(NEWS_KEY_VAR)
            .ok()
            .filter(|key| !key.is_empty() && key != "your_api_key_here");

        Self {
            news_api_key,
            ..Self::default()
        }
    }
}
