use std::sync::Arc;

use rand::seq::IndexedRandom;
use tracing::{debug, warn};

use crate::cache::{Clock, Expiry, Storage, TtlCache};
use crate::catalog::category::{Category, CategoryId, MediaDescriptor, VIDEO_IDS, category};
use crate::catalog::feed::{ChannelVideo, parse_feed};
use crate::catalog::station::{StationCandidate, filter_usable};
use crate::config::AppConfig;
use crate::http::{ChannelFeed, StationDirectory};

#[derive(Debug, Clone, PartialEq)]
pub struct StationQuery {
    taglist: Option<String>,
    limit: usize,
    order: &'static str,
    reverse: bool,
    bitrate_min: u32,
}

impl StationQuery {
    pub fn shuffle(config: &AppConfig) -> Self {
        Self {
            taglist: None,
            limit: config.shuffle_limit,
            order: "random",
            reverse: false,
            bitrate_min: config.min_bitrate,
        }
    }

    pub fn for_category(category: &Category, config: &AppConfig) -> Self {
        Self {
            taglist: Some(category.id.as_str().to_string()),
            limit: config.tag_limit,
            order: "clickcount",
            reverse: true,
            bitrate_min: config.min_bitrate,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn to_query_string(&self) -> String {
        let mut parts = Vec::new();
        if let Some(tags) = &self.taglist {
            parts.push(format!("taglist={tags}"));
        }
        parts.push(format!("limit={}", self.limit));
        parts.push(format!("order={}", self.order));
        if self.reverse {
            parts.push("reverse=true".to_string());
        }
        parts.push(format!("bitrate_min={}", self.bitrate_min));
        parts.join("&")
    }
}

pub struct CatalogResolver {
    directory: Arc<dyn StationDirectory>,
    feed: Arc<dyn ChannelFeed>,
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    station_cache: TtlCache<Vec<StationCandidate>>,
    config: AppConfig,
}

impl CatalogResolver {
    pub fn new(
        directory: Arc<dyn StationDirectory>,
        feed: Arc<dyn ChannelFeed>,
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
        config: AppConfig,
    ) -> Self {
        let station_cache = TtlCache::new(
            storage.clone(),
            clock.clone(),
            "radio_stations",
            Expiry::CalendarDay,
        );

        Self {
            directory,
            feed,
            storage,
            clock,
            station_cache,
            config,
        }
    }

    pub fn resolve_video(&self, id: CategoryId) -> Option<MediaDescriptor> {
        let videos = VIDEO_IDS.get(&id)?;
        let video_id = videos.choose(&mut rand::rng())?;
        Some(MediaDescriptor {
            id: (*video_id).to_string(),
            kind: category(id).kind,
            title: category(id).name.to_string(),
        })
    }

    /// Cache hit returns the stored list verbatim; any remote failure resolves
    /// to an empty candidate set.
    pub async fn resolve_stations(&self, query: &StationQuery) -> Vec<StationCandidate> {
        let key = query.to_query_string();
        if let Some(stations) = self.station_cache.get(&key) {
            debug!("station cache hit for {key}");
            return stations;
        }

        match self.directory.search(&key).await {
            Ok(raw) => {
                let stations = filter_usable(raw, query.limit());
                self.station_cache.set(&key, &stations);
                stations
            }
            Err(e) => {
                warn!("station directory search failed: {e}");
                Vec::new()
            }
        }
    }

    pub async fn resolve_channel_videos(&self, id: CategoryId) -> Vec<ChannelVideo> {
        let Some(channel_id) = category(id).channel_id else {
            return Vec::new();
        };

        let cache = self.channel_cache(channel_id);
        if let Some(videos) = cache.get("videos") {
            debug!("channel cache hit for {channel_id}");
            return videos;
        }

        match self.feed.fetch(channel_id).await {
            Ok(xml) => match parse_feed(&xml) {
                Ok(videos) => {
                    cache.set("videos", &videos);
                    videos
                }
                Err(e) => {
                    warn!("channel feed {channel_id} failed to parse: {e}");
                    Vec::new()
                }
            },
            Err(e) => {
                warn!("channel feed {channel_id} fetch failed: {e}");
                Vec::new()
            }
        }
    }

    fn channel_cache(&self, channel_id: &str) -> TtlCache<Vec<ChannelVideo>> {
        TtlCache::new(
            self.storage.clone(),
            self.clock.clone(),
            format!("channel_{channel_id}"),
            Expiry::Sliding(self.config.channel_feed_ttl),
        )
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
