use std::sync::Arc;

use flume::{Receiver, Sender};

use crate::cache::{FsStorage, SystemClock};
use crate::catalog::{CatalogResolver, CategoryId};
use crate::config::AppConfig;
use crate::event::Event;
use crate::http::HttpService;
use crate::news::NewsTicker;
use crate::playback::PlaybackController;
use crate::playback::backend::DefaultBackendFactory;
use crate::playback::video::VideoWidget;
use crate::util::task::TaskManager;

/// Wires the resolver, controller and news ticker to one event channel. The
/// host owns the event loop: it feeds UI intents and widget signals in
/// through `handle_event` and drains `event_rx` for completions.
pub struct LoungeSystem {
    pub controller: PlaybackController,
    resolver: Arc<CatalogResolver>,
    news: Arc<NewsTicker>,
    event_tx: Sender<Event>,
    pub event_rx: Receiver<Event>,
    tasks: TaskManager,
}

impl LoungeSystem {
    pub fn new(widget: Arc<dyn VideoWidget>, config: AppConfig) -> color_eyre::Result<Self> {
        let (event_tx, event_rx) = flume::unbounded();
        let http = Arc::new(HttpService::new()?);
        let storage = Arc::new(FsStorage::in_default_location());
        let clock = Arc::new(SystemClock);

        let resolver = Arc::new(CatalogResolver::new(
            http.clone(),
            http.clone(),
            storage.clone(),
            clock.clone(),
            config.clone(),
        ));
        let news = Arc::new(NewsTicker::new(http, storage, clock, config));

        let factory = Box::new(DefaultBackendFactory::new(widget, event_tx.clone()));
        let controller = PlaybackController::new(resolver.clone(), factory, event_tx.clone());

        Ok(Self {
            controller,
            resolver,
            news,
            event_tx,
            event_rx,
            tasks: TaskManager::new(),
        })
    }

    pub fn handle_event(&mut self, event: Event) {
        self.controller.handle_event(event);
    }

    pub fn refresh_news(&mut self) {
        let news = self.news.clone();
        let event_tx = self.event_tx.clone();
        self.tasks.spawn("fetch_news", async move {
            let text = news.ticker().await;
            let _ = event_tx.send(Event::NewsFetched(text));
        });
    }

    pub fn refresh_channel_videos(&mut self, category: CategoryId) {
        let resolver = self.resolver.clone();
        let event_tx = self.event_tx.clone();
        self.tasks.spawn("fetch_channel_videos", async move {
            let videos = resolver.resolve_channel_videos(category).await;
            let _ = event_tx.send(Event::ChannelVideosFetched { category, videos });
        });
    }
}
