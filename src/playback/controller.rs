use std::sync::Arc;

use flume::Sender;
use rand::Rng;
use tracing::{debug, warn};

use crate::catalog::{
    BackendKind, CatalogResolver, CategoryId, MediaDescriptor, StationCandidate, StationQuery,
    category,
};
use crate::event::Event;
use crate::playback::backend::{BackendEvent, BackendFactory, PlayerBackend, WidgetSignal};
use crate::playback::failover;
use crate::playback::session::{PlaybackSession, PlaybackState};
use crate::util::task::TaskManager;

const RESOLVE_TASK: &str = "resolve_stations";

pub struct PlaybackController {
    resolver: Arc<CatalogResolver>,
    factory: Box<dyn BackendFactory>,
    event_tx: Sender<Event>,
    tasks: TaskManager,

    session: Option<PlaybackSession>,
    backend: Option<Box<dyn PlayerBackend>>,
    volume: u8,
    volume_step: u8,
    // Bumped on every selection/shuffle; a resolution completion carrying an
    // older value is stale and must not attach.
    generation: u64,
}

impl PlaybackController {
    pub fn new(
        resolver: Arc<CatalogResolver>,
        factory: Box<dyn BackendFactory>,
        event_tx: Sender<Event>,
    ) -> Self {
        let config = resolver.config();
        let volume = config.volume.min(100);
        let volume_step = config.volume_step;

        Self {
            resolver,
            factory,
            event_tx,
            tasks: TaskManager::new(),
            session: None,
            backend: None,
            volume,
            volume_step,
            generation: 0,
        }
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::SelectCategory(id) => self.select_category(id),
            Event::Play => self.play(),
            Event::Stop => self.stop(),
            Event::Toggle => self.toggle(),
            Event::VolumeUp => self.volume_up(),
            Event::VolumeDown => self.volume_down(),
            Event::Shuffle => self.shuffle(),
            Event::StationsResolved {
                generation,
                stations,
            } => self.on_stations_resolved(generation, stations),
            Event::Backend(BackendEvent::PlayingChanged(playing)) => {
                self.on_playing_changed(playing)
            }
            Event::Backend(BackendEvent::Error(reason)) => self.on_backend_error(&reason),
            Event::Widget(signal) => self.on_widget_signal(signal),
            Event::NewsFetched(_) | Event::ChannelVideosFetched { .. } => {}
        }
    }

    pub fn select_category(&mut self, id: CategoryId) {
        self.detach_backend();

        let category = category(id);
        self.generation += 1;
        self.session = Some(PlaybackSession::loading(id, category.kind));

        match category.kind {
            BackendKind::EmbeddedVideo => match self.resolver.resolve_video(id) {
                Some(descriptor) => self.attach_media(descriptor),
                None => self.fail_session(),
            },
            BackendKind::StreamedAudio => {
                let query = StationQuery::for_category(category, self.resolver.config());
                self.spawn_station_resolution(query);
            }
        }
    }

    pub fn play(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if !matches!(session.state, PlaybackState::Ready | PlaybackState::Stopped)
            || session.descriptor.is_none()
        {
            return;
        }
        if let Some(backend) = self.backend.as_mut() {
            backend.play();
        }
    }

    pub fn stop(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if session.state != PlaybackState::Playing {
            return;
        }
        if let Some(backend) = self.backend.as_mut() {
            backend.stop();
        }
    }

    pub fn toggle(&mut self) {
        if self.is_playing() {
            self.stop();
        } else {
            self.play();
        }
    }

    // The stored volume always moves, attached backend or not, so a later
    // attach can sync to it.
    pub fn volume_up(&mut self) {
        self.set_volume(self.volume.saturating_add(self.volume_step).min(100));
    }

    pub fn volume_down(&mut self) {
        self.set_volume(self.volume.saturating_sub(self.volume_step));
    }

    fn set_volume(&mut self, volume: u8) {
        self.volume = volume;
        if let Some(backend) = self.backend.as_mut() {
            backend.set_volume(volume);
        }
    }

    pub fn shuffle(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.kind != BackendKind::StreamedAudio || session.is_loading() {
            return;
        }

        self.generation += 1;
        session.state = PlaybackState::Loading;
        session.candidates.clear();
        session.active = None;
        session.descriptor = None;

        let query = StationQuery::shuffle(self.resolver.config());
        self.spawn_station_resolution(query);
    }

    fn spawn_station_resolution(&mut self, query: StationQuery) {
        let generation = self.generation;
        let resolver = self.resolver.clone();
        let event_tx = self.event_tx.clone();

        self.tasks.spawn(RESOLVE_TASK, async move {
            let stations = resolver.resolve_stations(&query).await;
            let _ = event_tx.send(Event::StationsResolved {
                generation,
                stations,
            });
        });
    }

    fn on_stations_resolved(&mut self, generation: u64, stations: Vec<StationCandidate>) {
        if generation != self.generation {
            debug!("discarding stale station resolution (generation {generation})");
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.kind != BackendKind::StreamedAudio {
            return;
        }

        if stations.is_empty() {
            warn!("station resolution produced no candidates");
            self.fail_session();
            return;
        }

        let index = rand::rng().random_range(0..stations.len());
        let candidate = stations[index].clone();
        session.candidates = stations;
        session.active = Some(candidate.clone());
        self.attach_media(candidate.descriptor());
    }

    fn on_playing_changed(&mut self, playing: bool) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if playing {
            session.state = PlaybackState::Playing;
        } else if session.state == PlaybackState::Playing {
            session.state = PlaybackState::Ready;
        }
    }

    fn on_backend_error(&mut self, reason: &str) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.kind != BackendKind::StreamedAudio {
            return;
        }
        let Some(failed) = session.active.clone() else {
            return;
        };

        warn!("candidate {} failed: {reason}", failed.uuid);
        let was_playing = session.state == PlaybackState::Playing;

        match failover::next_candidate(&mut session.candidates, &failed.uuid) {
            Some(next) => {
                session.active = Some(next.clone());
                self.attach_media(next.descriptor());
                if was_playing && let Some(backend) = self.backend.as_mut() {
                    backend.play();
                }
            }
            None => {
                debug!("candidate set exhausted, stopping");
                self.fail_session();
            }
        }
    }

    fn on_widget_signal(&mut self, signal: WidgetSignal) {
        if let Some(backend) = self.backend.as_mut() {
            backend.widget_signal(signal);
        }
    }

    fn attach_media(&mut self, descriptor: MediaDescriptor) {
        if self.backend.is_none() {
            match self.factory.create(descriptor.kind) {
                Ok(backend) => self.backend = Some(backend),
                Err(e) => {
                    warn!("backend construction failed: {e}");
                    self.fail_session();
                    return;
                }
            }
        }

        if let Some(backend) = self.backend.as_mut() {
            backend.attach(&descriptor);
            backend.set_volume(self.volume);
        }

        if let Some(session) = self.session.as_mut() {
            session.descriptor = Some(descriptor);
            session.state = PlaybackState::Ready;
        }
    }

    // Terminal for the session: backend torn down, category kept so the UI
    // can still show "selected but stopped".
    fn fail_session(&mut self) {
        self.detach_backend();
        if let Some(session) = self.session.as_mut() {
            session.descriptor = None;
            session.active = None;
            session.state = PlaybackState::Failed;
        }
    }

    fn detach_backend(&mut self) {
        if let Some(mut backend) = self.backend.take() {
            backend.stop();
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.session
            .as_ref()
            .map(|s| s.state)
            .unwrap_or(PlaybackState::Idle)
    }

    pub fn is_playing(&self) -> bool {
        self.state() == PlaybackState::Playing
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn selected_category(&self) -> Option<CategoryId> {
        self.session.as_ref().map(|s| s.category)
    }

    pub fn now_playing(&self) -> Option<String> {
        self.session
            .as_ref()
            .and_then(|s| s.now_playing())
            .map(str::to_string)
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }
}
