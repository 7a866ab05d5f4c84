use std::sync::Arc;

use flume::Sender;
use tracing::debug;

use crate::catalog::MediaDescriptor;
use crate::event::Event;
use crate::playback::backend::{BackendEvent, PlayerBackend, WidgetSignal};

/// The widget's own state signal; exactly this value means playing, every
/// other value collapses to not-playing.
pub const WIDGET_STATE_PLAYING: i32 = 1;

/// Host-implemented seam around the third-party embeddable video widget.
pub trait VideoWidget: Send + Sync {
    fn load(&self, video_id: &str);
    fn play(&self);
    fn stop(&self);
    fn set_volume(&self, volume: u8);
}

pub struct EmbeddedVideoBackend {
    widget: Arc<dyn VideoWidget>,
    event_tx: Sender<Event>,
    ready: bool,
    playing: bool,
    pending_volume: Option<u8>,
}

impl EmbeddedVideoBackend {
    pub fn new(widget: Arc<dyn VideoWidget>, event_tx: Sender<Event>) -> Self {
        Self {
            widget,
            event_tx,
            ready: false,
            playing: false,
            pending_volume: None,
        }
    }
}

impl PlayerBackend for EmbeddedVideoBackend {
    fn attach(&mut self, media: &MediaDescriptor) {
        self.ready = false;
        self.playing = false;
        self.widget.load(&media.id);
    }

    fn play(&mut self) {
        self.widget.play();
    }

    fn stop(&mut self) {
        self.widget.stop();
    }

    // Volume commands issued before the widget is ready are buffered and
    // replayed once Ready fires; the last write wins.
    fn set_volume(&mut self, volume: u8) {
        if self.ready {
            self.widget.set_volume(volume);
        } else {
            self.pending_volume = Some(volume);
        }
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn widget_signal(&mut self, signal: WidgetSignal) {
        match signal {
            WidgetSignal::Ready => {
                self.ready = true;
                if let Some(volume) = self.pending_volume.take() {
                    debug!("replaying buffered volume {volume}");
                    self.widget.set_volume(volume);
                }
            }
            WidgetSignal::StateChange(state) => {
                let playing = state == WIDGET_STATE_PLAYING;
                if playing != self.playing {
                    self.playing = playing;
                    let _ = self
                        .event_tx
                        .send(Event::Backend(BackendEvent::PlayingChanged(playing)));
                }
            }
        }
    }
}
