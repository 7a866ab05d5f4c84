use std::sync::Arc;

use flume::Sender;

use crate::catalog::{BackendKind, MediaDescriptor};
use crate::event::Event;
use crate::playback::audio::StreamedAudioBackend;
use crate::playback::video::{EmbeddedVideoBackend, VideoWidget};

#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    PlayingChanged(bool),
    Error(String),
}

/// Signals from the host-owned embedded widget, routed through the event
/// channel so the controller can forward them to whichever backend is
/// attached without knowing its kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WidgetSignal {
    Ready,
    StateChange(i32),
}

/// The uniform playback contract. The controller only ever talks to this
/// trait after construction; backends report back through the event channel
/// as `Event::Backend(..)`.
pub trait PlayerBackend: Send {
    fn attach(&mut self, media: &MediaDescriptor);
    fn play(&mut self);
    fn stop(&mut self);
    fn set_volume(&mut self, volume: u8);
    fn is_playing(&self) -> bool;

    fn widget_signal(&mut self, _signal: WidgetSignal) {}
}

pub trait BackendFactory: Send {
    fn create(&self, kind: BackendKind) -> color_eyre::Result<Box<dyn PlayerBackend>>;
}

pub struct DefaultBackendFactory {
    widget: Arc<dyn VideoWidget>,
    event_tx: Sender<Event>,
}

impl DefaultBackendFactory {
    pub fn new(widget: Arc<dyn VideoWidget>, event_tx: Sender<Event>) -> Self {
        Self { widget, event_tx }
    }
}

impl BackendFactory for DefaultBackendFactory {
    fn create(&self, kind: BackendKind) -> color_eyre::Result<Box<dyn PlayerBackend>> {
        Ok(match kind {
            BackendKind::EmbeddedVideo => Box::new(EmbeddedVideoBackend::new(
                self.widget.clone(),
                self.event_tx.clone(),
            )),
            BackendKind::StreamedAudio => Box::new(StreamedAudioBackend::new(self.event_tx.clone())?),
        })
    }
}
