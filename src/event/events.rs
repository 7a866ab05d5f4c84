use crate::catalog::{CategoryId, ChannelVideo, StationCandidate};
use crate::playback::backend::{BackendEvent, WidgetSignal};

#[derive(Debug, Clone)]
pub enum Event {
    // Completions
    StationsResolved {
        generation: u64,
        stations: Vec<StationCandidate>,
    },
    ChannelVideosFetched {
        category: CategoryId,
        videos: Vec<ChannelVideo>,
    },
    NewsFetched(String),

    // Backend signals
    Backend(BackendEvent),
    Widget(WidgetSignal),

    // Commands
    SelectCategory(CategoryId),
    Play,
    Stop,
    Toggle,
    VolumeUp,
    VolumeDown,
    Shuffle,
}
