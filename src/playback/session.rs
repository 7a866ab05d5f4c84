use crate::catalog::{BackendKind, CategoryId, MediaDescriptor, StationCandidate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Loading,
    Ready,
    Playing,
    Stopped,
    Failed,
}

/// The live playback state, replaced wholesale on category selection so the
/// single-backend and candidate-set invariants hold in one place.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    pub category: CategoryId,
    pub kind: BackendKind,
    pub descriptor: Option<MediaDescriptor>,
    pub candidates: Vec<StationCandidate>,
    pub active: Option<StationCandidate>,
    pub state: PlaybackState,
}

impl PlaybackSession {
    pub fn loading(category: CategoryId, kind: BackendKind) -> Self {
        Self {
            category,
            kind,
            descriptor: None,
            candidates: Vec::new(),
            active: None,
            state: PlaybackState::Loading,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state == PlaybackState::Loading
    }

    pub fn now_playing(&self) -> Option<&str> {
        self.descriptor.as_ref().map(|d| d.title.as_str())
    }
}
