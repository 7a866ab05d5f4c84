pub mod audio;
pub mod backend;
pub mod controller;
pub mod failover;
pub mod output;
pub mod session;
pub mod video;

pub use self::backend::{BackendEvent, BackendFactory, PlayerBackend, WidgetSignal};
pub use self::controller::PlaybackController;
pub use self::session::{PlaybackSession, PlaybackState};
pub use self::video::VideoWidget;
