pub mod events;

pub use self::events::Event;
