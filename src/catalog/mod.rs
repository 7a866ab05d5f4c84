pub mod category;
pub mod feed;
pub mod resolver;
pub mod station;

pub use self::category::{BackendKind, CATEGORIES, Category, CategoryId, MediaDescriptor, category};
pub use self::feed::ChannelVideo;
pub use self::resolver::{CatalogResolver, StationQuery};
pub use self::station::StationCandidate;
