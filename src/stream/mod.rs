mod live;

pub use self::live::LiveDataSource;
