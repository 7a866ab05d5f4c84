use std::collections::HashMap;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

pub trait Storage: Send + Sync {
    fn load(&self, slot: &str) -> Option<String>;
    fn store(&self, slot: &str, contents: &str);
}

pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn in_default_location() -> Self {
        let root = directories::ProjectDirs::from("com", "loungefm", env!("CARGO_PKG_NAME"))
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".cache"));
        Self::new(root)
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.root.join(format!("{slot}.json"))
    }
}

impl Storage for FsStorage {
    fn load(&self, slot: &str) -> Option<String> {
        std::fs::read_to_string(self.slot_path(slot)).ok()
    }

    fn store(&self, slot: &str, contents: &str) {
        if let Err(e) = std::fs::create_dir_all(&self.root) {
            debug!("cache dir unavailable: {e}");
            return;
        }
        if let Err(e) = std::fs::write(self.slot_path(slot), contents) {
            debug!("cache write for slot {slot} failed: {e}");
        }
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    slots: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, slot: &str) -> Option<String> {
        self.slots.read().unwrap().get(slot).cloned()
    }

    fn store(&self, slot: &str, contents: &str) {
        self.slots
            .write()
            .unwrap()
            .insert(slot.to_string(), contents.to_string());
    }
}

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
    fn now_millis(&self) -> u64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }

    fn now_millis(&self) -> u64 {
        chrono::Local::now().timestamp_millis().max(0) as u64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub payload: T,
    pub date: String,
    pub stored_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    CalendarDay,
    Sliding(Duration),
}

pub struct TtlCache<T> {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    slot: String,
    expiry: Expiry,
    _payload: PhantomData<T>,
}

impl<T: Serialize + DeserializeOwned> TtlCache<T> {
    pub fn new(
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
        slot: impl Into<String>,
        expiry: Expiry,
    ) -> Self {
        Self {
            storage,
            clock,
            slot: slot.into(),
            expiry,
            _payload: PhantomData,
        }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        let mut entries = self.load_entries();
        let entry = entries.remove(key)?;

        let fresh = match self.expiry {
            Expiry::CalendarDay => entry.date == self.clock.today().format("%Y-%m-%d").to_string(),
            Expiry::Sliding(window) => {
                self.clock.now_millis().saturating_sub(entry.stored_ms) <= window.as_millis() as u64
            }
        };

        if !fresh {
            debug!("cache entry {key} in slot {} expired", self.slot);
            return None;
        }
        serde_json::from_value(entry.payload).ok()
    }

    pub fn set(&self, key: &str, value: &T) {
        let mut entries = self.load_entries();
        let payload = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                debug!("cache serialize for {key} failed: {e}");
                return;
            }
        };
        entries.insert(
            key.to_string(),
            CacheEntry {
                payload,
                date: self.clock.today().format("%Y-%m-%d").to_string(),
                stored_ms: self.clock.now_millis(),
            },
        );
        match serde_json::to_string(&entries) {
            Ok(contents) => self.storage.store(&self.slot, &contents),
            Err(e) => debug!("cache slot {} serialize failed: {e}", self.slot),
        }
    }

    // Unparsable slot content counts as empty, so a corrupt slot heals on the next write.
    fn load_entries(&self) -> HashMap<String, CacheEntry<serde_json::Value>> {
        let Some(raw) = self.storage.load(&self.slot) else {
            return HashMap::new();
        };
        serde_json::from_str(&raw).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

    struct ManualClock {
        day_offset: AtomicI64,
        millis: AtomicU64,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                day_offset: AtomicI64::new(0),
                millis: AtomicU64::new(1_000_000),
            }
        }

        fn advance_days(&self, days: i64) {
            self.day_offset.fetch_add(days, Ordering::SeqCst);
        }

        fn advance_millis(&self, ms: u64) {
            self.millis.fetch_add(ms, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn today(&self) -> NaiveDate {
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
                + chrono::Days::new(self.day_offset.load(Ordering::SeqCst).max(0) as u64)
        }

        fn now_millis(&self) -> u64 {
            self.millis.load(Ordering::SeqCst)
        }
    }

    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn load(&self, _slot: &str) -> Option<String> {
            None
        }

        fn store(&self, _slot: &str, _contents: &str) {}
    }

    fn day_cache(
        storage: Arc<dyn Storage>,
        clock: Arc<ManualClock>,
    ) -> TtlCache<Vec<String>> {
        TtlCache::new(storage, clock, "stations", Expiry::CalendarDay)
    }

    #[test]
    fn same_day_round_trip() {
        let storage = Arc::new(MemoryStorage::new());
        let clock = Arc::new(ManualClock::new());
        let cache = day_cache(storage, clock);

        let stations = vec!["a".to_string(), "b".to_string()];
        cache.set("taglist=jazz", &stations);
        assert_eq!(cache.get("taglist=jazz"), Some(stations));
    }

    #[test]
    fn cross_midnight_read_misses() {
        let storage = Arc::new(MemoryStorage::new());
        let clock = Arc::new(ManualClock::new());
        let cache = day_cache(storage, clock.clone());

        cache.set("taglist=jazz", &vec!["a".to_string()]);
        clock.advance_days(1);
        assert_eq!(cache.get("taglist=jazz"), None);
    }

    #[test]
    fn sliding_window_expires_by_elapsed_time() {
        let storage = Arc::new(MemoryStorage::new());
        let clock = Arc::new(ManualClock::new());
        let cache: TtlCache<Vec<String>> = TtlCache::new(
            storage,
            clock.clone(),
            "channel_abc",
            Expiry::Sliding(Duration::from_secs(60 * 60)),
        );

        cache.set("videos", &vec!["v1".to_string()]);
        clock.advance_millis(30 * 60 * 1000);
        assert_eq!(cache.get("videos"), Some(vec!["v1".to_string()]));

        clock.advance_millis(31 * 60 * 1000);
        assert_eq!(cache.get("videos"), None);
    }

    #[test]
    fn sliding_window_survives_day_rollover_within_window() {
        let storage = Arc::new(MemoryStorage::new());
        let clock = Arc::new(ManualClock::new());
        let cache: TtlCache<u32> = TtlCache::new(
            storage,
            clock.clone(),
            "channel_abc",
            Expiry::Sliding(Duration::from_secs(60 * 60)),
        );

        cache.set("videos", &7);
        clock.advance_days(1);
        assert_eq!(cache.get("videos"), Some(7));
    }

    #[test]
    fn corrupt_slot_is_a_miss_and_heals_on_write() {
        let storage = Arc::new(MemoryStorage::new());
        storage.store("stations", "{not json");
        let clock = Arc::new(ManualClock::new());
        let cache = day_cache(storage.clone(), clock);

        assert_eq!(cache.get("k"), None);
        cache.set("k", &vec!["x".to_string()]);
        assert_eq!(cache.get("k"), Some(vec!["x".to_string()]));
    }

    #[test]
    fn unavailable_storage_degrades_to_miss() {
        let clock = Arc::new(ManualClock::new());
        let cache = day_cache(Arc::new(BrokenStorage), clock);

        cache.set("k", &vec!["x".to_string()]);
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn independent_keys_share_one_slot() {
        let storage = Arc::new(MemoryStorage::new());
        let clock = Arc::new(ManualClock::new());
        let cache = day_cache(storage.clone(), clock);

        cache.set("a", &vec!["1".to_string()]);
        cache.set("b", &vec!["2".to_string()]);
        assert_eq!(cache.get("a"), Some(vec!["1".to_string()]));
        assert_eq!(cache.get("b"), Some(vec!["2".to_string()]));
        assert!(storage.load("stations").is_some());
    }

    #[test]
    fn fs_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(FsStorage::new(dir.path().to_path_buf()));
        let clock = Arc::new(ManualClock::new());
        let cache = day_cache(storage, clock);

        cache.set("k", &vec!["persisted".to_string()]);
        assert_eq!(cache.get("k"), Some(vec!["persisted".to_string()]));
    }
}
