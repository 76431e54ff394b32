//! # Read Cache
//!
//! A single-slot, time-bounded cache for the inventory read.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  get()  ── slot empty or older than TTL ──► None (caller loads + put)  │
//! │         └─ fresh ──────────────────────────► Some(clone)                │
//! │                                                                         │
//! │  every repository write ──► invalidate() before returning               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One cache per repository instance; nothing is shared between instances.
//! Population and a concurrent write are not mutually excluded, so callers
//! must not run overlapping reconciliations for one tenant.

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex, MutexGuard};
use stockline_core::{Clock, SystemClock};
use tracing::debug;

/// Cache settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl: std::time::Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            enabled: true,
            ttl: std::time::Duration::from_secs(60),
        }
    }
}

impl CacheConfig {
    pub fn disabled() -> Self {
        CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        }
    }

    pub fn with_ttl(ttl: std::time::Duration) -> Self {
        CacheConfig { enabled: true, ttl }
    }
}

struct Entry<T> {
    stored_at: DateTime<Utc>,
    value: T,
}

/// TTL cache holding one value.
pub struct ReadCache<T> {
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    slot: Mutex<Option<Entry<T>>>,
}

impl<T: Clone> ReadCache<T> {
    pub fn new(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        ReadCache {
            config,
            clock,
            slot: Mutex::new(None),
        }
    }

    /// Wall-clock cache with default settings.
    pub fn system(config: CacheConfig) -> Self {
        ReadCache::new(config, Arc::new(SystemClock))
    }

    fn lock(&self) -> MutexGuard<'_, Option<Entry<T>>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn ttl(&self) -> Duration {
        Duration::from_std(self.config.ttl).unwrap_or_else(|_| Duration::days(36_500))
    }

    /// The cached value, if present and not older than the TTL.
    pub fn get(&self) -> Option<T> {
        if !self.config.enabled {
            return None;
        }
        let now = self.clock.now();
        let ttl = self.ttl();
        let mut slot = self.lock();
        let fresh = slot.as_ref().map(|entry| now - entry.stored_at < ttl);
        match fresh {
            Some(true) => {
                debug!("Read cache hit");
                slot.as_ref().map(|entry| entry.value.clone())
            }
            Some(false) => {
                debug!("Read cache expired");
                *slot = None;
                None
            }
            None => {
                debug!("Read cache miss");
                None
            }
        }
    }

    /// Stores a freshly loaded value.
    pub fn put(&self, value: T) {
        if !self.config.enabled {
            return;
        }
        let stored_at = self.clock.now();
        *self.lock() = Some(Entry { stored_at, value });
    }

    /// Drops the cached value.
    pub fn invalidate(&self) {
        if self.lock().take().is_some() {
            debug!("Read cache invalidated");
        }
    }

    pub fn is_populated(&self) -> bool {
        self.lock().is_some()
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}

impl<T> std::fmt::Debug for ReadCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use stockline_core::ManualClock;

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 10, 9, 12, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn test_hit_until_ttl_then_miss() {
        let clock = clock();
        let cache = ReadCache::new(
            CacheConfig::with_ttl(std::time::Duration::from_secs(60)),
            clock.clone(),
        );
        cache.put(7_u32);
        assert_eq!(cache.get(), Some(7));

        clock.advance(Duration::seconds(59));
        assert_eq!(cache.get(), Some(7));

        clock.advance(Duration::seconds(1));
        assert_eq!(cache.get(), None);
        assert!(!cache.is_populated());
    }

    #[test]
    fn test_invalidate_drops_value() {
        let cache = ReadCache::new(CacheConfig::default(), clock());
        cache.put("snapshot".to_string());
        cache.invalidate();
        assert_eq!(cache.get(), None);
    }

    #[test]
    fn test_disabled_never_stores() {
        let cache = ReadCache::new(CacheConfig::disabled(), clock());
        cache.put(1_u8);
        assert!(!cache.is_populated());
        assert_eq!(cache.get(), None);
    }
}
