//! [`PathCache`] – bounded, time-limited reuse of computed paths.
//!
//! Path computation is the most expensive operation navguard triggers, and
//! agents near each other keep asking for near-identical routes. Keys
//! quantize both endpoints to a fine grid so those near-duplicates collide
//! into hits. Entries age out after a TTL (the world changes) and the whole
//! cache is bounded with least-recently-used eviction.
//!
//! One exclusive lock guards the map/order pair: even a hit mutates LRU
//! order, so read paths take the same lock as writes.
//!
//! # Example
//!
//! ```rust
//! use navguard_path::cache::{CachedPath, PathCache, PathCacheKey};
//! use navguard_types::{MapId, PathKind, Position};
//!
//! let cache = PathCache::default();
//! let key = PathCacheKey::new(
//!     MapId(0),
//!     Position::new(0.0, 0.0, 0.0),
//!     Position::new(10.0, 0.0, 0.0),
//! );
//! cache.put(key.clone(), CachedPath {
//!     points: vec![Position::new(0.0, 0.0, 0.0), Position::new(10.0, 0.0, 0.0)],
//!     kind: PathKind::Normal,
//!     requires_swimming: false,
//!     contains_water_transition: false,
//! });
//! assert!(cache.get(&key).is_some());
//! assert_eq!(cache.stats().hits, 1);
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use navguard_types::{MapId, PathKind, Position, SharedClock, system_clock};

/// Endpoint quantum: coordinates are rounded to this grid before keying.
const KEY_QUANTUM: f32 = 0.01;

// ────────────────────────────────────────────────────────────────────────────
// Key / entry / stats
// ────────────────────────────────────────────────────────────────────────────

/// Cache key over quantized endpoints.
///
/// Two queries whose endpoints differ by less than the quantum produce the
/// same key on purpose.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathCacheKey {
    map: MapId,
    from: (i64, i64, i64),
    to: (i64, i64, i64),
}

impl PathCacheKey {
    pub fn new(map: MapId, from: Position, to: Position) -> Self {
        Self {
            map,
            from: quantize(from),
            to: quantize(to),
        }
    }
}

fn quantize(p: Position) -> (i64, i64, i64) {
    (
        (p.x / KEY_QUANTUM).round() as i64,
        (p.y / KEY_QUANTUM).round() as i64,
        (p.z / KEY_QUANTUM).round() as i64,
    )
}

/// One cached path. Copied out to callers; the cache keeps sole ownership
/// of its entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedPath {
    pub points: Vec<Position>,
    pub kind: PathKind,
    pub requires_swimming: bool,
    pub contains_water_transition: bool,
}

#[derive(Debug)]
struct CacheEntry {
    path: CachedPath,
    inserted_at: Instant,
}

/// Hit/miss/insertion/eviction counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    pub evictions: u64,
}

impl PathCacheStats {
    /// Fraction of lookups served from cache; 0 when nothing was looked up.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

/// Size and lifetime limits.
#[derive(Debug, Clone, Copy)]
pub struct PathCacheConfig {
    pub max_entries: usize,
    pub ttl: Duration,
}

impl Default for PathCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 128,
            ttl: Duration::from_secs(30),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// PathCache
// ────────────────────────────────────────────────────────────────────────────

struct CacheInner {
    entries: HashMap<PathCacheKey, CacheEntry>,
    /// LRU order: front is oldest, back is most recently used.
    order: VecDeque<PathCacheKey>,
    stats: PathCacheStats,
}

/// Shared, lock-guarded path cache.
pub struct PathCache {
    inner: Mutex<CacheInner>,
    config: PathCacheConfig,
    clock: SharedClock,
}

impl Default for PathCache {
    fn default() -> Self {
        Self::new(PathCacheConfig::default(), system_clock())
    }
}

impl PathCache {
    pub fn new(config: PathCacheConfig, clock: SharedClock) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                order: VecDeque::new(),
                stats: PathCacheStats::default(),
            }),
            config,
            clock,
        }
    }

    /// Look up a path. A fresh entry is a hit and becomes most recently
    /// used; an expired entry is lazily evicted and counts as a miss.
    pub fn get(&self, key: &PathCacheKey) -> Option<CachedPath> {
        let now = self.clock.now();
        let mut inner = self.inner.lock().expect("path cache poisoned");

        // Resolve the lookup before mutating, so the map borrow is released.
        let lookup = match inner.entries.get(key) {
            Some(entry) if now.saturating_duration_since(entry.inserted_at) <= self.config.ttl => {
                Some(Some(entry.path.clone()))
            }
            Some(_) => Some(None), // present but expired
            None => None,
        };

        match lookup {
            Some(Some(path)) => {
                touch(&mut inner.order, key);
                inner.stats.hits += 1;
                Some(path)
            }
            Some(None) => {
                inner.entries.remove(key);
                inner.order.retain(|k| k != key);
                inner.stats.evictions += 1;
                inner.stats.misses += 1;
                None
            }
            None => {
                inner.stats.misses += 1;
                None
            }
        }
    }

    /// Insert or replace a path, evicting the least recently used entry
    /// when at capacity.
    pub fn put(&self, key: PathCacheKey, path: CachedPath) {
        let now = self.clock.now();
        let mut inner = self.inner.lock().expect("path cache poisoned");

        if inner.entries.contains_key(&key) {
            touch(&mut inner.order, &key);
        } else {
            if inner.entries.len() >= self.config.max_entries {
                if let Some(oldest) = inner.order.pop_front() {
                    inner.entries.remove(&oldest);
                    inner.stats.evictions += 1;
                    debug!(?oldest, "path cache full; evicted least recently used");
                }
            }
            inner.order.push_back(key.clone());
        }
        inner.entries.insert(
            key,
            CacheEntry {
                path,
                inserted_at: now,
            },
        );
        inner.stats.insertions += 1;
    }

    /// Proactively drop every expired entry.
    pub fn clear_expired(&self) {
        let now = self.clock.now();
        let ttl = self.config.ttl;
        let mut inner = self.inner.lock().expect("path cache poisoned");

        let CacheInner {
            entries,
            order,
            stats,
        } = &mut *inner;
        let before = entries.len();
        entries.retain(|_, e| now.saturating_duration_since(e.inserted_at) <= ttl);
        let dropped = before - entries.len();
        if dropped > 0 {
            order.retain(|k| entries.contains_key(k));
            stats.evictions += dropped as u64;
        }
    }

    /// Current counter snapshot.
    pub fn stats(&self) -> PathCacheStats {
        self.inner.lock().expect("path cache poisoned").stats
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("path cache poisoned").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Move `key` to the most-recently-used end of the order list.
fn touch(order: &mut VecDeque<PathCacheKey>, key: &PathCacheKey) {
    order.retain(|k| k != key);
    order.push_back(key.clone());
}

#[cfg(test)]
mod tests {
    use super::*;
    use navguard_types::ManualClock;
    use std::sync::Arc;

    const MAP: MapId = MapId(0);

    fn path_between(from: Position, to: Position) -> CachedPath {
        CachedPath {
            points: vec![from, to],
            kind: PathKind::Normal,
            requires_swimming: false,
            contains_water_transition: false,
        }
    }

    fn key(from_x: f32, to_x: f32) -> PathCacheKey {
        PathCacheKey::new(
            MAP,
            Position::new(from_x, 0.0, 0.0),
            Position::new(to_x, 0.0, 0.0),
        )
    }

    fn cache_with_clock() -> (PathCache, Arc<ManualClock>) {
        let clock = ManualClock::new();
        (
            PathCache::new(PathCacheConfig::default(), clock.clone()),
            clock,
        )
    }

    #[test]
    fn put_then_get_round_trips_and_counts_a_hit() {
        let (cache, _) = cache_with_clock();
        let k = key(0.0, 10.0);
        let p = path_between(Position::new(0.0, 0.0, 0.0), Position::new(10.0, 0.0, 0.0));
        cache.put(k.clone(), p.clone());

        assert_eq!(cache.get(&k), Some(p));
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.insertions, 1);
    }

    #[test]
    fn unknown_key_counts_a_miss() {
        let (cache, _) = cache_with_clock();
        assert!(cache.get(&key(1.0, 2.0)).is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn expired_entry_is_lazily_evicted_on_get() {
        let (cache, clock) = cache_with_clock();
        let k = key(0.0, 10.0);
        cache.put(
            k.clone(),
            path_between(Position::new(0.0, 0.0, 0.0), Position::new(10.0, 0.0, 0.0)),
        );
        clock.advance(Duration::from_secs(31)); // past the 30 s TTL

        assert!(cache.get(&k).is_none());
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn near_identical_endpoints_share_a_key() {
        let a = PathCacheKey::new(
            MAP,
            Position::new(1.0, 2.0, 3.0),
            Position::new(10.0, 0.0, 0.0),
        );
        let b = PathCacheKey::new(
            MAP,
            Position::new(1.001, 2.003, 3.0),
            Position::new(10.002, 0.0, 0.0),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn clearly_different_endpoints_do_not_collide() {
        assert_ne!(key(0.0, 10.0), key(0.0, 20.0));
    }

    #[test]
    fn lru_eviction_drops_the_oldest_entry() {
        let clock = ManualClock::new();
        let cache = PathCache::new(
            PathCacheConfig {
                max_entries: 2,
                ttl: Duration::from_secs(60),
            },
            clock.clone(),
        );
        let (k1, k2, k3) = (key(0.0, 1.0), key(0.0, 2.0), key(0.0, 3.0));
        let p = path_between(Position::new(0.0, 0.0, 0.0), Position::new(1.0, 0.0, 0.0));

        cache.put(k1.clone(), p.clone());
        cache.put(k2.clone(), p.clone());
        // Touch k1 so k2 becomes the least recently used.
        cache.get(&k1);
        cache.put(k3.clone(), p.clone());

        assert!(cache.get(&k1).is_some());
        assert!(cache.get(&k2).is_none(), "k2 should have been evicted");
        assert!(cache.get(&k3).is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn clear_expired_sweeps_everything_stale() {
        let (cache, clock) = cache_with_clock();
        let p = path_between(Position::new(0.0, 0.0, 0.0), Position::new(1.0, 0.0, 0.0));
        cache.put(key(0.0, 1.0), p.clone());
        cache.put(key(0.0, 2.0), p.clone());
        clock.advance(Duration::from_secs(31));
        cache.put(key(0.0, 3.0), p);

        cache.clear_expired();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().evictions, 2);
    }

    #[test]
    fn hit_rate_reflects_lookup_history() {
        let (cache, _) = cache_with_clock();
        let k = key(0.0, 1.0);
        cache.put(
            k.clone(),
            path_between(Position::new(0.0, 0.0, 0.0), Position::new(1.0, 0.0, 0.0)),
        );
        cache.get(&k); // hit
        cache.get(&key(5.0, 6.0)); // miss
        assert!((cache.stats().hit_rate() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn empty_cache_reports_zero_hit_rate() {
        let (cache, _) = cache_with_clock();
        assert_eq!(cache.stats().hit_rate(), 0.0);
    }
}
