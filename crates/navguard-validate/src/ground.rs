//! [`GroundValidator`] – terrain-height queries with a shared TTL cache.
//!
//! Height lookups hit the host's collision mesh and are the most expensive
//! query navguard issues, so results are cached per coarse terrain cell
//! with a short time-to-live. The cache is an explicitly owned,
//! lock-protected map shared by every agent on a simulation worker — never
//! a bare global.
//!
//! A column is *void* when the world reports no ground at all or a height
//! at or below [`VOID_FLOOR`]; void terrain and dangerous liquid together
//! make a column *unsafe*.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::debug;

use navguard_types::{
    LiquidInfo, MapId, Position, SharedClock, Validation, ValidationError, system_clock,
};
use navguard_world::query::WorldQuery;

/// Heights at or below this sentinel are treated as "no ground" (a fall
/// into the void).
pub const VOID_FLOOR: f32 = -500.0;

/// Edge length of one cache cell. Coarse on purpose: terrain sampling
/// tolerates several units of error, and a coarse cell makes near-identical
/// queries collide.
const CELL_SIZE: f32 = 8.0;

// ────────────────────────────────────────────────────────────────────────────
// Cache plumbing
// ────────────────────────────────────────────────────────────────────────────

/// Tuning for the height cache.
#[derive(Debug, Clone, Copy)]
pub struct HeightCacheConfig {
    /// How long one cached height stays valid.
    pub ttl: Duration,
    /// Entry count that triggers an eviction sweep.
    pub max_entries: usize,
}

impl Default for HeightCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(5),
            max_entries: 4096,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CachedHeight {
    /// `None` is cached too: a void column stays void for the TTL.
    height: Option<f32>,
    cached_at: Instant,
}

type CellKey = (MapId, i32, i32);

fn cell_of(x: f32, y: f32) -> (i32, i32) {
    (
        (x / CELL_SIZE).floor() as i32,
        (y / CELL_SIZE).floor() as i32,
    )
}

// ────────────────────────────────────────────────────────────────────────────
// GroundValidator
// ────────────────────────────────────────────────────────────────────────────

/// Terrain-height oracle with caching and void/unsafe classification.
pub struct GroundValidator {
    world: Arc<dyn WorldQuery>,
    clock: SharedClock,
    config: HeightCacheConfig,
    cache: Mutex<HashMap<CellKey, CachedHeight>>,
}

impl GroundValidator {
    pub fn new(world: Arc<dyn WorldQuery>) -> Self {
        Self::with_config(world, HeightCacheConfig::default(), system_clock())
    }

    pub fn with_config(
        world: Arc<dyn WorldQuery>,
        config: HeightCacheConfig,
        clock: SharedClock,
    ) -> Self {
        Self {
            world,
            clock,
            config,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Terrain height at `(x, y)`, from cache when fresh.
    ///
    /// `seed_z` hints the floor to prefer in multi-level geometry and is
    /// not part of the cache key — the cell granularity already assumes
    /// one floor per cell.
    pub fn height_at(&self, map: MapId, x: f32, y: f32, seed_z: f32) -> Option<f32> {
        let key = {
            let (cx, cy) = cell_of(x, y);
            (map, cx, cy)
        };
        let now = self.clock.now();

        let mut cache = self.cache.lock().expect("height cache poisoned");
        if let Some(entry) = cache.get(&key) {
            if now.saturating_duration_since(entry.cached_at) <= self.config.ttl {
                return entry.height;
            }
        }

        let height = self.world.ground_height(map, x, y, seed_z, true);
        if cache.len() >= self.config.max_entries {
            let ttl = self.config.ttl;
            cache.retain(|_, e| now.saturating_duration_since(e.cached_at) <= ttl);
            if cache.len() >= self.config.max_entries {
                debug!(entries = cache.len(), "height cache full of live entries; clearing");
                cache.clear();
            }
        }
        cache.insert(
            key,
            CachedHeight {
                height,
                cached_at: now,
            },
        );
        height
    }

    /// True when the column under `position` has no usable ground.
    pub fn is_void(&self, map: MapId, position: Position) -> bool {
        match self.height_at(map, position.x, position.y, position.z) {
            None => true,
            Some(height) => height <= VOID_FLOOR,
        }
    }

    /// True when the column is void or carries dangerous liquid.
    pub fn is_unsafe_terrain(&self, map: MapId, position: Position) -> bool {
        if self.is_void(map, position) {
            return true;
        }
        match self.world.liquid_at(map, position) {
            Some(sample) => {
                LiquidInfo::submersion(position, sample.kind, sample.surface_height).is_dangerous()
            }
            None => false,
        }
    }

    /// `position` with its height replaced by the terrain height, or `None`
    /// over void.
    pub fn snap_to_ground(&self, map: MapId, position: Position) -> Option<Position> {
        let height = self.height_at(map, position.x, position.y, position.z)?;
        if height <= VOID_FLOOR {
            return None;
        }
        Some(position.with_z(height))
    }

    /// Structured validation of the ground under `position`.
    pub fn validate(&self, map: MapId, position: Position) -> Validation {
        match self.height_at(map, position.x, position.y, position.z) {
            None => Err(ValidationError::NoGroundHeight { position }),
            Some(height) if height <= VOID_FLOOR => {
                Err(ValidationError::VoidPosition { position })
            }
            Some(_) => Ok(()),
        }
    }

    /// Number of live cache entries, for metrics.
    pub fn cached_cells(&self) -> usize {
        self.cache.lock().expect("height cache poisoned").len()
    }
}
