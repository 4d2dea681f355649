//! [`CollisionValidator`] – line-of-sight and geometry-embedding checks.
//!
//! All sight tests are raised by [`EYE_HEIGHT`] so that ankle-high clutter
//! does not read as a wall. Path validation reports the index of the first
//! blocked segment; [`CollisionValidator::last_valid_position`] then probes
//! along that segment to find how far the agent can actually get.

use std::sync::Arc;

use navguard_types::{MapId, Position, Validation, ValidationError};
use navguard_world::query::WorldQuery;

/// Sight tests run at roughly eye level above the queried points.
pub const EYE_HEIGHT: f32 = 2.0;

/// Step length of the last-valid-position probe along a blocked segment.
const PROBE_STEP: f32 = 0.5;

/// Number of radial rays cast by the embedding heuristic.
const EMBED_RAYS: usize = 8;

/// Length of each embedding ray.
const EMBED_RAY_LENGTH: f32 = 10.0;

/// Sight-based collision checks over world geometry.
pub struct CollisionValidator {
    world: Arc<dyn WorldQuery>,
}

impl CollisionValidator {
    pub fn new(world: Arc<dyn WorldQuery>) -> Self {
        Self { world }
    }

    /// Eye-level line-of-sight between two points.
    pub fn line_of_sight(&self, map: MapId, from: Position, to: Position) -> bool {
        self.world.line_of_sight(
            map,
            from.offset(0.0, 0.0, EYE_HEIGHT),
            to.offset(0.0, 0.0, EYE_HEIGHT),
        )
    }

    /// Validate a single path segment.
    pub fn validate_segment(&self, map: MapId, from: Position, to: Position) -> Validation {
        if self.line_of_sight(map, from, to) {
            Ok(())
        } else {
            Err(ValidationError::CollisionDetected { from, to })
        }
    }

    /// Validate every consecutive segment of `points`, reporting the
    /// 0-based index of the first blocked one.
    pub fn validate_path(&self, map: MapId, points: &[Position]) -> Validation {
        for (segment, pair) in points.windows(2).enumerate() {
            if !self.line_of_sight(map, pair[0], pair[1]) {
                return Err(ValidationError::PathBlocked { segment });
            }
        }
        Ok(())
    }

    /// March from `from` toward `to` in fixed steps and return the last
    /// point still visible from `from`. Returns `from` itself when the very
    /// first step is already blocked.
    pub fn last_valid_position(&self, map: MapId, from: Position, to: Position) -> Position {
        let total = from.distance_to(to);
        if total <= PROBE_STEP {
            return from;
        }
        let steps = (total / PROBE_STEP) as usize;
        let mut last_good = from;
        for i in 1..=steps {
            let t = (i as f32 * PROBE_STEP) / total;
            let probe = Position::new(
                from.x + (to.x - from.x) * t,
                from.y + (to.y - from.y) * t,
                from.z + (to.z - from.z) * t,
            );
            if !self.line_of_sight(map, from, probe) {
                return last_good;
            }
            last_good = probe;
        }
        last_good
    }

    /// Heuristic: is `position` embedded inside collision geometry?
    ///
    /// Casts [`EMBED_RAYS`] horizontal rays of [`EMBED_RAY_LENGTH`] units
    /// spread evenly around the point; when fewer than half escape, the
    /// point is considered inside a wall or pillar.
    pub fn is_inside_geometry(&self, map: MapId, position: Position) -> bool {
        let mut escaped = 0usize;
        for i in 0..EMBED_RAYS {
            let angle = i as f32 * (std::f32::consts::TAU / EMBED_RAYS as f32);
            let target = position.offset(
                angle.cos() * EMBED_RAY_LENGTH,
                angle.sin() * EMBED_RAY_LENGTH,
                0.0,
            );
            if self.line_of_sight(map, position, target) {
                escaped += 1;
            }
        }
        escaped < EMBED_RAYS / 2
    }
}
