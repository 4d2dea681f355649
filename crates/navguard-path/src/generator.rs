//! [`ValidatedPathGenerator`] – the gated path pipeline.
//!
//! Every path request passes through one interception point: destination
//! checks, the raw path primitive, per-segment collision validation, and
//! per-segment liquid validation, gated by the configured
//! [`ValidationLevel`]. The pipeline short-circuits on the first failure
//! and never panics — a failed stage is a structured [`NavError`] the
//! caller records as a path-failure signal.
//!
//! Successful paths are simplified (collinear interior waypoints dropped),
//! annotated with swim requirements, and stored in the shared
//! [`PathCache`].

use std::sync::Arc;

use tracing::{debug, trace};

use navguard_types::{
    MapId, NavError, PathKind, Position, ValidationError, ValidationLevel,
};
use navguard_validate::{
    CollisionValidator, GroundValidator, LiquidValidator, PositionValidator,
};
use navguard_world::query::WorldQuery;

use crate::cache::{CachedPath, PathCache, PathCacheKey};

/// Interior waypoints whose incoming/outgoing directions agree beyond this
/// normalized dot product are dropped as collinear.
const COLLINEAR_DOT: f32 = 0.999;

// ────────────────────────────────────────────────────────────────────────────
// ValidatedPath
// ────────────────────────────────────────────────────────────────────────────

/// A path that survived the pipeline, with swim annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPath {
    pub points: Vec<Position>,
    pub kind: PathKind,
    /// At least one waypoint lies in liquid that must be swum.
    pub requires_swimming: bool,
    /// The path enters or leaves liquid somewhere along its length.
    pub contains_water_transition: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// ValidatedPathGenerator
// ────────────────────────────────────────────────────────────────────────────

/// Wraps the raw path primitive with staged validation.
pub struct ValidatedPathGenerator {
    world: Arc<dyn WorldQuery>,
    position: PositionValidator,
    liquid: LiquidValidator,
    collision: CollisionValidator,
    ground: Arc<GroundValidator>,
    cache: Arc<PathCache>,
    level: ValidationLevel,
}

impl ValidatedPathGenerator {
    pub fn new(
        world: Arc<dyn WorldQuery>,
        position: PositionValidator,
        ground: Arc<GroundValidator>,
        cache: Arc<PathCache>,
        level: ValidationLevel,
    ) -> Self {
        Self {
            liquid: LiquidValidator::new(world.clone()),
            collision: CollisionValidator::new(world.clone()),
            world,
            position,
            ground,
            cache,
            level,
        }
    }

    pub fn level(&self) -> ValidationLevel {
        self.level
    }

    pub fn set_level(&mut self, level: ValidationLevel) {
        self.level = level;
    }

    /// The shared ground validator, for callers that snap points to
    /// terrain with the same height cache.
    pub fn ground(&self) -> &Arc<GroundValidator> {
        &self.ground
    }

    /// Run the full pipeline from `from` to `to` on `map`.
    ///
    /// # Errors
    ///
    /// - [`NavError::Validation`] when a pipeline stage rejects the
    ///   destination or a segment.
    /// - [`NavError::NoPath`] when the raw primitive finds no route.
    /// - [`NavError::EmptyPath`] when the primitive returns zero waypoints.
    pub fn generate(
        &self,
        map: MapId,
        from: Position,
        to: Position,
    ) -> Result<ValidatedPath, NavError> {
        // Unknown maps fail closed regardless of level.
        if !self.world.is_known_map(map) {
            return Err(ValidationError::InvalidMapId { map }.into());
        }

        // Stage 1 (Basic+): destination sanity.
        if self.level >= ValidationLevel::Basic {
            self.position.validate_bounds(to)?;
            self.liquid.validate_destination(map, to)?;
        }

        // Cache short-circuit: near-identical requests reuse prior work.
        let key = PathCacheKey::new(map, from, to);
        if let Some(cached) = self.cache.get(&key) {
            trace!(%map, %from, %to, "path served from cache");
            return Ok(ValidatedPath {
                points: cached.points,
                kind: cached.kind,
                requires_swimming: cached.requires_swimming,
                contains_water_transition: cached.contains_water_transition,
            });
        }

        // Stage 2: the raw primitive.
        let raw = self
            .world
            .find_path(map, from, to)
            .ok_or(NavError::NoPath { from, to })?;
        if raw.is_empty() {
            return Err(NavError::EmptyPath);
        }

        // Stage 3 (Standard+): per-segment collision validation.
        if self.level >= ValidationLevel::Standard {
            self.collision.validate_path(map, &raw)?;
        }

        // Stage 4 (Strict): per-segment liquid-transition validation.
        if self.level >= ValidationLevel::Strict {
            self.liquid.validate_path(map, &raw)?;
        }

        // Annotate on the raw waypoints: simplification may collapse a
        // straight lake crossing down to its dry endpoints.
        let requires_swimming = raw
            .iter()
            .any(|p| self.liquid.classify(map, *p).requires_breath());
        let contains_water_transition = self.has_water_transition(map, &raw);
        let points = simplify_path(&raw);

        debug!(
            %map,
            waypoints = points.len(),
            raw_waypoints = raw.len(),
            requires_swimming,
            "validated path generated"
        );

        self.cache.put(
            key,
            CachedPath {
                points: points.clone(),
                kind: PathKind::Normal,
                requires_swimming,
                contains_water_transition,
            },
        );

        Ok(ValidatedPath {
            points,
            kind: PathKind::Normal,
            requires_swimming,
            contains_water_transition,
        })
    }

    fn has_water_transition(&self, map: MapId, points: &[Position]) -> bool {
        points.windows(2).any(|pair| {
            let a = self.liquid.classify(map, pair[0]);
            let b = self.liquid.classify(map, pair[1]);
            a.in_liquid != b.in_liquid
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Simplification
// ────────────────────────────────────────────────────────────────────────────

/// Drop interior waypoints that lie on a (nearly) straight run.
///
/// Endpoints always survive; a genuine corner always survives. Duplicate
/// consecutive points collapse.
pub fn simplify_path(points: &[Position]) -> Vec<Position> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let mut simplified = Vec::with_capacity(points.len());
    simplified.push(points[0]);

    for i in 1..points.len() - 1 {
        let prev = *simplified.last().expect("seeded with first point");
        let current = points[i];
        let next = points[i + 1];

        let incoming = direction(prev, current);
        let outgoing = direction(current, next);
        match (incoming, outgoing) {
            // Degenerate (zero-length) steps carry no direction; drop the
            // duplicate point.
            (None, _) | (_, None) => continue,
            (Some(a), Some(b)) => {
                let dot = a.0 * b.0 + a.1 * b.1 + a.2 * b.2;
                if dot < COLLINEAR_DOT {
                    simplified.push(current);
                }
            }
        }
    }

    simplified.push(*points.last().expect("len checked above"));
    simplified
}

fn direction(from: Position, to: Position) -> Option<(f32, f32, f32)> {
    let len = from.distance_to(to);
    if len < f32::EPSILON {
        return None;
    }
    Some(((to.x - from.x) / len, (to.y - from.y) / len, (to.z - from.z) / len))
}
