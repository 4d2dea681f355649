//! Deterministic in-process world for tests and CI.
//!
//! [`SimWorld`] implements [`WorldQuery`] over hand-placed geometry: a flat
//! ground plane, axis-aligned wall boxes that block line of sight, liquid
//! volumes, and void holes with no ground. [`SimAgent`] is a recording
//! [`AgentBody`] stub. Together they let the full navguard stack — the
//! validators, the path pipeline, stuck detection, and recovery — run in
//! headless tests without a live game world.
//!
//! # Example
//!
//! ```rust
//! use navguard_types::{LiquidKind, MapId, Position};
//! use navguard_world::query::WorldQuery;
//! use navguard_world::sim::{SimBox, SimWorld};
//!
//! let world = SimWorld::new(MapId(0))
//!     .with_ground_height(0.0)
//!     .with_wall(SimBox::new(
//!         Position::new(4.0, -2.0, 0.0),
//!         Position::new(5.0, 2.0, 10.0),
//!     ));
//!
//! let from = Position::new(0.0, 0.0, 1.0);
//! let to = Position::new(10.0, 0.0, 1.0);
//! assert!(!world.line_of_sight(MapId(0), from, to)); // wall in the way
//! ```

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::debug;

use navguard_types::{AgentId, LiquidKind, MapId, MovementFlags, Position};

use crate::body::AgentBody;
use crate::query::{LiquidSample, WorldQuery};

/// Spacing between waypoints of a simulated raw path.
const SIM_WAYPOINT_SPACING: f32 = 5.0;

// ────────────────────────────────────────────────────────────────────────────
// SimBox
// ────────────────────────────────────────────────────────────────────────────

/// An axis-aligned box of simulated geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimBox {
    pub min: Position,
    pub max: Position,
}

impl SimBox {
    /// Build a box from two opposite corners, normalising so `min ≤ max`
    /// per axis.
    pub fn new(a: Position, b: Position) -> Self {
        Self {
            min: Position::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Position::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// True when `p` lies inside or on the boundary.
    pub fn contains_point(&self, p: Position) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// True when `(x, y)` falls inside the box's footprint, at any height.
    pub fn contains_column(&self, x: f32, y: f32) -> bool {
        x >= self.min.x && x <= self.max.x && y >= self.min.y && y <= self.max.y
    }

    /// Slab-method test: does the segment `from → to` pass through the box?
    pub fn intersects_segment(&self, from: Position, to: Position) -> bool {
        let mut t_min = 0.0_f32;
        let mut t_max = 1.0_f32;
        let axes = [
            (from.x, to.x - from.x, self.min.x, self.max.x),
            (from.y, to.y - from.y, self.min.y, self.max.y),
            (from.z, to.z - from.z, self.min.z, self.max.z),
        ];
        for (start, delta, min, max) in axes {
            if delta.abs() < f32::EPSILON {
                if start < min || start > max {
                    return false;
                }
            } else {
                let inv = 1.0 / delta;
                let mut t0 = (min - start) * inv;
                let mut t1 = (max - start) * inv;
                if t0 > t1 {
                    std::mem::swap(&mut t0, &mut t1);
                }
                t_min = t_min.max(t0);
                t_max = t_max.min(t1);
                if t_min > t_max {
                    return false;
                }
            }
        }
        true
    }
}

/// A liquid volume: a [`SimBox`] region whose top face is the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimVolume {
    pub region: SimBox,
    pub kind: LiquidKind,
}

// ────────────────────────────────────────────────────────────────────────────
// Query counters
// ────────────────────────────────────────────────────────────────────────────

/// How many times each [`WorldQuery`] method has been called.
///
/// Tests assert on these to prove caching behaviour (a cache hit must not
/// touch the world).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimCounters {
    pub ground_queries: u64,
    pub liquid_queries: u64,
    pub los_queries: u64,
    pub path_queries: u64,
}

// ────────────────────────────────────────────────────────────────────────────
// SimWorld
// ────────────────────────────────────────────────────────────────────────────

/// Deterministic fake world, builder style.
///
/// Chain `with_*` calls to place geometry, then hand the world to the stack
/// as an `Arc<dyn WorldQuery>` via [`SimWorld::into_shared`].
pub struct SimWorld {
    known_maps: HashSet<MapId>,
    ground_height: f32,
    walls: Vec<SimBox>,
    liquids: Vec<SimVolume>,
    voids: Vec<SimBox>,
    paths_blocked: bool,
    counters: Mutex<SimCounters>,
}

impl SimWorld {
    /// Create a flat, empty world containing only `map`, with ground at
    /// height zero.
    pub fn new(map: MapId) -> Self {
        let mut known_maps = HashSet::new();
        known_maps.insert(map);
        Self {
            known_maps,
            ground_height: 0.0,
            walls: Vec::new(),
            liquids: Vec::new(),
            voids: Vec::new(),
            paths_blocked: false,
            counters: Mutex::new(SimCounters::default()),
        }
    }

    /// Register an additional valid map id.
    pub fn with_map(mut self, map: MapId) -> Self {
        self.known_maps.insert(map);
        self
    }

    /// Set the height of the global ground plane.
    pub fn with_ground_height(mut self, height: f32) -> Self {
        self.ground_height = height;
        self
    }

    /// Place a wall box that blocks line of sight.
    pub fn with_wall(mut self, wall: SimBox) -> Self {
        self.walls.push(wall);
        self
    }

    /// Place a liquid volume. The top face of `region` is the surface.
    pub fn with_liquid(mut self, region: SimBox, kind: LiquidKind) -> Self {
        self.liquids.push(SimVolume { region, kind });
        self
    }

    /// Cut a hole in the ground: columns inside `region` report no height.
    pub fn with_void(mut self, region: SimBox) -> Self {
        self.voids.push(region);
        self
    }

    /// Force [`WorldQuery::find_path`] to fail, simulating a navigation
    /// mesh with no route.
    pub fn with_pathfinding_blocked(mut self) -> Self {
        self.paths_blocked = true;
        self
    }

    /// Finish building and return a shareable handle.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Snapshot of the per-method query counters.
    pub fn counters(&self) -> SimCounters {
        *self.counters.lock().expect("sim counters poisoned")
    }

    fn bump(&self, f: impl FnOnce(&mut SimCounters)) {
        f(&mut self.counters.lock().expect("sim counters poisoned"));
    }
}

impl WorldQuery for SimWorld {
    fn is_known_map(&self, map: MapId) -> bool {
        self.known_maps.contains(&map)
    }

    fn ground_height(
        &self,
        map: MapId,
        x: f32,
        y: f32,
        _seed_z: f32,
        _fine_mesh: bool,
    ) -> Option<f32> {
        self.bump(|c| c.ground_queries += 1);
        if !self.is_known_map(map) {
            return None;
        }
        if self.voids.iter().any(|v| v.contains_column(x, y)) {
            return None;
        }
        Some(self.ground_height)
    }

    fn liquid_at(&self, map: MapId, position: Position) -> Option<LiquidSample> {
        self.bump(|c| c.liquid_queries += 1);
        if !self.is_known_map(map) {
            return None;
        }
        self.liquids
            .iter()
            .find(|v| v.region.contains_column(position.x, position.y))
            .map(|v| LiquidSample {
                kind: v.kind,
                surface_height: v.region.max.z,
            })
    }

    fn line_of_sight(&self, map: MapId, from: Position, to: Position) -> bool {
        self.bump(|c| c.los_queries += 1);
        if !self.is_known_map(map) {
            return false;
        }
        !self
            .walls
            .iter()
            .any(|wall| wall.intersects_segment(from, to))
    }

    fn find_path(&self, map: MapId, from: Position, to: Position) -> Option<Vec<Position>> {
        self.bump(|c| c.path_queries += 1);
        if self.paths_blocked || !self.is_known_map(map) {
            debug!(%map, %from, %to, "sim world refusing path request");
            return None;
        }
        // Straight segment subdivided into evenly spaced waypoints. The sim
        // world has no navigation mesh; validation is the caller's job.
        let length = from.distance_to(to);
        let steps = (length / SIM_WAYPOINT_SPACING).ceil().max(1.0) as usize;
        let mut points = Vec::with_capacity(steps + 1);
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            points.push(Position::new(
                from.x + (to.x - from.x) * t,
                from.y + (to.y - from.y) * t,
                from.z + (to.z - from.z) * t,
            ));
        }
        Some(points)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SimAgent
// ────────────────────────────────────────────────────────────────────────────

/// Recording [`AgentBody`] stub.
///
/// Motion commands are recorded, not executed — tests reposition the agent
/// explicitly with [`SimAgent::set_position`] to simulate physics. Teleports
/// do move the agent, matching their instantaneous semantics.
pub struct SimAgent {
    id: AgentId,
    map: MapId,
    position: Position,
    orientation: f32,
    flags: MovementFlags,
    speed: f32,
    in_combat: bool,
    motion_finished: bool,
    /// Every path handed to [`AgentBody::move_along`].
    pub commanded_paths: Vec<Vec<Position>>,
    /// Every destination handed to [`AgentBody::move_directly`].
    pub direct_moves: Vec<Position>,
    /// Every teleport destination.
    pub teleports: Vec<Position>,
    /// Number of [`AgentBody::stop_movement`] calls.
    pub stops: usize,
    /// Number of [`AgentBody::disengage_movement`] calls.
    pub disengages: usize,
}

impl SimAgent {
    pub fn new(map: MapId, position: Position) -> Self {
        Self {
            id: AgentId::new(),
            map,
            position,
            orientation: 0.0,
            flags: MovementFlags::default(),
            speed: 7.0,
            in_combat: false,
            motion_finished: false,
            commanded_paths: Vec::new(),
            direct_moves: Vec::new(),
            teleports: Vec::new(),
            stops: 0,
            disengages: 0,
        }
    }

    /// Reposition the agent, as the host physics would.
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn set_in_combat(&mut self, in_combat: bool) {
        self.in_combat = in_combat;
    }

    /// Mark the queued motion as having run to completion.
    pub fn set_motion_finished(&mut self, finished: bool) {
        self.motion_finished = finished;
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// The last path handed to [`AgentBody::move_along`], if any.
    pub fn last_commanded_path(&self) -> Option<&[Position]> {
        self.commanded_paths.last().map(Vec::as_slice)
    }
}

impl AgentBody for SimAgent {
    fn id(&self) -> AgentId {
        self.id
    }

    fn map(&self) -> MapId {
        self.map
    }

    fn position(&self) -> Position {
        self.position
    }

    fn orientation(&self) -> f32 {
        self.orientation
    }

    fn set_orientation(&mut self, orientation_rad: f32) {
        self.orientation = orientation_rad;
    }

    fn movement_flags(&self) -> MovementFlags {
        self.flags
    }

    fn set_movement_flags(&mut self, flags: MovementFlags) {
        self.flags = flags;
    }

    fn current_speed(&self) -> f32 {
        self.speed
    }

    fn move_along(&mut self, path: &[Position], speed: f32) {
        self.speed = speed;
        self.motion_finished = false;
        self.commanded_paths.push(path.to_vec());
    }

    fn move_directly(&mut self, destination: Position, speed: f32) {
        self.speed = speed;
        self.motion_finished = false;
        self.direct_moves.push(destination);
    }

    fn stop_movement(&mut self) {
        self.stops += 1;
        self.motion_finished = true;
    }

    fn teleport_to(&mut self, position: Position) {
        self.teleports.push(position);
        self.position = position;
    }

    fn is_in_combat(&self) -> bool {
        self.in_combat
    }

    fn disengage_movement(&mut self) {
        self.disengages += 1;
        self.motion_finished = true;
    }

    fn motion_finished(&self) -> bool {
        self.motion_finished
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: MapId = MapId(0);

    // ── SimBox ──────────────────────────────────────────────────────────────

    #[test]
    fn sim_box_normalises_corners() {
        let b = SimBox::new(Position::new(5.0, 5.0, 5.0), Position::new(1.0, 1.0, 1.0));
        assert_eq!(b.min, Position::new(1.0, 1.0, 1.0));
        assert_eq!(b.max, Position::new(5.0, 5.0, 5.0));
    }

    #[test]
    fn segment_through_box_intersects() {
        let b = SimBox::new(Position::new(4.0, -1.0, 0.0), Position::new(5.0, 1.0, 10.0));
        assert!(b.intersects_segment(Position::new(0.0, 0.0, 1.0), Position::new(10.0, 0.0, 1.0)));
    }

    #[test]
    fn segment_beside_box_does_not_intersect() {
        let b = SimBox::new(Position::new(4.0, -1.0, 0.0), Position::new(5.0, 1.0, 10.0));
        assert!(!b.intersects_segment(Position::new(0.0, 5.0, 1.0), Position::new(10.0, 5.0, 1.0)));
    }

    #[test]
    fn segment_stopping_short_does_not_intersect() {
        let b = SimBox::new(Position::new(4.0, -1.0, 0.0), Position::new(5.0, 1.0, 10.0));
        assert!(!b.intersects_segment(Position::new(0.0, 0.0, 1.0), Position::new(3.0, 0.0, 1.0)));
    }

    #[test]
    fn axis_parallel_segment_outside_slab_misses() {
        let b = SimBox::new(Position::new(0.0, 0.0, 0.0), Position::new(1.0, 1.0, 1.0));
        // Parallel to X at y=2: outside the Y slab for its whole length.
        assert!(!b.intersects_segment(Position::new(-5.0, 2.0, 0.5), Position::new(5.0, 2.0, 0.5)));
    }

    // ── SimWorld queries ────────────────────────────────────────────────────

    #[test]
    fn ground_height_on_plane() {
        let world = SimWorld::new(MAP).with_ground_height(12.5);
        assert_eq!(world.ground_height(MAP, 3.0, 4.0, 20.0, false), Some(12.5));
    }

    #[test]
    fn ground_height_unknown_map_is_none() {
        let world = SimWorld::new(MAP);
        assert_eq!(world.ground_height(MapId(99), 0.0, 0.0, 0.0, false), None);
    }

    #[test]
    fn void_column_has_no_ground() {
        let world = SimWorld::new(MAP).with_void(SimBox::new(
            Position::new(10.0, 10.0, -100.0),
            Position::new(20.0, 20.0, 100.0),
        ));
        assert_eq!(world.ground_height(MAP, 15.0, 15.0, 0.0, false), None);
        assert_eq!(world.ground_height(MAP, 0.0, 0.0, 0.0, false), Some(0.0));
    }

    #[test]
    fn liquid_lookup_reports_kind_and_surface() {
        let world = SimWorld::new(MAP).with_liquid(
            SimBox::new(Position::new(0.0, 0.0, -10.0), Position::new(10.0, 10.0, 2.0)),
            LiquidKind::Water,
        );
        let sample = world.liquid_at(MAP, Position::new(5.0, 5.0, 0.0)).unwrap();
        assert_eq!(sample.kind, LiquidKind::Water);
        assert!((sample.surface_height - 2.0).abs() < f32::EPSILON);
        assert!(world.liquid_at(MAP, Position::new(50.0, 50.0, 0.0)).is_none());
    }

    #[test]
    fn line_of_sight_blocked_by_wall_only() {
        let world = SimWorld::new(MAP).with_wall(SimBox::new(
            Position::new(4.0, -2.0, 0.0),
            Position::new(5.0, 2.0, 10.0),
        ));
        let from = Position::new(0.0, 0.0, 1.0);
        assert!(!world.line_of_sight(MAP, from, Position::new(10.0, 0.0, 1.0)));
        assert!(world.line_of_sight(MAP, from, Position::new(0.0, 10.0, 1.0)));
    }

    #[test]
    fn line_of_sight_fails_closed_on_unknown_map() {
        let world = SimWorld::new(MAP);
        assert!(!world.line_of_sight(
            MapId(7),
            Position::new(0.0, 0.0, 0.0),
            Position::new(1.0, 0.0, 0.0)
        ));
    }

    #[test]
    fn find_path_subdivides_and_keeps_endpoints() {
        let world = SimWorld::new(MAP);
        let from = Position::new(0.0, 0.0, 0.0);
        let to = Position::new(20.0, 0.0, 0.0);
        let path = world.find_path(MAP, from, to).unwrap();
        assert!(path.len() >= 3);
        assert_eq!(path[0], from);
        assert_eq!(*path.last().unwrap(), to);
    }

    #[test]
    fn find_path_honours_blocked_switch() {
        let world = SimWorld::new(MAP).with_pathfinding_blocked();
        assert!(
            world
                .find_path(MAP, Position::new(0.0, 0.0, 0.0), Position::new(1.0, 0.0, 0.0))
                .is_none()
        );
    }

    #[test]
    fn counters_track_query_volume() {
        let world = SimWorld::new(MAP);
        world.ground_height(MAP, 0.0, 0.0, 0.0, false);
        world.ground_height(MAP, 1.0, 1.0, 0.0, false);
        world.liquid_at(MAP, Position::new(0.0, 0.0, 0.0));
        let counters = world.counters();
        assert_eq!(counters.ground_queries, 2);
        assert_eq!(counters.liquid_queries, 1);
        assert_eq!(counters.los_queries, 0);
    }

    // ── SimAgent ────────────────────────────────────────────────────────────

    #[test]
    fn sim_agent_records_motion_commands() {
        let mut agent = SimAgent::new(MAP, Position::new(0.0, 0.0, 0.0));
        let path = vec![Position::new(0.0, 0.0, 0.0), Position::new(5.0, 0.0, 0.0)];
        agent.move_along(&path, 7.0);
        agent.move_directly(Position::new(9.0, 0.0, 0.0), 4.5);
        agent.stop_movement();

        assert_eq!(agent.commanded_paths.len(), 1);
        assert_eq!(agent.last_commanded_path().unwrap(), path.as_slice());
        assert_eq!(agent.direct_moves, vec![Position::new(9.0, 0.0, 0.0)]);
        assert_eq!(agent.stops, 1);
        assert!((agent.current_speed() - 4.5).abs() < f32::EPSILON);
    }

    #[test]
    fn teleport_moves_the_agent_immediately() {
        let mut agent = SimAgent::new(MAP, Position::new(0.0, 0.0, 0.0));
        agent.teleport_to(Position::new(3.0, 4.0, 5.0));
        assert_eq!(agent.position(), Position::new(3.0, 4.0, 5.0));
        assert_eq!(agent.teleports.len(), 1);
    }

    #[test]
    fn move_along_clears_motion_finished() {
        let mut agent = SimAgent::new(MAP, Position::new(0.0, 0.0, 0.0));
        agent.set_motion_finished(true);
        agent.move_along(&[Position::new(1.0, 0.0, 0.0)], 7.0);
        assert!(!agent.motion_finished());
    }

    #[test]
    fn disengage_does_not_touch_combat_state() {
        let mut agent = SimAgent::new(MAP, Position::new(0.0, 0.0, 0.0));
        agent.set_in_combat(true);
        agent.disengage_movement();
        assert!(agent.is_in_combat());
        assert_eq!(agent.disengages, 1);
    }
}
