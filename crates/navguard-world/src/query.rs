//! The `WorldQuery` capability trait.
//!
//! Navguard never touches terrain meshes, liquid volumes, or collision
//! geometry directly — the host simulation answers a small set of spatial
//! questions through this trait. Everything downstream (validators, path
//! generation, recovery) holds an `Arc<dyn WorldQuery>`, so the whole
//! pipeline runs unchanged against the deterministic
//! [`SimWorld`](crate::sim::SimWorld) in tests.
//!
//! All queries are blocking, bounded-time calls; all fail closed (`None` /
//! `false` for anything unknown or out of world).

use navguard_types::{LiquidKind, MapId, Position};

/// Raw liquid report at one map column, as the host world sees it.
///
/// The validators derive the full [`LiquidInfo`][navguard_types::LiquidInfo]
/// (depth, submersion, danger) from this sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiquidSample {
    pub kind: LiquidKind,
    /// Height of the liquid surface at the queried column.
    pub surface_height: f32,
}

/// Spatial queries answered by the host simulation.
pub trait WorldQuery: Send + Sync {
    /// True when `map` exists in the host world.
    fn is_known_map(&self, map: MapId) -> bool;

    /// Terrain height at `(x, y)`, or `None` when the column has no ground
    /// (void, unloaded terrain, outside the map).
    ///
    /// `seed_z` hints which floor to prefer in multi-level geometry;
    /// `fine_mesh` requests the detailed collision mesh instead of the
    /// coarse terrain grid.
    fn ground_height(&self, map: MapId, x: f32, y: f32, seed_z: f32, fine_mesh: bool)
    -> Option<f32>;

    /// The liquid occupying the column at `position`, or `None` for dry
    /// ground.
    fn liquid_at(&self, map: MapId, position: Position) -> Option<LiquidSample>;

    /// True when an unobstructed straight line exists between `from` and
    /// `to`. Unknown maps report `false` (fail closed).
    fn line_of_sight(&self, map: MapId, from: Position, to: Position) -> bool;

    /// Compute a raw path between two points, or `None` when the navigation
    /// mesh has no route. This is the primitive the validated generator
    /// wraps; its output is unvalidated.
    fn find_path(&self, map: MapId, from: Position, to: Position) -> Option<Vec<Position>>;
}
