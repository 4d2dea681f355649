//! World-space coordinates and identity types.
//!
//! [`Position`] is the universal 3-D coordinate used by every navguard crate.
//! [`MapId`] names one map (continent, instance, …) in the host world;
//! [`AgentId`] names one agent for log correlation.
//!
//! # Example
//!
//! ```rust
//! use navguard_types::position::Position;
//!
//! let a = Position::new(0.0, 0.0, 0.0);
//! let b = Position::new(3.0, 4.0, 0.0);
//! assert!((a.distance_to(b) - 5.0).abs() < f32::EPSILON);
//! ```

use std::time::Instant;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ────────────────────────────────────────────────────────────────────────────
// MapId / AgentId
// ────────────────────────────────────────────────────────────────────────────

/// Identifier of one map in the host world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapId(pub u32);

impl std::fmt::Display for MapId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "map:{}", self.0)
    }
}

/// Identifier of one agent, used to correlate log lines and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub Uuid);

impl AgentId {
    /// Mint a fresh random agent id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Position
// ────────────────────────────────────────────────────────────────────────────

/// A point in 3-D world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    /// Create a new position.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// True when every coordinate is a finite number (no NaN, no ±∞).
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(&self, other: Position) -> f32 {
        self.distance_squared_to(other).sqrt()
    }

    /// Squared Euclidean distance to `other`.
    ///
    /// Use this for threshold comparisons to avoid the square root.
    pub fn distance_squared_to(&self, other: Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Horizontal (XY-plane) distance to `other`, ignoring height.
    pub fn distance_2d_to(&self, other: Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// This position displaced by `(dx, dy, dz)`.
    pub fn offset(&self, dx: f32, dy: f32, dz: f32) -> Position {
        Position::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// This position with its height replaced by `z`.
    pub fn with_z(&self, z: f32) -> Position {
        Position::new(self.x, self.y, z)
    }

    /// The point at `distance` from this position along `orientation_rad`
    /// (counter-clockwise from +X), keeping the current height.
    pub fn point_ahead(&self, orientation_rad: f32, distance: f32) -> Position {
        Position::new(
            self.x + orientation_rad.cos() * distance,
            self.y + orientation_rad.sin() * distance,
            self.z,
        )
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// PositionSnapshot
// ────────────────────────────────────────────────────────────────────────────

/// A position paired with the monotonic instant it was recorded.
///
/// Owned by whichever rolling buffer holds it and immutable once recorded.
#[derive(Debug, Clone, Copy)]
pub struct PositionSnapshot {
    pub position: Position,
    pub recorded_at: Instant,
}

impl PositionSnapshot {
    /// Record `position` at `recorded_at`.
    pub fn new(position: Position, recorded_at: Instant) -> Self {
        Self {
            position,
            recorded_at,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// WorldBounds
// ────────────────────────────────────────────────────────────────────────────

/// The coordinate envelope outside which no position can be valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    /// Maximum absolute X or Y coordinate.
    pub max_xy: f32,
    /// Minimum Z coordinate (depths below this are rejected outright).
    pub min_z: f32,
    /// Maximum Z coordinate.
    pub max_z: f32,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            max_xy: 17_000.0,
            min_z: -2_000.0,
            max_z: 5_000.0,
        }
    }
}

impl WorldBounds {
    /// True when `position` is finite and inside the envelope.
    pub fn contains(&self, position: Position) -> bool {
        position.is_finite()
            && position.x.abs() <= self.max_xy
            && position.y.abs() <= self.max_xy
            && position.z >= self.min_z
            && position.z <= self.max_z
    }
}
