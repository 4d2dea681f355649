//! Validation results and operational errors.
//!
//! Every validator in navguard returns a [`Validation`] value: `Ok(())` or a
//! categorized [`ValidationError`] whose `Display` text is the precise
//! failure message. Validation never panics and never raises — callers
//! branch on the variant and log the message (fail-closed error design).

use serde::{Deserialize, Serialize};

use crate::liquid::LiquidKind;
use crate::position::{MapId, Position};

// ────────────────────────────────────────────────────────────────────────────
// ValidationError
// ────────────────────────────────────────────────────────────────────────────

/// Why a position or path failed validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("position {position} has non-finite coordinates")]
    InvalidPosition { position: Position },

    #[error("position {position} is outside world bounds")]
    OutOfBounds { position: Position },

    #[error("unknown map {map}")]
    InvalidMapId { map: MapId },

    #[error("collision between {from} and {to}")]
    CollisionDetected { from: Position, to: Position },

    #[error("path blocked at segment {segment}")]
    PathBlocked { segment: usize },

    #[error("dangerous liquid ({kind:?}) at {position}")]
    LiquidDanger { kind: LiquidKind, position: Position },

    #[error("position {position} is over the void")]
    VoidPosition { position: Position },

    #[error("no ground height at {position}")]
    NoGroundHeight { position: Position },
}

/// The outcome of any validation query.
pub type Validation = Result<(), ValidationError>;

// ────────────────────────────────────────────────────────────────────────────
// ValidationLevel
// ────────────────────────────────────────────────────────────────────────────

/// How many stages of the path-validation pipeline a candidate path must
/// pass. Levels are ordered: each level includes everything below it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum ValidationLevel {
    /// No validation at all; the raw path is trusted.
    None,
    /// Destination bounds and liquid-danger checks only.
    Basic,
    /// Basic plus per-segment collision validation.
    #[default]
    Standard,
    /// Standard plus per-segment liquid-transition validation.
    Strict,
}

// ────────────────────────────────────────────────────────────────────────────
// NavError
// ────────────────────────────────────────────────────────────────────────────

/// Operational failure of a navigation request.
///
/// Path-generation failure is non-fatal by design: callers record it as a
/// path-failure signal for the stuck detector and continue the tick.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NavError {
    #[error("no path found from {from} to {to}")]
    NoPath { from: Position, to: Position },

    #[error("path validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("path primitive returned no waypoints")]
    EmptyPath,
}

/// How a path was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathKind {
    /// Produced and validated by the full pipeline.
    Normal,
    /// Degraded straight-line fallback issued after path generation failed.
    Direct,
}
