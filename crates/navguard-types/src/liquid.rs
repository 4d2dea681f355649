//! Liquid classification model.
//!
//! The host world reports raw liquid volumes; navguard derives a
//! [`LiquidInfo`] per query (never cached — liquid state is cheap to
//! recompute and the agent moves between queries).
//!
//! Magma and slime are lethal on contact and must never be entered; water
//! and ocean are swimmable but cost breath below the surface.

use serde::{Deserialize, Serialize};

use crate::position::Position;

/// Eye offset used to decide whether an agent at a position is underwater:
/// the head is this far above the feet.
pub const SWIM_EYE_HEIGHT: f32 = 1.6;

// ────────────────────────────────────────────────────────────────────────────
// LiquidKind
// ────────────────────────────────────────────────────────────────────────────

/// The kind of liquid occupying a point, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiquidKind {
    None,
    Water,
    Ocean,
    Magma,
    Slime,
}

impl LiquidKind {
    /// Lethal on contact (magma, slime).
    pub fn is_dangerous(self) -> bool {
        matches!(self, LiquidKind::Magma | LiquidKind::Slime)
    }

    /// Swimmable liquid that costs breath while submerged.
    pub fn requires_breath(self) -> bool {
        matches!(self, LiquidKind::Water | LiquidKind::Ocean)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LiquidInfo
// ────────────────────────────────────────────────────────────────────────────

/// Everything navguard knows about the liquid situation at one position.
///
/// Derived fresh per query from world state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidInfo {
    /// True when the position's feet are at or below the liquid surface.
    pub in_liquid: bool,
    /// True when the eye line ([`SWIM_EYE_HEIGHT`] above the feet) is
    /// submerged.
    pub underwater: bool,
    /// Height of the liquid surface, when liquid is present.
    pub surface_height: Option<f32>,
    /// Signed depth: surface height minus feet height. Negative when the
    /// position is above the surface.
    pub depth: f32,
    pub kind: LiquidKind,
}

impl LiquidInfo {
    /// The "no liquid here" result.
    pub fn dry() -> Self {
        Self {
            in_liquid: false,
            underwater: false,
            surface_height: None,
            depth: 0.0,
            kind: LiquidKind::None,
        }
    }

    /// Derive the full liquid picture for feet at `position` inside a liquid
    /// volume of `kind` whose surface sits at `surface_height`.
    pub fn submersion(position: Position, kind: LiquidKind, surface_height: f32) -> Self {
        let depth = surface_height - position.z;
        Self {
            in_liquid: depth >= 0.0,
            underwater: depth > SWIM_EYE_HEIGHT,
            surface_height: Some(surface_height),
            depth,
            kind,
        }
    }

    pub fn is_dangerous(&self) -> bool {
        self.in_liquid && self.kind.is_dangerous()
    }

    pub fn requires_breath(&self) -> bool {
        self.in_liquid && self.kind.requires_breath()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LiquidTransition
// ────────────────────────────────────────────────────────────────────────────

/// How the liquid situation changes between two points of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiquidTransition {
    /// No change in liquid state.
    None,
    /// Dry → benign liquid.
    Entering,
    /// Dry or benign liquid → dangerous liquid. Never allowed on a path.
    EnteringDangerous,
    /// Liquid → dry ground.
    Exiting,
    /// Staying in liquid, moving meaningfully deeper.
    Deepening,
    /// Staying in liquid, moving meaningfully shallower.
    Shallowing,
}
