//! Recovery-ladder types.
//!
//! Stuck recovery escalates through five levels. Which level runs is a pure
//! function of the attempt count — see [`RecoveryLevel::for_attempt`]. The
//! first two attempts both use level 1: recalculating the path is cheap and
//! frequently enough, so it gets two tries before the ladder escalates.

use serde::{Deserialize, Serialize};

use crate::position::Position;

// ────────────────────────────────────────────────────────────────────────────
// RecoveryLevel
// ────────────────────────────────────────────────────────────────────────────

/// One rung of the escalating recovery ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecoveryLevel {
    /// Clear motion intent and let the caller regenerate the path.
    RecalculatePath,
    /// Step straight backwards and retry from there.
    BackupAndRetry,
    /// Move to a random safe point in an annulus around the agent.
    RandomNearby,
    /// Teleport to the most recent safe position in history.
    TeleportToSafe,
    /// Unconditional terminal action: drop all movement intent.
    EvadeAndReset,
}

impl RecoveryLevel {
    /// Select the ladder rung for a given attempt count.
    ///
    /// Attempts 0 and 1 both map to level 1; from there each attempt
    /// escalates one rung, capping at level 5.
    pub fn for_attempt(attempt: u32) -> Self {
        match attempt {
            0 | 1 => RecoveryLevel::RecalculatePath,
            2 => RecoveryLevel::BackupAndRetry,
            3 => RecoveryLevel::RandomNearby,
            4 => RecoveryLevel::TeleportToSafe,
            _ => RecoveryLevel::EvadeAndReset,
        }
    }

    /// Ladder position as a 1-based number, for logs and metrics.
    pub fn rung(self) -> u8 {
        match self {
            RecoveryLevel::RecalculatePath => 1,
            RecoveryLevel::BackupAndRetry => 2,
            RecoveryLevel::RandomNearby => 3,
            RecoveryLevel::TeleportToSafe => 4,
            RecoveryLevel::EvadeAndReset => 5,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RecoveryOutcome
// ────────────────────────────────────────────────────────────────────────────

/// What one recovery attempt did.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryOutcome {
    pub success: bool,
    pub level: RecoveryLevel,
    /// Human-readable account of what the attempt did or why it failed.
    pub message: String,
    /// Where the agent was sent, for levels that relocate it.
    pub new_position: Option<Position>,
}

impl RecoveryOutcome {
    pub fn succeeded(level: RecoveryLevel, message: impl Into<String>) -> Self {
        Self {
            success: true,
            level,
            message: message.into(),
            new_position: None,
        }
    }

    pub fn failed(level: RecoveryLevel, message: impl Into<String>) -> Self {
        Self {
            success: false,
            level,
            message: message.into(),
            new_position: None,
        }
    }

    /// Attach the position the agent was sent to.
    pub fn at(mut self, position: Position) -> Self {
        self.new_position = Some(position);
        self
    }
}
