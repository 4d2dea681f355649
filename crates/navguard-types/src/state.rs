//! Movement-state and stuck-condition model.
//!
//! An agent is in exactly one [`MovementStateKind`] at a time. The swim and
//! fall [`MovementFlags`] are *derived* from the active state — the state
//! machine reconciles them every tick; nothing else may write them.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::position::Position;

// ────────────────────────────────────────────────────────────────────────────
// MovementStateKind
// ────────────────────────────────────────────────────────────────────────────

/// The closed set of movement states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementStateKind {
    Idle,
    Ground,
    Swimming,
    /// Declared for completeness; transitions into it are refused.
    Flying,
    Falling,
    /// Entered only by the stuck-recovery orchestration, never by
    /// environment detection.
    Stuck,
}

impl MovementStateKind {
    /// The movement flags an agent in this state must carry.
    pub fn expected_flags(self) -> MovementFlags {
        MovementFlags {
            swimming: self == MovementStateKind::Swimming,
            falling: self == MovementStateKind::Falling,
        }
    }
}

/// Derived swim/fall flag bits mirrored onto the agent every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MovementFlags {
    pub swimming: bool,
    pub falling: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Stuck model
// ────────────────────────────────────────────────────────────────────────────

/// Which independent detector declared the agent stuck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StuckKind {
    /// Displacement over the sampling window stayed under the threshold.
    Position,
    /// No waypoint-index advance for too long.
    Progress,
    /// Too many consecutive path-generation failures.
    PathFailure,
    /// Too many consecutive collision reports.
    Collision,
}

/// The detector's view of one continuous stuck episode.
///
/// Zero-valued until the detector declares a stuck condition; mutated only
/// by `set_stuck`/`clear_stuck`. `recovery_attempts` is incremented by the
/// orchestrating caller between recovery tries.
#[derive(Debug, Clone, Copy, Default)]
pub struct StuckInfo {
    pub kind: Option<StuckKind>,
    pub since: Option<Instant>,
    pub position: Option<Position>,
    pub recovery_attempts: u32,
}

impl StuckInfo {
    pub fn is_stuck(&self) -> bool {
        self.kind.is_some()
    }

    /// How long the current episode has lasted as of `now`; zero when not
    /// stuck.
    pub fn duration(&self, now: Instant) -> Duration {
        self.since
            .map(|since| now.saturating_duration_since(since))
            .unwrap_or_default()
    }
}

/// Lifetime per-kind stuck counters for operational dashboards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StuckCounters {
    pub position: u64,
    pub progress: u64,
    pub path_failure: u64,
    pub collision: u64,
}

impl StuckCounters {
    /// Bump the counter for `kind`.
    pub fn record(&mut self, kind: StuckKind) {
        match kind {
            StuckKind::Position => self.position += 1,
            StuckKind::Progress => self.progress += 1,
            StuckKind::PathFailure => self.path_failure += 1,
            StuckKind::Collision => self.collision += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.position + self.progress + self.path_failure + self.collision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_flags_follow_state() {
        assert_eq!(
            MovementStateKind::Swimming.expected_flags(),
            MovementFlags {
                swimming: true,
                falling: false
            }
        );
        assert_eq!(
            MovementStateKind::Falling.expected_flags(),
            MovementFlags {
                swimming: false,
                falling: true
            }
        );
        assert_eq!(
            MovementStateKind::Ground.expected_flags(),
            MovementFlags::default()
        );
    }

    #[test]
    fn default_stuck_info_is_not_stuck() {
        let info = StuckInfo::default();
        assert!(!info.is_stuck());
        assert_eq!(info.duration(Instant::now()), Duration::ZERO);
        assert_eq!(info.recovery_attempts, 0);
    }

    #[test]
    fn duration_measures_from_episode_start() {
        let start = Instant::now();
        let info = StuckInfo {
            kind: Some(StuckKind::Position),
            since: Some(start),
            position: Some(Position::new(0.0, 0.0, 0.0)),
            recovery_attempts: 0,
        };
        let later = start + Duration::from_secs(7);
        assert_eq!(info.duration(later), Duration::from_secs(7));
    }

    #[test]
    fn counters_record_each_kind_independently() {
        let mut counters = StuckCounters::default();
        counters.record(StuckKind::Position);
        counters.record(StuckKind::Position);
        counters.record(StuckKind::Collision);
        assert_eq!(counters.position, 2);
        assert_eq!(counters.collision, 1);
        assert_eq!(counters.progress, 0);
        assert_eq!(counters.total(), 3);
    }
}
