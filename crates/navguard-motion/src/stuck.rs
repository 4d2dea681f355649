//! [`StuckDetector`] – multi-signal failure-to-progress detection.
//!
//! Four independent signals feed one verdict, checked in a fixed order and
//! stopping at the first positive:
//!
//! 1. **Position** – displacement across the sampled window stayed under a
//!    threshold for long enough.
//! 2. **Progress** – the waypoint index has not advanced for too long.
//! 3. **Path failure** – consecutive path-generation failures.
//! 4. **Collision** – consecutive collision reports.
//!
//! New progress is proof of recovery: [`StuckDetector::record_progress`]
//! with a fresh waypoint index resets the failure counters and clears a
//! position/progress stuck verdict immediately.
//!
//! # Example
//!
//! ```rust
//! use navguard_motion::config::StuckConfig;
//! use navguard_motion::stuck::StuckDetector;
//! use navguard_types::{ManualClock, Position, StuckKind};
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let mut detector = StuckDetector::new(StuckConfig::default(), clock.clone());
//!
//! // An agent that never moves becomes PositionStuck once the window fills.
//! for _ in 0..7 {
//!     detector.update(Position::new(100.0, 100.0, 0.0));
//!     clock.advance(Duration::from_secs(2));
//! }
//! assert_eq!(detector.stuck_kind(), Some(StuckKind::Position));
//! ```

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use navguard_types::{
    Position, PositionSnapshot, SharedClock, StuckCounters, StuckInfo, StuckKind,
};

use crate::config::StuckConfig;

/// Samples agent positions and turns movement signals into a stuck verdict.
pub struct StuckDetector {
    config: StuckConfig,
    clock: SharedClock,
    history: VecDeque<PositionSnapshot>,
    last_sample_at: Option<Instant>,
    last_progress_at: Instant,
    last_waypoint: Option<usize>,
    consecutive_path_failures: u32,
    consecutive_collisions: u32,
    info: StuckInfo,
    counters: StuckCounters,
}

impl StuckDetector {
    pub fn new(config: StuckConfig, clock: SharedClock) -> Self {
        let now = clock.now();
        Self {
            config,
            clock,
            history: VecDeque::with_capacity(16),
            last_sample_at: None,
            last_progress_at: now,
            last_waypoint: None,
            consecutive_path_failures: 0,
            consecutive_collisions: 0,
            info: StuckInfo::default(),
            counters: StuckCounters::default(),
        }
    }

    // ------------------------------------------------------------------------
    // Signal intake
    // ------------------------------------------------------------------------

    /// Sample `position` (rate-limited to the configured interval) and run
    /// the four detectors.
    pub fn update(&mut self, position: Position) {
        let now = self.clock.now();

        let due = self
            .last_sample_at
            .is_none_or(|last| now.saturating_duration_since(last) >= self.config.sample_interval);
        if due {
            self.last_sample_at = Some(now);
            self.history.push_back(PositionSnapshot::new(position, now));
            while self.history.len() > self.config.history_capacity {
                self.history.pop_front();
            }
        }

        if self.info.is_stuck() {
            return;
        }

        if let Some(kind) = self.evaluate(now) {
            self.set_stuck(kind, position);
        }
    }

    /// Record the waypoint index the agent is currently heading for.
    ///
    /// Any index change counts as progress: failure counters reset, and a
    /// position/progress stuck verdict clears on the spot.
    pub fn record_progress(&mut self, waypoint_index: usize) {
        if self.last_waypoint == Some(waypoint_index) {
            return;
        }
        self.last_waypoint = Some(waypoint_index);
        self.last_progress_at = self.clock.now();
        self.consecutive_path_failures = 0;
        self.consecutive_collisions = 0;

        if matches!(
            self.info.kind,
            Some(StuckKind::Position) | Some(StuckKind::Progress)
        ) {
            debug!(waypoint_index, "progress resumed; clearing stuck verdict");
            self.clear_stuck();
        }
    }

    /// Record one failed path-generation attempt.
    pub fn record_path_failure(&mut self) {
        self.consecutive_path_failures += 1;
    }

    /// Record one collision report from the motion layer.
    pub fn record_collision(&mut self) {
        self.consecutive_collisions += 1;
    }

    // ------------------------------------------------------------------------
    // Verdict management
    // ------------------------------------------------------------------------

    /// Declare the agent stuck. No-op when a verdict is already active.
    pub fn set_stuck(&mut self, kind: StuckKind, position: Position) {
        if self.info.is_stuck() {
            return;
        }
        let now = self.clock.now();
        self.info = StuckInfo {
            kind: Some(kind),
            since: Some(now),
            position: Some(position),
            recovery_attempts: 0,
        };
        self.counters.record(kind);
        info!(?kind, %position, "agent declared stuck");
    }

    /// Clear the active verdict and reset the attempt counter. No-op when
    /// not stuck.
    pub fn clear_stuck(&mut self) {
        if !self.info.is_stuck() {
            return;
        }
        let duration = self.info.duration(self.clock.now());
        info!(
            kind = ?self.info.kind,
            duration_ms = duration.as_millis() as u64,
            attempts = self.info.recovery_attempts,
            "stuck episode cleared"
        );
        self.info = StuckInfo::default();
    }

    /// Count one recovery attempt against the current episode.
    pub fn register_recovery_attempt(&mut self) {
        self.info.recovery_attempts += 1;
    }

    /// Forget everything: history, counters, verdict. Called when a new
    /// movement intent starts.
    pub fn reset(&mut self) {
        let now = self.clock.now();
        self.history.clear();
        self.last_sample_at = None;
        self.last_progress_at = now;
        self.last_waypoint = None;
        self.consecutive_path_failures = 0;
        self.consecutive_collisions = 0;
        self.info = StuckInfo::default();
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn is_stuck(&self) -> bool {
        self.info.is_stuck()
    }

    pub fn stuck_kind(&self) -> Option<StuckKind> {
        self.info.kind
    }

    pub fn stuck_duration(&self) -> Duration {
        self.info.duration(self.clock.now())
    }

    pub fn recovery_attempts(&self) -> u32 {
        self.info.recovery_attempts
    }

    /// Sampled positions, oldest first.
    pub fn position_history(&self) -> &VecDeque<PositionSnapshot> {
        &self.history
    }

    /// Lifetime per-kind counters for dashboards.
    pub fn counters(&self) -> StuckCounters {
        self.counters
    }

    // ------------------------------------------------------------------------
    // Detection
    // ------------------------------------------------------------------------

    /// Run the four checks in order, returning the first positive.
    fn evaluate(&self, now: Instant) -> Option<StuckKind> {
        if self.position_stuck() {
            return Some(StuckKind::Position);
        }
        if self.progress_stuck(now) {
            return Some(StuckKind::Progress);
        }
        if self.consecutive_path_failures >= self.config.max_path_failures {
            return Some(StuckKind::PathFailure);
        }
        if self.consecutive_collisions >= self.config.max_collisions {
            return Some(StuckKind::Collision);
        }
        None
    }

    fn position_stuck(&self) -> bool {
        let (Some(oldest), Some(newest)) = (self.history.front(), self.history.back()) else {
            return false;
        };
        let window = newest
            .recorded_at
            .saturating_duration_since(oldest.recorded_at);
        if window < self.config.position_window {
            return false;
        }
        oldest.position.distance_to(newest.position) < self.config.position_threshold
    }

    fn progress_stuck(&self, now: Instant) -> bool {
        // Only meaningful once waypoint tracking has started.
        self.last_waypoint.is_some()
            && now.saturating_duration_since(self.last_progress_at) > self.config.progress_timeout
    }
}
