//! Numeric thresholds for detection, recovery, and state checks.
//!
//! One config struct per concern, each with defaults tuned for a
//! walking-speed agent in world units of roughly one metre. Everything here
//! is plain data; hosts override fields before building a
//! [`Navigator`][crate::navigator::Navigator].

use std::time::Duration;

use navguard_path::PathCacheConfig;
use navguard_types::ValidationLevel;
use navguard_validate::HeightCacheConfig;

// ────────────────────────────────────────────────────────────────────────────
// StuckConfig
// ────────────────────────────────────────────────────────────────────────────

/// Thresholds of the four stuck detectors.
#[derive(Debug, Clone, Copy)]
pub struct StuckConfig {
    /// How often the detector samples the agent position.
    pub sample_interval: Duration,
    /// Maximum retained position samples.
    pub history_capacity: usize,
    /// Displacement below this across the window counts as not moving.
    pub position_threshold: f32,
    /// Minimum window span before the position check may fire.
    pub position_window: Duration,
    /// Maximum time without a waypoint-index advance.
    pub progress_timeout: Duration,
    /// Consecutive path-generation failures that declare a stuck condition.
    pub max_path_failures: u32,
    /// Consecutive collision reports that declare a stuck condition.
    pub max_collisions: u32,
}

impl Default for StuckConfig {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_secs(2),
            history_capacity: 10,
            position_threshold: 5.0,
            position_window: Duration::from_secs(10),
            progress_timeout: Duration::from_secs(15),
            max_path_failures: 3,
            max_collisions: 5,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RecoveryConfig
// ────────────────────────────────────────────────────────────────────────────

/// Tuning of the recovery ladder and its ceilings.
#[derive(Debug, Clone, Copy)]
pub struct RecoveryConfig {
    /// How far level 2 steps straight backwards.
    pub backup_distance: f32,
    /// Inner radius of the level-3 sampling annulus.
    pub random_min_radius: f32,
    /// Outer radius of the level-3 sampling annulus.
    pub random_max_radius: f32,
    /// Random candidates tried before level 3 gives up.
    pub random_samples: u32,
    /// Pause between recovery attempts while in the Stuck state.
    pub attempt_interval: Duration,
    /// Attempts after which the Stuck state force-exits.
    pub max_attempts: u32,
    /// Hard ceiling on one continuous Stuck-state residence.
    pub duration_ceiling: Duration,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            backup_distance: 5.0,
            random_min_radius: 5.0,
            random_max_radius: 15.0,
            random_samples: 10,
            attempt_interval: Duration::from_millis(2_500),
            max_attempts: 8,
            duration_ceiling: Duration::from_secs(60),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// StateConfig
// ────────────────────────────────────────────────────────────────────────────

/// Environment-check thresholds of the movement states.
#[derive(Debug, Clone, Copy)]
pub struct StateConfig {
    /// Interval of the per-state environment checks.
    pub check_interval: Duration,
    /// Height above ground beyond which a non-swimming agent is falling.
    pub fall_height_threshold: f32,
    /// Height above ground below which a falling agent has landed.
    pub landing_epsilon: f32,
    /// Liquid depth at which an agent switches from wading to swimming.
    pub swim_depth_min: f32,
    /// Continuous underwater time after which surfacing is requested.
    pub underwater_warning: Duration,
    /// Look-ahead distance of the ground state's edge probe.
    pub edge_probe_distance: f32,
    /// Height drop ahead that flags an edge.
    pub edge_drop_threshold: f32,
    /// Fall distance below which landing costs nothing.
    pub safe_fall_height: f32,
    /// Fall distance at or beyond which landing is fatal.
    pub fatal_fall_height: f32,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(1),
            fall_height_threshold: 3.0,
            landing_epsilon: 0.5,
            swim_depth_min: 1.2,
            underwater_warning: Duration::from_secs(30),
            edge_probe_distance: 4.0,
            edge_drop_threshold: 10.0,
            safe_fall_height: 12.0,
            fatal_fall_height: 40.0,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// NavConfig
// ────────────────────────────────────────────────────────────────────────────

/// The full configuration surface of one navigator.
#[derive(Debug, Clone, Copy, Default)]
pub struct NavConfig {
    pub validation_level: ValidationLevel,
    pub stuck: StuckConfig,
    pub recovery: RecoveryConfig,
    pub state: StateConfig,
    pub path_cache: PathCacheConfig,
    pub height_cache: HeightCacheConfig,
}
