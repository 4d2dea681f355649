//! [`Navigator`] – the per-agent orchestration facade.
//!
//! One navigator owns everything navguard knows about one agent: the
//! movement state machine, the stuck detector, the recovery ladder, and the
//! current move request. The host calls [`Navigator::move_to`] and then
//! [`Navigator::update`] once per simulation tick; within a tick the order
//! is fixed — movement generation, state-machine update, stuck-detection
//! sampling, recovery orchestration — and never interleaves with another
//! tick for the same agent.
//!
//! The path cache and the terrain-height cache are shared across navigators
//! on the same worker via [`Navigator::with_shared`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use navguard_path::{PathCache, PathCacheStats, ValidatedPathGenerator};
use navguard_types::{
    MovementStateKind, Position, SharedClock, StuckCounters, StuckKind, ValidationLevel,
    WorldBounds, system_clock,
};
use navguard_validate::{CollisionValidator, GroundValidator, PositionValidator};
use navguard_world::body::AgentBody;
use navguard_world::query::WorldQuery;

use crate::config::NavConfig;
use crate::generator::PointMovementGenerator;
use crate::machine::{EnvironmentProbe, MovementStateMachine, StateContext, StateSignals};
use crate::recovery::RecoveryStrategies;
use crate::stuck::StuckDetector;

// ────────────────────────────────────────────────────────────────────────────
// MetricsSnapshot
// ────────────────────────────────────────────────────────────────────────────

/// Point-in-time operational metrics for dashboards.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub captured_at: DateTime<Utc>,
    pub state: MovementStateKind,
    pub cache: PathCacheStats,
    pub cache_hit_rate: f64,
    pub stuck: StuckCounters,
}

// ────────────────────────────────────────────────────────────────────────────
// Navigator
// ────────────────────────────────────────────────────────────────────────────

/// Per-agent navigation controller.
pub struct Navigator {
    config: NavConfig,
    cache: Arc<PathCache>,
    paths: ValidatedPathGenerator,
    collision: CollisionValidator,
    probe: EnvironmentProbe,
    machine: MovementStateMachine,
    detector: StuckDetector,
    recovery: RecoveryStrategies,
    generator: Option<PointMovementGenerator>,
    /// Set by [`move_to`][Self::move_to]; the next update forces the state
    /// machine into agreement with the environment before moving.
    pending_sync: bool,
}

impl Navigator {
    /// Build a self-contained navigator with its own caches and the system
    /// clock.
    pub fn new(world: Arc<dyn WorldQuery>, config: NavConfig) -> Self {
        let clock = system_clock();
        let cache = Arc::new(PathCache::new(config.path_cache, clock.clone()));
        let ground = Arc::new(GroundValidator::with_config(
            world.clone(),
            config.height_cache,
            clock.clone(),
        ));
        Self::with_shared(world, config, cache, ground, clock)
    }

    /// Build a navigator around shared caches — the normal arrangement when
    /// many agents run on one simulation worker.
    pub fn with_shared(
        world: Arc<dyn WorldQuery>,
        config: NavConfig,
        cache: Arc<PathCache>,
        ground: Arc<GroundValidator>,
        clock: SharedClock,
    ) -> Self {
        let bounds = WorldBounds::default();
        let paths = ValidatedPathGenerator::new(
            world.clone(),
            PositionValidator::new(bounds),
            ground.clone(),
            cache.clone(),
            config.validation_level,
        );
        let recovery = RecoveryStrategies::new(
            world.clone(),
            PositionValidator::new(bounds),
            ground.clone(),
            config.recovery,
        );
        Self {
            cache,
            paths,
            collision: CollisionValidator::new(world.clone()),
            probe: EnvironmentProbe::new(world, ground),
            machine: MovementStateMachine::new(),
            detector: StuckDetector::new(config.stuck, clock),
            recovery,
            generator: None,
            pending_sync: false,
            config,
        }
    }

    // ------------------------------------------------------------------------
    // Movement control
    // ------------------------------------------------------------------------

    /// Start moving toward `destination`. Replaces any active request and
    /// resets stuck tracking.
    pub fn move_to(
        &mut self,
        destination: Position,
        speed_override: Option<f32>,
        final_orientation: Option<f32>,
    ) {
        debug!(%destination, ?speed_override, "new move request");
        self.detector.reset();
        self.generator = Some(PointMovementGenerator::new(
            destination,
            speed_override,
            final_orientation,
        ));
        self.pending_sync = true;
    }

    /// Cancel the active move request and stop the agent.
    pub fn stop(&mut self, agent: &mut dyn AgentBody) {
        self.generator = None;
        self.detector.reset();
        agent.stop_movement();
    }

    /// Advance navigation by one simulation tick.
    pub fn update(&mut self, agent: &mut dyn AgentBody, dt: Duration) {
        // 1. Drive the active move request.
        if let Some(generator) = self.generator.as_mut() {
            let arrived = generator.update(
                agent,
                &self.paths,
                &self.collision,
                &mut self.detector,
                dt,
            );
            if arrived {
                self.generator = None;
                self.detector.reset();
            }
        }

        // 2. State machine: commit pending transition, run the active
        //    state, reconcile movement flags.
        {
            let mut ctx = StateContext {
                agent: &mut *agent,
                probe: &self.probe,
                detector: &mut self.detector,
                recovery: &mut self.recovery,
                state_config: &self.config.state,
                recovery_config: &self.config.recovery,
            };
            if self.pending_sync {
                self.machine.sync_with_environment(&ctx);
                self.pending_sync = false;
            }
            self.machine.update(&mut ctx, dt);
        }

        // 3. Stuck sampling, only while a move is in flight.
        if self.generator.is_some() {
            self.detector.update(agent.position());
        }

        // 4. A declared stuck condition pulls the machine into Stuck; the
        //    Stuck state runs the recovery ladder from there.
        if self.detector.is_stuck() && self.machine.current() != MovementStateKind::Stuck {
            self.machine.request_transition(MovementStateKind::Stuck);
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn is_moving(&self) -> bool {
        self.generator.is_some()
    }

    pub fn destination(&self) -> Option<Position> {
        self.generator.as_ref().map(|g| g.destination())
    }

    pub fn current_state(&self) -> MovementStateKind {
        self.machine.current()
    }

    pub fn signals(&self) -> StateSignals {
        self.machine.signals()
    }

    pub fn is_stuck(&self) -> bool {
        self.detector.is_stuck()
    }

    pub fn stuck_kind(&self) -> Option<StuckKind> {
        self.detector.stuck_kind()
    }

    /// Change path-validation strictness at runtime.
    pub fn set_validation_level(&mut self, level: ValidationLevel) {
        self.paths.set_level(level);
    }

    pub fn validation_level(&self) -> ValidationLevel {
        self.paths.level()
    }

    /// Export current operational metrics.
    pub fn metrics(&self) -> MetricsSnapshot {
        let cache = self.cache.stats();
        MetricsSnapshot {
            captured_at: Utc::now(),
            state: self.machine.current(),
            cache_hit_rate: cache.hit_rate(),
            cache,
            stuck: self.detector.counters(),
        }
    }
}
