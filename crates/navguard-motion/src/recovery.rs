//! [`RecoveryStrategies`] – the escalating unstuck ladder.
//!
//! Five strategies, cheapest first, selected purely by attempt count
//! ([`RecoveryLevel::for_attempt`]). Levels 2–4 relocate the agent and can
//! fail when no safe spot exists; level 1 and level 5 always succeed, which
//! makes level 5 the guaranteed terminal action.
//!
//! A spot is *safe* when it passes bounds/map validation, has real ground,
//! carries no dangerous liquid, and is not embedded in collision geometry.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use navguard_types::{
    MapId, Position, PositionSnapshot, RecoveryLevel, RecoveryOutcome, StuckKind,
};
use navguard_validate::{CollisionValidator, GroundValidator, LiquidValidator, PositionValidator};
use navguard_world::body::AgentBody;
use navguard_world::query::WorldQuery;

use crate::config::RecoveryConfig;

/// Executes recovery attempts against the live world.
pub struct RecoveryStrategies {
    position: PositionValidator,
    ground: Arc<GroundValidator>,
    liquid: LiquidValidator,
    collision: CollisionValidator,
    config: RecoveryConfig,
    rng: StdRng,
}

impl RecoveryStrategies {
    pub fn new(
        world: Arc<dyn WorldQuery>,
        position: PositionValidator,
        ground: Arc<GroundValidator>,
        config: RecoveryConfig,
    ) -> Self {
        Self {
            position,
            ground,
            liquid: LiquidValidator::new(world.clone()),
            collision: CollisionValidator::new(world),
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Fix the random source, for deterministic tests.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Run the strategy selected by `attempt` against `agent`.
    ///
    /// `history` is the detector's position history (oldest first), used by
    /// the teleport level.
    pub fn try_recover(
        &mut self,
        agent: &mut dyn AgentBody,
        stuck_kind: Option<StuckKind>,
        attempt: u32,
        history: &[PositionSnapshot],
    ) -> RecoveryOutcome {
        let level = RecoveryLevel::for_attempt(attempt);
        debug!(
            agent = %agent.id(),
            ?stuck_kind,
            attempt,
            ?level,
            "running recovery attempt"
        );
        let outcome = match level {
            RecoveryLevel::RecalculatePath => self.recalculate_path(agent),
            RecoveryLevel::BackupAndRetry => self.backup_and_retry(agent),
            RecoveryLevel::RandomNearby => self.random_nearby(agent),
            RecoveryLevel::TeleportToSafe => self.teleport_to_safe(agent, history),
            RecoveryLevel::EvadeAndReset => self.evade_and_reset(agent),
        };
        info!(
            agent = %agent.id(),
            level = outcome.level.rung(),
            success = outcome.success,
            message = %outcome.message,
            "recovery attempt finished"
        );
        outcome
    }

    // ------------------------------------------------------------------------
    // Levels
    // ------------------------------------------------------------------------

    /// Level 1: clear motion intent. The caller regenerates a path on its
    /// next tick; the act of clearing is itself the recovery.
    fn recalculate_path(&mut self, agent: &mut dyn AgentBody) -> RecoveryOutcome {
        agent.stop_movement();
        RecoveryOutcome::succeeded(
            RecoveryLevel::RecalculatePath,
            "cleared motion intent; path will be recalculated",
        )
    }

    /// Level 2: step straight backwards onto safe ground.
    fn backup_and_retry(&mut self, agent: &mut dyn AgentBody) -> RecoveryOutcome {
        let map = agent.map();
        let behind = agent.position().point_ahead(
            agent.orientation() + std::f32::consts::PI,
            self.config.backup_distance,
        );
        match self.safe_ground_point(map, behind) {
            Some(spot) => {
                let speed = agent.current_speed();
                agent.move_directly(spot, speed);
                RecoveryOutcome::succeeded(RecoveryLevel::BackupAndRetry, "backing up").at(spot)
            }
            None => RecoveryOutcome::failed(
                RecoveryLevel::BackupAndRetry,
                "no safe ground behind the agent",
            ),
        }
    }

    /// Level 3: bounded random search in an annulus around the agent.
    fn random_nearby(&mut self, agent: &mut dyn AgentBody) -> RecoveryOutcome {
        match self.sample_safe_point(agent.map(), agent.position()) {
            Some(spot) => {
                let speed = agent.current_speed();
                agent.move_directly(spot, speed);
                RecoveryOutcome::succeeded(RecoveryLevel::RandomNearby, "moving to random nearby spot")
                    .at(spot)
            }
            None => RecoveryOutcome::failed(
                RecoveryLevel::RandomNearby,
                "no safe random spot within the annulus",
            ),
        }
    }

    /// Level 4: teleport to the most recent safe recorded position,
    /// falling back to a random search when the whole history is unsafe.
    fn teleport_to_safe(
        &mut self,
        agent: &mut dyn AgentBody,
        history: &[PositionSnapshot],
    ) -> RecoveryOutcome {
        let map = agent.map();
        for snapshot in history.iter().rev() {
            if let Some(spot) = self.safe_ground_point(map, snapshot.position) {
                warn!(agent = %agent.id(), %spot, "teleporting to safe history position");
                agent.teleport_to(spot);
                return RecoveryOutcome::succeeded(
                    RecoveryLevel::TeleportToSafe,
                    "teleported to recorded safe position",
                )
                .at(spot);
            }
        }
        // History exhausted: random search, still teleporting.
        match self.sample_safe_point(map, agent.position()) {
            Some(spot) => {
                warn!(agent = %agent.id(), %spot, "teleporting to random safe position");
                agent.teleport_to(spot);
                RecoveryOutcome::succeeded(
                    RecoveryLevel::TeleportToSafe,
                    "teleported to random safe position",
                )
                .at(spot)
            }
            None => RecoveryOutcome::failed(
                RecoveryLevel::TeleportToSafe,
                "no safe position in history or nearby",
            ),
        }
    }

    /// Level 5: unconditional terminal action. Clears all movement intent;
    /// a fighting agent keeps fighting — only its movement disengages.
    fn evade_and_reset(&mut self, agent: &mut dyn AgentBody) -> RecoveryOutcome {
        agent.stop_movement();
        if agent.is_in_combat() {
            agent.disengage_movement();
        }
        RecoveryOutcome::succeeded(
            RecoveryLevel::EvadeAndReset,
            "cleared all movement intent (evade)",
        )
    }

    // ------------------------------------------------------------------------
    // Safety
    // ------------------------------------------------------------------------

    /// Snap `candidate` to ground and accept it only when it is safe to
    /// stand on.
    fn safe_ground_point(&self, map: MapId, candidate: Position) -> Option<Position> {
        let snapped = self.ground.snap_to_ground(map, candidate)?;
        if self.is_safe_position(map, snapped) {
            Some(snapped)
        } else {
            None
        }
    }

    /// The safety conjunction: valid bounds and map, real ground, no
    /// dangerous liquid, not embedded in geometry.
    pub fn is_safe_position(&self, map: MapId, position: Position) -> bool {
        self.position.validate(map, position).is_ok()
            && !self.ground.is_void(map, position)
            && !self.liquid.classify(map, position).is_dangerous()
            && !self.collision.is_inside_geometry(map, position)
    }

    /// Up to `random_samples` draws from the annulus, first safe one wins.
    fn sample_safe_point(&mut self, map: MapId, around: Position) -> Option<Position> {
        for _ in 0..self.config.random_samples {
            let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
            let radius = self
                .rng
                .gen_range(self.config.random_min_radius..=self.config.random_max_radius);
            let candidate = around.offset(angle.cos() * radius, angle.sin() * radius, 0.0);
            if let Some(spot) = self.safe_ground_point(map, candidate) {
                return Some(spot);
            }
        }
        None
    }
}
