//! [`MovementStateMachine`] – six persistent states, deferred transitions.
//!
//! The six state objects are allocated once and live for the machine's
//! lifetime; transitions switch an index, never reallocate. A transition is
//! *requested* via [`MovementStateMachine::request_transition`] and commits
//! at the start of the **next** [`update`][MovementStateMachine::update] —
//! the active state is never mutated re-entrantly mid-update. This deferral
//! is a correctness requirement, not a style choice.
//!
//! Environment detection runs in strict priority order
//! Falling > Swimming > Ground > Idle. The Stuck state is entered only
//! externally (by the stuck-recovery orchestration); Flying transitions are
//! refused because flight movement is not implemented.
//!
//! After every update the machine reconciles the agent's swim/fall flags
//! with what the active state declares — the flags are derived state and
//! may never drift.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use navguard_types::{LiquidInfo, MapId, MovementStateKind, Position};
use navguard_validate::{GroundValidator, LiquidValidator};
use navguard_world::body::AgentBody;
use navguard_world::query::WorldQuery;

use crate::config::{RecoveryConfig, StateConfig};
use crate::recovery::RecoveryStrategies;
use crate::states::{FallingState, FlyingState, GroundState, IdleState, StuckState, SwimmingState};
use crate::stuck::StuckDetector;

// ────────────────────────────────────────────────────────────────────────────
// EnvironmentProbe
// ────────────────────────────────────────────────────────────────────────────

/// Read-only environment checks shared by every state.
pub struct EnvironmentProbe {
    ground: Arc<GroundValidator>,
    liquid: LiquidValidator,
}

impl EnvironmentProbe {
    pub fn new(world: Arc<dyn WorldQuery>, ground: Arc<GroundValidator>) -> Self {
        Self {
            ground,
            liquid: LiquidValidator::new(world),
        }
    }

    /// Liquid picture at the agent's feet.
    pub fn liquid_info(&self, agent: &dyn AgentBody) -> LiquidInfo {
        self.liquid.classify(agent.map(), agent.position())
    }

    /// Terrain height under `position`, through the shared height cache.
    pub fn ground_height_at(&self, map: MapId, position: Position) -> Option<f32> {
        self.ground
            .height_at(map, position.x, position.y, position.z)
    }

    /// How far the agent's feet are above the ground; `None` over void.
    pub fn height_above_ground(&self, agent: &dyn AgentBody) -> Option<f32> {
        let position = agent.position();
        self.ground_height_at(agent.map(), position)
            .map(|h| position.z - h)
    }

    /// Environment detection in strict priority order
    /// Falling > Swimming > Ground > Idle. Never returns Stuck or Flying.
    pub fn detect(&self, agent: &dyn AgentBody, config: &StateConfig) -> MovementStateKind {
        let info = self.liquid_info(agent);
        let height_above = self.height_above_ground(agent);

        let airborne = height_above.is_none_or(|h| h > config.fall_height_threshold);
        if !info.in_liquid && airborne {
            return MovementStateKind::Falling;
        }
        if info.kind.requires_breath() && info.depth >= config.swim_depth_min {
            return MovementStateKind::Swimming;
        }
        if height_above.is_some() {
            return MovementStateKind::Ground;
        }
        MovementStateKind::Idle
    }
}

// ────────────────────────────────────────────────────────────────────────────
// State plumbing
// ────────────────────────────────────────────────────────────────────────────

/// Everything a state may touch during one update.
pub struct StateContext<'a> {
    pub agent: &'a mut dyn AgentBody,
    pub probe: &'a EnvironmentProbe,
    pub detector: &'a mut StuckDetector,
    pub recovery: &'a mut RecoveryStrategies,
    pub state_config: &'a StateConfig,
    pub recovery_config: &'a RecoveryConfig,
}

/// Side signals the states surface to the behavior layer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StateSignals {
    /// The ground state's look-ahead found a cliff or missing ground ahead.
    /// Consumed by path validation, never a transition trigger.
    pub edge_ahead: bool,
    /// The swimming state has been underwater long enough to want air.
    /// A request only; the machine never forces movement for it.
    pub wants_surface: bool,
    /// The falling state's running damage estimate, 0–100.
    pub estimated_fall_damage_pct: f32,
}

/// One movement state. Implementations are long-lived: constructed once,
/// re-entered many times.
pub trait MovementState {
    fn kind(&self) -> MovementStateKind;

    fn on_enter(&mut self, _ctx: &mut StateContext<'_>, _signals: &mut StateSignals) {}

    fn on_exit(&mut self, _ctx: &mut StateContext<'_>, _signals: &mut StateSignals) {}

    /// Advance the state by `dt`. Returning `Some(kind)` requests a
    /// transition that commits at the start of the next machine update.
    fn update(
        &mut self,
        ctx: &mut StateContext<'_>,
        signals: &mut StateSignals,
        dt: Duration,
    ) -> Option<MovementStateKind>;
}

// ────────────────────────────────────────────────────────────────────────────
// MovementStateMachine
// ────────────────────────────────────────────────────────────────────────────

fn slot(kind: MovementStateKind) -> usize {
    match kind {
        MovementStateKind::Idle => 0,
        MovementStateKind::Ground => 1,
        MovementStateKind::Swimming => 2,
        MovementStateKind::Flying => 3,
        MovementStateKind::Falling => 4,
        MovementStateKind::Stuck => 5,
    }
}

/// The per-agent movement state machine.
pub struct MovementStateMachine {
    states: [Box<dyn MovementState>; 6],
    current: MovementStateKind,
    pending: Option<MovementStateKind>,
    signals: StateSignals,
}

impl Default for MovementStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl MovementStateMachine {
    /// Build the machine with all six states allocated up front, starting
    /// Idle.
    pub fn new() -> Self {
        Self {
            states: [
                Box::new(IdleState::new()),
                Box::new(GroundState::new()),
                Box::new(SwimmingState::new()),
                Box::new(FlyingState),
                Box::new(FallingState::new()),
                Box::new(StuckState::new()),
            ],
            current: MovementStateKind::Idle,
            pending: None,
            signals: StateSignals::default(),
        }
    }

    pub fn current(&self) -> MovementStateKind {
        self.current
    }

    pub fn signals(&self) -> StateSignals {
        self.signals
    }

    /// The ground state's edge look-ahead flag.
    pub fn edge_ahead(&self) -> bool {
        self.signals.edge_ahead
    }

    /// Request a transition; it commits at the start of the next update.
    ///
    /// Flying is refused (flight movement is not implemented) and a
    /// same-state request is dropped.
    pub fn request_transition(&mut self, kind: MovementStateKind) {
        if kind == MovementStateKind::Flying {
            warn!("flight movement is not implemented; transition refused");
            return;
        }
        if kind == self.current && self.pending.is_none() {
            return;
        }
        self.pending = Some(kind);
    }

    /// Commit any pending transition, advance the active state, and
    /// reconcile the agent's movement flags.
    pub fn update(&mut self, ctx: &mut StateContext<'_>, dt: Duration) {
        if let Some(next) = self.pending.take() {
            if next != self.current {
                self.states[slot(self.current)].on_exit(ctx, &mut self.signals);
                debug!(agent = %ctx.agent.id(), from = ?self.current, to = ?next, "movement state transition");
                self.current = next;
                self.states[slot(self.current)].on_enter(ctx, &mut self.signals);
            }
        }

        if let Some(requested) = self.states[slot(self.current)].update(ctx, &mut self.signals, dt)
        {
            self.request_transition(requested);
        }

        // Invariant: the agent's flags always match the active state.
        let expected = self.current.expected_flags();
        if ctx.agent.movement_flags() != expected {
            ctx.agent.set_movement_flags(expected);
        }
    }

    /// Force agreement with the environment: when detection disagrees with
    /// the current state, request the detected one. Stuck is exempt — only
    /// its own recovery logic may leave it.
    pub fn sync_with_environment(&mut self, ctx: &StateContext<'_>) {
        if self.current == MovementStateKind::Stuck {
            return;
        }
        let detected = ctx.probe.detect(ctx.agent, ctx.state_config);
        if detected != self.current {
            debug!(current = ?self.current, ?detected, "state out of sync with environment");
            self.request_transition(detected);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NavConfig, StuckConfig};
    use navguard_types::{ManualClock, MapId, MovementFlags, WorldBounds};
    use navguard_validate::PositionValidator;
    use navguard_world::sim::{SimAgent, SimWorld};

    const MAP: MapId = MapId(0);

    struct Harness {
        probe: EnvironmentProbe,
        detector: StuckDetector,
        recovery: RecoveryStrategies,
        config: NavConfig,
    }

    impl Harness {
        fn new(world: Arc<SimWorld>) -> Self {
            let config = NavConfig::default();
            let ground = Arc::new(GroundValidator::new(world.clone()));
            Self {
                probe: EnvironmentProbe::new(world.clone(), ground.clone()),
                detector: StuckDetector::new(StuckConfig::default(), ManualClock::new()),
                recovery: RecoveryStrategies::new(
                    world,
                    PositionValidator::new(WorldBounds::default()),
                    ground,
                    config.recovery,
                )
                .with_rng_seed(1),
                config,
            }
        }

        fn ctx<'a>(&'a mut self, agent: &'a mut SimAgent) -> StateContext<'a> {
            StateContext {
                agent,
                probe: &self.probe,
                detector: &mut self.detector,
                recovery: &mut self.recovery,
                state_config: &self.config.state,
                recovery_config: &self.config.recovery,
            }
        }
    }

    #[test]
    fn machine_starts_idle() {
        let machine = MovementStateMachine::new();
        assert_eq!(machine.current(), MovementStateKind::Idle);
    }

    #[test]
    fn transition_commits_on_next_update_not_immediately() {
        let world = SimWorld::new(MAP).into_shared();
        let mut harness = Harness::new(world);
        let mut agent = SimAgent::new(MAP, Position::new(0.0, 0.0, 0.0));
        let mut machine = MovementStateMachine::new();

        machine.request_transition(MovementStateKind::Ground);
        assert_eq!(machine.current(), MovementStateKind::Idle, "deferred");

        machine.update(&mut harness.ctx(&mut agent), Duration::from_millis(100));
        assert_eq!(machine.current(), MovementStateKind::Ground);
    }

    #[test]
    fn flying_transition_is_refused() {
        let mut machine = MovementStateMachine::new();
        machine.request_transition(MovementStateKind::Flying);

        let world = SimWorld::new(MAP).into_shared();
        let mut harness = Harness::new(world);
        let mut agent = SimAgent::new(MAP, Position::new(0.0, 0.0, 0.0));
        machine.update(&mut harness.ctx(&mut agent), Duration::from_millis(100));
        assert_eq!(machine.current(), MovementStateKind::Idle);
    }

    #[test]
    fn flags_are_reconciled_every_update() {
        let world = SimWorld::new(MAP).into_shared();
        let mut harness = Harness::new(world);
        let mut agent = SimAgent::new(MAP, Position::new(0.0, 0.0, 0.0));
        // Corrupt the flags from outside.
        agent.set_movement_flags(MovementFlags {
            swimming: true,
            falling: true,
        });

        let mut machine = MovementStateMachine::new();
        machine.update(&mut harness.ctx(&mut agent), Duration::from_millis(100));
        assert_eq!(agent.movement_flags(), MovementFlags::default());
    }

    #[test]
    fn detect_on_flat_ground_is_ground() {
        let world = SimWorld::new(MAP).into_shared();
        let harness = Harness::new(world);
        let agent = SimAgent::new(MAP, Position::new(0.0, 0.0, 0.0));
        assert_eq!(
            harness.probe.detect(&agent, &harness.config.state),
            MovementStateKind::Ground
        );
    }

    #[test]
    fn detect_high_above_ground_is_falling() {
        let world = SimWorld::new(MAP).into_shared();
        let harness = Harness::new(world);
        let agent = SimAgent::new(MAP, Position::new(0.0, 0.0, 50.0));
        assert_eq!(
            harness.probe.detect(&agent, &harness.config.state),
            MovementStateKind::Falling
        );
    }

    #[test]
    fn detect_submerged_is_swimming_and_outranks_ground() {
        use navguard_types::LiquidKind;
        use navguard_world::sim::SimBox;
        let world = SimWorld::new(MAP)
            .with_liquid(
                SimBox::new(Position::new(-10.0, -10.0, -5.0), Position::new(10.0, 10.0, 4.0)),
                LiquidKind::Water,
            )
            .into_shared();
        let harness = Harness::new(world);
        let agent = SimAgent::new(MAP, Position::new(0.0, 0.0, 0.0)); // depth 4
        assert_eq!(
            harness.probe.detect(&agent, &harness.config.state),
            MovementStateKind::Swimming
        );
    }

    #[test]
    fn sync_with_environment_requests_detected_state() {
        let world = SimWorld::new(MAP).into_shared();
        let mut harness = Harness::new(world);
        let mut agent = SimAgent::new(MAP, Position::new(0.0, 0.0, 0.0));
        let mut machine = MovementStateMachine::new();

        {
            let ctx = harness.ctx(&mut agent);
            machine.sync_with_environment(&ctx);
        }
        machine.update(&mut harness.ctx(&mut agent), Duration::from_millis(100));
        assert_eq!(machine.current(), MovementStateKind::Ground);
    }

    #[test]
    fn stuck_is_never_left_by_environment_sync() {
        let world = SimWorld::new(MAP).into_shared();
        let mut harness = Harness::new(world);
        let mut agent = SimAgent::new(MAP, Position::new(0.0, 0.0, 0.0));
        let mut machine = MovementStateMachine::new();

        machine.request_transition(MovementStateKind::Stuck);
        machine.update(&mut harness.ctx(&mut agent), Duration::from_millis(1));
        assert_eq!(machine.current(), MovementStateKind::Stuck);

        {
            let ctx = harness.ctx(&mut agent);
            machine.sync_with_environment(&ctx);
        }
        // No pending transition was requested: one tiny update keeps Stuck.
        machine.update(&mut harness.ctx(&mut agent), Duration::from_millis(1));
        assert_eq!(machine.current(), MovementStateKind::Stuck);
    }
}
