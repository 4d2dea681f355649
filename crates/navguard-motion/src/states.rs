//! The six movement states.
//!
//! Each state runs its environment checks on a fixed interval (accumulated
//! from the tick delta) and requests transitions through its return value —
//! never by mutating the machine directly. The Stuck state is the only one
//! with side effects beyond flags: it drives the recovery ladder and is
//! guaranteed to exit by attempt and duration ceilings.

use std::time::Duration;

use tracing::{debug, info, warn};

use navguard_types::{MovementFlags, MovementStateKind, PositionSnapshot};

use crate::machine::{MovementState, StateContext, StateSignals};

// ────────────────────────────────────────────────────────────────────────────
// Idle
// ────────────────────────────────────────────────────────────────────────────

/// Inert between movement intents; only watches for premature liquid entry
/// or a slip off an edge.
pub struct IdleState {
    timer: Duration,
}

impl IdleState {
    pub fn new() -> Self {
        Self {
            timer: Duration::ZERO,
        }
    }
}

impl Default for IdleState {
    fn default() -> Self {
        Self::new()
    }
}

impl MovementState for IdleState {
    fn kind(&self) -> MovementStateKind {
        MovementStateKind::Idle
    }

    fn update(
        &mut self,
        ctx: &mut StateContext<'_>,
        _signals: &mut StateSignals,
        dt: Duration,
    ) -> Option<MovementStateKind> {
        self.timer += dt;
        if self.timer < ctx.state_config.check_interval {
            return None;
        }
        self.timer = Duration::ZERO;

        match ctx.probe.detect(ctx.agent, ctx.state_config) {
            detected @ (MovementStateKind::Swimming | MovementStateKind::Falling) => {
                debug!(?detected, "idle agent found itself in liquid or airborne");
                Some(detected)
            }
            _ => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Ground
// ────────────────────────────────────────────────────────────────────────────

/// Normal terrestrial movement: watches for falling, water entry, and
/// edges ahead.
pub struct GroundState {
    timer: Duration,
}

impl GroundState {
    pub fn new() -> Self {
        Self {
            timer: Duration::ZERO,
        }
    }
}

impl Default for GroundState {
    fn default() -> Self {
        Self::new()
    }
}

impl MovementState for GroundState {
    fn kind(&self) -> MovementStateKind {
        MovementStateKind::Ground
    }

    fn on_exit(&mut self, _ctx: &mut StateContext<'_>, signals: &mut StateSignals) {
        signals.edge_ahead = false;
    }

    fn update(
        &mut self,
        ctx: &mut StateContext<'_>,
        signals: &mut StateSignals,
        dt: Duration,
    ) -> Option<MovementStateKind> {
        self.timer += dt;
        if self.timer < ctx.state_config.check_interval {
            return None;
        }
        self.timer = Duration::ZERO;

        let info = ctx.probe.liquid_info(ctx.agent);
        let height_above = ctx.probe.height_above_ground(ctx.agent);

        // Falling check: airborne and not held up by liquid.
        let airborne =
            height_above.is_none_or(|h| h > ctx.state_config.fall_height_threshold);
        if !info.in_liquid && airborne {
            return Some(MovementStateKind::Falling);
        }

        // Water check: deep enough to swim.
        if info.kind.requires_breath() && info.depth >= ctx.state_config.swim_depth_min {
            return Some(MovementStateKind::Swimming);
        }

        // Edge look-ahead: sample the ground a fixed distance along the
        // current facing. No ground or a large drop flags an edge for path
        // validation; it never triggers a transition by itself.
        let position = ctx.agent.position();
        let ahead = position.point_ahead(
            ctx.agent.orientation(),
            ctx.state_config.edge_probe_distance,
        );
        let here = ctx.probe.ground_height_at(ctx.agent.map(), position);
        let there = ctx.probe.ground_height_at(ctx.agent.map(), ahead);
        signals.edge_ahead = match (here, there) {
            (_, None) => true,
            (Some(current), Some(ahead_height)) => {
                current - ahead_height > ctx.state_config.edge_drop_threshold
            }
            (None, Some(_)) => false,
        };

        None
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Swimming
// ────────────────────────────────────────────────────────────────────────────

/// In benign liquid. Tracks continuous underwater time and raises the
/// surfacing request when breath runs short.
pub struct SwimmingState {
    timer: Duration,
    underwater_for: Duration,
}

impl SwimmingState {
    pub fn new() -> Self {
        Self {
            timer: Duration::ZERO,
            underwater_for: Duration::ZERO,
        }
    }
}

impl Default for SwimmingState {
    fn default() -> Self {
        Self::new()
    }
}

impl MovementState for SwimmingState {
    fn kind(&self) -> MovementStateKind {
        MovementStateKind::Swimming
    }

    fn on_enter(&mut self, ctx: &mut StateContext<'_>, signals: &mut StateSignals) {
        self.underwater_for = Duration::ZERO;
        signals.wants_surface = false;
        ctx.agent.set_movement_flags(MovementFlags {
            swimming: true,
            falling: false,
        });
    }

    fn on_exit(&mut self, ctx: &mut StateContext<'_>, signals: &mut StateSignals) {
        signals.wants_surface = false;
        ctx.agent.set_movement_flags(MovementFlags::default());
    }

    fn update(
        &mut self,
        ctx: &mut StateContext<'_>,
        signals: &mut StateSignals,
        dt: Duration,
    ) -> Option<MovementStateKind> {
        self.timer += dt;
        if self.timer < ctx.state_config.check_interval {
            return None;
        }
        let elapsed = self.timer;
        self.timer = Duration::ZERO;

        let info = ctx.probe.liquid_info(ctx.agent);
        if !info.in_liquid {
            return Some(MovementStateKind::Ground);
        }

        if info.underwater {
            self.underwater_for += elapsed;
            if self.underwater_for >= ctx.state_config.underwater_warning && !signals.wants_surface
            {
                info!(
                    agent = %ctx.agent.id(),
                    underwater_secs = self.underwater_for.as_secs(),
                    "breath running short; requesting surfacing"
                );
                signals.wants_surface = true;
            }
        } else {
            self.underwater_for = Duration::ZERO;
            signals.wants_surface = false;
        }

        None
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Flying
// ────────────────────────────────────────────────────────────────────────────

/// Declared for the closed state set; flight movement is not implemented
/// and the machine refuses transitions into this state.
pub struct FlyingState;

impl MovementState for FlyingState {
    fn kind(&self) -> MovementStateKind {
        MovementStateKind::Flying
    }

    fn update(
        &mut self,
        _ctx: &mut StateContext<'_>,
        _signals: &mut StateSignals,
        _dt: Duration,
    ) -> Option<MovementStateKind> {
        None
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Falling
// ────────────────────────────────────────────────────────────────────────────

/// Airborne. Watches for landing on ground or in water and keeps a running
/// fall-damage estimate.
pub struct FallingState {
    timer: Duration,
    start_height: f32,
}

impl FallingState {
    pub fn new() -> Self {
        Self {
            timer: Duration::ZERO,
            start_height: 0.0,
        }
    }

    /// Damage for a completed fall of `distance`: 0 below the safe height,
    /// 100 at or beyond the fatal height, linear in between.
    fn damage_pct(distance: f32, safe: f32, fatal: f32) -> f32 {
        if distance <= safe {
            0.0
        } else if distance >= fatal {
            100.0
        } else {
            (distance - safe) / (fatal - safe) * 100.0
        }
    }
}

impl Default for FallingState {
    fn default() -> Self {
        Self::new()
    }
}

impl MovementState for FallingState {
    fn kind(&self) -> MovementStateKind {
        MovementStateKind::Falling
    }

    fn on_enter(&mut self, ctx: &mut StateContext<'_>, signals: &mut StateSignals) {
        self.start_height = ctx.agent.position().z;
        signals.estimated_fall_damage_pct = 0.0;
        ctx.agent.set_movement_flags(MovementFlags {
            swimming: false,
            falling: true,
        });
    }

    fn on_exit(&mut self, ctx: &mut StateContext<'_>, _signals: &mut StateSignals) {
        ctx.agent.set_movement_flags(MovementFlags::default());
    }

    fn update(
        &mut self,
        ctx: &mut StateContext<'_>,
        signals: &mut StateSignals,
        dt: Duration,
    ) -> Option<MovementStateKind> {
        self.timer += dt;
        if self.timer < ctx.state_config.check_interval {
            return None;
        }
        self.timer = Duration::ZERO;

        let fallen = self.start_height - ctx.agent.position().z;
        signals.estimated_fall_damage_pct = Self::damage_pct(
            fallen.max(0.0),
            ctx.state_config.safe_fall_height,
            ctx.state_config.fatal_fall_height,
        );

        // Landing in water beats landing on the lake bed.
        let info = ctx.probe.liquid_info(ctx.agent);
        if info.in_liquid {
            return Some(MovementStateKind::Swimming);
        }

        if let Some(height) = ctx.probe.height_above_ground(ctx.agent) {
            if height <= ctx.state_config.landing_epsilon {
                debug!(
                    agent = %ctx.agent.id(),
                    fallen,
                    estimated_damage = signals.estimated_fall_damage_pct,
                    "landed"
                );
                return Some(MovementStateKind::Ground);
            }
        }

        None
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stuck
// ────────────────────────────────────────────────────────────────────────────

/// Externally entered recovery driver.
///
/// On a fixed interval it runs one rung of the recovery ladder. A
/// successful attempt exits to the detected environment state; exhausted
/// attempts or the duration ceiling force an unconditional exit — this
/// state is never a dead end.
pub struct StuckState {
    timer: Duration,
}

impl StuckState {
    pub fn new() -> Self {
        Self {
            timer: Duration::ZERO,
        }
    }
}

impl Default for StuckState {
    fn default() -> Self {
        Self::new()
    }
}

impl MovementState for StuckState {
    fn kind(&self) -> MovementStateKind {
        MovementStateKind::Stuck
    }

    fn on_enter(&mut self, ctx: &mut StateContext<'_>, _signals: &mut StateSignals) {
        self.timer = Duration::ZERO;
        info!(
            agent = %ctx.agent.id(),
            kind = ?ctx.detector.stuck_kind(),
            attempts = ctx.detector.recovery_attempts(),
            "entered stuck recovery"
        );
    }

    fn update(
        &mut self,
        ctx: &mut StateContext<'_>,
        _signals: &mut StateSignals,
        dt: Duration,
    ) -> Option<MovementStateKind> {
        self.timer += dt;
        if self.timer < ctx.recovery_config.attempt_interval {
            return None;
        }
        self.timer = Duration::ZERO;

        let StateContext {
            agent,
            probe,
            detector,
            recovery,
            state_config,
            recovery_config,
        } = ctx;

        // Fail-safe ceilings: force an exit no matter what.
        let attempts = detector.recovery_attempts();
        let stuck_for = detector.stuck_duration();
        if attempts >= recovery_config.max_attempts || stuck_for >= recovery_config.duration_ceiling
        {
            warn!(
                agent = %agent.id(),
                attempts,
                stuck_secs = stuck_for.as_secs(),
                "recovery ceilings reached; forcing exit from stuck state"
            );
            detector.clear_stuck();
            return Some(probe.detect(&**agent, state_config));
        }

        let kind = detector.stuck_kind();
        let history: Vec<PositionSnapshot> =
            detector.position_history().iter().copied().collect();
        let outcome = recovery.try_recover(&mut **agent, kind, attempts, &history);
        detector.register_recovery_attempt();

        if outcome.success {
            // Give the new motion intent a chance; if no real progress
            // follows, the detector re-declares stuck and the ladder
            // resumes one rung higher.
            return Some(probe.detect(&**agent, state_config));
        }
        None
    }
}
