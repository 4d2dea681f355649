//! The `AgentBody` capability trait.
//!
//! One [`AgentBody`] is the read/write surface of a single agent: position,
//! orientation, movement flags, and motion commands. The host simulation
//! implements it over its entity representation; tests use the recording
//! [`SimAgent`][crate::sim::SimAgent].
//!
//! Navguard owns the *decision* of where an agent may move; the body owns
//! the physical execution. The swim/fall flags are derived state — only the
//! movement state machine writes them.

use navguard_types::{AgentId, MapId, MovementFlags, Position};

/// Read/write access to one agent's physical state and motion queue.
pub trait AgentBody {
    /// Stable identity, used in log fields.
    fn id(&self) -> AgentId;

    /// The map the agent currently occupies.
    fn map(&self) -> MapId;

    fn position(&self) -> Position;

    /// Facing angle in radians, counter-clockwise from +X.
    fn orientation(&self) -> f32;

    fn set_orientation(&mut self, orientation_rad: f32);

    fn movement_flags(&self) -> MovementFlags;

    fn set_movement_flags(&mut self, flags: MovementFlags);

    /// Current movement speed in world units per second.
    fn current_speed(&self) -> f32;

    /// Queue smooth motion along `path` at `speed`.
    fn move_along(&mut self, path: &[Position], speed: f32);

    /// Queue direct motion toward `destination`, ignoring the navigation
    /// mesh. Degraded fallback only.
    fn move_directly(&mut self, destination: Position, speed: f32);

    /// Drop all queued motion.
    fn stop_movement(&mut self);

    /// Relocate instantaneously, bypassing motion entirely.
    fn teleport_to(&mut self, position: Position);

    /// True when the agent is currently fighting something.
    fn is_in_combat(&self) -> bool;

    /// Stop movement without touching combat state.
    fn disengage_movement(&mut self);

    /// True when the queued motion has run to completion (which does not
    /// imply the agent reached its intended destination).
    fn motion_finished(&self) -> bool;
}
