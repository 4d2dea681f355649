//! `navguard-world` – the capability boundary to the host simulation.
//!
//! Navguard treats the physical world (terrain meshes, liquid volumes,
//! collision geometry) and the agent's body as opaque services behind two
//! small traits, so every downstream component can run against the real
//! world in production and a deterministic fake in tests.
//!
//! # Modules
//!
//! - [`query`] – [`WorldQuery`][query::WorldQuery]: terrain height, liquid
//!   classification, line of sight, and the raw path primitive.
//! - [`body`] – [`AgentBody`][body::AgentBody]: one agent's position,
//!   orientation, movement flags, and motion commands.
//! - [`sim`] – [`SimWorld`][sim::SimWorld] and [`SimAgent`][sim::SimAgent]:
//!   builder-style deterministic doubles that record every command, letting
//!   the whole stack run headless in CI.

pub mod body;
pub mod query;
pub mod sim;

pub use body::AgentBody;
pub use query::{LiquidSample, WorldQuery};
pub use sim::{SimAgent, SimBox, SimCounters, SimVolume, SimWorld};
