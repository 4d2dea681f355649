//! `navguard-motion` – the per-agent navigation-reliability engine.
//!
//! Where the decision loop lives: the movement state machine, the stuck
//! detector, the recovery ladder, and the movement generator, orchestrated
//! behind the [`Navigator`][navigator::Navigator] facade in a fixed
//! per-tick order (movement → state machine → detection → recovery).
//!
//! # Modules
//!
//! - [`navigator`] – [`Navigator`][navigator::Navigator]: the facade hosts
//!   drive; one per agent, sharing caches across a worker.
//! - [`machine`] – [`MovementStateMachine`][machine::MovementStateMachine]:
//!   six persistent states with deferred transitions and movement-flag
//!   reconciliation; [`EnvironmentProbe`][machine::EnvironmentProbe] runs
//!   detection in strict priority order Falling > Swimming > Ground > Idle.
//! - [`states`] – the six state implementations, including the Stuck state
//!   whose attempt and duration ceilings guarantee exit.
//! - [`stuck`] – [`StuckDetector`][stuck::StuckDetector]: four ordered
//!   stuck signals over a rolling position history.
//! - [`recovery`] – [`RecoveryStrategies`][recovery::RecoveryStrategies]:
//!   the five-rung escalation ladder, level 5 unconditional.
//! - [`generator`] – [`PointMovementGenerator`][generator::PointMovementGenerator]:
//!   drives one agent toward one destination, regenerating invalidated
//!   paths and degrading to direct movement as a last resort.
//! - [`config`] – the numeric threshold surface ([`NavConfig`][config::NavConfig]).
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: `tracing`
//!   subscriber setup with optional OTLP span export.

pub mod config;
pub mod generator;
pub mod machine;
pub mod navigator;
pub mod recovery;
pub mod states;
pub mod stuck;
pub mod telemetry;

pub use config::{NavConfig, RecoveryConfig, StateConfig, StuckConfig};
pub use generator::PointMovementGenerator;
pub use machine::{EnvironmentProbe, MovementState, MovementStateMachine, StateContext, StateSignals};
pub use navigator::{MetricsSnapshot, Navigator};
pub use recovery::RecoveryStrategies;
pub use stuck::StuckDetector;
pub use telemetry::{TracerProviderGuard, init_tracing};
