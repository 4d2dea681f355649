//! `navguard-types` – shared data model of the navguard stack.
//!
//! Plain data only: no world access, no I/O. Every other navguard crate
//! builds on these types.
//!
//! # Modules
//!
//! - [`position`] – [`Position`], [`MapId`], [`AgentId`], [`WorldBounds`],
//!   and the timestamped [`PositionSnapshot`] used by rolling histories.
//! - [`liquid`] – [`LiquidKind`]/[`LiquidInfo`] classification and the
//!   [`LiquidTransition`] taxonomy for path steps.
//! - [`state`] – the closed [`MovementStateKind`] set, derived
//!   [`MovementFlags`], and the [`StuckKind`]/[`StuckInfo`] model.
//! - [`validation`] – [`ValidationError`] (categorized, fail-closed
//!   validation results), [`ValidationLevel`] strictness tiers, and the
//!   operational [`NavError`].
//! - [`recovery`] – the five-rung [`RecoveryLevel`] ladder and
//!   [`RecoveryOutcome`].
//! - [`clock`] – the injected [`Clock`] abstraction ([`SystemClock`] in
//!   production, [`ManualClock`] in tests).

pub mod clock;
pub mod liquid;
pub mod position;
pub mod recovery;
pub mod state;
pub mod validation;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock, system_clock};
pub use liquid::{LiquidInfo, LiquidKind, LiquidTransition, SWIM_EYE_HEIGHT};
pub use position::{AgentId, MapId, Position, PositionSnapshot, WorldBounds};
pub use recovery::{RecoveryLevel, RecoveryOutcome};
pub use state::{MovementFlags, MovementStateKind, StuckCounters, StuckInfo, StuckKind};
pub use validation::{NavError, PathKind, Validation, ValidationError, ValidationLevel};
