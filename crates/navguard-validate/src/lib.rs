//! `navguard-validate` – the validation foundation.
//!
//! Four stateless-or-nearly-stateless validators answer every "may the
//! agent be here / go there?" question the rest of the stack asks. All of
//! them fail closed: anything unknown, out of world, or unanswerable
//! validates negative.
//!
//! # Modules
//!
//! - [`position`] – [`PositionValidator`][position::PositionValidator]:
//!   pure arithmetic over coordinates and map ids; no world access.
//! - [`ground`] – [`GroundValidator`][ground::GroundValidator]: terrain
//!   height with an explicitly owned, lock-protected TTL cache keyed by
//!   coarse terrain cell; void and unsafe-terrain classification.
//! - [`liquid`] – [`LiquidValidator`][liquid::LiquidValidator]: per-query
//!   liquid classification, transition taxonomy, and the
//!   never-enter-dangerous-liquid path rule.
//! - [`collision`] – [`CollisionValidator`][collision::CollisionValidator]:
//!   eye-level line of sight, per-segment path validation with failing
//!   index, last-valid-position probing, and the radial-ray embedding
//!   heuristic.

pub mod collision;
pub mod ground;
pub mod liquid;
pub mod position;

pub use collision::{CollisionValidator, EYE_HEIGHT};
pub use ground::{GroundValidator, HeightCacheConfig, VOID_FLOOR};
pub use liquid::LiquidValidator;
pub use position::PositionValidator;
