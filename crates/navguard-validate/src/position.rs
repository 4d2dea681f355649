//! [`PositionValidator`] – pure-arithmetic coordinate and map checks.
//!
//! The cheapest validator and the first gate of every pipeline: no world
//! access at all, just bounds arithmetic and a known-map set.
//!
//! # Example
//!
//! ```rust
//! use navguard_types::{MapId, Position, WorldBounds};
//! use navguard_validate::position::PositionValidator;
//!
//! let validator = PositionValidator::new(WorldBounds::default()).with_known_maps([MapId(0)]);
//! assert!(validator.validate(MapId(0), Position::new(10.0, 20.0, 30.0)).is_ok());
//! assert!(validator.validate(MapId(9), Position::new(10.0, 20.0, 30.0)).is_err());
//! ```

use std::collections::HashSet;

use navguard_types::{MapId, Position, Validation, ValidationError, WorldBounds};

/// Validates raw coordinates and map identifiers.
#[derive(Debug, Clone, Default)]
pub struct PositionValidator {
    bounds: WorldBounds,
    /// Maps accepted by [`validate_map`][Self::validate_map]. When empty,
    /// map validation is deferred to the world handle at richer call sites.
    known_maps: HashSet<MapId>,
}

impl PositionValidator {
    pub fn new(bounds: WorldBounds) -> Self {
        Self {
            bounds,
            known_maps: HashSet::new(),
        }
    }

    /// Restrict map validation to the given set.
    pub fn with_known_maps(mut self, maps: impl IntoIterator<Item = MapId>) -> Self {
        self.known_maps = maps.into_iter().collect();
        self
    }

    /// Reject non-finite coordinates and coordinates outside the world
    /// envelope.
    pub fn validate_bounds(&self, position: Position) -> Validation {
        if !position.is_finite() {
            return Err(ValidationError::InvalidPosition { position });
        }
        if !self.bounds.contains(position) {
            return Err(ValidationError::OutOfBounds { position });
        }
        Ok(())
    }

    /// Reject maps outside the known set. Accepts everything when no set
    /// was configured.
    pub fn validate_map(&self, map: MapId) -> Validation {
        if !self.known_maps.is_empty() && !self.known_maps.contains(&map) {
            return Err(ValidationError::InvalidMapId { map });
        }
        Ok(())
    }

    /// Map check, then bounds check.
    pub fn validate(&self, map: MapId, position: Position) -> Validation {
        self.validate_map(map)?;
        self.validate_bounds(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> PositionValidator {
        PositionValidator::new(WorldBounds::default()).with_known_maps([MapId(0), MapId(1)])
    }

    #[test]
    fn finite_in_bound_positions_pass() {
        let v = validator();
        assert!(v.validate_bounds(Position::new(0.0, 0.0, 0.0)).is_ok());
        assert!(v.validate_bounds(Position::new(-16_999.0, 16_999.0, 4_999.0)).is_ok());
    }

    #[test]
    fn nan_and_infinite_coordinates_are_invalid_position() {
        let v = validator();
        for bad in [
            Position::new(f32::NAN, 0.0, 0.0),
            Position::new(0.0, f32::INFINITY, 0.0),
            Position::new(0.0, 0.0, f32::NEG_INFINITY),
        ] {
            assert!(matches!(
                v.validate_bounds(bad),
                Err(ValidationError::InvalidPosition { .. })
            ));
        }
    }

    #[test]
    fn out_of_envelope_coordinates_are_out_of_bounds() {
        let v = validator();
        assert!(matches!(
            v.validate_bounds(Position::new(18_000.0, 0.0, 0.0)),
            Err(ValidationError::OutOfBounds { .. })
        ));
        assert!(matches!(
            v.validate_bounds(Position::new(0.0, 0.0, -3_000.0)),
            Err(ValidationError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn known_maps_pass_unknown_maps_fail() {
        let v = validator();
        assert!(v.validate_map(MapId(1)).is_ok());
        assert!(matches!(
            v.validate_map(MapId(42)),
            Err(ValidationError::InvalidMapId { map: MapId(42) })
        ));
    }

    #[test]
    fn empty_known_set_accepts_any_map() {
        let v = PositionValidator::new(WorldBounds::default());
        assert!(v.validate_map(MapId(12_345)).is_ok());
    }

    #[test]
    fn validate_checks_map_before_bounds() {
        let v = validator();
        // Both the map and the position are bad; the map error wins.
        assert!(matches!(
            v.validate(MapId(99), Position::new(f32::NAN, 0.0, 0.0)),
            Err(ValidationError::InvalidMapId { .. })
        ));
    }
}
