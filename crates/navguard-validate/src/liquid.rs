//! [`LiquidValidator`] – liquid classification and transition rules.
//!
//! Classification is derived fresh per query (the agent moves between
//! queries; stale liquid state is worse than the cheap lookup). The one
//! hard rule lives here: a path may never step into dangerous liquid.

use std::sync::Arc;

use navguard_types::{
    LiquidInfo, LiquidTransition, MapId, Position, Validation, ValidationError,
};
use navguard_world::query::WorldQuery;

/// Depth change between two in-liquid points that counts as deepening or
/// shallowing rather than noise.
const DEPTH_STEP: f32 = 1.0;

/// Classifies liquid at positions and across path steps.
pub struct LiquidValidator {
    world: Arc<dyn WorldQuery>,
}

impl LiquidValidator {
    pub fn new(world: Arc<dyn WorldQuery>) -> Self {
        Self { world }
    }

    /// The full liquid picture at `position`, derived from the world's raw
    /// sample. Dry ground when the world reports no liquid.
    pub fn classify(&self, map: MapId, position: Position) -> LiquidInfo {
        match self.world.liquid_at(map, position) {
            Some(sample) => LiquidInfo::submersion(position, sample.kind, sample.surface_height),
            None => LiquidInfo::dry(),
        }
    }

    /// How the liquid situation changes moving `from → to`.
    pub fn transition(&self, map: MapId, from: Position, to: Position) -> LiquidTransition {
        let a = self.classify(map, from);
        let b = self.classify(map, to);

        if b.is_dangerous() && !a.is_dangerous() {
            return LiquidTransition::EnteringDangerous;
        }
        match (a.in_liquid, b.in_liquid) {
            (false, true) => LiquidTransition::Entering,
            (true, false) => LiquidTransition::Exiting,
            (true, true) => {
                let delta = b.depth - a.depth;
                if delta > DEPTH_STEP {
                    LiquidTransition::Deepening
                } else if delta < -DEPTH_STEP {
                    LiquidTransition::Shallowing
                } else {
                    LiquidTransition::None
                }
            }
            (false, false) => LiquidTransition::None,
        }
    }

    /// Reject a destination sitting in dangerous liquid.
    pub fn validate_destination(&self, map: MapId, position: Position) -> Validation {
        let info = self.classify(map, position);
        if info.is_dangerous() {
            return Err(ValidationError::LiquidDanger {
                kind: info.kind,
                position,
            });
        }
        Ok(())
    }

    /// Walk every consecutive pair of `points` and fail on the first step
    /// that enters dangerous liquid.
    pub fn validate_path(&self, map: MapId, points: &[Position]) -> Validation {
        for pair in points.windows(2) {
            if self.transition(map, pair[0], pair[1]) == LiquidTransition::EnteringDangerous {
                let info = self.classify(map, pair[1]);
                return Err(ValidationError::LiquidDanger {
                    kind: info.kind,
                    position: pair[1],
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navguard_types::LiquidKind;
    use navguard_world::sim::{SimBox, SimWorld};

    const MAP: MapId = MapId(0);

    fn world_with_lake(kind: LiquidKind) -> Arc<SimWorld> {
        // Lake occupying x ∈ [10, 30], surface at z = 2, bed at z = -10.
        SimWorld::new(MAP)
            .with_liquid(
                SimBox::new(Position::new(10.0, -20.0, -10.0), Position::new(30.0, 20.0, 2.0)),
                kind,
            )
            .into_shared()
    }

    #[test]
    fn classify_dry_ground() {
        let v = LiquidValidator::new(world_with_lake(LiquidKind::Water));
        let info = v.classify(MAP, Position::new(0.0, 0.0, 0.0));
        assert!(!info.in_liquid);
        assert_eq!(info.kind, LiquidKind::None);
    }

    #[test]
    fn classify_inside_lake_reports_depth() {
        let v = LiquidValidator::new(world_with_lake(LiquidKind::Water));
        let info = v.classify(MAP, Position::new(20.0, 0.0, -3.0));
        assert!(info.in_liquid);
        assert!(info.underwater);
        assert!((info.depth - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn dry_into_water_is_entering() {
        let v = LiquidValidator::new(world_with_lake(LiquidKind::Water));
        let t = v.transition(MAP, Position::new(0.0, 0.0, 0.0), Position::new(20.0, 0.0, 0.0));
        assert_eq!(t, LiquidTransition::Entering);
    }

    #[test]
    fn water_onto_shore_is_exiting() {
        let v = LiquidValidator::new(world_with_lake(LiquidKind::Water));
        let t = v.transition(MAP, Position::new(20.0, 0.0, 0.0), Position::new(0.0, 0.0, 0.0));
        assert_eq!(t, LiquidTransition::Exiting);
    }

    #[test]
    fn dry_into_magma_is_entering_dangerous() {
        let v = LiquidValidator::new(world_with_lake(LiquidKind::Magma));
        let t = v.transition(MAP, Position::new(0.0, 0.0, 0.0), Position::new(20.0, 0.0, 0.0));
        assert_eq!(t, LiquidTransition::EnteringDangerous);
    }

    #[test]
    fn depth_changes_classify_as_deepening_and_shallowing() {
        let v = LiquidValidator::new(world_with_lake(LiquidKind::Water));
        let shallow = Position::new(20.0, 0.0, 1.5); // depth 0.5
        let deep = Position::new(25.0, 0.0, -6.0); // depth 8.0
        assert_eq!(v.transition(MAP, shallow, deep), LiquidTransition::Deepening);
        assert_eq!(v.transition(MAP, deep, shallow), LiquidTransition::Shallowing);
    }

    #[test]
    fn small_depth_change_is_no_transition() {
        let v = LiquidValidator::new(world_with_lake(LiquidKind::Water));
        let a = Position::new(20.0, 0.0, 0.0);
        let b = Position::new(21.0, 0.0, -0.5);
        assert_eq!(v.transition(MAP, a, b), LiquidTransition::None);
    }

    #[test]
    fn path_entering_magma_fails_with_liquid_danger() {
        let v = LiquidValidator::new(world_with_lake(LiquidKind::Magma));
        let path = [Position::new(0.0, 0.0, 0.0), Position::new(20.0, 0.0, 0.0)];
        assert!(matches!(
            v.validate_path(MAP, &path),
            Err(ValidationError::LiquidDanger {
                kind: LiquidKind::Magma,
                ..
            })
        ));
    }

    #[test]
    fn path_through_benign_water_passes() {
        let v = LiquidValidator::new(world_with_lake(LiquidKind::Water));
        let path = [
            Position::new(0.0, 0.0, 0.0),
            Position::new(20.0, 0.0, 0.0),
            Position::new(40.0, 0.0, 0.0),
        ];
        assert!(v.validate_path(MAP, &path).is_ok());
    }

    #[test]
    fn destination_in_slime_is_rejected() {
        let v = LiquidValidator::new(world_with_lake(LiquidKind::Slime));
        assert!(matches!(
            v.validate_destination(MAP, Position::new(20.0, 0.0, 0.0)),
            Err(ValidationError::LiquidDanger {
                kind: LiquidKind::Slime,
                ..
            })
        ));
        assert!(v.validate_destination(MAP, Position::new(0.0, 0.0, 0.0)).is_ok());
    }
}
