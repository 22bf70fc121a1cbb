//! Control points and their derivation rules.
//!
//! A `PointSet` owns every control point of the active topology. Draggable
//! points are mutated by user input through [`PointSet::set_position`];
//! derived points are recomputed from their drivers immediately after any
//! mutation and are never written directly.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{CoreError, Result};

/// Stable index of a control point within its set.
pub type PointId = usize;

/// Rule producing a derived point's position from its driver(s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Derivation {
    /// Position is copied from the driving point. Used to replicate a shared
    /// boundary vertex so each quad gets its own texture-coordinate slot.
    CopyOf(PointId),
    /// Position is the reflection of `origin` through `center`:
    /// `2 * center - origin`, clamped to [0,1] on both axes. Extends a line
    /// of three points so the implied endpoint follows the visible pair.
    ReflectThrough {
        /// The point being reflected.
        origin: PointId,
        /// The pivot of the reflection.
        center: PointId,
    },
}

impl Derivation {
    /// Ids of the points this rule reads.
    pub fn drivers(&self) -> impl Iterator<Item = PointId> {
        let (a, b) = match *self {
            Derivation::CopyOf(src) => (src, None),
            Derivation::ReflectThrough { origin, center } => (origin, Some(center)),
        };
        std::iter::once(a).chain(b)
    }
}

/// A single control point in normalized canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    /// Position as fractions of the surface, always clamped to [0,1].
    pub pos: Vec2,
    /// Whether user input may move this point.
    pub draggable: bool,
    /// Derivation rule, present exactly when the point is not draggable.
    pub derivation: Option<Derivation>,
}

impl ControlPoint {
    /// A user-movable point.
    pub fn draggable(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            draggable: true,
            derivation: None,
        }
    }

    /// A point whose position is a function of other points. The stored
    /// position is a cache; it is overwritten on every resolution pass.
    pub fn derived(x: f32, y: f32, rule: Derivation) -> Self {
        Self {
            pos: Vec2::new(x, y),
            draggable: false,
            derivation: Some(rule),
        }
    }
}

/// The full set of control points for one topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSet {
    points: Vec<ControlPoint>,
}

impl PointSet {
    /// Create a point set, validating the derivation graph.
    ///
    /// Rules: draggable points carry no derivation, derived points carry
    /// exactly one, and every driver must be an in-range draggable point
    /// (no chained derivations).
    pub fn new(points: Vec<ControlPoint>) -> Result<Self> {
        for (id, point) in points.iter().enumerate() {
            match (&point.derivation, point.draggable) {
                (Some(_), true) => {
                    return Err(CoreError::InvalidPointSet(format!(
                        "point {id} is draggable but has a derivation rule"
                    )));
                }
                (None, false) => {
                    return Err(CoreError::InvalidPointSet(format!(
                        "point {id} is neither draggable nor derived"
                    )));
                }
                _ => {}
            }

            if let Some(rule) = &point.derivation {
                for driver in rule.drivers() {
                    let Some(target) = points.get(driver) else {
                        return Err(CoreError::InvalidPointSet(format!(
                            "point {id} is driven by out-of-range point {driver}"
                        )));
                    };
                    if !target.draggable {
                        return Err(CoreError::InvalidPointSet(format!(
                            "point {id} is driven by derived point {driver}"
                        )));
                    }
                }
            }
        }

        let mut set = Self { points };
        set.resolve_derived();
        Ok(set)
    }

    /// Number of control points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Look up a point by id.
    pub fn get(&self, id: PointId) -> Option<&ControlPoint> {
        self.points.get(id)
    }

    /// Iterate over all points in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ControlPoint> {
        self.points.iter()
    }

    /// Move a draggable point to the given normalized position.
    ///
    /// Coordinates are clamped to [0,1] on both axes. Targeting a derived or
    /// unknown point is a no-op. Returns `true` when the set was mutated and
    /// a render pass is due.
    pub fn set_position(&mut self, id: PointId, x: f32, y: f32) -> bool {
        match self.points.get_mut(id) {
            Some(point) if point.draggable => {
                point.pos = Vec2::new(x, y).clamp(Vec2::ZERO, Vec2::ONE);
                trace!(id, x = point.pos.x, y = point.pos.y, "point moved");
                self.resolve_derived();
                true
            }
            Some(_) => {
                trace!(id, "ignoring move of non-draggable point");
                false
            }
            None => false,
        }
    }

    /// Recompute every derived point from its drivers.
    ///
    /// Runs eagerly after each mutation, so cached derived positions are
    /// always consistent by the time they are read for rendering.
    fn resolve_derived(&mut self) {
        for id in 0..self.points.len() {
            let Some(rule) = self.points[id].derivation else {
                continue;
            };
            let pos = match rule {
                Derivation::CopyOf(src) => self.points[src].pos,
                Derivation::ReflectThrough { origin, center } => {
                    let o = self.points[origin].pos;
                    let c = self.points[center].pos;
                    (2.0 * c - o).clamp(Vec2::ZERO, Vec2::ONE)
                }
            };
            self.points[id].pos = pos;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_plus_reflected() -> PointSet {
        PointSet::new(vec![
            ControlPoint::draggable(0.05, 0.05),
            ControlPoint::draggable(0.5, 0.05),
            ControlPoint::derived(
                0.95,
                0.05,
                Derivation::ReflectThrough {
                    origin: 0,
                    center: 1,
                },
            ),
        ])
        .unwrap()
    }

    #[test]
    fn set_position_clamps_to_unit_range() {
        let mut set = two_plus_reflected();
        assert!(set.set_position(0, 1.5, -0.5));
        assert_eq!(set.get(0).unwrap().pos, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn derived_point_rejects_direct_mutation() {
        let mut set = two_plus_reflected();
        let before = set.get(2).unwrap().pos;
        assert!(!set.set_position(2, 0.3, 0.3));
        assert_eq!(set.get(2).unwrap().pos, before);
    }

    #[test]
    fn reflection_follows_drivers() {
        let mut set = two_plus_reflected();
        // Defaults already resolve: 2 * 0.5 - 0.05 = 0.95.
        assert_eq!(set.get(2).unwrap().pos, Vec2::new(0.95, 0.05));

        set.set_position(1, 0.4, 0.2);
        let expected = Vec2::new(2.0 * 0.4 - 0.05, 2.0 * 0.2 - 0.05);
        assert!((set.get(2).unwrap().pos - expected).length() < 1e-6);
    }

    #[test]
    fn reflection_clamps_when_leaving_surface() {
        let mut set = two_plus_reflected();
        set.set_position(0, 0.0, 0.0);
        set.set_position(1, 0.9, 0.9);
        // Unclamped reflection would be (1.8, 1.8).
        assert_eq!(set.get(2).unwrap().pos, Vec2::ONE);
    }

    #[test]
    fn copy_rule_tracks_its_driver() {
        let mut set = PointSet::new(vec![
            ControlPoint::draggable(0.2, 0.3),
            ControlPoint::derived(0.0, 0.0, Derivation::CopyOf(0)),
        ])
        .unwrap();
        assert_eq!(set.get(1).unwrap().pos, Vec2::new(0.2, 0.3));

        set.set_position(0, 0.7, 0.8);
        assert_eq!(set.get(1).unwrap().pos, Vec2::new(0.7, 0.8));
    }

    #[test]
    fn new_rejects_chained_derivations() {
        let result = PointSet::new(vec![
            ControlPoint::draggable(0.0, 0.0),
            ControlPoint::derived(0.0, 0.0, Derivation::CopyOf(0)),
            ControlPoint::derived(0.0, 0.0, Derivation::CopyOf(1)),
        ]);
        assert!(matches!(result, Err(CoreError::InvalidPointSet(_))));
    }

    #[test]
    fn new_rejects_out_of_range_driver() {
        let result = PointSet::new(vec![ControlPoint::derived(
            0.0,
            0.0,
            Derivation::CopyOf(7),
        )]);
        assert!(matches!(result, Err(CoreError::InvalidPointSet(_))));
    }

    #[test]
    fn point_set_serialization_round_trip() {
        let set = two_plus_reflected();
        let json = serde_json::to_string(&set).expect("serialize");
        let back: PointSet = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(set, back);
    }
}
