//! Fixed mesh topologies.
//!
//! A topology bundles everything that distinguishes the two supported mesh
//! layouts: control point defaults and draggability, derivation rules, the
//! constant position and index buffers, the slot-to-point mapping for
//! texture coordinates, and the edit wireframe drawn in the preview.

use serde::{Deserialize, Serialize};

use crate::point::{ControlPoint, Derivation, PointId, PointSet};

/// An edge of the preview wireframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEdge {
    /// First endpoint.
    pub a: PointId,
    /// Second endpoint.
    pub b: PointId,
    /// Whether both endpoints are draggable. Editable edges are drawn solid,
    /// edges touching derived points dashed and translucent.
    pub editable: bool,
}

const fn edge(a: PointId, b: PointId, editable: bool) -> WireEdge {
    WireEdge { a, b, editable }
}

/// Single quad split into two triangles. Four draggable corners plus the two
/// diagonal corners duplicated as derived points, so each triangle owns its
/// texture-coordinate slots.
mod quad {
    use super::*;

    pub const POSITIONS: [[f32; 3]; 6] = [
        [0.0, 0.0, 0.0], // 0: top-left
        [1.0, 0.0, 0.0], // 1: top-right
        [0.0, 1.0, 0.0], // 2: bottom-left
        [1.0, 1.0, 0.0], // 3: bottom-right
        [1.0, 0.0, 0.0], // 4: top-right duplicate
        [0.0, 1.0, 0.0], // 5: bottom-left duplicate
    ];

    pub const INDICES: [u16; 6] = [
        0, 1, 2, // upper-left triangle
        4, 3, 5, // lower-right triangle
    ];

    pub const SLOT_MAP: [PointId; 6] = [0, 1, 2, 3, 4, 5];

    pub const WIREFRAME: [WireEdge; 4] = [
        edge(0, 1, true),
        edge(0, 2, true),
        edge(1, 3, true),
        edge(2, 3, true),
    ];
}

/// Two quads in a row. The rightmost column of points is derived by
/// reflecting the left column through the middle one. Each quad is an
/// independent UV patch, so the shared middle points feed slots in both.
mod grid {
    use super::*;

    /// Object-space position of each control point on the 3x2 grid.
    pub const POINT_POSITIONS: [[f32; 2]; 6] = [
        [0.0, 0.0],
        [0.5, 0.0],
        [1.0, 0.0],
        [0.0, 1.0],
        [0.5, 1.0],
        [1.0, 1.0],
    ];

    pub const SLOT_MAP: [PointId; 12] = [
        0, 1, 3, // left quad
        1, 4, 3, //
        1, 2, 4, // right quad
        2, 5, 4, //
    ];

    pub const POSITIONS: [[f32; 3]; 12] = {
        let mut out = [[0.0; 3]; 12];
        let mut slot = 0;
        while slot < 12 {
            let p = POINT_POSITIONS[SLOT_MAP[slot]];
            out[slot] = [p[0], p[1], 0.0];
            slot += 1;
        }
        out
    };

    pub const INDICES: [u16; 12] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

    pub const WIREFRAME: [WireEdge; 7] = [
        edge(0, 1, true),
        edge(1, 2, false),
        edge(0, 3, true),
        edge(1, 4, true),
        edge(2, 5, false),
        edge(3, 4, true),
        edge(4, 5, false),
    ];
}

/// The supported mesh layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Topology {
    /// One quad, two triangles, six texture-coordinate slots.
    #[default]
    Quad,
    /// Two quads with mirrored right edge, twelve texture-coordinate slots.
    Grid,
}

impl Topology {
    /// Parse a topology name as given on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "quad" => Some(Topology::Quad),
            "grid" => Some(Topology::Grid),
            _ => None,
        }
    }

    /// Default control points for this topology, derived points resolved.
    pub fn default_points(&self) -> PointSet {
        let points = match self {
            Topology::Quad => vec![
                ControlPoint::draggable(0.05, 0.05),
                ControlPoint::draggable(0.95, 0.05),
                ControlPoint::draggable(0.05, 0.95),
                ControlPoint::draggable(0.95, 0.95),
                ControlPoint::derived(0.95, 0.05, Derivation::CopyOf(1)),
                ControlPoint::derived(0.05, 0.95, Derivation::CopyOf(2)),
            ],
            Topology::Grid => vec![
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
                ControlPoint::draggable(0.05, 0.95),
                ControlPoint::draggable(0.5, 0.95),
                ControlPoint::derived(
                    0.95,
                    0.95,
                    Derivation::ReflectThrough {
                        origin: 3,
                        center: 4,
                    },
                ),
            ],
        };
        // The tables above satisfy every PointSet rule by construction.
        PointSet::new(points).expect("built-in topology tables are valid")
    }

    /// Constant object-space vertex positions, one per slot, z fixed at 0.
    pub fn positions(&self) -> &'static [[f32; 3]] {
        match self {
            Topology::Quad => &quad::POSITIONS,
            Topology::Grid => &grid::POSITIONS,
        }
    }

    /// Constant triangle-list index buffer.
    pub fn indices(&self) -> &'static [u16] {
        match self {
            Topology::Quad => &quad::INDICES,
            Topology::Grid => &grid::INDICES,
        }
    }

    /// Mapping from texture-coordinate slot to the control point feeding it.
    /// Not one-to-one with control points: shared edge points feed one slot
    /// per adjoining quad.
    pub fn slot_map(&self) -> &'static [PointId] {
        match self {
            Topology::Quad => &quad::SLOT_MAP,
            Topology::Grid => &grid::SLOT_MAP,
        }
    }

    /// Number of vertex slots, and therefore texture-coordinate entries.
    pub fn slot_count(&self) -> usize {
        self.slot_map().len()
    }

    /// Point pairs connected by the preview wireframe.
    pub fn wireframe(&self) -> &'static [WireEdge] {
        match self {
            Topology::Quad => &quad::WIREFRAME,
            Topology::Grid => &grid::WIREFRAME,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_counts_are_topology_constants() {
        assert_eq!(Topology::Quad.slot_count(), 6);
        assert_eq!(Topology::Grid.slot_count(), 12);
        assert_eq!(Topology::Quad.positions().len(), 6);
        assert_eq!(Topology::Grid.positions().len(), 12);
    }

    #[test]
    fn index_buffers_cover_all_slots() {
        for topology in [Topology::Quad, Topology::Grid] {
            assert_eq!(topology.indices().len() % 3, 0);
            for &i in topology.indices() {
                assert!((i as usize) < topology.slot_count());
            }
        }
    }

    #[test]
    fn slot_maps_reference_valid_points() {
        for topology in [Topology::Quad, Topology::Grid] {
            let points = topology.default_points();
            for &id in topology.slot_map() {
                assert!(points.get(id).is_some());
            }
        }
    }

    #[test]
    fn wireframe_editable_tags_match_draggability() {
        for topology in [Topology::Quad, Topology::Grid] {
            let points = topology.default_points();
            for e in topology.wireframe() {
                let both_draggable =
                    points.get(e.a).unwrap().draggable && points.get(e.b).unwrap().draggable;
                assert_eq!(e.editable, both_draggable, "{topology:?} edge {e:?}");
            }
        }
    }

    #[test]
    fn grid_positions_follow_slot_map() {
        let positions = Topology::Grid.positions();
        let map = Topology::Grid.slot_map();
        // Slots 1 and 3 both map to point 1, so their positions coincide.
        assert_eq!(map[1], map[3]);
        assert_eq!(positions[1], positions[3]);
    }

    #[test]
    fn topology_names_parse() {
        assert_eq!(Topology::from_name("quad"), Some(Topology::Quad));
        assert_eq!(Topology::from_name("grid"), Some(Topology::Grid));
        assert_eq!(Topology::from_name("mesh"), None);
    }
}
