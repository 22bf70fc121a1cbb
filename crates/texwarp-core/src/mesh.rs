//! Mesh buffer construction.
//!
//! The geometric frame of the mesh never moves: position and index buffers
//! are topology constants built once. Warping happens entirely in the
//! texture-coordinate buffer, which is rebuilt from the current control
//! point positions on every render pass.

use serde::{Deserialize, Serialize};

use crate::point::PointSet;
use crate::topology::Topology;

/// CPU-side mesh buffers ready for upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshBuffers {
    /// Object-space vertex positions, z fixed at 0. Constant per topology.
    pub positions: Vec<[f32; 3]>,
    /// One texture coordinate per vertex slot, from current point positions.
    pub tex_coords: Vec<[f32; 2]>,
    /// Triangle-list indices. Constant per topology.
    pub indices: Vec<u16>,
}

/// Builds mesh buffers for a fixed topology.
#[derive(Debug, Clone)]
pub struct MeshBuilder {
    topology: Topology,
}

impl MeshBuilder {
    /// Create a builder for the given topology.
    pub fn new(topology: Topology) -> Self {
        Self { topology }
    }

    /// The topology this builder serves.
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// The constant position buffer.
    pub fn positions(&self) -> &'static [[f32; 3]] {
        self.topology.positions()
    }

    /// The constant index buffer.
    pub fn indices(&self) -> &'static [u16] {
        self.topology.indices()
    }

    /// Build the texture-coordinate buffer from the current point set.
    ///
    /// Pure and idempotent: reads only `points`, returns one entry per
    /// vertex slot in slot order.
    pub fn tex_coords(&self, points: &PointSet) -> Vec<[f32; 2]> {
        self.topology
            .slot_map()
            .iter()
            .map(|&id| {
                // Slot maps are validated against the point set's topology;
                // a missing point means the caller mixed topologies.
                let p = points
                    .get(id)
                    .map(|p| p.pos)
                    .unwrap_or(glam::Vec2::ZERO);
                [p.x, p.y]
            })
            .collect()
    }

    /// Build the full buffer set for one render pass.
    pub fn build(&self, points: &PointSet) -> MeshBuffers {
        MeshBuffers {
            positions: self.positions().to_vec(),
            tex_coords: self.tex_coords(points),
            indices: self.indices().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn tex_coord_count_matches_slot_count() {
        for topology in [Topology::Quad, Topology::Grid] {
            let points = topology.default_points();
            let builder = MeshBuilder::new(topology);
            assert_eq!(builder.tex_coords(&points).len(), topology.slot_count());
        }
    }

    #[test]
    fn build_is_idempotent() {
        let points = Topology::Grid.default_points();
        let builder = MeshBuilder::new(Topology::Grid);
        assert_eq!(builder.build(&points), builder.build(&points));
    }

    #[test]
    fn tex_coords_track_point_moves() {
        let mut points = Topology::Quad.default_points();
        let builder = MeshBuilder::new(Topology::Quad);

        points.set_position(0, 0.0, 0.0);
        let coords = builder.tex_coords(&points);
        assert_eq!(coords[0], [0.0, 0.0]);
        // Point 5 duplicates the untouched bottom-left corner.
        assert_eq!(points.get(5).unwrap().pos, Vec2::new(0.05, 0.95));
        assert_eq!(coords[5], [0.05, 0.95]);
    }

    #[test]
    fn shared_edge_points_feed_both_quads() {
        let mut points = Topology::Grid.default_points();
        let builder = MeshBuilder::new(Topology::Grid);

        points.set_position(1, 0.4, 0.1);
        let coords = builder.tex_coords(&points);
        // Point 1 occupies slots 1, 3 and 6.
        assert_eq!(coords[1], [0.4, 0.1]);
        assert_eq!(coords[3], [0.4, 0.1]);
        assert_eq!(coords[6], [0.4, 0.1]);
    }

    #[test]
    fn positions_do_not_vary_with_points() {
        let mut points = Topology::Grid.default_points();
        let builder = MeshBuilder::new(Topology::Grid);
        let before = builder.positions();
        points.set_position(0, 1.0, 1.0);
        assert_eq!(builder.positions(), before);
        assert_eq!(builder.indices(), Topology::Grid.indices());
    }
}
