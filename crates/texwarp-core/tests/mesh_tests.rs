use texwarp_core::{MeshBuilder, Topology};

#[test]
fn quad_scenario_drag_corner_to_origin() {
    let mut points = Topology::Quad.default_points();
    let builder = MeshBuilder::new(Topology::Quad);

    points.set_position(0, 0.0, 0.0);
    let mesh = builder.build(&points);

    assert_eq!(mesh.tex_coords[0], [0.0, 0.0]);
    // The derived bottom-left duplicate keeps its driver's default.
    assert_eq!(mesh.tex_coords[5], [0.05, 0.95]);
    assert_eq!(mesh.positions, Topology::Quad.positions().to_vec());
    assert_eq!(mesh.indices, Topology::Quad.indices().to_vec());
}

#[test]
fn tex_coord_length_is_invariant_under_moves() {
    for topology in [Topology::Quad, Topology::Grid] {
        let mut points = topology.default_points();
        let builder = MeshBuilder::new(topology);

        for step in 0..20 {
            let t = step as f32 / 19.0;
            points.set_position(0, t, 1.0 - t);
            assert_eq!(builder.tex_coords(&points).len(), topology.slot_count());
        }
    }
}

#[test]
fn repeated_builds_without_mutation_are_identical() {
    let mut points = Topology::Grid.default_points();
    points.set_position(1, 0.3, 0.2);
    let builder = MeshBuilder::new(Topology::Grid);

    let first = builder.build(&points);
    let second = builder.build(&points);
    assert_eq!(first, second);
}

#[test]
fn grid_mirror_motion_reaches_right_quad_slots() {
    let mut points = Topology::Grid.default_points();
    let builder = MeshBuilder::new(Topology::Grid);

    // Shrink the top row: mirror moves from 0.95 to 2*0.4 - 0.1 = 0.7.
    points.set_position(0, 0.1, 0.05);
    points.set_position(1, 0.4, 0.05);
    let coords = builder.tex_coords(&points);

    // Point 2 feeds slots 7 and 9 of the right quad.
    assert!((coords[7][0] - 0.7).abs() < 1e-6);
    assert!((coords[9][0] - 0.7).abs() < 1e-6);
}
