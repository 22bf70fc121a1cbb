//! Pointer interaction state machine.
//!
//! Translates raw pointer events in surface coordinates into control point
//! mutations. Owns the single drag session: at most one point is dragged at
//! a time, and any pointer-up clears the session no matter where the pointer
//! is — releasing outside the surface is deliberately lenient.

use glam::Vec2;
use tracing::debug;

use crate::point::{PointId, PointSet};

/// Hit test radius around a draggable marker, in surface pixels.
pub const HIT_RADIUS: f32 = 5.0;

/// Placement of the drawable surface within the pointer coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceRect {
    /// Top-left corner of the surface.
    pub origin: Vec2,
    /// Width and height of the surface in pixels.
    pub size: Vec2,
}

impl SurfaceRect {
    /// Surface at `(x, y)` with dimensions `(w, h)`.
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Convert an absolute pointer position to clamped [0,1] percentages.
    pub fn to_percent(&self, pointer: Vec2) -> Vec2 {
        ((pointer - self.origin) / self.size).clamp(Vec2::ZERO, Vec2::ONE)
    }

    /// Convert normalized percentages to an absolute surface position.
    pub fn to_surface(&self, percent: Vec2) -> Vec2 {
        self.origin + percent * self.size
    }
}

/// Drag state machine feeding a [`PointSet`].
#[derive(Debug, Clone)]
pub struct InteractionController {
    surface: SurfaceRect,
    dragging: Option<PointId>,
}

impl InteractionController {
    /// Controller for a surface at the given placement.
    pub fn new(surface: SurfaceRect) -> Self {
        Self {
            surface,
            dragging: None,
        }
    }

    /// Update the surface placement (after a window resize or layout move).
    pub fn set_surface(&mut self, surface: SurfaceRect) {
        self.surface = surface;
    }

    /// The surface this controller maps pointer events onto.
    pub fn surface(&self) -> SurfaceRect {
        self.surface
    }

    /// The point currently being dragged, if any.
    pub fn dragging(&self) -> Option<PointId> {
        self.dragging
    }

    /// Pointer pressed at an absolute position. Starts a drag session when a
    /// draggable marker lies within [`HIT_RADIUS`]; returns whether one did.
    pub fn pointer_down(&mut self, pointer: Vec2, points: &PointSet) -> bool {
        for id in 0..points.len() {
            let point = match points.get(id) {
                Some(p) if p.draggable => p,
                _ => continue,
            };
            let marker = self.surface.to_surface(point.pos);
            if marker.distance(pointer) <= HIT_RADIUS {
                debug!(id, "drag started");
                self.dragging = Some(id);
                return true;
            }
        }
        false
    }

    /// Pointer moved. While a drag is active, converts to percentages,
    /// clamps, and moves the dragged point. Returns whether a render pass
    /// is due.
    pub fn pointer_move(&mut self, pointer: Vec2, points: &mut PointSet) -> bool {
        let Some(id) = self.dragging else {
            return false;
        };
        let percent = self.surface.to_percent(pointer);
        points.set_position(id, percent.x, percent.y)
    }

    /// Pointer released anywhere. Ends the drag session unconditionally;
    /// safe to call with no active drag.
    pub fn pointer_up(&mut self) {
        if let Some(id) = self.dragging.take() {
            debug!(id, "drag ended");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::Topology;

    fn controller() -> InteractionController {
        // 512x512 surface with no offset, as in the default preview layout.
        InteractionController::new(SurfaceRect::new(0.0, 0.0, 512.0, 512.0))
    }

    #[test]
    fn pointer_down_hits_draggable_marker() {
        let points = Topology::Grid.default_points();
        let mut ctl = controller();
        // Point 0 sits at (0.05, 0.05) -> (25.6, 25.6).
        assert!(ctl.pointer_down(Vec2::new(28.0, 25.0), &points));
        assert_eq!(ctl.dragging(), Some(0));
    }

    #[test]
    fn pointer_down_ignores_derived_marker() {
        let points = Topology::Grid.default_points();
        let mut ctl = controller();
        // Point 2 (derived) sits at (0.95, 0.05) -> (486.4, 25.6).
        assert!(!ctl.pointer_down(Vec2::new(486.0, 26.0), &points));
        assert_eq!(ctl.dragging(), None);
    }

    #[test]
    fn pointer_down_misses_outside_radius() {
        let points = Topology::Grid.default_points();
        let mut ctl = controller();
        assert!(!ctl.pointer_down(Vec2::new(60.0, 60.0), &points));
    }

    #[test]
    fn drag_moves_point_and_requests_render() {
        let mut points = Topology::Grid.default_points();
        let mut ctl = controller();
        assert!(ctl.pointer_down(Vec2::new(25.6, 25.6), &points));

        assert!(ctl.pointer_move(Vec2::new(256.0, 128.0), &mut points));
        let pos = points.get(0).unwrap().pos;
        assert!((pos - Vec2::new(0.5, 0.25)).length() < 1e-6);
    }

    #[test]
    fn drag_clamps_out_of_bounds_pointer() {
        let mut points = Topology::Grid.default_points();
        let mut ctl = controller();
        assert!(ctl.pointer_down(Vec2::new(25.6, 25.6), &points));

        ctl.pointer_move(Vec2::new(768.0, -256.0), &mut points);
        assert_eq!(points.get(0).unwrap().pos, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn move_without_drag_is_inert() {
        let mut points = Topology::Grid.default_points();
        let before = points.clone();
        let mut ctl = controller();
        assert!(!ctl.pointer_move(Vec2::new(100.0, 100.0), &mut points));
        assert_eq!(points, before);
    }

    #[test]
    fn pointer_up_without_drag_is_a_no_op() {
        let mut ctl = controller();
        ctl.pointer_up();
        assert_eq!(ctl.dragging(), None);
    }

    #[test]
    fn pointer_up_clears_drag_unconditionally() {
        let mut points = Topology::Grid.default_points();
        let mut ctl = controller();
        ctl.pointer_down(Vec2::new(25.6, 25.6), &points);
        // Release far outside the surface.
        ctl.pointer_move(Vec2::new(-500.0, 900.0), &mut points);
        ctl.pointer_up();
        assert_eq!(ctl.dragging(), None);
    }

    #[test]
    fn surface_offset_is_respected() {
        let points = Topology::Grid.default_points();
        let mut ctl =
            InteractionController::new(SurfaceRect::new(100.0, 50.0, 512.0, 512.0));
        // Marker for point 0 is now at (125.6, 75.6).
        assert!(ctl.pointer_down(Vec2::new(126.0, 76.0), &points));
    }
}
