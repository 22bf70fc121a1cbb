//! CPU preview renderer.
//!
//! Draws the source image, the edit wireframe and the point markers onto a
//! tiny-skia pixmap sized to the preview surface. Everything is recomputed
//! from the current point set on each call; the surface is fully cleared
//! first, so there is no accumulation between frames.

use glam::Vec2;
use image::RgbaImage;
use tiny_skia::{
    Color, FillRule, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, StrokeDash, Transform,
};
use tracing::warn;

use texwarp_core::{PointSet, Topology};

/// Radius of a point marker in surface pixels.
const MARKER_RADIUS: f32 = 5.0;
/// Wireframe stroke width in surface pixels.
const LINE_WIDTH: f32 = 2.0;
/// Dash pattern for edges touching derived points.
const DASH_PATTERN: [f32; 2] = [5.0, 5.0];

/// Light gray at 80% opacity: draggable markers and editable edges.
fn editable_color() -> Color {
    Color::from_rgba8(204, 204, 204, 204)
}

/// Mid gray at 40% opacity: derived markers and their edges.
fn derived_color() -> Color {
    Color::from_rgba8(102, 102, 102, 102)
}

/// Renders the interactive 2D preview.
pub struct PreviewRenderer {
    pixmap: Pixmap,
    source: Option<Pixmap>,
}

impl PreviewRenderer {
    /// Create a preview surface of the given size.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Some(Self {
            pixmap: Pixmap::new(width, height)?,
            source: None,
        })
    }

    /// Surface width in pixels.
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Surface height in pixels.
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Replace the source image shown under the wireframe.
    pub fn set_source(&mut self, image: &RgbaImage) {
        match rgba_to_pixmap(image) {
            Some(pixmap) => self.source = Some(pixmap),
            None => warn!("source image has zero dimension, keeping previous preview image"),
        }
    }

    /// Redraw the preview from the current point set.
    ///
    /// Returns the pixmap holding the finished frame, ready for upload.
    pub fn render(&mut self, points: &PointSet, topology: Topology) -> &Pixmap {
        let w = self.pixmap.width() as f32;
        let h = self.pixmap.height() as f32;

        self.pixmap.fill(Color::from_rgba8(0x33, 0x33, 0x33, 0xFF));

        // Source image scaled to fill the surface.
        if let Some(source) = &self.source {
            let sx = w / source.width() as f32;
            let sy = h / source.height() as f32;
            self.pixmap.draw_pixmap(
                0,
                0,
                source.as_ref(),
                &PixmapPaint {
                    quality: tiny_skia::FilterQuality::Bilinear,
                    ..PixmapPaint::default()
                },
                Transform::from_scale(sx, sy),
                None,
            );
        }

        // Wireframe edges. Editable pairs are solid, pairs touching derived
        // points dashed and darker.
        for edge in topology.wireframe() {
            let (Some(a), Some(b)) = (points.get(edge.a), points.get(edge.b)) else {
                continue;
            };
            let mut pb = PathBuilder::new();
            pb.move_to(a.pos.x * w, a.pos.y * h);
            pb.line_to(b.pos.x * w, b.pos.y * h);
            let Some(path) = pb.finish() else { continue };

            let mut paint = Paint::default();
            paint.anti_alias = true;
            let mut stroke = Stroke {
                width: LINE_WIDTH,
                ..Stroke::default()
            };
            if edge.editable {
                paint.set_color(editable_color());
            } else {
                paint.set_color(derived_color());
                stroke.dash = StrokeDash::new(DASH_PATTERN.to_vec(), 0.0);
            }
            self.pixmap
                .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }

        // Point markers on top.
        for point in points.iter() {
            let center = Vec2::new(point.pos.x * w, point.pos.y * h);
            let Some(circle) = PathBuilder::from_circle(center.x, center.y, MARKER_RADIUS) else {
                continue;
            };
            let mut paint = Paint::default();
            paint.anti_alias = true;
            paint.set_color(if point.draggable {
                editable_color()
            } else {
                derived_color()
            });
            self.pixmap
                .fill_path(&circle, &paint, FillRule::Winding, Transform::identity(), None);
        }

        &self.pixmap
    }
}

/// Convert RGBA pixels (straight alpha) into a premultiplied pixmap.
fn rgba_to_pixmap(image: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (pixel, out) in image.pixels().zip(pixmap.pixels_mut()) {
        let [r, g, b, a] = pixel.0;
        *out = tiny_skia::ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_clears_before_drawing() {
        let mut preview = PreviewRenderer::new(64, 64).unwrap();
        let points = Topology::Grid.default_points();

        let first: Vec<u8> = preview.render(&points, Topology::Grid).data().to_vec();
        let second: Vec<u8> = preview.render(&points, Topology::Grid).data().to_vec();
        assert_eq!(first, second, "repeated renders must not accumulate");
    }

    #[test]
    fn markers_touch_the_surface() {
        let mut preview = PreviewRenderer::new(128, 128).unwrap();
        let points = Topology::Quad.default_points();
        let pixmap = preview.render(&points, Topology::Quad);

        // Point 0 sits at (0.05, 0.05) -> pixel (6, 6); its marker must
        // differ from the background fill.
        let marker = pixmap.pixel(6, 6).unwrap();
        let background = pixmap.pixel(64, 64).unwrap();
        assert_ne!(marker, background);
    }

    #[test]
    fn source_image_fills_the_surface() {
        let mut preview = PreviewRenderer::new(32, 32).unwrap();
        let mut image = RgbaImage::new(2, 2);
        for pixel in image.pixels_mut() {
            pixel.0 = [255, 0, 0, 255];
        }
        preview.set_source(&image);

        let points = Topology::Quad.default_points();
        let pixmap = preview.render(&points, Topology::Quad);
        let center = pixmap.pixel(16, 16).unwrap();
        assert_eq!(center.red(), 255);
        assert_eq!(center.green(), 0);
    }

    #[test]
    fn zero_sized_source_is_rejected() {
        let mut preview = PreviewRenderer::new(32, 32).unwrap();
        preview.set_source(&RgbaImage::new(0, 0));
        let points = Topology::Quad.default_points();
        // Renders with no source; must not panic.
        preview.render(&points, Topology::Quad);
    }
}
