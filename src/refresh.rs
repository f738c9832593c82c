// The round "new letter" button in the UI layer.
// Visual: a grey ring with a 60° gap and an arrowhead, top-right corner.

use std::f64::consts::PI;

use kurbo::{Arc, PathEl, Point, Rect, Shape, Size, Vec2};
use tiny_skia::{FillRule, LineCap, PathBuilder, Stroke, Transform};

use crate::surface::{Layer, solid_paint};

const CONTROL_COLOR: u32 = 0x00_88_88_88;
const GAP: f64 = PI / 3.0;

#[derive(Clone, Debug, PartialEq)]
pub struct RefreshButton {
    center: Point,
    diameter: f64,
    bounds: Rect,
}

impl RefreshButton {
    pub fn new(center: Point, diameter: f64) -> Self {
        let r = diameter / 2.0;
        Self {
            center,
            diameter,
            bounds: Rect::new(center.x - r, center.y - r, center.x + r, center.y + r),
        }
    }

    /// Radius min(w, h)/8, tucked into the top-right corner half a radius in.
    pub fn anchored(surface: Size) -> Self {
        let r = surface.width.min(surface.height) / 8.0;
        let margin = r / 2.0;
        Self::new(Point::new(surface.width - margin - r, margin + r), 2.0 * r)
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Bounding-box test, inclusive on all four edges.
    pub fn test_hit(&self, p: Point) -> bool {
        let b = self.bounds;
        p.x >= b.x0 && p.x <= b.x1 && p.y >= b.y0 && p.y <= b.y1
    }

    pub fn render(&self, layer: &mut Layer) {
        let r = self.diameter / 2.0;
        let ring_r = r * 0.6;
        let width = (r * 0.16) as f32;

        // Ring: starts just after 12 o'clock and sweeps round to leave the gap.
        let start = -PI / 2.0 + GAP / 2.0;
        let sweep = 2.0 * PI - GAP;
        let arc = Arc {
            center: self.center,
            radii: Vec2::new(ring_r, ring_r),
            start_angle: start,
            sweep_angle: sweep,
            x_rotation: 0.0,
        };
        let paint = solid_paint(CONTROL_COLOR);
        if let Some(path) = to_skia(arc.path_elements(0.1)) {
            let stroke = Stroke { width, line_cap: LineCap::Round, ..Stroke::default() };
            layer
                .pixmap_mut()
                .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }

        // Arrowhead at the trailing end of the arc, pointing along the sweep.
        let end = start + sweep;
        let tip_base = self.center + Vec2::from_angle(end) * ring_r;
        let tangent = Vec2::from_angle(end + PI / 2.0);
        let normal = Vec2::from_angle(end);
        let head = r * 0.3;
        let tip = tip_base + tangent * head;
        let a = tip_base + normal * head * 0.8;
        let b = tip_base - normal * head * 0.8;
        let triangle = [PathEl::MoveTo(a), PathEl::LineTo(tip), PathEl::LineTo(b), PathEl::ClosePath];
        if let Some(path) = to_skia(triangle) {
            layer
                .pixmap_mut()
                .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
    }
}

fn to_skia(els: impl IntoIterator<Item = PathEl>) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for el in els {
        match el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p) => pb.quad_to(p1.x as f32, p1.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(p1, p2, p) => pb.cubic_to(
                p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32, p.x as f32, p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}
