// A drawable layer: one tiny-skia raster sized for the device pixel ratio.
// Visual: the host stacks guide, drawing and UI layers into the window.

use kurbo::{Point, Size};
use tiny_skia::{Color, LineCap, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::error::Error;
use crate::types::CanvasHandle;

/// Convert a 0x00RRGGBB color into an opaque tiny-skia color.
pub fn rgb(color: u32) -> Color {
    Color::from_rgba8(
        ((color >> 16) & 0xFF) as u8,
        ((color >> 8) & 0xFF) as u8,
        (color & 0xFF) as u8,
        0xFF,
    )
}

pub(crate) fn solid_paint(color: u32) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(rgb(color));
    paint.anti_alias = true;
    paint
}

pub(crate) fn allocate(width: u32, height: u32) -> Result<Pixmap, Error> {
    Pixmap::new(width, height).ok_or(Error::ContextUnavailable { width, height })
}

pub struct Layer {
    handle: CanvasHandle, // bounding rect snapshot taken at construction
    pixmap: Pixmap,
    stroke: Stroke,
}

impl Layer {
    /// Size the raster to `client × dpr`. A layer never resizes: a new
    /// canvas size means a new layer.
    pub fn new(handle: CanvasHandle) -> Result<Self, Error> {
        let (width, height) = handle.backing_size();
        let pixmap = allocate(width, height)?;
        Ok(Self { handle, pixmap, stroke: Stroke::default() })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn size(&self) -> Size {
        Size::new(self.width() as f64, self.height() as f64)
    }

    pub fn handle(&self) -> &CanvasHandle {
        &self.handle
    }

    /// Client (CSS) space → canvas pixels. Dividing by the bounding rect
    /// compensates for CSS scaling and the device pixel ratio at once.
    pub fn get_position(&self, client: Point) -> Point {
        let rect = self.handle.bounding_rect;
        Point::new(
            self.width() as f64 * client.x / rect.width(),
            self.height() as f64 * client.y / rect.height(),
        )
    }

    /// Inverse of [`Layer::get_position`].
    pub fn to_client(&self, position: Point) -> Point {
        let rect = self.handle.bounding_rect;
        Point::new(
            position.x * rect.width() / self.width() as f64,
            position.y * rect.height() / self.height() as f64,
        )
    }

    pub fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }

    pub fn set_line_style(&mut self, width: f32, cap: LineCap) {
        self.stroke.width = width;
        self.stroke.line_cap = cap;
    }

    pub fn line_width(&self) -> f32 {
        self.stroke.width
    }

    pub fn line_cap(&self) -> LineCap {
        self.stroke.line_cap
    }

    /// Stroke one straight segment with the current line style.
    /// Returns false (and paints nothing) for a zero-length segment.
    pub fn stroke_segment(&mut self, from: Point, to: Point, color: u32) -> bool {
        if from == to {
            return false;
        }
        let mut pb = PathBuilder::new();
        pb.move_to(from.x as f32, from.y as f32);
        pb.line_to(to.x as f32, to.y as f32);
        let Some(path) = pb.finish() else {
            return false;
        };
        self.pixmap
            .stroke_path(&path, &solid_paint(color), &self.stroke, Transform::identity(), None);
        true
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    /// True when nothing has been painted since the last clear.
    pub fn is_blank(&self) -> bool {
        self.pixmap.pixels().iter().all(|p| p.alpha() == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;
    use proptest::prelude::*;

    fn layer(w: f64, h: f64, dpr: f64) -> Layer {
        Layer::new(CanvasHandle::new(Size::new(w, h), dpr)).expect("layer")
    }

    #[test]
    fn backing_store_follows_device_pixel_ratio() {
        let l = layer(400.0, 300.0, 2.0);
        assert_eq!((l.width(), l.height()), (800, 600));
    }

    #[test]
    fn zero_sized_canvas_has_no_context() {
        let err = Layer::new(CanvasHandle::new(Size::new(0.0, 10.0), 1.0)).err();
        assert!(matches!(err, Some(Error::ContextUnavailable { width: 0, height: 10 })));
    }

    #[test]
    fn position_maps_through_css_scaling() {
        // 200x100 CSS canvas at dpr 2, but displayed stretched to 400x200.
        let handle = CanvasHandle::new(Size::new(200.0, 100.0), 2.0)
            .with_bounding_rect(Rect::new(0.0, 0.0, 400.0, 200.0));
        let l = Layer::new(handle).expect("layer");
        assert_eq!(l.get_position(Point::new(200.0, 100.0)), Point::new(200.0, 100.0));
        assert_eq!(l.get_position(Point::new(400.0, 50.0)), Point::new(400.0, 50.0));
    }

    #[test]
    fn stroke_paints_and_clear_wipes() {
        let mut l = layer(60.0, 60.0, 1.0);
        l.set_line_style(20.0, LineCap::Round);
        assert!(l.stroke_segment(Point::new(10.0, 30.0), Point::new(50.0, 30.0), 0x00_00_00_00));
        let px = l.pixmap().pixel(30, 30).expect("in bounds");
        assert_eq!(px.alpha(), 255);
        l.clear();
        assert!(l.is_blank());
    }

    #[test]
    fn zero_length_segment_is_a_no_op() {
        let mut l = layer(60.0, 60.0, 1.0);
        l.set_line_style(20.0, LineCap::Round);
        let p = Point::new(30.0, 30.0);
        assert!(!l.stroke_segment(p, p, 0x00_FF_00_00));
        assert!(l.is_blank());
    }

    proptest! {
        #[test]
        fn client_mapping_round_trips(
            x in 0.0f64..2000.0,
            y in 0.0f64..2000.0,
            css_w in 1.0f64..600.0,
            css_h in 1.0f64..600.0,
            dpr in prop::sample::select(vec![1.0f64, 1.25, 1.5, 2.0, 3.0]),
            stretch in 0.5f64..2.0,
        ) {
            let handle = CanvasHandle::new(Size::new(css_w, css_h), dpr)
                .with_bounding_rect(Rect::new(0.0, 0.0, css_w * stretch, css_h * stretch));
            let l = Layer::new(handle).expect("layer");
            let back = l.to_client(l.get_position(Point::new(x, y)));
            prop_assert!((back.x - x).abs() < 1e-6);
            prop_assert!((back.y - y).abs() < 1e-6);
        }
    }
}
