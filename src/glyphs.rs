// Turns a GlyphLayout into filled pixels.
// Visual: the big grey guide letter, and the invisible copy in the hit-test mask.

use kurbo::Point;
use tiny_skia::{FillRule, PathBuilder, Pixmap, Rect, Transform};
use tracing::{info, warn};
use ttf_parser::{Face, GlyphId, OutlineBuilder};

use crate::font5x7::{glyph5x7, lit};
use crate::layout::GlyphLayout;
use crate::surface::solid_paint;

/// Families tried in order before giving up on system fonts.
const FAMILIES: [fontdb::Family<'static>; 4] = [
    fontdb::Family::Name("DejaVu Sans"),
    fontdb::Family::Name("Liberation Sans"),
    fontdb::Family::Name("Arial"),
    fontdb::Family::SansSerif,
];

pub enum GlyphSource {
    /// A bold sans-serif face from the system, drawn from its outlines.
    Outline(OutlineFont),
    /// The built-in 5x7 letters, scaled up.
    Bitmap,
}

pub struct OutlineFont {
    data: Vec<u8>,
    index: u32,
}

impl GlyphSource {
    /// Look up a bold sans-serif system face; fall back to the built-in letters.
    pub fn system() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        let query = fontdb::Query {
            families: &FAMILIES,
            weight: fontdb::Weight::BOLD,
            ..Default::default()
        };
        let Some(id) = db.query(&query) else {
            warn!(faces = db.len(), "no sans-serif system font found, using built-in letters");
            return GlyphSource::Bitmap;
        };
        let family = db
            .face(id)
            .and_then(|f| f.families.first().map(|(name, _)| name.clone()))
            .unwrap_or_default();
        match db.with_face_data(id, |data, index| (data.to_vec(), index)) {
            Some((data, index)) if Face::parse(&data, index).is_ok() => {
                info!(%family, "using system font");
                GlyphSource::Outline(OutlineFont { data, index })
            }
            _ => {
                warn!(%family, "system font could not be parsed, using built-in letters");
                GlyphSource::Bitmap
            }
        }
    }

    /// Fill every run of the layout, center-aligned with a "middle" baseline.
    pub fn fill_layout(&self, pixmap: &mut Pixmap, layout: &GlyphLayout, color: u32) {
        for run in &layout.runs {
            self.fill_text(pixmap, &run.text, run.center, layout.font_size, color);
        }
    }

    pub fn fill_text(&self, pixmap: &mut Pixmap, text: &str, center: Point, font_size: f64, color: u32) {
        match self {
            GlyphSource::Outline(font) => font.fill_text(pixmap, text, center, font_size as f32, color),
            GlyphSource::Bitmap => fill_bitmap_text(pixmap, text, center, font_size as f32, color),
        }
    }
}

impl OutlineFont {
    fn fill_text(&self, pixmap: &mut Pixmap, text: &str, center: Point, font_size: f32, color: u32) {
        let Ok(face) = Face::parse(&self.data, self.index) else {
            return;
        };
        let scale = font_size / face.units_per_em() as f32;
        let glyphs: Vec<GlyphId> = text
            .chars()
            .map(|c| face.glyph_index(c).unwrap_or(GlyphId(0)))
            .collect();
        let advance = |g: GlyphId| face.glyph_hor_advance(g).unwrap_or(0) as f32 * scale;
        let width: f32 = glyphs.iter().map(|&g| advance(g)).sum();

        // "middle" baseline: the em box midpoint sits on center.y
        let em_middle = (face.ascender() as f32 + face.descender() as f32) / 2.0 * scale;
        let baseline = center.y as f32 + em_middle;

        let mut sink = PathSink {
            builder: PathBuilder::new(),
            scale,
            origin_x: center.x as f32 - width / 2.0,
            baseline,
        };
        for g in glyphs {
            face.outline_glyph(g, &mut sink);
            sink.origin_x += advance(g);
        }
        if let Some(path) = sink.builder.finish() {
            pixmap.fill_path(&path, &solid_paint(color), FillRule::Winding, Transform::identity(), None);
        }
    }
}

/// Converts font units (y up) into pixels (y down) at a pen position.
struct PathSink {
    builder: PathBuilder,
    scale: f32,
    origin_x: f32,
    baseline: f32,
}

impl PathSink {
    fn x(&self, x: f32) -> f32 {
        self.origin_x + x * self.scale
    }

    fn y(&self, y: f32) -> f32 {
        self.baseline - y * self.scale
    }
}

impl OutlineBuilder for PathSink {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(self.x(x), self.y(y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(self.x(x), self.y(y));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(self.x(x1), self.y(y1), self.x(x), self.y(y));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder
            .cubic_to(self.x(x1), self.y(y1), self.x(x2), self.y(y2), self.x(x), self.y(y));
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

/* ---------- Built-in letters: 5x7 cells, 1 cell of spacing ---------- */

/// Cell edge length for a given font size (7 rows fill 7/8 of the em).
pub fn bitmap_cell(font_size: f32) -> f32 {
    font_size / 8.0
}

/// Top-left corner of the first cell of the first glyph.
pub fn bitmap_origin(text: &str, center: Point, font_size: f32) -> (f32, f32) {
    let cell = bitmap_cell(font_size);
    let n = text.chars().count() as f32;
    let width_cells = (n * 6.0 - 1.0).max(0.0);
    (
        center.x as f32 - width_cells * cell / 2.0,
        center.y as f32 - 3.5 * cell,
    )
}

fn fill_bitmap_text(pixmap: &mut Pixmap, text: &str, center: Point, font_size: f32, color: u32) {
    let cell = bitmap_cell(font_size);
    let (left, top) = bitmap_origin(text, center, font_size);
    let paint = solid_paint(color);
    for (i, ch) in text.chars().enumerate() {
        let Some(rows) = glyph5x7(ch) else {
            continue;
        };
        let x0 = left + i as f32 * 6.0 * cell;
        for row in 0..7 {
            for col in 0..5 {
                if !lit(&rows, col, row) {
                    continue;
                }
                let x = x0 + col as f32 * cell;
                let y = top + row as f32 * cell;
                if let Some(rect) = Rect::from_xywh(x, y, cell, cell) {
                    pixmap.fill_rect(rect, &paint, Transform::identity(), None);
                }
            }
        }
    }
}
