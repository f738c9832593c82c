// Off-screen hit-test mask.
// Visual: never shown. Wherever the glyph was stamped alpha > 0, elsewhere 0,
// and the stroke color is decided by sampling it.

use kurbo::Point;
use tiny_skia::{Color, Pixmap};

use crate::error::Error;
use crate::glyphs::GlyphSource;
use crate::layout::GlyphLayout;
use crate::surface::{Layer, allocate};

/// Any opaque color works; only alpha is ever read back.
const MASK_INK: u32 = 0x00_00_00_00;

pub struct OffscreenMask {
    pixmap: Pixmap,
}

impl OffscreenMask {
    pub fn new(width: u32, height: u32) -> Result<Self, Error> {
        Ok(Self { pixmap: allocate(width, height)? })
    }

    /// A mask with the same pixel size as `layer`.
    pub fn for_layer(layer: &Layer) -> Result<Self, Error> {
        Self::new(layer.width(), layer.height())
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }

    /// Clear, then rasterize the glyph runs exactly where the guide draws them.
    pub fn stamp(&mut self, glyphs: &GlyphSource, layout: &GlyphLayout) {
        self.clear();
        glyphs.fill_layout(&mut self.pixmap, layout, MASK_INK);
    }

    /// Single-pixel alpha sample. Coordinates are floored; anything off the
    /// raster reads as transparent.
    pub fn alpha_at(&self, position: Point) -> u8 {
        if !position.x.is_finite() || !position.y.is_finite() {
            return 0;
        }
        let (x, y) = (position.x.floor(), position.y.floor());
        if x < 0.0 || y < 0.0 {
            return 0;
        }
        self.pixmap
            .pixel(x as u32, y as u32)
            .map_or(0, |p| p.alpha())
    }

    pub fn is_hit(&self, position: Point) -> bool {
        self.alpha_at(position) > 0
    }
}
