// Window + compositing for the desktop host.
// Visual effects provided here:
// 1) A resizable window showing the guide, ink and UI layers stacked on white.
// 2) Left mouse button edges and cursor motion turned into session input.

use kurbo::{Point, Size};
use minifb::{Key, MouseMode, Window, WindowOptions};
use tiny_skia::Pixmap;

use crate::error::Error;
use crate::state::Layers;
use crate::types::{CanvasHandle, Canvases, FrameBuffer, InputEvent, MouseInput};

pub const BACKGROUND: u32 = 0x00_FF_FF_FF;

pub struct Drawer {
    window: Window, // the on-screen window you see
}

impl Drawer {
    /// Create a resizable window.
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize, target_fps: usize) -> Result<Self, Error> {
        let options = WindowOptions { resize: true, ..WindowOptions::default() };
        let mut window = Window::new(title, width, height, options)
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        // update_with_buffer paces the loop: this is our "next display refresh".
        window.set_target_fps(target_fps);
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// True while ESC is held down (we’ll exit when this is pressed).
    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Current window size in physical pixels.
    pub fn size(&self) -> (usize, usize) {
        self.window.get_size()
    }

    /// Cursor position in window pixels; None while it is outside the window.
    pub fn mouse_pos(&self) -> Option<(f32, f32)> {
        self.window.get_mouse_pos(MouseMode::Discard)
    }

    pub fn left_mouse_down(&self) -> bool {
        self.window.get_mouse_down(minifb::MouseButton::Left)
    }
}

/// Three stacked canvases covering a window of `size` physical pixels.
pub fn canvases_for(size: (usize, usize), device_pixel_ratio: f64) -> Canvases {
    let client = Size::new(
        size.0 as f64 / device_pixel_ratio,
        size.1 as f64 / device_pixel_ratio,
    );
    Canvases::stacked(CanvasHandle::new(client, device_pixel_ratio))
}

/// Turns polled button/cursor state into down/move/up events.
#[derive(Debug, Default)]
pub struct PointerTracker {
    held: bool,      // raw button state last frame
    stroking: bool,  // a MouseDown went out and no MouseUp yet
    last: Option<Point>,
}

impl PointerTracker {
    pub fn events(&mut self, pos: Option<(f32, f32)>, down: bool, device_pixel_ratio: f64) -> Vec<InputEvent> {
        let mut out = Vec::new();
        let client = pos.map(|(x, y)| Point::new(x as f64 / device_pixel_ratio, y as f64 / device_pixel_ratio));

        if let Some(p) = client {
            if down && !self.held {
                out.push(InputEvent::MouseDown(MouseInput::primary(p.x, p.y)));
                self.stroking = true;
            } else if self.last != Some(p) {
                out.push(InputEvent::MouseMove(MouseInput::primary(p.x, p.y)));
            }
        }
        if !down && self.stroking {
            let p = client.or(self.last).unwrap_or(Point::ORIGIN);
            out.push(InputEvent::MouseUp(MouseInput::primary(p.x, p.y)));
            self.stroking = false;
        }

        self.held = down;
        if client.is_some() {
            self.last = client;
        }
        out
    }
}

/// Stack the layers onto a white background.
/// Visual: exactly what the window shows this frame.
pub fn compose(fb: &mut FrameBuffer, layers: &Layers) {
    fb.pixels.fill(BACKGROUND);
    for layer in [&layers.guide, &layers.drawing, &layers.ui] {
        blend_over(fb, layer.pixmap());
    }
}

/// Source-over with premultiplied source pixels.
fn blend_over(fb: &mut FrameBuffer, src: &Pixmap) {
    let sw = src.width() as usize;
    let w = sw.min(fb.width);
    let h = (src.height() as usize).min(fb.height);
    let pixels = src.pixels();

    for y in 0..h {
        for x in 0..w {
            let p = pixels[y * sw + x];
            let a = p.alpha() as u32;
            if a == 0 {
                continue;
            }
            let idx = y * fb.width + x;
            let old = fb.pixels[idx];
            let inv = 255 - a;
            let mix = |s: u8, d: u32| (s as u32 + (d * inv + 127) / 255).min(255);
            let r = mix(p.red(), (old >> 16) & 0xFF);
            let g = mix(p.green(), (old >> 8) & 0xFF);
            let b = mix(p.blue(), old & 0xFF);
            fb.pixels[idx] = (r << 16) | (g << 8) | b;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_move_release_become_events() {
        let mut t = PointerTracker::default();
        assert_eq!(t.events(Some((10.0, 10.0)), false, 1.0).len(), 1); // first sighting is a move
        let down = t.events(Some((10.0, 10.0)), true, 1.0);
        assert_eq!(down, vec![InputEvent::MouseDown(MouseInput::primary(10.0, 10.0))]);
        assert!(t.events(Some((10.0, 10.0)), true, 1.0).is_empty());
        let moved = t.events(Some((30.0, 10.0)), true, 1.0);
        assert_eq!(moved, vec![InputEvent::MouseMove(MouseInput::primary(30.0, 10.0))]);
        let up = t.events(Some((30.0, 10.0)), false, 1.0);
        assert_eq!(up, vec![InputEvent::MouseUp(MouseInput::primary(30.0, 10.0))]);
    }

    #[test]
    fn pointer_events_never_need_a_non_passive_listener() {
        let mut t = PointerTracker::default();
        let mut seen = Vec::new();
        for (pos, down) in [((5.0, 5.0), false), ((5.0, 5.0), true), ((9.0, 5.0), true), ((9.0, 5.0), false)] {
            seen.extend(t.events(Some(pos), down, 1.0));
        }
        assert_eq!(seen.len(), 4);
        assert!(seen.iter().all(|e| e.kind().passive()));
    }

    #[test]
    fn window_pixels_are_divided_by_the_pixel_ratio() {
        let mut t = PointerTracker::default();
        let ev = t.events(Some((40.0, 20.0)), true, 2.0);
        assert_eq!(ev, vec![InputEvent::MouseDown(MouseInput::primary(20.0, 10.0))]);
        let c = canvases_for((800, 600), 2.0);
        assert_eq!(c.ui.backing_size(), (800, 600));
    }

    #[test]
    fn press_outside_the_window_is_not_a_stroke() {
        let mut t = PointerTracker::default();
        assert!(t.events(None, true, 1.0).is_empty());
        // Entering with the button still held is only a move.
        let entered = t.events(Some((5.0, 5.0)), true, 1.0);
        assert_eq!(entered, vec![InputEvent::MouseMove(MouseInput::primary(5.0, 5.0))]);
        // Releasing it ends nothing, since nothing started.
        assert!(t.events(Some((5.0, 5.0)), false, 1.0).is_empty());
    }

    #[test]
    fn opaque_ink_replaces_the_background() {
        let mut layers = Layers::new(&canvases_for((4, 4), 1.0)).expect("layers");
        layers.drawing.pixmap_mut().fill(tiny_skia::Color::from_rgba8(255, 0, 0, 255));
        let mut fb = FrameBuffer::new(4, 4);
        compose(&mut fb, &layers);
        assert!(fb.pixels.iter().all(|&p| p == 0x00_FF_00_00));
    }

    #[test]
    fn empty_layers_show_white() {
        let layers = Layers::new(&canvases_for((3, 2), 1.0)).expect("layers");
        let mut fb = FrameBuffer::new(3, 2);
        compose(&mut fb, &layers);
        assert!(fb.pixels.iter().all(|&p| p == BACKGROUND));
    }
}
