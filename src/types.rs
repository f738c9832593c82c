// Core types shared by the layers, the state machine and the host window.

use kurbo::{Point, Rect, Size};

/// Screen buffer handed to minifb.
#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,     // how wide the frame is on screen (pixels)
    pub height: usize,    // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>, // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }
}

/// What the host knows about one drawable canvas: its CSS-space size,
/// the device pixel ratio and where it sits in client space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasHandle {
    pub client_size: Size,
    pub device_pixel_ratio: f64,
    pub bounding_rect: Rect,
}

impl CanvasHandle {
    /// A canvas anchored at the client origin.
    pub fn new(client_size: Size, device_pixel_ratio: f64) -> Self {
        Self {
            client_size,
            device_pixel_ratio,
            bounding_rect: Rect::from_origin_size(Point::ORIGIN, client_size),
        }
    }

    pub fn with_bounding_rect(mut self, bounding_rect: Rect) -> Self {
        self.bounding_rect = bounding_rect;
        self
    }

    /// Backing store size in canvas pixels. Fractional pixels are dropped,
    /// the same way assigning a float to `canvas.width` truncates.
    pub fn backing_size(&self) -> (u32, u32) {
        let w = (self.client_size.width * self.device_pixel_ratio).trunc();
        let h = (self.client_size.height * self.device_pixel_ratio).trunc();
        (w.max(0.0) as u32, h.max(0.0) as u32)
    }
}

/// The three stacked canvases: guide at the bottom, UI on top.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Canvases {
    pub guide: CanvasHandle,
    pub drawing: CanvasHandle,
    pub ui: CanvasHandle,
}

impl Canvases {
    /// All three layers stacked exactly on top of each other.
    pub fn stacked(handle: CanvasHandle) -> Self {
        Self { guide: handle, drawing: handle, ui: handle }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Auxiliary,
    Secondary,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouseInput {
    pub client: Point,
    pub button: MouseButton,
}

impl MouseInput {
    pub fn primary(x: f64, y: f64) -> Self {
        Self { client: Point::new(x, y), button: MouseButton::Primary }
    }
}

pub type TouchId = i64;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchPoint {
    pub id: TouchId,
    pub client: Point,
}

impl TouchPoint {
    pub fn new(id: TouchId, x: f64, y: f64) -> Self {
        Self { id, client: Point::new(x, y) }
    }
}

/// A touch event: every touch still on the surface plus the ones that changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TouchInput {
    pub touches: Vec<TouchPoint>,
    pub changed_touches: Vec<TouchPoint>,
}

impl TouchInput {
    pub fn find(list: &[TouchPoint], id: TouchId) -> Option<TouchPoint> {
        list.iter().copied().find(|t| t.id == id)
    }
}

/// Everything the host can feed into a session.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    Resize(Canvases),
    MouseDown(MouseInput),
    MouseMove(MouseInput),
    MouseUp(MouseInput),
    TouchStart(TouchInput),
    TouchMove(TouchInput),
    TouchEnd(TouchInput),
    TouchCancel(TouchInput),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Resize,
    MouseDown,
    MouseMove,
    MouseUp,
    TouchStart,
    TouchMove,
    TouchEnd,
    TouchCancel,
}

impl EventKind {
    /// Listener table for hosts that register per-kind handlers: touch
    /// start/move must be non-passive so scrolling and pinch zoom can be
    /// suppressed while tracing. The session logs it with every input.
    pub fn passive(self) -> bool {
        !matches!(self, EventKind::TouchStart | EventKind::TouchMove)
    }
}

impl InputEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            InputEvent::Resize(_) => EventKind::Resize,
            InputEvent::MouseDown(_) => EventKind::MouseDown,
            InputEvent::MouseMove(_) => EventKind::MouseMove,
            InputEvent::MouseUp(_) => EventKind::MouseUp,
            InputEvent::TouchStart(_) => EventKind::TouchStart,
            InputEvent::TouchMove(_) => EventKind::TouchMove,
            InputEvent::TouchEnd(_) => EventKind::TouchEnd,
            InputEvent::TouchCancel(_) => EventKind::TouchCancel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backing_size_scales_and_truncates() {
        let handle = CanvasHandle::new(Size::new(100.5, 40.0), 2.0);
        assert_eq!(handle.backing_size(), (201, 80));
        let handle = CanvasHandle::new(Size::new(33.0, 10.0), 1.5);
        assert_eq!(handle.backing_size(), (49, 15));
    }

    #[test]
    fn only_touch_start_and_move_are_non_passive() {
        assert!(!EventKind::TouchStart.passive());
        assert!(!EventKind::TouchMove.passive());
        assert!(EventKind::TouchEnd.passive());
        assert!(EventKind::MouseDown.passive());
    }
}
