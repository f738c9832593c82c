// The tracing session's states and what each one does with input and ticks.
// Visual cycle: grey letter (Ready) → black/red ink while dragging (stroke)
// → ink wiped on the next frame (Clearing) → grey letter again.

use std::time::Instant;

use kurbo::Point;
use rand::rngs::StdRng;
use tiny_skia::LineCap;
use tracing::{debug, info};

use crate::error::Error;
use crate::glyphs::GlyphSource;
use crate::haptics::HapticFeedback;
use crate::layout::GlyphLayout;
use crate::letters::{self, Letter};
use crate::mask::OffscreenMask;
use crate::refresh::RefreshButton;
use crate::surface::Layer;
use crate::types::{Canvases, MouseButton, MouseInput, TouchId, TouchInput};

pub const GUIDE_COLOR: u32 = 0x00_AA_AA_AA; // faint letter to trace over
pub const PRIMARY_COLOR: u32 = 0x00_00_00_00; // ink while on the letter
pub const WARNING_COLOR: u32 = 0x00_FF_00_00; // ink once the stroke strays

#[derive(Clone, Debug, PartialEq)]
pub struct SessionOptions {
    pub stroke_width: f32,
    /// Pick a fresh letter after every stroke instead of keeping the current one.
    pub new_letter_after_stroke: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self { stroke_width: 20.0, new_letter_after_stroke: false }
    }
}

/// What every state can reach: shared services plus the frame request flag
/// that stands in for "call me again on the next display refresh".
pub struct Proxy {
    glyphs: GlyphSource,
    haptics: HapticFeedback,
    rng: StdRng,
    options: SessionOptions,
    frame_requested: bool,
    rebuilds: u64, // fresh layer sets built so far
}

impl Proxy {
    pub fn new(glyphs: GlyphSource, haptics: HapticFeedback, rng: StdRng, options: SessionOptions) -> Self {
        Self { glyphs, haptics, rng, options, frame_requested: false, rebuilds: 0 }
    }

    /// Ask for one more tick. Repeated requests before the tick collapse into one.
    pub fn request_frame(&mut self) {
        self.frame_requested = true;
    }

    pub fn frame_requested(&self) -> bool {
        self.frame_requested
    }

    /// How many times layers were built from canvas handles
    /// (initialise, resize and refresh each count once).
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub(crate) fn take_frame_request(&mut self) -> bool {
        std::mem::take(&mut self.frame_requested)
    }

    pub(crate) fn haptics_mut(&mut self) -> &mut HapticFeedback {
        &mut self.haptics
    }

    fn pick_letter(&mut self) -> Letter {
        letters::pick(&mut self.rng)
    }
}

/// Guide, drawing and UI layers, bottom to top.
pub struct Layers {
    pub guide: Layer,
    pub drawing: Layer,
    pub ui: Layer,
}

impl Layers {
    pub fn new(canvases: &Canvases) -> Result<Self, Error> {
        Ok(Self {
            guide: Layer::new(canvases.guide)?,
            drawing: Layer::new(canvases.drawing)?,
            ui: Layer::new(canvases.ui)?,
        })
    }

    /// The handles these layers were built from.
    pub fn canvases(&self) -> Canvases {
        Canvases {
            guide: *self.guide.handle(),
            drawing: *self.drawing.handle(),
            ui: *self.ui.handle(),
        }
    }
}

pub enum State {
    Uninitialised,
    Ready(ReadyState),
    MouseStroke(DrawingState),
    TouchStroke(TouchStroke),
    Clearing(ClearingState),
}

impl State {
    pub fn name(&self) -> &'static str {
        match self {
            State::Uninitialised => "Uninitialised",
            State::Ready(_) => "Ready",
            State::MouseStroke(_) => "MouseStroke",
            State::TouchStroke(_) => "TouchStroke",
            State::Clearing(_) => "Clearing",
        }
    }

    pub fn layers(&self) -> Option<&Layers> {
        match self {
            State::Uninitialised => None,
            State::Ready(s) => Some(&s.layers),
            State::MouseStroke(s) => Some(&s.layers),
            State::TouchStroke(s) => Some(&s.drawing.layers),
            State::Clearing(s) => Some(&s.layers),
        }
    }

    pub fn letter(&self) -> Option<Letter> {
        match self {
            State::Uninitialised => None,
            State::Ready(s) => Some(s.letter),
            State::MouseStroke(s) => Some(s.letter),
            State::TouchStroke(s) => Some(s.drawing.letter),
            State::Clearing(s) => Some(s.letter),
        }
    }

    /// Uninitialised → Ready: build the three layers and pick the first letter.
    pub(crate) fn initialise(proxy: &mut Proxy, canvases: &Canvases) -> Result<State, Error> {
        let letter = proxy.pick_letter();
        rebuild(canvases, letter, proxy)
    }
}

/// Fresh layers for `canvases`, then straight into Ready.
fn rebuild(canvases: &Canvases, letter: Letter, proxy: &mut Proxy) -> Result<State, Error> {
    let layers = Layers::new(canvases)?;
    proxy.rebuilds += 1;
    Ok(State::Ready(ReadyState::enter(layers, letter, proxy)?))
}

/* ------------------------------ Ready ------------------------------ */

pub struct ReadyState {
    layers: Layers,
    mask: OffscreenMask,
    letter: Letter,
    layout: GlyphLayout,
    refresh: RefreshButton,
}

impl ReadyState {
    /// Draw the guide letter, stamp the mask the same way, and put the
    /// refresh button on the UI layer.
    pub(crate) fn enter(mut layers: Layers, letter: Letter, proxy: &mut Proxy) -> Result<Self, Error> {
        let layout = GlyphLayout::for_surface(layers.guide.size(), letter);

        layers.guide.clear();
        proxy.glyphs.fill_layout(layers.guide.pixmap_mut(), &layout, GUIDE_COLOR);

        let mut mask = OffscreenMask::for_layer(&layers.ui)?;
        mask.stamp(&proxy.glyphs, &layout);

        layers.ui.clear();
        let refresh = RefreshButton::anchored(layers.ui.size());
        refresh.render(&mut layers.ui);

        info!(
            letter = %letter.pair_text(),
            orientation = ?layout.orientation,
            font_size = layout.font_size,
            width = layers.guide.width(),
            height = layers.guide.height(),
            "ready"
        );
        Ok(Self { layers, mask, letter, layout, refresh })
    }

    pub fn layers(&self) -> &Layers {
        &self.layers
    }

    pub fn mask(&self) -> &OffscreenMask {
        &self.mask
    }

    pub fn letter(&self) -> Letter {
        self.letter
    }

    pub fn layout(&self) -> &GlyphLayout {
        &self.layout
    }

    pub fn refresh_button(&self) -> &RefreshButton {
        &self.refresh
    }

    /// A button press either hits the refresh control (new letter, nothing
    /// else) or starts a mouse stroke.
    pub(crate) fn on_mouse_down(self, proxy: &mut Proxy, input: MouseInput) -> Result<State, Error> {
        if input.button != MouseButton::Primary {
            debug!(button = ?input.button, "ignoring non-primary button");
            return Ok(State::Ready(self));
        }
        if self.refresh.test_hit(self.layers.ui.get_position(input.client)) {
            return self.refresh_letter(proxy);
        }
        let position = self.layers.drawing.get_position(input.client);
        Ok(State::MouseStroke(DrawingState::begin(self, position, proxy)))
    }

    /// Same as a mouse press, but only for a single-finger touch.
    pub(crate) fn on_touch_start(self, proxy: &mut Proxy, input: &TouchInput) -> Result<State, Error> {
        let [touch] = input.touches.as_slice() else {
            debug!(touches = input.touches.len(), "ignoring multi-touch start");
            return Ok(State::Ready(self));
        };
        if self.refresh.test_hit(self.layers.ui.get_position(touch.client)) {
            return self.refresh_letter(proxy);
        }
        let position = self.layers.drawing.get_position(touch.client);
        let drawing = DrawingState::begin(self, position, proxy);
        Ok(State::TouchStroke(TouchStroke { drawing, identifier: touch.id }))
    }

    pub(crate) fn resize(self, proxy: &mut Proxy, canvases: &Canvases) -> Result<State, Error> {
        rebuild(canvases, self.letter, proxy)
    }

    fn refresh_letter(self, proxy: &mut Proxy) -> Result<State, Error> {
        let canvases = self.layers.canvases();
        let letter = proxy.pick_letter();
        info!(previous = %self.letter.pair_text(), next = %letter.pair_text(), "refresh");
        rebuild(&canvases, letter, proxy)
    }
}

/* ------------------------------ Drawing ------------------------------ */

/// The two most recent pointer samples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeSession {
    pub last_position: Point,
    pub position: Point,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StrokeStats {
    pub segments: u32,      // non-empty segments actually painted
    pub on_glyph_ticks: u32,
    pub off_glyph_ticks: u32,
}

/// Shared behavior of MouseStroke and TouchStroke.
pub struct DrawingState {
    layers: Layers,
    mask: OffscreenMask,
    letter: Letter,
    stroke: StrokeSession,
    stats: StrokeStats,
}

impl DrawingState {
    fn begin(ready: ReadyState, position: Point, proxy: &mut Proxy) -> Self {
        let ReadyState { mut layers, mask, letter, .. } = ready;
        layers.drawing.set_line_style(proxy.options.stroke_width, LineCap::Round);
        proxy.request_frame();
        Self {
            layers,
            mask,
            letter,
            stroke: StrokeSession { last_position: position, position },
            stats: StrokeStats::default(),
        }
    }

    pub fn layers(&self) -> &Layers {
        &self.layers
    }

    pub fn mask(&self) -> &OffscreenMask {
        &self.mask
    }

    pub fn letter(&self) -> Letter {
        self.letter
    }

    pub fn stroke(&self) -> StrokeSession {
        self.stroke
    }

    pub fn stats(&self) -> StrokeStats {
        self.stats
    }

    /// Pointer moved: remember where, draw on the next tick.
    pub(crate) fn move_to_client(&mut self, client: Point) {
        self.stroke.position = self.layers.drawing.get_position(client);
    }

    /// One animation frame: judge the segment against the mask, paint it,
    /// roll the samples forward. Keeps itself scheduled.
    pub(crate) fn tick(&mut self, proxy: &mut Proxy, now: Instant) {
        proxy.request_frame();

        let StrokeSession { last_position, position } = self.stroke;
        // Both samples, so a fast jump across a gap still counts as a miss.
        let previous_miss = !self.mask.is_hit(last_position);
        let miss = !self.mask.is_hit(position);
        let color = if previous_miss || miss {
            self.stats.off_glyph_ticks += 1;
            WARNING_COLOR
        } else {
            self.stats.on_glyph_ticks += 1;
            proxy.haptics.trigger(now);
            PRIMARY_COLOR
        };

        if self.layers.drawing.stroke_segment(last_position, position, color) {
            self.stats.segments += 1;
        }
        self.stroke.last_position = position;
    }

    /// Stroke over: hand the layers to Clearing, which wipes on the next tick.
    pub(crate) fn finish(self, proxy: &mut Proxy) -> State {
        debug!(
            segments = self.stats.segments,
            on = self.stats.on_glyph_ticks,
            off = self.stats.off_glyph_ticks,
            "stroke finished"
        );
        proxy.request_frame();
        State::Clearing(ClearingState { layers: self.layers, letter: self.letter })
    }

    /// Canvas size changed mid-stroke: drop the stroke, keep the letter.
    pub(crate) fn abandon(self, proxy: &mut Proxy, canvases: &Canvases) -> Result<State, Error> {
        info!(segments = self.stats.segments, "resize during stroke, stroke abandoned");
        rebuild(canvases, self.letter, proxy)
    }
}

/// A drawing pinned to one finger.
pub struct TouchStroke {
    drawing: DrawingState,
    identifier: TouchId,
}

impl TouchStroke {
    pub fn drawing(&self) -> &DrawingState {
        &self.drawing
    }

    pub fn identifier(&self) -> TouchId {
        self.identifier
    }

    pub(crate) fn tick(&mut self, proxy: &mut Proxy, now: Instant) {
        self.drawing.tick(proxy, now);
    }

    /// Follow our finger; other fingers are ignored.
    pub(crate) fn on_move(&mut self, input: &TouchInput) {
        match TouchInput::find(&input.touches, self.identifier) {
            Some(touch) => self.drawing.move_to_client(touch.client),
            None => debug!(id = self.identifier, "touch move without our finger"),
        }
    }

    /// End or cancel: only our finger lifting ends the stroke.
    pub(crate) fn on_release(self, proxy: &mut Proxy, input: &TouchInput) -> State {
        if TouchInput::find(&input.changed_touches, self.identifier).is_none() {
            return State::TouchStroke(self);
        }
        self.drawing.finish(proxy)
    }

    pub(crate) fn abandon(self, proxy: &mut Proxy, canvases: &Canvases) -> Result<State, Error> {
        self.drawing.abandon(proxy, canvases)
    }
}

/* ------------------------------ Clearing ------------------------------ */

pub struct ClearingState {
    layers: Layers,
    letter: Letter,
}

impl ClearingState {
    pub fn layers(&self) -> &Layers {
        &self.layers
    }

    pub fn letter(&self) -> Letter {
        self.letter
    }

    /// Single tick: wipe the ink, then back to Ready on the same layers.
    pub(crate) fn tick(self, proxy: &mut Proxy) -> Result<State, Error> {
        let Self { mut layers, letter } = self;
        layers.drawing.clear();
        let letter = if proxy.options.new_letter_after_stroke { proxy.pick_letter() } else { letter };
        Ok(State::Ready(ReadyState::enter(layers, letter, proxy)?))
    }

    pub(crate) fn resize(self, proxy: &mut Proxy, canvases: &Canvases) -> Result<State, Error> {
        rebuild(canvases, self.letter, proxy)
    }
}
