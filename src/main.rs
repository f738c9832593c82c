// What you SEE now:
// • A big letter pair ("Aa", "Bb", ...) in light grey on white.
// • Hold Left Mouse and trace it: black ink while you stay on the letter, red once you stray.
// • Release: the ink clears and the letter is ready to trace again.
// • Click the ring in the top-right corner for a different letter. ESC quits.
// • Optional first argument: path to a JSON settings file (default: settings.json).

use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use sandpaper_letters::draw::{Drawer, PointerTracker, canvases_for, compose};
use sandpaper_letters::error::Error;
use sandpaper_letters::logging;
use sandpaper_letters::settings::Settings;
use sandpaper_letters::types::{FrameBuffer, InputEvent};
use sandpaper_letters::{Proxy, Session};

fn main() -> Result<(), Error> {
    /* --- Settings + logging ---
       Visual: nothing yet; decides window size, font and haptics. */
    let path = std::env::args().nth(1).unwrap_or_else(|| "settings.json".to_owned());
    let settings = Settings::load(&path)?;
    logging::init(settings.debug_logging);
    info!(path = %path, "settings loaded");

    /* --- Window ---
       Visual: an empty white window opens. */
    let mut drawer = Drawer::new(
        "Sandpaper Letters",
        settings.window_width,
        settings.window_height,
        settings.target_fps,
    )?;
    let dpr = settings.device_pixel_ratio;

    /* --- Session ---
       Visual: the first letter appears in grey with the refresh ring. */
    let rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let proxy = Proxy::new(settings.glyph_source(), settings.haptics(), rng, settings.session_options());
    let mut session = Session::new(proxy);

    let mut size = drawer.size();
    session.initialise(canvases_for(size, dpr))?;

    /* --- Reusable screen buffer ---
       Visual: this is the image you actually see each frame. */
    let mut screen = FrameBuffer::new(size.0, size.1);
    let mut pointer = PointerTracker::default();

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        let now = Instant::now();

        /* 1) Window resized? Layers are rebuilt and any stroke is dropped.
           A minimised window reports 0x0; keep the old layers until it comes back. */
        let current = drawer.size();
        if current != size && current.0 > 0 && current.1 > 0 {
            debug!(width = current.0, height = current.1, "window resized");
            size = current;
            session.handle(InputEvent::Resize(canvases_for(size, dpr)))?;
            screen = FrameBuffer::new(size.0, size.1);
        }

        /* 2) Pointer edges → session input. */
        for event in pointer.events(drawer.mouse_pos(), drawer.left_mouse_down(), dpr) {
            session.handle(event)?;
        }

        /* 3) The display refresh: one stroke segment, or the clear after release. */
        session.animate(now)?;
        session.poll_haptics(now);

        /* 4) Stack guide, ink and UI over white and present. */
        if let Some(layers) = session.layers() {
            compose(&mut screen, layers);
        }
        drawer.present(&screen)?;
    }

    Ok(())
}
