//! Sandpaper letters: trace a large letter pair with mouse or finger.
//! Ink turns red as soon as the stroke leaves the letter; staying on it
//! gives a short haptic pulse.

pub mod draw;
pub mod error;
pub mod font5x7;
pub mod glyphs;
pub mod haptics;
pub mod layout;
pub mod letters;
pub mod logging;
pub mod mask;
pub mod refresh;
pub mod session;
pub mod settings;
pub mod state;
pub mod surface;
pub mod types;

pub use error::Error;
pub use session::Session;
pub use settings::Settings;
pub use state::{Proxy, SessionOptions, State};
pub use types::{Canvases, InputEvent};
