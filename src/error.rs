// One error type for the whole crate.
// Every variant states *where* things went wrong.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Creating the window failed
    #[error("Window init error: {0}")]
    WindowInit(String),

    /// Pushing a frame to the window failed
    #[error("Window update error: {0}")]
    WindowUpdate(String),

    /// A layer or mask could not get a raster to draw into (zero or huge size).
    /// Treated as a broken environment, not something to retry.
    #[error("Could not get 2D context for a {width}x{height} surface")]
    ContextUnavailable { width: u32, height: u32 },

    /// settings.json exists but is not valid
    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
