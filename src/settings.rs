use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::glyphs::GlyphSource;
use crate::haptics::{HapticFeedback, TerminalBell, Vibrate};
use crate::state::SessionOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontChoice {
    /// Bold sans-serif from the system, built-in letters if none is found.
    #[default]
    System,
    /// Always the built-in 5x7 letters.
    Builtin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HapticChoice {
    #[default]
    Off,
    /// Ring the terminal bell in place of a vibration motor.
    Bell,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window_width: usize,
    pub window_height: usize,
    /// minifb reports physical pixels; client coordinates are those divided by this.
    pub device_pixel_ratio: f64,
    pub target_fps: usize,
    pub font: FontChoice,
    pub stroke_width: f32,
    pub vibration_ms: u64,
    pub haptics: HapticChoice,
    pub new_letter_after_stroke: bool,
    /// Fixed RNG seed for a reproducible letter sequence.
    pub seed: Option<u64>,
    /// When enabled the logger starts at debug level and honours `RUST_LOG`.
    pub debug_logging: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_width: 960,
            window_height: 600,
            device_pixel_ratio: 1.0,
            target_fps: 60,
            font: FontChoice::default(),
            stroke_width: 20.0,
            vibration_ms: 300,
            haptics: HapticChoice::default(),
            new_letter_after_stroke: false,
            seed: None,
            debug_logging: false,
        }
    }
}

impl Settings {
    /// Missing or empty file → defaults. A file that exists but does not parse is an error.
    pub fn load(path: &str) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            stroke_width: self.stroke_width,
            new_letter_after_stroke: self.new_letter_after_stroke,
        }
    }

    pub fn glyph_source(&self) -> GlyphSource {
        match self.font {
            FontChoice::System => GlyphSource::system(),
            FontChoice::Builtin => GlyphSource::Bitmap,
        }
    }

    pub fn haptics(&self) -> HapticFeedback {
        let device: Option<Box<dyn Vibrate>> = match self.haptics {
            HapticChoice::Off => None,
            HapticChoice::Bell => Some(Box::new(TerminalBell)),
        };
        HapticFeedback::probe(device, Duration::from_millis(self.vibration_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let s: Settings = serde_json::from_str(r#"{ "font": "builtin", "seed": 9 }"#).expect("parse");
        assert_eq!(s.font, FontChoice::Builtin);
        assert_eq!(s.seed, Some(9));
        assert_eq!(s.stroke_width, 20.0);
        assert_eq!(s.vibration_ms, 300);
        assert_eq!(s.haptics, HapticChoice::Off);
    }

    #[test]
    fn missing_file_is_default() {
        let s = Settings::load("/definitely/not/here/settings.json").expect("defaults");
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(serde_json::from_str::<Settings>("{ nope").is_err());
    }

    #[test]
    fn save_then_load_keeps_values() {
        let path = std::env::temp_dir().join(format!("sandpaper-settings-{}.json", std::process::id()));
        let path = path.to_str().expect("utf8 path").to_owned();
        let s = Settings { haptics: HapticChoice::Bell, new_letter_after_stroke: true, ..Settings::default() };
        s.save(&path).expect("save");
        assert_eq!(Settings::load(&path).expect("load"), s);
        let _ = std::fs::remove_file(&path);
    }
}
