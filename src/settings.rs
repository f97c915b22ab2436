//! Game settings and preferences
//!
//! Loaded from an optional `settings.json` next to the binary; defaults
//! otherwise. Nothing is written back - the game keeps no state across runs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Window size (logical pixels)
    pub window_width: u32,
    pub window_height: u32,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,

    // === Visuals ===
    /// Particle bursts on collisions
    pub particles: bool,
    /// Show the FPS counter in the window title
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_width: 800,
            window_height: 600,
            master_volume: 0.8,
            music_volume: 0.7,
            particles: true,
            show_fps: false,
        }
    }
}

impl Settings {
    const FILE_NAME: &'static str = "settings.json";

    /// Load settings from the local file if present, defaults otherwise
    pub fn load() -> Self {
        match std::fs::read_to_string(Self::FILE_NAME) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("loaded {}", Self::FILE_NAME);
                    settings
                }
                Err(e) => {
                    log::warn!("ignoring malformed {}: {}", Self::FILE_NAME, e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Effective music volume
    pub fn effective_music_volume(&self) -> f32 {
        (self.master_volume * self.music_volume).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"music_volume": 0.25}"#).expect("partial json parses");
        assert_eq!(settings.music_volume, 0.25);
        assert_eq!(settings.window_width, Settings::default().window_width);
        assert!(settings.particles);
    }

    #[test]
    fn test_effective_volume_clamped() {
        let mut settings = Settings::default();
        settings.master_volume = 3.0;
        settings.music_volume = 1.0;
        assert_eq!(settings.effective_music_volume(), 1.0);
    }
}
