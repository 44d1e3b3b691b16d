//! Runtime settings with persistence
//!
//! Settings are saved to `~/.config/diorama/settings.toml`

use std::fs;
use std::path::{Path, PathBuf};

use diorama_audio::AudioConfig;
use diorama_core::TimeConfig;
use diorama_game::ControlsConfig;
use diorama_render::CameraConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// All runtime settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DioramaSettings {
    pub video: VideoSettings,
    pub controls: ControlsConfig,
    pub render_loop: RenderLoopSettings,
    pub audio: AudioSettings,
    pub assets: AssetSettings,
}

impl DioramaSettings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("diorama"))
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save settings to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(path) = Self::settings_path() else {
            anyhow::bail!("Could not determine config directory");
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}

/// Viewport and projection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    /// Viewport width
    pub width: u32,
    /// Viewport height
    pub height: u32,
    /// Vertical field of view in degrees
    pub fov: f32,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fov: 75.0,
        }
    }
}

impl VideoSettings {
    pub fn camera_config(&self) -> CameraConfig {
        CameraConfig {
            fov_degrees: self.fov,
            ..CameraConfig::default()
        }
    }
}

/// Render loop pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderLoopSettings {
    pub target_fps: u32,
    /// Longest elapsed time a single tick reports, in seconds
    pub max_delta_time: f32,
    /// Stop after this many frames (unlimited when absent)
    pub max_frames: Option<u64>,
}

impl Default for RenderLoopSettings {
    fn default() -> Self {
        Self {
            target_fps: 60,
            max_delta_time: 0.25,
            max_frames: None,
        }
    }
}

impl RenderLoopSettings {
    pub fn time_config(&self) -> TimeConfig {
        TimeConfig {
            max_delta_time: self.max_delta_time,
            ..TimeConfig::default()
        }
    }
}

/// Audio settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Master volume (0.0 to 1.0)
    pub master: f32,
    /// Global sound volume (0.0 to 1.0)
    pub music: f32,
    /// Positional sound volume (0.0 to 1.0)
    pub sfx: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master: 1.0,
            music: 0.8,
            sfx: 1.0,
        }
    }
}

impl AudioSettings {
    pub fn to_config(&self) -> AudioConfig {
        AudioConfig {
            master_volume: self.master.clamp(0.0, 1.0) as f64,
            music_volume: self.music.clamp(0.0, 1.0) as f64,
            sfx_volume: self.sfx.clamp(0.0, 1.0) as f64,
        }
    }
}

/// Where asset sources are resolved from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetSettings {
    /// Base directory for relative asset paths. When absent, paths resolve
    /// against the manifest's directory.
    pub base_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_defaults() {
        let settings: DioramaSettings = toml::from_str(
            r#"
            [video]
            width = 800

            [render_loop]
            max_frames = 120
            "#,
        )
        .unwrap();

        assert_eq!(settings.video.width, 800);
        assert_eq!(settings.video.height, 720);
        assert_eq!(settings.render_loop.max_frames, Some(120));
        assert_eq!(settings.render_loop.target_fps, 60);
        assert_eq!(settings.controls.pitch_max, 89.0);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join(format!("diorama-settings-{}", std::process::id()));
        let path = dir.join("settings.toml");

        let mut settings = DioramaSettings::default();
        settings.controls.smoothing = 1.0;
        settings.audio.master = 0.5;
        settings.save_to(&path).unwrap();

        let loaded = DioramaSettings::load_from(&path);
        assert_eq!(loaded.controls.smoothing, 1.0);
        assert_eq!(loaded.audio.to_config().master_volume, 0.5);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn unparsable_file_falls_back_to_defaults() {
        let dir = std::env::temp_dir().join(format!("diorama-bad-settings-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");
        fs::write(&path, "video = [[[").unwrap();

        let loaded = DioramaSettings::load_from(&path);
        assert_eq!(loaded.video.width, 1280);

        let _ = fs::remove_dir_all(&dir);
    }
}
