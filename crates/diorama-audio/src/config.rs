/// Audio volume configuration. Built from the `audio` section of the
/// settings file.
#[derive(Debug, Clone)]
pub struct AudioConfig {
    /// Master volume multiplier (0.0–1.0).
    pub master_volume: f64,
    /// Volume of global sounds (0.0–1.0).
    pub music_volume: f64,
    /// Volume of positional sounds (0.0–1.0).
    pub sfx_volume: f64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            music_volume: 0.8,
            sfx_volume: 1.0,
        }
    }
}

impl AudioConfig {
    /// Effective music volume (master * music).
    pub fn effective_music_volume(&self) -> f64 {
        self.master_volume * self.music_volume
    }

    /// Effective SFX volume (master * sfx).
    pub fn effective_sfx_volume(&self) -> f64 {
        self.master_volume * self.sfx_volume
    }
}
