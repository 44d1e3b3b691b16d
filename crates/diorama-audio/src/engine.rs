use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use diorama_render::SceneGraph;
use kira::manager::backend::DefaultBackend;
use kira::manager::{AudioManager, AudioManagerSettings};
use kira::sound::static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings};
use kira::sound::PlaybackState;
use kira::tween::Tween;
use tracing::{debug, info, warn};

use crate::config::AudioConfig;
use crate::emitter::{resolve_placement, SoundDescriptor, SoundPlacement};
use crate::error::AudioError;
use crate::spatial::{compute_spatial, Listener};

const FADE_IN: Duration = Duration::from_millis(500);
const SPATIAL_TWEEN: Duration = Duration::from_millis(50);

struct Emitter {
    identifier: String,
    placement: SoundPlacement,
    volume: f64,
    handle: StaticSoundHandle,
}

/// Plays the scene's sounds. Wraps kira's AudioManager.
pub struct AudioEngine {
    manager: AudioManager<DefaultBackend>,
    config: AudioConfig,
    listener: Listener,
    cache: HashMap<PathBuf, StaticSoundData>,
    emitters: Vec<Emitter>,
}

impl AudioEngine {
    /// Open the default audio device
    pub fn new(config: AudioConfig) -> Result<Self, AudioError> {
        let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
            .map_err(|e| AudioError::InitFailed(e.to_string()))?;

        info!("Audio engine initialized");

        Ok(Self {
            manager,
            config,
            listener: Listener::default(),
            cache: HashMap::new(),
            emitters: Vec::new(),
        })
    }

    /// Decode and start every sound of the scene. Sounds that cannot be
    /// placed, decoded, or played are logged and skipped. Returns the
    /// number of sounds started.
    pub async fn setup(&mut self, base_path: &Path, sounds: &[SoundDescriptor], scene: &SceneGraph) -> usize {
        let mut started = 0;
        for sound in sounds {
            let placement = match resolve_placement(sound, scene) {
                Ok(placement) => placement,
                Err(e) => {
                    warn!("Skipping sound: {}", e);
                    continue;
                }
            };
            match self.start(base_path, sound, placement).await {
                Ok(()) => started += 1,
                Err(e) => warn!("Skipping sound '{}': {}", sound.identifier, e),
            }
        }
        info!("Started {} of {} sounds", started, sounds.len());
        started
    }

    async fn start(
        &mut self,
        base_path: &Path,
        sound: &SoundDescriptor,
        placement: SoundPlacement,
    ) -> Result<(), AudioError> {
        let data = self.load(&base_path.join(&sound.source)).await?;

        let mut settings = StaticSoundSettings::new().volume(0.0);
        if sound.looping {
            settings = settings.loop_region(..);
        }
        let (volume, panning) = self.mix(&placement, sound.volume);
        settings = settings.panning(panning);

        let mut handle = self
            .manager
            .play(data.with_settings(settings))
            .map_err(|e| AudioError::PlaybackFailed(e.to_string()))?;
        handle.set_volume(
            volume,
            Tween {
                duration: FADE_IN,
                ..Default::default()
            },
        );

        debug!("Playing '{}' ({:?})", sound.identifier, placement);
        self.emitters.push(Emitter {
            identifier: sound.identifier.clone(),
            placement,
            volume: sound.volume,
            handle,
        });
        Ok(())
    }

    /// Decode off the event loop; decoded files are cached by path
    async fn load(&mut self, path: &Path) -> Result<StaticSoundData, AudioError> {
        if let Some(data) = self.cache.get(path) {
            return Ok(data.clone());
        }

        let owned = path.to_path_buf();
        let data = tokio::task::spawn_blocking(move || StaticSoundData::from_file(owned))
            .await
            .map_err(|e| AudioError::LoadFailed(path.to_path_buf(), e.to_string()))?
            .map_err(|e| AudioError::LoadFailed(path.to_path_buf(), e.to_string()))?;

        self.cache.insert(path.to_path_buf(), data.clone());
        Ok(data)
    }

    /// Volume and kira panning for a placement relative to the listener
    fn mix(&self, placement: &SoundPlacement, volume: f64) -> (f64, f64) {
        match placement {
            SoundPlacement::Global => (self.config.effective_music_volume() * volume, 0.5),
            SoundPlacement::Positional { position, .. } => {
                let spatial = compute_spatial(&self.listener, *position);
                (
                    self.config.effective_sfx_volume() * volume * spatial.volume,
                    spatial.kira_panning(),
                )
            }
        }
    }

    /// Move the listener and re-mix positional emitters
    pub fn set_listener(&mut self, listener: Listener) {
        if listener == self.listener {
            return;
        }
        self.listener = listener;

        let tween = Tween {
            duration: SPATIAL_TWEEN,
            ..Default::default()
        };
        for index in 0..self.emitters.len() {
            let emitter = &self.emitters[index];
            if emitter.placement == SoundPlacement::Global {
                continue;
            }
            let (volume, panning) = self.mix(&emitter.placement, emitter.volume);
            let handle = &mut self.emitters[index].handle;
            handle.set_volume(volume, tween);
            handle.set_panning(panning, tween);
        }
    }

    /// Apply new volume settings at runtime.
    pub fn update_volumes(&mut self, config: AudioConfig) {
        self.config = config;
        for index in 0..self.emitters.len() {
            let emitter = &self.emitters[index];
            let (volume, _) = self.mix(&emitter.placement, emitter.volume);
            self.emitters[index].handle.set_volume(volume, Tween::default());
        }
    }

    /// Drop emitters whose sounds have finished.
    pub fn update(&mut self) {
        self.emitters.retain(|e| {
            let alive = e.handle.state() != PlaybackState::Stopped;
            if !alive {
                debug!("Sound '{}' finished", e.identifier);
            }
            alive
        });
    }

    pub fn playing(&self) -> usize {
        self.emitters.len()
    }

    /// Fade every sound out.
    pub fn stop_all(&mut self, fade_out: Duration) {
        for emitter in &mut self.emitters {
            emitter.handle.stop(Tween {
                duration: fade_out,
                ..Default::default()
            });
        }
    }

    pub fn config(&self) -> &AudioConfig {
        &self.config
    }
}
