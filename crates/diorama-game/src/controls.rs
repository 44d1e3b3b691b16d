//! Camera controls driven by a pose source

use diorama_render::CameraRig;
use glam::Quat;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::pose::PoseSource;

/// Controls configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Mouse-look sensitivity (radians per pixel)
    pub sensitivity: f32,
    /// Orientation smoothing (0-1, lower = smoother, 1 = snap)
    pub smoothing: f32,
    /// Minimum pitch angle in degrees
    pub pitch_min: f32,
    /// Maximum pitch angle in degrees
    pub pitch_max: f32,
    /// Heading offset applied to device orientation, in degrees
    pub alpha_offset: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            sensitivity: 0.003,
            smoothing: 0.25,
            pitch_min: -89.0,
            pitch_max: 89.0,
            alpha_offset: 0.0,
        }
    }
}

/// Steers the camera orientation from a bound pose source, once per tick
pub struct ControlsBinder {
    pub config: ControlsConfig,
    source: Option<Box<dyn PoseSource>>,
    rest: Quat,
}

impl ControlsBinder {
    pub fn new(config: ControlsConfig) -> Self {
        Self {
            config,
            source: None,
            rest: Quat::IDENTITY,
        }
    }

    /// Attach a pose source. The camera's current orientation becomes the
    /// rest orientation that relative poses (mouse look) start from.
    pub fn bind(&mut self, source: Box<dyn PoseSource>, camera: &CameraRig) {
        self.rest = camera.orientation();
        self.source = Some(source);
        info!("Controls bound to pose source");
    }

    pub fn unbind(&mut self) {
        if self.source.take().is_some() {
            debug!("Controls unbound");
        }
    }

    pub fn is_bound(&self) -> bool {
        self.source.is_some()
    }

    /// Move the camera toward the latest pose. A no-op until the source
    /// has produced a sample.
    pub fn update(&mut self, elapsed: f32, camera: &mut CameraRig) {
        let Some(sample) = self.source.as_ref().and_then(|s| s.latest()) else {
            return;
        };

        let pose = sample.orientation(self.config.alpha_offset.to_radians());
        let target = if sample.is_relative() { self.rest * pose } else { pose };

        let smoothing = self.config.smoothing.clamp(0.0, 1.0);
        let t = if smoothing >= 1.0 {
            1.0
        } else {
            1.0 - (1.0 - smoothing).powf(elapsed.max(0.0) * 60.0)
        };
        camera.set_orientation(camera.orientation().slerp(target, t));
    }
}

impl Default for ControlsBinder {
    fn default() -> Self {
        Self::new(ControlsConfig::default())
    }
}
