use diorama_render::CameraRig;
use glam::Vec3;

/// The ear of the scene, normally riding on the camera.
#[derive(Debug, Clone, PartialEq)]
pub struct Listener {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
}

impl Default for Listener {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: -Vec3::Z,
            up: Vec3::Y,
        }
    }
}

impl Listener {
    pub fn from_camera(camera: &CameraRig) -> Self {
        Self {
            position: camera.position(),
            forward: camera.forward(),
            up: camera.up(),
        }
    }
}

/// Parameters computed for a sound emitter relative to the listener.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialParams {
    /// Volume attenuation factor (0.0–1.0).
    pub volume: f64,
    /// Stereo panning (-1.0 = full left, 0.0 = center, 1.0 = full right).
    pub panning: f64,
}

impl SpatialParams {
    /// Panning in kira's range (0.0 = left, 0.5 = center, 1.0 = right)
    pub fn kira_panning(&self) -> f64 {
        (self.panning + 1.0) * 0.5
    }
}

/// Distance beyond which attenuation stops growing.
const MAX_DISTANCE: f32 = 100.0;

/// Distance inside which a sound plays at full volume.
const MIN_DISTANCE: f32 = 1.0;

/// Compute spatial audio parameters for an emitter position relative to a listener.
///
/// Uses inverse-distance attenuation with the distance clamped to
/// `[MIN_DISTANCE, MAX_DISTANCE]`. Panning is the projection of the
/// direction to the emitter onto the listener's right vector.
pub fn compute_spatial(listener: &Listener, emitter_pos: Vec3) -> SpatialParams {
    let to_emitter = emitter_pos - listener.position;
    let distance = to_emitter.length();

    if distance < f32::EPSILON {
        return SpatialParams {
            volume: 1.0,
            panning: 0.0,
        };
    }

    let clamped = distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
    let volume = (MIN_DISTANCE / clamped) as f64;

    let right = listener.forward.cross(listener.up).normalize_or_zero();
    let panning = to_emitter.normalize().dot(right) as f64;

    SpatialParams {
        volume: volume.clamp(0.0, 1.0),
        panning: panning.clamp(-1.0, 1.0),
    }
}
