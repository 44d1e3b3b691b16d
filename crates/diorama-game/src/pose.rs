//! Pose sources for the camera controls

use std::cell::Cell;
use std::f32::consts::FRAC_PI_2;
use std::rc::Rc;

use glam::{EulerRot, Quat, Vec2, Vec3};

use crate::controls::ControlsConfig;

/// One orientation reading from a pose source
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PoseSample {
    /// Device orientation angles in degrees, as reported by a handheld's
    /// motion sensors, plus the screen orientation in degrees.
    Device {
        alpha: f32,
        beta: f32,
        gamma: f32,
        screen_orientation: f32,
    },
    /// Yaw and pitch in radians, relative to the camera's orientation at
    /// bind time. Positive yaw turns right, positive pitch looks up.
    YawPitch { yaw: f32, pitch: f32 },
}

impl PoseSample {
    /// Camera orientation for this sample. `alpha_offset` (radians) rotates
    /// device headings about the vertical axis.
    pub fn orientation(&self, alpha_offset: f32) -> Quat {
        match *self {
            PoseSample::Device {
                alpha,
                beta,
                gamma,
                screen_orientation,
            } => {
                let alpha = alpha.to_radians() + alpha_offset;
                let beta = beta.to_radians();
                let gamma = gamma.to_radians();
                let orient = screen_orientation.to_radians();

                // Device frame to camera frame: look out the back of the
                // screen instead of the top of the device.
                let device = Quat::from_euler(EulerRot::YXZ, alpha, beta, -gamma);
                let camera = Quat::from_axis_angle(Vec3::X, -FRAC_PI_2);
                let screen = Quat::from_axis_angle(Vec3::Z, -orient);
                (device * camera * screen).normalize()
            }
            PoseSample::YawPitch { yaw, pitch } => Quat::from_euler(EulerRot::YXZ, -yaw, pitch, 0.0),
        }
    }

    /// Whether the orientation is relative to the camera's rest orientation
    pub fn is_relative(&self) -> bool {
        matches!(self, PoseSample::YawPitch { .. })
    }
}

/// Pull accessor for the most recent pose
pub trait PoseSource {
    /// Latest sample, or `None` before the source has produced one
    fn latest(&self) -> Option<PoseSample>;
}

/// Single-threaded mailbox holding the latest pose. One clone is published
/// to by the input side, another is read by the controls.
#[derive(Debug, Clone, Default)]
pub struct SharedPose {
    latest: Rc<Cell<Option<PoseSample>>>,
}

impl SharedPose {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, sample: PoseSample) {
        self.latest.set(Some(sample));
    }

    pub fn clear(&self) {
        self.latest.set(None);
    }
}

impl PoseSource for SharedPose {
    fn latest(&self) -> Option<PoseSample> {
        self.latest.get()
    }
}

/// Mouse-look pose source for hosts without motion sensors
#[derive(Debug, Clone)]
pub struct MouseLook {
    /// Yaw rotation in radians (horizontal)
    pub yaw: f32,
    /// Pitch rotation in radians (vertical)
    pub pitch: f32,
    sensitivity: f32,
    pitch_min: f32,
    pitch_max: f32,
    moved: bool,
}

impl MouseLook {
    pub fn new(config: &ControlsConfig) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            sensitivity: config.sensitivity,
            pitch_min: config.pitch_min.to_radians(),
            pitch_max: config.pitch_max.to_radians(),
            moved: false,
        }
    }

    /// Handle a mouse delta in pixels
    pub fn handle_mouse_look(&mut self, mouse_delta: Vec2) {
        // Apply yaw (horizontal)
        self.yaw += mouse_delta.x * self.sensitivity;

        // Apply pitch (vertical) with clamping
        self.pitch -= mouse_delta.y * self.sensitivity;
        self.pitch = self.pitch.clamp(self.pitch_min, self.pitch_max);
        self.moved = true;
    }

    pub fn sample(&self) -> PoseSample {
        PoseSample::YawPitch {
            yaw: self.yaw,
            pitch: self.pitch,
        }
    }
}

impl PoseSource for MouseLook {
    fn latest(&self) -> Option<PoseSample> {
        self.moved.then(|| self.sample())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn upright_device_looks_forward() {
        // Portrait, screen facing the user, heading north
        let pose = PoseSample::Device {
            alpha: 0.0,
            beta: 90.0,
            gamma: 0.0,
            screen_orientation: 0.0,
        };
        let forward = pose.orientation(0.0) * -Vec3::Z;
        assert!(approx(forward, -Vec3::Z), "{forward:?}");
    }

    #[test]
    fn flat_device_looks_down() {
        let pose = PoseSample::Device {
            alpha: 0.0,
            beta: 0.0,
            gamma: 0.0,
            screen_orientation: 0.0,
        };
        let forward = pose.orientation(0.0) * -Vec3::Z;
        assert!(approx(forward, -Vec3::Y), "{forward:?}");
    }

    #[test]
    fn alpha_offset_turns_heading() {
        let pose = PoseSample::Device {
            alpha: 0.0,
            beta: 90.0,
            gamma: 0.0,
            screen_orientation: 0.0,
        };
        let forward = pose.orientation(FRAC_PI_2) * -Vec3::Z;
        assert!(approx(forward, -Vec3::X), "{forward:?}");
    }

    #[test]
    fn yaw_pitch_directions() {
        let right = PoseSample::YawPitch { yaw: FRAC_PI_2, pitch: 0.0 }.orientation(0.0);
        assert!(approx(right * -Vec3::Z, Vec3::X));

        let up = PoseSample::YawPitch { yaw: 0.0, pitch: 0.5 }.orientation(0.0);
        assert!((up * -Vec3::Z).y > 0.0);
    }

    #[test]
    fn shared_pose_starts_empty() {
        let writer = SharedPose::new();
        let reader = writer.clone();
        assert!(reader.latest().is_none());

        writer.publish(PoseSample::YawPitch { yaw: 0.1, pitch: 0.0 });
        assert_eq!(reader.latest(), Some(PoseSample::YawPitch { yaw: 0.1, pitch: 0.0 }));

        writer.clear();
        assert!(reader.latest().is_none());
    }

    #[test]
    fn mouse_look_clamps_pitch() {
        let mut look = MouseLook::new(&ControlsConfig::default());
        assert!(look.latest().is_none());

        look.handle_mouse_look(Vec2::new(0.0, -100_000.0));
        assert!(look.pitch <= 89f32.to_radians() + 1e-6);
        assert!(look.latest().is_some());
    }
}
