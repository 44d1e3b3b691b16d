//! Camera rig: position, orientation, and projection

use diorama_core::{Ray, Vec2};
use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Projection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clip distance
    pub near: f32,
    /// Far clip distance
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Perspective camera state. Looks down its local -Z axis.
#[derive(Debug, Clone)]
pub struct CameraRig {
    pub config: CameraConfig,
    position: Vec3,
    orientation: Quat,
    viewport: (u32, u32),
    projection: Mat4,
    position_set: bool,
}

impl CameraRig {
    pub fn new(config: CameraConfig, width: u32, height: u32) -> Self {
        let mut rig = Self {
            config,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            viewport: (width.max(1), height.max(1)),
            projection: Mat4::IDENTITY,
            position_set: false,
        };
        rig.update_projection();
        rig
    }

    /// Place the camera in world space
    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vec3::new(x, y, z);
        self.position_set = true;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Whether a position has been set since construction or the last reset
    pub fn has_position(&self) -> bool {
        self.position_set
    }

    /// Rotate the camera to face `point`. A point at the camera's own
    /// position leaves the orientation unchanged.
    pub fn look_at(&mut self, point: Vec3) {
        let to_target = point - self.position;
        if to_target.length_squared() < f32::EPSILON {
            return;
        }

        let forward = to_target.normalize();
        let up = if forward.cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let world_from_camera = Mat4::look_at_rh(self.position, point, up).inverse();
        self.orientation = Quat::from_mat4(&world_from_camera).normalize();
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation.normalize();
    }

    /// Get the camera's forward direction
    pub fn forward(&self) -> Vec3 {
        self.orientation * -Vec3::Z
    }

    /// Get the camera's up direction
    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    /// Get the camera's right direction
    pub fn right(&self) -> Vec3 {
        self.orientation * Vec3::X
    }

    /// Recompute the projection for a new viewport. Zero-sized viewports
    /// (minimized windows) are ignored.
    pub fn on_viewport_resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            debug!("Ignoring zero-sized viewport {}x{}", width, height);
            return;
        }
        self.viewport = (width, height);
        self.update_projection();
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.viewport.0 as f32 / self.viewport.1 as f32
    }

    fn update_projection(&mut self) {
        self.projection = Mat4::perspective_rh(
            self.config.fov_degrees.to_radians(),
            self.aspect_ratio(),
            self.config.near,
            self.config.far,
        );
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position).inverse()
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }

    /// World-space ray from the camera through a point in normalized device
    /// coordinates (x right, y up, both in [-1, 1]). The direction is unit
    /// length, so hit parameters are world distances.
    pub fn ray_through(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection().inverse();
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        let direction = (far - near).normalize_or_zero();
        let direction = if direction == Vec3::ZERO {
            self.forward()
        } else {
            direction
        };
        Ray::new(self.position, direction)
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(CameraConfig::default(), 1280, 720)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn new_camera_has_no_position() {
        let mut camera = CameraRig::default();
        assert!(!camera.has_position());
        camera.set_position(0.0, 2.0, 5.0);
        assert!(camera.has_position());
        assert_eq!(camera.position(), Vec3::new(0.0, 2.0, 5.0));
    }

    #[test]
    fn look_at_faces_target() {
        let mut camera = CameraRig::default();
        camera.set_position(0.0, 0.0, 10.0);
        camera.look_at(Vec3::ZERO);
        assert!(approx(camera.forward(), -Vec3::Z));

        camera.look_at(Vec3::new(10.0, 0.0, 10.0));
        assert!(approx(camera.forward(), Vec3::X));
    }

    #[test]
    fn look_straight_down_is_stable() {
        let mut camera = CameraRig::default();
        camera.set_position(0.0, 10.0, 0.0);
        camera.look_at(Vec3::ZERO);
        assert!(approx(camera.forward(), -Vec3::Y));
        assert!(camera.orientation().is_finite());
    }

    #[test]
    fn look_at_own_position_is_ignored() {
        let mut camera = CameraRig::default();
        camera.set_position(1.0, 1.0, 1.0);
        camera.look_at(Vec3::ONE);
        assert_eq!(camera.orientation(), Quat::IDENTITY);
    }

    #[test]
    fn resize_updates_projection() {
        let mut camera = CameraRig::default();
        let before = camera.projection_matrix();
        camera.on_viewport_resize(800, 800);
        assert_eq!(camera.aspect_ratio(), 1.0);
        assert_ne!(before, camera.projection_matrix());
    }

    #[test]
    fn zero_viewport_is_ignored() {
        let mut camera = CameraRig::default();
        camera.on_viewport_resize(0, 600);
        assert_eq!(camera.viewport(), (1280, 720));
    }

    #[test]
    fn center_ray_follows_forward() {
        let mut camera = CameraRig::default();
        camera.set_position(0.0, 0.0, 0.0);
        let ray = camera.ray_through(Vec2::ZERO);
        assert!(approx(ray.direction, -Vec3::Z));
        assert_eq!(ray.origin, Vec3::ZERO);
    }

    #[test]
    fn edge_ray_spreads_with_fov() {
        let mut camera = CameraRig::new(CameraConfig::default(), 100, 100);
        camera.set_position(0.0, 0.0, 0.0);
        let ray = camera.ray_through(Vec2::new(0.0, 1.0));
        let half_fov = camera.config.fov_degrees.to_radians() / 2.0;
        let angle = ray.direction.angle_between(-Vec3::Z);
        assert!((angle - half_fov).abs() < 1e-3, "{angle} vs {half_fov}");
        assert!(ray.direction.y > 0.0);
    }
}
