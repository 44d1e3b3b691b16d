//! Per-frame draw data derived from the scene graph and camera

use diorama_assets::LightKind;
use glam::{Mat4, Vec3};

use crate::camera::CameraRig;
use crate::scene::{NodeKind, SceneGraph};

/// Scene-wide uniforms for rendering
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneUniforms {
    /// View matrix (camera)
    pub view: Mat4,
    /// Projection matrix
    pub projection: Mat4,
    /// Direction toward the key light (normalized)
    pub sun_direction: Vec3,
    pub sun_intensity: f32,
    pub sun_color: Vec3,
    pub ambient_intensity: f32,
}

impl Default for SceneUniforms {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            sun_direction: Vec3::new(0.5, 0.8, 0.3).normalize(),
            sun_intensity: 0.0,
            sun_color: Vec3::ONE,
            ambient_intensity: 0.0,
        }
    }
}

impl SceneUniforms {
    /// Gather camera matrices and lighting terms. The first directional
    /// light is the key light; ambient and hemisphere lights add up into the
    /// ambient term.
    pub fn from_scene(scene: &SceneGraph, camera: &CameraRig) -> Self {
        let mut uniforms = Self {
            view: camera.view_matrix(),
            projection: camera.projection_matrix(),
            ..Self::default()
        };

        let mut has_key = false;
        for (node, light) in scene.lights() {
            match light.kind {
                LightKind::Ambient | LightKind::Hemisphere => {
                    uniforms.ambient_intensity += light.intensity;
                }
                LightKind::Directional if !has_key => {
                    if let Some(direction) = node.position().try_normalize() {
                        uniforms.sun_direction = direction;
                    }
                    uniforms.sun_intensity = light.intensity;
                    uniforms.sun_color = light.color.to_vec3(1.0);
                    has_key = true;
                }
                LightKind::Directional | LightKind::Point => {}
            }
        }

        uniforms
    }
}

/// Push constants for basic 3D rendering
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BasicPushConstants {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub sun_direction: [f32; 4], // xyz = direction, w = intensity
    pub sun_color: [f32; 4],     // xyz = color, w = ambient intensity
}

impl BasicPushConstants {
    pub fn from_uniforms(model: Mat4, uniforms: &SceneUniforms) -> Self {
        let d = uniforms.sun_direction;
        let c = uniforms.sun_color;
        Self {
            model: model.to_cols_array_2d(),
            view: uniforms.view.to_cols_array_2d(),
            projection: uniforms.projection.to_cols_array_2d(),
            sun_direction: [d.x, d.y, d.z, uniforms.sun_intensity],
            sun_color: [c.x, c.y, c.z, uniforms.ambient_intensity],
        }
    }
}

/// One drawable node
#[derive(Clone, Debug)]
pub struct DrawCommand {
    pub identifier: String,
    pub push: BasicPushConstants,
    pub vertex_count: usize,
}

/// Everything a backend needs to draw one frame
#[derive(Clone, Debug, Default)]
pub struct DrawList {
    pub uniforms: SceneUniforms,
    pub draws: Vec<DrawCommand>,
}

impl DrawList {
    /// Build the frame's draws in scene order. Lights produce no draws.
    pub fn build(scene: &SceneGraph, camera: &CameraRig) -> Self {
        let uniforms = SceneUniforms::from_scene(scene, camera);
        let draws = scene
            .nodes()
            .filter(|node| node.kind() != NodeKind::Light)
            .map(|node| DrawCommand {
                identifier: node.identifier().to_string(),
                push: BasicPushConstants::from_uniforms(node.transform().matrix(), &uniforms),
                vertex_count: node.vertex_count(),
            })
            .collect();
        Self { uniforms, draws }
    }

    pub fn total_vertices(&self) -> usize {
        self.draws.iter().map(|d| d.vertex_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }
}
