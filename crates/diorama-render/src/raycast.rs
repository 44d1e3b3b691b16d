//! Pointer picking against the composed scene

use diorama_core::{Ray, Vec2};
use tracing::trace;

use crate::camera::CameraRig;
use crate::scene::{SceneGraph, SceneGraphNode};

/// A pointer position in normalized device coordinates: x to the right and
/// y up, both in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
}

impl PointerSample {
    /// Create a sample, clamping both axes into [-1, 1]
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x: x.clamp(-1.0, 1.0),
            y: y.clamp(-1.0, 1.0),
        }
    }

    /// Normalize a pointer position in device pixels (origin top-left, y
    /// down). Returns `None` for an empty viewport or a position outside it.
    pub fn from_pixels(px: f32, py: f32, width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let (w, h) = (width as f32, height as f32);
        if !(0.0..=w).contains(&px) || !(0.0..=h).contains(&py) {
            return None;
        }
        Some(Self {
            x: px / w * 2.0 - 1.0,
            y: -(py / h) * 2.0 + 1.0,
        })
    }

    pub fn to_ndc(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// The nearest node hit by a pick ray
#[derive(Debug, Clone, PartialEq)]
pub struct RaycastHit {
    pub identifier: String,
    pub distance: f32,
}

/// Resolves pointer samples to scene nodes.
///
/// Every pickable node is tested: first against its world bounds, then,
/// when it has triangle data, against each triangle in the node's local
/// space. The smallest hit distance wins; on equal distances the node
/// earlier in the graph's order is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct RaycastResolver;

impl RaycastResolver {
    pub fn new() -> Self {
        Self
    }

    /// Identifier of the nearest node under the pointer, or `None`
    pub fn resolve(&self, pointer: PointerSample, camera: &CameraRig, scene: &SceneGraph) -> Option<String> {
        let ray = camera.ray_through(pointer.to_ndc());
        self.cast(&ray, scene).map(|hit| hit.identifier)
    }

    /// Nearest hit along an arbitrary world-space ray
    pub fn cast(&self, ray: &Ray, scene: &SceneGraph) -> Option<RaycastHit> {
        let mut best: Option<RaycastHit> = None;

        for node in scene.nodes().filter(|n| n.is_pickable()) {
            let Some(distance) = intersect_node(ray, node) else {
                continue;
            };
            trace!("Ray hit '{}' at {:.3}", node.identifier(), distance);
            if best.as_ref().map_or(true, |b| distance < b.distance) {
                best = Some(RaycastHit {
                    identifier: node.identifier().to_string(),
                    distance,
                });
            }
        }

        best
    }
}

fn intersect_node(ray: &Ray, node: &SceneGraphNode) -> Option<f32> {
    let bounds_hit = ray.intersect_aabb(node.world_bounds())?;

    let local_ray = ray.transformed(&node.transform().matrix().inverse());
    let mut any_triangles = false;
    let mut nearest: Option<f32> = None;
    for [a, b, c] in node.triangles() {
        any_triangles = true;
        if let Some(t) = local_ray.intersect_triangle(a, b, c) {
            nearest = Some(nearest.map_or(t, |n| n.min(t)));
        }
    }

    if any_triangles {
        nearest
    } else {
        Some(bounds_hit)
    }
}
