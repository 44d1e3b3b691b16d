use diorama_core::{Transform, Vec3};
use serde::{Deserialize, Serialize};

/// The manager class an asset belongs to. Identifiers are unique within a
/// class and, once composed, across the whole scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetClass {
    Geometry,
    Model,
    Light,
}

impl AssetClass {
    pub fn name(&self) -> &'static str {
        match self {
            AssetClass::Geometry => "geometry",
            AssetClass::Model => "model",
            AssetClass::Light => "light",
        }
    }
}

/// Placement hints applied when the asset becomes a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformHints {
    pub position: Vec3,
    /// Euler angles in degrees (Y-X-Z order)
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for TransformHints {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl TransformHints {
    pub fn transform(&self) -> Transform {
        Transform::from_hints(self.position, self.rotation, self.scale)
    }
}

/// Describes one asset to fetch. Descriptors are created when the scene is
/// defined and handed to fetchers by reference only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    #[serde(rename = "id")]
    pub identifier: String,
    pub source: String,
    #[serde(flatten)]
    pub hints: TransformHints,
    /// Whether pointer picks can select this asset's node
    #[serde(default = "default_pickable")]
    pub pickable: bool,
}

fn default_pickable() -> bool {
    true
}

impl AssetDescriptor {
    pub fn new(identifier: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            source: source.into(),
            hints: TransformHints::default(),
            pickable: true,
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.hints.position = position;
        self
    }

    pub fn with_rotation(mut self, degrees: Vec3) -> Self {
        self.hints.rotation = degrees;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.hints.scale = scale;
        self
    }

    pub fn unpickable(mut self) -> Self {
        self.pickable = false;
        self
    }
}
