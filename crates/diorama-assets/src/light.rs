use std::collections::HashMap;
use std::str::FromStr;

use diorama_core::{Aabb, Color};
use serde::{Deserialize, Serialize};

use crate::descriptor::AssetDescriptor;
use crate::error::AssetError;
use crate::fetch::AssetFetcher;
use crate::handle::LoadedAsset;

/// Light categories understood by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightKind {
    Ambient,
    Hemisphere,
    /// Shines from its position toward the origin
    Directional,
    Point,
}

impl FromStr for LightKind {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ambient" => Ok(Self::Ambient),
            "hemisphere" => Ok(Self::Hemisphere),
            "directional" => Ok(Self::Directional),
            "point" => Ok(Self::Point),
            _ => Err(AssetError::UnknownLightKind(s.to_string())),
        }
    }
}

/// A light source. Lights have no spatial extent and are never picked.
#[derive(Debug, Clone, PartialEq)]
pub struct LightAsset {
    pub kind: LightKind,
    pub color: Color,
    pub intensity: f32,
    /// Ground color for hemisphere lights
    pub ground_color: Option<Color>,
    /// Cutoff distance for point lights (None = unlimited)
    pub range: Option<f32>,
}

impl LightAsset {
    pub fn new(kind: LightKind) -> Self {
        Self {
            kind,
            color: Color::WHITE,
            intensity: 1.0,
            ground_color: None,
            range: None,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }
}

/// Resolves light descriptors. The descriptor source names the light kind;
/// color and intensity come from parameters registered per identifier, or
/// white at full intensity otherwise.
#[derive(Debug, Clone, Default)]
pub struct LightFetcher {
    params: HashMap<String, LightAsset>,
}

impl LightFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register explicit parameters for the light with `identifier`. The
    /// registered kind is overridden by the descriptor's source.
    pub fn register(&mut self, identifier: impl Into<String>, light: LightAsset) {
        self.params.insert(identifier.into(), light);
    }
}

impl AssetFetcher for LightFetcher {
    type Asset = LightAsset;

    async fn fetch(&self, descriptor: &AssetDescriptor) -> Result<LoadedAsset<LightAsset>, AssetError> {
        let kind: LightKind = descriptor.source.parse()?;
        let light = match self.params.get(&descriptor.identifier) {
            Some(params) => LightAsset {
                kind,
                ..params.clone()
            },
            None => LightAsset::new(kind),
        };
        Ok(LoadedAsset::from_descriptor(descriptor, light, Aabb::EMPTY))
    }
}
