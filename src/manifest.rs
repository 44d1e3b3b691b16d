//! Scene manifest (`scene.toml`)
//!
//! Lists what the session loads: the camera placement, the three asset
//! classes, and the sounds.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use diorama_assets::{AssetDescriptor, LightAsset, LightFetcher, LightKind};
use diorama_audio::SoundDescriptor;
use diorama_core::{Color, Vec3};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneManifest {
    pub camera: CameraPlacement,
    pub geometries: Vec<AssetDescriptor>,
    pub models: Vec<AssetDescriptor>,
    pub lights: Vec<LightEntry>,
    pub sounds: Vec<SoundDescriptor>,
}

/// Where the camera starts and what it looks at
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraPlacement {
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for CameraPlacement {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, 6.0),
            target: Vec3::ZERO,
        }
    }
}

/// A light: the descriptor's `source` names the kind, the remaining fields
/// are optional parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightEntry {
    #[serde(flatten)]
    pub descriptor: AssetDescriptor,
    /// 0xRRGGBB
    #[serde(default)]
    pub color: Option<u32>,
    #[serde(default)]
    pub intensity: Option<f32>,
    /// 0xRRGGBB, hemisphere lights only
    #[serde(default)]
    pub ground_color: Option<u32>,
    #[serde(default)]
    pub range: Option<f32>,
}

impl LightEntry {
    fn params(&self) -> LightAsset {
        // The fetcher replaces the kind with the one parsed from `source`.
        let mut light = LightAsset::new(LightKind::Point);
        if let Some(hex) = self.color {
            light = light.with_color(Color::from_hex(hex));
        }
        if let Some(intensity) = self.intensity {
            light = light.with_intensity(intensity);
        }
        light.ground_color = self.ground_color.map(Color::from_hex);
        light.range = self.range;
        light
    }
}

impl SceneManifest {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read scene manifest {:?}", path))?;
        let manifest: Self =
            toml::from_str(&content).with_context(|| format!("Failed to parse scene manifest {:?}", path))?;
        info!(
            "Loaded manifest {:?}: {} geometries, {} models, {} lights, {} sounds",
            path,
            manifest.geometries.len(),
            manifest.models.len(),
            manifest.lights.len(),
            manifest.sounds.len()
        );
        Ok(manifest)
    }

    /// Directory relative asset sources resolve against
    pub fn base_dir(path: &Path) -> PathBuf {
        path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn light_descriptors(&self) -> Vec<AssetDescriptor> {
        self.lights.iter().map(|l| l.descriptor.clone()).collect()
    }

    /// Light fetcher primed with each light's parameters
    pub fn light_fetcher(&self) -> LightFetcher {
        let mut fetcher = LightFetcher::new();
        for entry in &self.lights {
            fetcher.register(entry.descriptor.identifier.clone(), entry.params());
        }
        fetcher
    }
}
