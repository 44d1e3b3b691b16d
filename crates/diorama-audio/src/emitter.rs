use diorama_render::SceneGraph;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::AudioError;

/// A sound listed in the scene manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundDescriptor {
    #[serde(rename = "id")]
    pub identifier: String,
    pub source: String,
    /// Scene node the sound follows. Unattached sounds are global.
    #[serde(default)]
    pub attach_to: Option<String>,
    #[serde(default)]
    pub looping: bool,
    #[serde(default = "default_volume")]
    pub volume: f64,
}

fn default_volume() -> f64 {
    1.0
}

impl SoundDescriptor {
    pub fn new(identifier: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            source: source.into(),
            attach_to: None,
            looping: false,
            volume: default_volume(),
        }
    }

    pub fn attached_to(mut self, node: impl Into<String>) -> Self {
        self.attach_to = Some(node.into());
        self
    }

    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }
}

/// Where a sound plays from
#[derive(Debug, Clone, PartialEq)]
pub enum SoundPlacement {
    /// Unattenuated, centered
    Global,
    /// At a scene node's position
    Positional { node: String, position: Vec3 },
}

/// Find where `sound` plays in `scene`
pub fn resolve_placement(sound: &SoundDescriptor, scene: &SceneGraph) -> Result<SoundPlacement, AudioError> {
    let Some(node_id) = &sound.attach_to else {
        return Ok(SoundPlacement::Global);
    };
    let node = scene.get(node_id).ok_or_else(|| AudioError::UnknownAttachment {
        sound: sound.identifier.clone(),
        node: node_id.clone(),
    })?;
    Ok(SoundPlacement::Positional {
        node: node_id.clone(),
        position: node.position(),
    })
}
