use diorama_core::{Aabb, Vec3};

use crate::gltf_loader::GltfContents;
use crate::mesh::MeshAsset;
use crate::texture::TextureAsset;

/// A skinned or static model loaded from a glTF file.
#[derive(Debug, Clone)]
pub struct ModelAsset {
    pub name: String,
    pub meshes: Vec<MeshAsset>,
    pub textures: Vec<TextureAsset>,
    /// Joints in the first skin (0 for unrigged models)
    pub joint_count: usize,
    /// Names of the animation clips shipped with the model
    pub animations: Vec<String>,
}

impl ModelAsset {
    pub fn from_contents(name: impl Into<String>, contents: GltfContents) -> Self {
        Self {
            name: name.into(),
            meshes: contents.meshes,
            textures: contents.textures,
            joint_count: contents.joint_count,
            animations: contents.animations,
        }
    }

    pub fn is_skinned(&self) -> bool {
        self.joint_count > 0
    }

    pub fn bounds(&self) -> Aabb {
        self.meshes
            .iter()
            .map(MeshAsset::bounds)
            .fold(Aabb::EMPTY, Aabb::union)
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.meshes.iter().flat_map(MeshAsset::triangles)
    }
}
