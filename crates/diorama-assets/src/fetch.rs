use std::future::Future;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::descriptor::AssetDescriptor;
use crate::error::AssetError;
use crate::gltf_loader;
use crate::handle::LoadedAsset;
use crate::mesh::MeshAsset;
use crate::model::ModelAsset;
use crate::procedural::ProceduralShape;

/// Asynchronously turns a descriptor into a loaded asset.
///
/// Fetchers run on the single control thread, so the returned futures are
/// not required to be `Send`.
pub trait AssetFetcher {
    type Asset;

    fn fetch(
        &self,
        descriptor: &AssetDescriptor,
    ) -> impl Future<Output = Result<LoadedAsset<Self::Asset>, AssetError>>;
}

/// Resolve a relative asset path against a base path.
fn resolve(base_path: &Path, source: &str) -> PathBuf {
    let path = Path::new(source);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_path.join(path)
    }
}

async fn read_gltf(path: &Path) -> Result<gltf_loader::GltfContents, AssetError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AssetError::from_io(path.to_path_buf(), e))?;
    gltf_loader::parse_gltf(&bytes, path)
}

/// Fetches scene geometry: procedural shapes are generated in place, any
/// other source is read as a glTF file and its first mesh is used.
#[derive(Debug, Clone)]
pub struct GeometryFetcher {
    base_path: PathBuf,
}

impl GeometryFetcher {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl AssetFetcher for GeometryFetcher {
    type Asset = MeshAsset;

    async fn fetch(&self, descriptor: &AssetDescriptor) -> Result<LoadedAsset<MeshAsset>, AssetError> {
        let mesh = match ProceduralShape::from_source(&descriptor.source)? {
            Some(shape) => shape.generate(&descriptor.identifier),
            None => {
                let path = resolve(&self.base_path, &descriptor.source);
                let contents = read_gltf(&path).await?;
                contents
                    .meshes
                    .into_iter()
                    .next()
                    .ok_or_else(|| AssetError::GltfLoadFailed(path, "no meshes found".into()))?
            }
        };

        debug!(
            "Geometry '{}' ready ({} vertices)",
            descriptor.identifier,
            mesh.vertex_count()
        );
        let bounds = mesh.bounds();
        Ok(LoadedAsset::from_descriptor(descriptor, mesh, bounds))
    }
}

/// Fetches skinned or static models from glTF files.
#[derive(Debug, Clone)]
pub struct ModelFetcher {
    base_path: PathBuf,
}

impl ModelFetcher {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl AssetFetcher for ModelFetcher {
    type Asset = ModelAsset;

    async fn fetch(&self, descriptor: &AssetDescriptor) -> Result<LoadedAsset<ModelAsset>, AssetError> {
        let path = resolve(&self.base_path, &descriptor.source);
        let contents = read_gltf(&path).await?;
        if contents.meshes.is_empty() {
            return Err(AssetError::GltfLoadFailed(path, "no meshes found".into()));
        }

        let model = ModelAsset::from_contents(&descriptor.identifier, contents);
        debug!(
            "Model '{}' ready: {} meshes, {} joints, animations {:?}",
            descriptor.identifier,
            model.meshes.len(),
            model.joint_count,
            model.animations
        );
        let bounds = model.bounds();
        Ok(LoadedAsset::from_descriptor(descriptor, model, bounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_absolute_path() {
        assert_eq!(
            resolve(Path::new("/home/user/assets"), "/absolute/path.glb"),
            PathBuf::from("/absolute/path.glb")
        );
    }

    #[test]
    fn resolve_relative_path() {
        assert_eq!(
            resolve(Path::new("/home/user/assets"), "models/fox.glb"),
            PathBuf::from("/home/user/assets/models/fox.glb")
        );
    }

    #[tokio::test]
    async fn procedural_geometry_needs_no_files() {
        let fetcher = GeometryFetcher::new("/nonexistent");
        let descriptor = AssetDescriptor::new("Ground", "procedural:plane");
        let asset = fetcher.fetch(&descriptor).await.unwrap();
        assert_eq!(asset.identifier, "Ground");
        assert_eq!(asset.data.name, "Ground");
    }

    #[tokio::test]
    async fn missing_model_returns_not_found() {
        let fetcher = ModelFetcher::new("/nonexistent");
        let descriptor = AssetDescriptor::new("Fox", "does_not_exist.glb");
        match fetcher.fetch(&descriptor).await {
            Err(AssetError::NotFound(path)) => {
                assert_eq!(path, PathBuf::from("/nonexistent/does_not_exist.glb"))
            }
            other => panic!("expected NotFound, got: {:?}", other.map(|a| a.identifier)),
        }
    }

    #[tokio::test]
    async fn unknown_procedural_shape_is_rejected() {
        let fetcher = GeometryFetcher::new("/nonexistent");
        let descriptor = AssetDescriptor::new("Pot", "procedural:teapot");
        assert!(matches!(
            fetcher.fetch(&descriptor).await,
            Err(AssetError::UnsupportedSource(_))
        ));
    }
}
