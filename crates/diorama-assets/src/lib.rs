//! Diorama Assets - Asset loading and batch coordination
//!
//! Describes the assets a scene needs, fetches them asynchronously
//! (procedural geometry, glTF models, lights), and coordinates whole batches
//! so scene composition only runs once every asset of a class is available.

mod coordinator;
mod descriptor;
mod error;
mod fetch;
mod gltf_loader;
mod handle;
mod light;
mod manager;
mod mesh;
mod model;
mod procedural;
mod texture;

pub use coordinator::{await_all, load_batch, BatchOutcome, LoadBatch};
pub use descriptor::{AssetClass, AssetDescriptor, TransformHints};
pub use error::{AssetError, AssetLoadError};
pub use fetch::{AssetFetcher, GeometryFetcher, ModelFetcher};
pub use gltf_loader::{parse_gltf, GltfContents};
pub use handle::{AssetHandle, AssetId, LoadedAsset};
pub use light::{LightAsset, LightFetcher, LightKind};
pub use manager::{AssetManager, GeometryManager, LightManager, ModelManager};
pub use mesh::{MeshAsset, MeshPrimitive};
pub use model::ModelAsset;
pub use procedural::ProceduralShape;
pub use texture::{TextureAsset, TextureFormat};
