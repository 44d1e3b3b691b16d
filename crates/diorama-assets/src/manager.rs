use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::coordinator::{load_batch, BatchOutcome};
use crate::descriptor::{AssetClass, AssetDescriptor};
use crate::error::AssetLoadError;
use crate::fetch::AssetFetcher;
use crate::handle::{AssetHandle, AssetId, LoadedAsset};
use crate::light::LightAsset;
use crate::mesh::MeshAsset;
use crate::model::ModelAsset;

pub type GeometryManager = AssetManager<MeshAsset>;
pub type ModelManager = AssetManager<ModelAsset>;
pub type LightManager = AssetManager<LightAsset>;

/// Owns the loaded assets of one class for the lifetime of a session.
/// Consumers receive shared references, never copies.
pub struct AssetManager<T> {
    class: AssetClass,
    assets: HashMap<AssetId, Arc<LoadedAsset<T>>>,
    by_identifier: HashMap<String, AssetHandle<T>>,
}

impl<T> AssetManager<T> {
    pub fn new(class: AssetClass) -> Self {
        Self {
            class,
            assets: HashMap::new(),
            by_identifier: HashMap::new(),
        }
    }

    pub fn class(&self) -> AssetClass {
        self.class
    }

    /// Load a batch of descriptors through `fetcher`. Returns the batch in
    /// descriptor order. Assets that finished before a failure are kept.
    pub async fn load_all<F>(
        &mut self,
        fetcher: &F,
        descriptors: &[AssetDescriptor],
    ) -> Result<Vec<Arc<LoadedAsset<T>>>, AssetLoadError>
    where
        F: AssetFetcher<Asset = T>,
    {
        info!("Loading {} {} assets", descriptors.len(), self.class.name());

        match load_batch(descriptors, |descriptor| fetcher.fetch(descriptor)).await {
            BatchOutcome::Complete(assets) => {
                let assets: Vec<_> = assets.into_iter().map(Arc::new).collect();
                for asset in &assets {
                    self.retain(Arc::clone(asset));
                }
                info!("Loaded {} {} assets", assets.len(), self.class.name());
                Ok(assets)
            }
            BatchOutcome::Failed { error, loaded } => {
                warn!(
                    "{} batch failed on '{}'; keeping {} finished assets",
                    self.class.name(),
                    error.identifier,
                    loaded.len()
                );
                for asset in loaded {
                    self.retain(Arc::new(asset));
                }
                Err(error)
            }
        }
    }

    /// Store an asset. A reload under the same identifier replaces the
    /// previous asset.
    fn retain(&mut self, asset: Arc<LoadedAsset<T>>) {
        if let Some(previous) = self.by_identifier.insert(asset.identifier.clone(), asset.handle) {
            self.assets.remove(&previous.id());
        }
        self.assets.insert(asset.handle.id(), asset);
    }

    /// Get a loaded asset by identifier.
    pub fn get(&self, identifier: &str) -> Option<&Arc<LoadedAsset<T>>> {
        let handle = self.by_identifier.get(identifier)?;
        self.assets.get(&handle.id())
    }

    /// Check if a handle refers to a loaded asset.
    pub fn is_loaded(&self, handle: AssetHandle<T>) -> bool {
        self.assets.contains_key(&handle.id())
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Drop every asset this manager owns.
    pub fn clear(&mut self) {
        self.assets.clear();
        self.by_identifier.clear();
    }
}
