use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use diorama_core::{Aabb, Transform};

use crate::descriptor::AssetDescriptor;

/// Unique identifier for a loaded asset.
pub type AssetId = u64;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a new unique asset ID.
pub(crate) fn next_asset_id() -> AssetId {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// A typed handle referencing a loaded asset in its manager.
#[derive(Debug)]
pub struct AssetHandle<T> {
    id: AssetId,
    _marker: PhantomData<T>,
}

impl<T> AssetHandle<T> {
    pub(crate) fn new(id: AssetId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// The unique ID of this asset.
    pub fn id(&self) -> AssetId {
        self.id
    }
}

impl<T> Clone for AssetHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for AssetHandle<T> {}

impl<T> PartialEq for AssetHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for AssetHandle<T> {}

impl<T> std::hash::Hash for AssetHandle<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// An asset that finished loading, together with the spatial metadata the
/// scene needs to place and pick it.
#[derive(Debug)]
pub struct LoadedAsset<T> {
    pub handle: AssetHandle<T>,
    pub identifier: String,
    pub data: T,
    /// Bounds in the asset's local space (empty for assets without extent)
    pub local_bounds: Aabb,
    /// Placement derived from the descriptor's hints
    pub placement: Transform,
    pub pickable: bool,
}

impl<T> LoadedAsset<T> {
    pub fn from_descriptor(descriptor: &AssetDescriptor, data: T, local_bounds: Aabb) -> Self {
        Self {
            handle: AssetHandle::new(next_asset_id()),
            identifier: descriptor.identifier.clone(),
            data,
            local_bounds,
            placement: descriptor.hints.transform(),
            pickable: descriptor.pickable,
        }
    }

    /// Bounds after applying the placement transform
    pub fn world_bounds(&self) -> Aabb {
        self.local_bounds.transformed(&self.placement.matrix())
    }
}
