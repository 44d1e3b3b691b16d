//! Scene graph composition
//!
//! The composer merges the loaded geometry, model, and light collections
//! into one graph with an identifier index. Later consumers (picking, audio
//! attachment) depend on identifiers being unique across the whole graph.

use std::collections::HashMap;
use std::sync::Arc;

use diorama_assets::{LightAsset, LoadedAsset, MeshAsset, ModelAsset};
use diorama_core::{Aabb, Transform, Vec3};
use tracing::{debug, info};

/// Two assets share an identifier. Indicates a scene definition bug.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("duplicate scene identifier '{identifier}'")]
pub struct DuplicateIdentifierError {
    pub identifier: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Geometry,
    Model,
    Light,
}

/// The loaded asset behind a node, shared with its owning manager
#[derive(Debug, Clone)]
pub enum NodePayload {
    Geometry(Arc<LoadedAsset<MeshAsset>>),
    Model(Arc<LoadedAsset<ModelAsset>>),
    Light(Arc<LoadedAsset<LightAsset>>),
}

/// A composed node, looked up by its asset identifier
#[derive(Debug, Clone)]
pub struct SceneGraphNode {
    identifier: String,
    transform: Transform,
    world_bounds: Aabb,
    pickable: bool,
    payload: NodePayload,
}

impl SceneGraphNode {
    fn new(payload: NodePayload) -> Self {
        let (identifier, transform, world_bounds, pickable) = match &payload {
            NodePayload::Geometry(a) => (a.identifier.clone(), a.placement, a.world_bounds(), a.pickable),
            NodePayload::Model(a) => (a.identifier.clone(), a.placement, a.world_bounds(), a.pickable),
            NodePayload::Light(a) => (a.identifier.clone(), a.placement, Aabb::EMPTY, false),
        };
        Self {
            identifier,
            transform,
            world_bounds,
            pickable,
            payload,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn kind(&self) -> NodeKind {
        match self.payload {
            NodePayload::Geometry(_) => NodeKind::Geometry,
            NodePayload::Model(_) => NodeKind::Model,
            NodePayload::Light(_) => NodeKind::Light,
        }
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn world_bounds(&self) -> &Aabb {
        &self.world_bounds
    }

    /// Whether pointer picks may select this node
    pub fn is_pickable(&self) -> bool {
        self.pickable && !self.world_bounds.is_empty()
    }

    pub fn payload(&self) -> &NodePayload {
        &self.payload
    }

    pub fn light(&self) -> Option<&LightAsset> {
        match &self.payload {
            NodePayload::Light(asset) => Some(&asset.data),
            _ => None,
        }
    }

    pub fn model(&self) -> Option<&ModelAsset> {
        match &self.payload {
            NodePayload::Model(asset) => Some(&asset.data),
            _ => None,
        }
    }

    /// Local-space triangles, empty for lights
    pub fn triangles(&self) -> Box<dyn Iterator<Item = [Vec3; 3]> + '_> {
        match &self.payload {
            NodePayload::Geometry(asset) => Box::new(asset.data.triangles()),
            NodePayload::Model(asset) => Box::new(asset.data.triangles()),
            NodePayload::Light(_) => Box::new(std::iter::empty()),
        }
    }

    pub fn vertex_count(&self) -> usize {
        match &self.payload {
            NodePayload::Geometry(asset) => asset.data.vertex_count(),
            NodePayload::Model(asset) => asset.data.meshes.iter().map(MeshAsset::vertex_count).sum(),
            NodePayload::Light(_) => 0,
        }
    }
}

/// The composed scene. Iteration follows insertion order: geometries, then
/// models, then lights.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneGraphNode>,
    index: HashMap<String, usize>,
}

impl SceneGraph {
    fn insert(&mut self, node: SceneGraphNode) -> Result<(), DuplicateIdentifierError> {
        if self.index.contains_key(node.identifier()) {
            return Err(DuplicateIdentifierError {
                identifier: node.identifier,
            });
        }
        self.index.insert(node.identifier.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Exact-match lookup by identifier
    pub fn get(&self, identifier: &str) -> Option<&SceneGraphNode> {
        self.index.get(identifier).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.index.contains_key(identifier)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &SceneGraphNode> {
        self.nodes.iter()
    }

    pub fn lights(&self) -> impl Iterator<Item = (&SceneGraphNode, &LightAsset)> {
        self.nodes.iter().filter_map(|n| n.light().map(|l| (n, l)))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Builds scene graphs from loaded asset collections. Holds no state: every
/// call is a fresh build.
#[derive(Debug, Clone, Copy, Default)]
pub struct SceneComposer;

impl SceneComposer {
    pub fn new() -> Self {
        Self
    }

    /// Merge the three collections into a new graph. Fails on the first
    /// identifier seen twice, within or across collections.
    pub fn compose(
        &self,
        geometries: &[Arc<LoadedAsset<MeshAsset>>],
        models: &[Arc<LoadedAsset<ModelAsset>>],
        lights: &[Arc<LoadedAsset<LightAsset>>],
    ) -> Result<SceneGraph, DuplicateIdentifierError> {
        let mut graph = SceneGraph::default();

        let payloads = geometries
            .iter()
            .map(|a| NodePayload::Geometry(Arc::clone(a)))
            .chain(models.iter().map(|a| NodePayload::Model(Arc::clone(a))))
            .chain(lights.iter().map(|a| NodePayload::Light(Arc::clone(a))));

        for payload in payloads {
            let node = SceneGraphNode::new(payload);
            debug!("Composing {:?} node '{}'", node.kind(), node.identifier());
            graph.insert(node)?;
        }

        info!(
            "Composed scene graph: {} geometries, {} models, {} lights",
            geometries.len(),
            models.len(),
            lights.len()
        );
        Ok(graph)
    }
}
