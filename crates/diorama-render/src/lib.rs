//! Diorama Render - Scene composition and the hand-off to the renderer
//!
//! Provides the camera rig, the composed scene graph with its identifier
//! index, pointer picking against that graph, and the `Renderer` seam the
//! render loop drives each frame.

pub mod camera;
pub mod frame;
pub mod raycast;
pub mod renderer;
pub mod scene;

pub use camera::{CameraConfig, CameraRig};
pub use frame::{BasicPushConstants, DrawCommand, DrawList, SceneUniforms};
pub use raycast::{PointerSample, RaycastHit, RaycastResolver};
pub use renderer::{HeadlessRenderer, RenderError, Renderer};
pub use scene::{DuplicateIdentifierError, NodeKind, NodePayload, SceneComposer, SceneGraph, SceneGraphNode};
