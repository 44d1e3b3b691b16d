//! The renderer seam driven by the render loop

use thiserror::Error;
use tracing::{debug, trace};

use crate::camera::CameraRig;
use crate::frame::DrawList;
use crate::scene::SceneGraph;

/// A failed frame. The render loop logs these and keeps going.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("render surface lost")]
    SurfaceLost,

    #[error("viewport {0}x{1} cannot be drawn")]
    InvalidViewport(u32, u32),

    #[error("frame failed: {0}")]
    Frame(String),
}

/// Draws one frame of the scene from the camera's point of view
pub trait Renderer {
    fn render(&mut self, scene: &SceneGraph, camera: &CameraRig) -> Result<(), RenderError>;
}

/// Renderer without a GPU backend. Builds the frame's draw list and keeps
/// the last one around for inspection.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    frames: u64,
    last_frame: DrawList,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        debug!("Creating headless renderer");
        Self::default()
    }

    /// Frames rendered successfully
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn last_frame(&self) -> &DrawList {
        &self.last_frame
    }
}

impl Renderer for HeadlessRenderer {
    fn render(&mut self, scene: &SceneGraph, camera: &CameraRig) -> Result<(), RenderError> {
        let (width, height) = camera.viewport();
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidViewport(width, height));
        }

        self.last_frame = DrawList::build(scene, camera);
        self.frames += 1;
        trace!(
            "Frame {}: {} draws, {} vertices",
            self.frames,
            self.last_frame.draws.len(),
            self.last_frame.total_vertices()
        );
        Ok(())
    }
}
