//! Diorama Audio - Scene audio playback using kira
//!
//! Provides global sounds and positional emitters attached to scene nodes,
//! attenuated and panned relative to the camera.

mod config;
mod emitter;
mod engine;
mod error;
mod spatial;

pub use config::AudioConfig;
pub use emitter::{resolve_placement, SoundDescriptor, SoundPlacement};
pub use engine::AudioEngine;
pub use error::AudioError;
pub use spatial::{compute_spatial, Listener, SpatialParams};
