//! Diorama Core - Core types and utilities for the Diorama scene runtime
//!
//! This crate provides the foundational types used throughout the workspace:
//! - Mathematical primitives (re-exported from glam)
//! - Transform and color types shared by assets and the scene graph
//! - Axis-aligned bounds and rays for picking
//! - Frame clock for per-tick elapsed time

pub mod spatial;
pub mod time;
pub mod types;

pub use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};
pub use spatial::{Aabb, Ray};
pub use time::{FrameClock, TimeConfig};
pub use types::{Color, Transform};
