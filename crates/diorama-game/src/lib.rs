//! Diorama Game - Interactive runtime on top of the composed scene
//!
//! Provides pose sources and the controls that steer the camera from them,
//! and the scheduler that drives the per-frame update and render.

pub mod controls;
pub mod pose;
pub mod scheduler;

pub use controls::{ControlsBinder, ControlsConfig};
pub use pose::{MouseLook, PoseSample, PoseSource, SharedPose};
pub use scheduler::{
    FramePacer, FrameTarget, IntervalPacer, LoopReport, LoopState, RenderLoopScheduler, SchedulerError,
    StopHandle,
};
