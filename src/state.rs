//! Session lifecycle states
//!
//! A session starts stopped, passes through the loading phases, and is
//! ready once the scene is composed and the camera and controls are bound.

/// The current session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No scene; the initial state and the state after a failed startup
    #[default]
    Stopped,
    /// Startup in progress
    Loading(LoadingPhase),
    /// Scene composed, camera positioned, controls bound
    Ready,
}

/// Loading phases with associated progress percentages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingPhase {
    /// Loading geometry, models, and lights (0%)
    Assets,
    /// Building the scene graph (60%)
    Composing,
    /// Placing the camera (80%)
    Camera,
    /// Binding the controls (90%)
    Controls,
}

impl LoadingPhase {
    /// Get the progress percentage for this phase (0.0 to 1.0)
    pub fn progress(&self) -> f32 {
        match self {
            Self::Assets => 0.0,
            Self::Composing => 0.60,
            Self::Camera => 0.80,
            Self::Controls => 0.90,
        }
    }

    /// Get a human-readable description of this phase
    pub fn description(&self) -> &'static str {
        match self {
            Self::Assets => "Loading assets...",
            Self::Composing => "Composing scene...",
            Self::Camera => "Placing camera...",
            Self::Controls => "Binding controls...",
        }
    }
}
