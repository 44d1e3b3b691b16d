//! Frame timing for the render loop
//!
//! Turns the instants delivered by the host's frame pacing into clamped
//! per-tick elapsed seconds.

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Configuration for frame timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeConfig {
    /// How many scene seconds pass per real second
    pub time_scale: f32,
    /// Maximum elapsed time reported for a single tick, so a stalled frame
    /// does not make the controls jump
    pub max_delta_time: f32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            max_delta_time: 0.25,
        }
    }
}

/// Tracks elapsed time between frame ticks
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Configuration
    pub config: TimeConfig,
    /// Time since the first tick in seconds
    pub total_time: f64,
    /// Delta time for this frame (clamped and scaled)
    pub delta_time: f32,
    /// Frame counter
    pub frame_count: u64,
    last_tick: Option<Instant>,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(TimeConfig::default())
    }
}

impl FrameClock {
    pub fn new(config: TimeConfig) -> Self {
        Self {
            config,
            total_time: 0.0,
            delta_time: 0.0,
            frame_count: 0,
            last_tick: None,
        }
    }

    /// Sample the elapsed time since the previous tick. The first tick
    /// reports zero.
    pub fn tick(&mut self, now: Instant) -> f32 {
        let raw = match self.last_tick {
            Some(last) => now.saturating_duration_since(last).as_secs_f32(),
            None => 0.0,
        };
        self.last_tick = Some(now);
        self.update(raw);
        self.delta_time
    }

    /// Update the clock with the raw delta from the previous frame
    pub fn update(&mut self, raw_delta: f32) {
        let clamped = raw_delta.clamp(0.0, self.config.max_delta_time);
        self.frame_count += 1;
        self.delta_time = clamped * self.config.time_scale;
        self.total_time += self.delta_time as f64;
    }

    /// Forget the previous tick so the next one reports zero elapsed time
    pub fn reset(&mut self) {
        self.last_tick = None;
    }
}
