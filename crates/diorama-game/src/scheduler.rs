//! Render loop scheduling
//!
//! The loop is cooperative: each tick waits on the host's frame pacing,
//! samples elapsed time, updates the controls, then renders. Everything
//! runs on the calling task, so the frame target lives in a `RefCell` and
//! is only borrowed between suspension points.

use std::cell::RefCell;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use diorama_core::{FrameClock, TimeConfig};
use diorama_render::RenderError;
use thiserror::Error;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// The scene, camera, or controls are not set up yet
    #[error("render loop not ready: {0}")]
    NotReady(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

/// Cross-task stop request for a running loop
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Clear a previous stop request
    pub fn reset(&self) {
        self.stopped.store(false, Ordering::SeqCst);
    }
}

/// The host's frame pacing primitive
pub trait FramePacer {
    /// Wait for the next frame and return its timestamp
    fn next_frame(&mut self) -> impl Future<Output = Instant>;
}

/// Fixed-rate pacing on a tokio interval. Late frames are skipped rather
/// than replayed in a burst.
pub struct IntervalPacer {
    interval: Interval,
}

impl IntervalPacer {
    pub fn new(target_fps: u32) -> Self {
        let period = Duration::from_secs_f64(1.0 / target_fps.max(1) as f64);
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }
}

impl FramePacer for IntervalPacer {
    async fn next_frame(&mut self) -> Instant {
        self.interval.tick().await.into_std()
    }
}

/// What the loop drives each tick
pub trait FrameTarget {
    /// `Ok` once a populated scene, a positioned camera, and bound controls
    /// exist
    fn readiness(&self) -> Result<(), SchedulerError>;

    fn update_controls(&mut self, elapsed: f32);

    fn render_frame(&mut self) -> Result<(), RenderError>;
}

/// Summary of a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopReport {
    pub ticks: u64,
    pub render_failures: u64,
}

pub struct RenderLoopScheduler {
    state: LoopState,
    stop: StopHandle,
    clock: FrameClock,
    max_frames: Option<u64>,
}

impl RenderLoopScheduler {
    pub fn new(time: TimeConfig) -> Self {
        Self {
            state: LoopState::Stopped,
            stop: StopHandle::new(),
            clock: FrameClock::new(time),
            max_frames: None,
        }
    }

    /// Stop on its own after `frames` ticks
    pub fn with_max_frames(mut self, frames: Option<u64>) -> Self {
        self.max_frames = frames;
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Run the loop until stopped. Refuses to start, staying `Stopped`,
    /// when the target is not ready.
    pub async fn run<P, T>(&mut self, pacer: &mut P, target: &RefCell<T>) -> Result<LoopReport, SchedulerError>
    where
        P: FramePacer,
        T: FrameTarget,
    {
        if let Err(err) = target.borrow().readiness() {
            warn!("Render loop refused to start: {}", err);
            return Err(err);
        }

        self.state = LoopState::Running;
        self.clock.reset();
        info!("Render loop started");

        let mut report = LoopReport::default();
        loop {
            if self.stop.is_stopped() {
                debug!("Stop requested");
                break;
            }
            if self.max_frames.is_some_and(|max| report.ticks >= max) {
                debug!("Reached frame limit of {}", report.ticks);
                break;
            }

            let now = pacer.next_frame().await;
            if self.stop.is_stopped() {
                debug!("Stop requested");
                break;
            }

            let elapsed = self.clock.tick(now);
            let mut frame = target.borrow_mut();
            frame.update_controls(elapsed);
            if let Err(err) = frame.render_frame() {
                report.render_failures += 1;
                warn!("Frame {} failed to render: {}", report.ticks, err);
            }
            drop(frame);
            report.ticks += 1;
        }

        self.state = LoopState::Stopped;
        info!(
            "Render loop stopped after {} ticks ({} failed)",
            report.ticks, report.render_failures
        );
        Ok(report)
    }
}

impl Default for RenderLoopScheduler {
    fn default() -> Self {
        Self::new(TimeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns immediately with timestamps one step apart
    struct StepPacer {
        now: Instant,
        step: Duration,
    }

    impl StepPacer {
        fn new() -> Self {
            Self {
                now: Instant::now(),
                step: Duration::from_millis(16),
            }
        }
    }

    impl FramePacer for StepPacer {
        async fn next_frame(&mut self) -> Instant {
            tokio::task::yield_now().await;
            self.now += self.step;
            self.now
        }
    }

    #[derive(Default)]
    struct Recorder {
        ready: bool,
        events: Vec<String>,
        elapsed: Vec<f32>,
        fail_frames: Vec<usize>,
        renders: usize,
        stop_after: Option<(usize, StopHandle)>,
    }

    impl FrameTarget for Recorder {
        fn readiness(&self) -> Result<(), SchedulerError> {
            if self.ready {
                Ok(())
            } else {
                Err(SchedulerError::NotReady("scene not composed".into()))
            }
        }

        fn update_controls(&mut self, elapsed: f32) {
            self.events.push("controls".into());
            self.elapsed.push(elapsed);
        }

        fn render_frame(&mut self) -> Result<(), RenderError> {
            self.events.push("render".into());
            let frame = self.renders;
            self.renders += 1;
            if let Some((after, stop)) = &self.stop_after {
                if self.renders >= *after {
                    stop.stop();
                }
            }
            if self.fail_frames.contains(&frame) {
                return Err(RenderError::Frame("device busy".into()));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn refuses_to_start_before_ready() {
        let mut scheduler = RenderLoopScheduler::default();
        let target = RefCell::new(Recorder::default());

        let err = scheduler.run(&mut StepPacer::new(), &target).await.unwrap_err();
        assert!(matches!(err, SchedulerError::NotReady(_)));
        assert_eq!(scheduler.state(), LoopState::Stopped);
        assert!(target.borrow().events.is_empty());
    }

    #[tokio::test]
    async fn controls_update_before_render_each_tick() {
        let mut scheduler = RenderLoopScheduler::default().with_max_frames(Some(3));
        let target = RefCell::new(Recorder {
            ready: true,
            ..Default::default()
        });

        let report = scheduler.run(&mut StepPacer::new(), &target).await.unwrap();
        assert_eq!(report.ticks, 3);
        assert_eq!(
            target.borrow().events,
            vec!["controls", "render", "controls", "render", "controls", "render"]
        );

        let elapsed = target.borrow().elapsed.clone();
        assert_eq!(elapsed[0], 0.0);
        assert!((elapsed[1] - 0.016).abs() < 1e-4);
        assert_eq!(scheduler.state(), LoopState::Stopped);
    }

    #[tokio::test]
    async fn stop_flag_ends_the_loop() {
        let mut scheduler = RenderLoopScheduler::default();
        let target = RefCell::new(Recorder {
            ready: true,
            stop_after: Some((5, scheduler.stop_handle())),
            ..Default::default()
        });

        let report = scheduler.run(&mut StepPacer::new(), &target).await.unwrap();
        assert_eq!(report.ticks, 5);
        assert_eq!(scheduler.state(), LoopState::Stopped);
    }

    #[tokio::test]
    async fn stop_before_start_runs_no_ticks() {
        let mut scheduler = RenderLoopScheduler::default();
        scheduler.stop_handle().stop();
        let target = RefCell::new(Recorder {
            ready: true,
            ..Default::default()
        });

        let report = scheduler.run(&mut StepPacer::new(), &target).await.unwrap();
        assert_eq!(report.ticks, 0);
        assert!(target.borrow().events.is_empty());
    }

    #[tokio::test]
    async fn render_errors_are_skipped() {
        let mut scheduler = RenderLoopScheduler::default().with_max_frames(Some(4));
        let target = RefCell::new(Recorder {
            ready: true,
            fail_frames: vec![1, 2],
            ..Default::default()
        });

        let report = scheduler.run(&mut StepPacer::new(), &target).await.unwrap();
        assert_eq!(report, LoopReport { ticks: 4, render_failures: 2 });
        assert_eq!(target.borrow().renders, 4);
    }

    #[tokio::test]
    async fn interval_pacer_advances() {
        let mut pacer = IntervalPacer::new(240);
        let first = pacer.next_frame().await;
        let second = pacer.next_frame().await;
        assert!(second > first);
    }
}
