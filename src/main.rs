//! Diorama - Asset-driven interactive 3D scene runtime
//!
//! Loads the scene manifest, composes the scene, and runs the render loop
//! alongside the stdin input and audio tasks.

mod input;
mod manifest;
mod session;
mod settings;
mod state;

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use diorama_audio::{AudioConfig, AudioEngine, Listener, SoundDescriptor};
use diorama_game::{IntervalPacer, MouseLook, RenderLoopScheduler, SharedPose, StopHandle};
use diorama_render::HeadlessRenderer;
use tokio::task::LocalSet;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::input::input_task;
use crate::manifest::SceneManifest;
use crate::session::Session;
use crate::settings::DioramaSettings;

const DEFAULT_MANIFEST: &str = "scene.toml";

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Starting Diorama v{}", env!("CARGO_PKG_VERSION"));

    let manifest_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST));
    let settings = DioramaSettings::load();
    if DioramaSettings::settings_path().is_some_and(|path| !path.exists()) {
        if let Err(e) = settings.save() {
            warn!("Could not write default settings: {}", e);
        }
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build async runtime")?;
    let local = LocalSet::new();
    let result = local.block_on(&runtime, run(manifest_path, settings));

    // The stdin reader may still be parked on a blocking read.
    drop(local);
    runtime.shutdown_background();
    result
}

async fn run(manifest_path: PathBuf, settings: DioramaSettings) -> Result<()> {
    let manifest = SceneManifest::load(&manifest_path)?;
    let base_path = settings
        .assets
        .base_path
        .clone()
        .unwrap_or_else(|| SceneManifest::base_dir(&manifest_path));
    info!("Resolving assets against {:?}", base_path);

    let pose = SharedPose::new();
    let mut session = Session::new(&settings, Box::new(HeadlessRenderer::new()));
    session
        .start(&manifest, &base_path, Box::new(pose.clone()))
        .await
        .context("Failed to start session")?;
    info!(
        "Session {:?}: {} geometries, {} models, {} lights, controls bound: {}",
        session.state(),
        session.geometries().len(),
        session.models().len(),
        session.lights().len(),
        session.controls().is_bound()
    );
    let session = Rc::new(RefCell::new(session));

    let mut scheduler = RenderLoopScheduler::new(settings.render_loop.time_config())
        .with_max_frames(settings.render_loop.max_frames);
    let stop = scheduler.stop_handle();

    let ctrl_c_stop = stop.clone();
    tokio::task::spawn_local(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, stopping");
            ctrl_c_stop.stop();
        }
    });

    tokio::task::spawn_local(input_task(
        Rc::clone(&session),
        pose,
        MouseLook::new(&settings.controls),
        stop.clone(),
    ));

    let audio = tokio::task::spawn_local(audio_task(
        Rc::clone(&session),
        manifest.sounds.clone(),
        base_path,
        settings.audio.to_config(),
        stop.clone(),
    ));

    let mut pacer = IntervalPacer::new(settings.render_loop.target_fps);
    let report = scheduler
        .run(&mut pacer, &*session)
        .await
        .context("Render loop did not start")?;

    stop.stop();
    if let Err(e) = audio.await {
        warn!("Audio task ended abnormally: {}", e);
    }

    info!(
        "Shutting down after {} frames ({} render failures)",
        report.ticks, report.render_failures
    );
    Ok(())
}

/// Start the scene's sounds, then keep the listener on the camera until the
/// loop stops. Runs beside the render loop and never gates it.
async fn audio_task(
    session: Rc<RefCell<Session>>,
    sounds: Vec<SoundDescriptor>,
    base_path: PathBuf,
    config: AudioConfig,
    stop: StopHandle,
) {
    if sounds.is_empty() {
        return;
    }

    let mut engine = match AudioEngine::new(config) {
        Ok(engine) => engine,
        Err(e) => {
            warn!("Audio disabled: {}", e);
            return;
        }
    };

    let Some(scene) = session.borrow().scene().cloned() else {
        return;
    };
    engine.set_listener(Listener::from_camera(session.borrow().camera()));
    engine.setup(&base_path, &sounds, &scene).await;

    let mut ticker = tokio::time::interval(Duration::from_millis(50));
    while !stop.is_stopped() {
        ticker.tick().await;
        let listener = Listener::from_camera(session.borrow().camera());
        engine.set_listener(listener);
        engine.update();
    }

    let fade_out = Duration::from_millis(250);
    engine.stop_all(fade_out);
    tokio::time::sleep(fade_out).await;
}
