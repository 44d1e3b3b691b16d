//! The session: owns the asset managers, the composed scene, the camera,
//! and the controls for one run of a scene manifest.

use std::path::Path;

use diorama_assets::{
    AssetClass, AssetLoadError, GeometryFetcher, GeometryManager, LightManager, ModelFetcher, ModelManager,
};
use diorama_game::{ControlsBinder, FrameTarget, PoseSource, SchedulerError};
use diorama_render::{
    CameraRig, DuplicateIdentifierError, PointerSample, RaycastResolver, RenderError, Renderer, SceneComposer,
    SceneGraph,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::manifest::SceneManifest;
use crate::settings::DioramaSettings;
use crate::state::{LoadingPhase, SessionState};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("{class} batch failed")]
    AssetLoad {
        class: &'static str,
        #[source]
        source: AssetLoadError,
    },

    #[error("scene composition failed")]
    Compose(#[from] DuplicateIdentifierError),

    #[error("session is already started")]
    AlreadyStarted,
}

pub struct Session {
    state: SessionState,
    geometries: GeometryManager,
    models: ModelManager,
    lights: LightManager,
    composer: SceneComposer,
    scene: Option<SceneGraph>,
    camera: CameraRig,
    controls: ControlsBinder,
    resolver: RaycastResolver,
    renderer: Box<dyn Renderer>,
}

impl Session {
    pub fn new(settings: &DioramaSettings, renderer: Box<dyn Renderer>) -> Self {
        Self {
            state: SessionState::Stopped,
            geometries: GeometryManager::new(AssetClass::Geometry),
            models: ModelManager::new(AssetClass::Model),
            lights: LightManager::new(AssetClass::Light),
            composer: SceneComposer::new(),
            scene: None,
            camera: CameraRig::new(settings.video.camera_config(), settings.video.width, settings.video.height),
            controls: ControlsBinder::new(settings.controls.clone()),
            resolver: RaycastResolver::new(),
            renderer,
        }
    }

    /// Load every asset of `manifest`, compose the scene, place the camera,
    /// and bind `pose` to it. On failure the session is left stopped with
    /// no scene, an unplaced camera, and unbound controls.
    pub async fn start(
        &mut self,
        manifest: &SceneManifest,
        base_path: &Path,
        pose: Box<dyn PoseSource>,
    ) -> Result<(), SessionError> {
        if self.state != SessionState::Stopped {
            return Err(SessionError::AlreadyStarted);
        }

        match self.try_start(manifest, base_path, pose).await {
            Ok(()) => {
                self.state = SessionState::Ready;
                info!("Session ready");
                Ok(())
            }
            Err(e) => {
                warn!("Session startup failed: {}", e);
                self.reset();
                Err(e)
            }
        }
    }

    async fn try_start(
        &mut self,
        manifest: &SceneManifest,
        base_path: &Path,
        pose: Box<dyn PoseSource>,
    ) -> Result<(), SessionError> {
        self.enter(LoadingPhase::Assets);
        let geometry_fetcher = GeometryFetcher::new(base_path);
        let model_fetcher = ModelFetcher::new(base_path);
        let light_fetcher = manifest.light_fetcher();
        let light_descriptors = manifest.light_descriptors();

        let Self {
            geometries,
            models,
            lights,
            ..
        } = self;
        let (geometry_result, model_result, light_result) = tokio::join!(
            geometries.load_all(&geometry_fetcher, &manifest.geometries),
            models.load_all(&model_fetcher, &manifest.models),
            lights.load_all(&light_fetcher, &light_descriptors),
        );

        let geometry_assets = geometry_result.map_err(|source| SessionError::AssetLoad {
            class: AssetClass::Geometry.name(),
            source,
        })?;
        let model_assets = model_result.map_err(|source| SessionError::AssetLoad {
            class: AssetClass::Model.name(),
            source,
        })?;
        let light_assets = light_result.map_err(|source| SessionError::AssetLoad {
            class: AssetClass::Light.name(),
            source,
        })?;

        self.enter(LoadingPhase::Composing);
        let scene = self.composer.compose(&geometry_assets, &model_assets, &light_assets)?;

        self.enter(LoadingPhase::Camera);
        let placement = &manifest.camera;
        self.camera
            .set_position(placement.position.x, placement.position.y, placement.position.z);
        self.camera.look_at(placement.target);

        self.enter(LoadingPhase::Controls);
        self.controls.bind(pose, &self.camera);

        self.scene = Some(scene);
        Ok(())
    }

    fn enter(&mut self, phase: LoadingPhase) {
        info!("[{:>3.0}%] {}", phase.progress() * 100.0, phase.description());
        self.state = SessionState::Loading(phase);
    }

    /// Back to `Stopped`. Loaded assets stay with their managers.
    fn reset(&mut self) {
        self.state = SessionState::Stopped;
        self.scene = None;
        self.camera = CameraRig::new(self.camera.config.clone(), self.camera.viewport().0, self.camera.viewport().1);
        self.controls.unbind();
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn scene(&self) -> Option<&SceneGraph> {
        self.scene.as_ref()
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn controls(&self) -> &ControlsBinder {
        &self.controls
    }

    pub fn geometries(&self) -> &GeometryManager {
        &self.geometries
    }

    pub fn models(&self) -> &ModelManager {
        &self.models
    }

    pub fn lights(&self) -> &LightManager {
        &self.lights
    }

    pub fn on_viewport_resize(&mut self, width: u32, height: u32) {
        self.camera.on_viewport_resize(width, height);
    }

    /// Identifier of the nearest node under a pointer given in viewport
    /// pixels
    pub fn pick(&self, px: f32, py: f32) -> Option<String> {
        let scene = self.scene.as_ref()?;
        let (width, height) = self.camera.viewport();
        let pointer = PointerSample::from_pixels(px, py, width, height)?;
        self.resolver.resolve(pointer, &self.camera, scene)
    }
}

impl FrameTarget for Session {
    fn readiness(&self) -> Result<(), SchedulerError> {
        match &self.scene {
            None => return Err(SchedulerError::NotReady("scene not composed".into())),
            Some(scene) if scene.is_empty() => {
                return Err(SchedulerError::NotReady("scene is empty".into()));
            }
            Some(_) => {}
        }
        if !self.camera.has_position() {
            return Err(SchedulerError::NotReady("camera has no position".into()));
        }
        if !self.controls.is_bound() {
            return Err(SchedulerError::NotReady("controls not bound".into()));
        }
        Ok(())
    }

    fn update_controls(&mut self, elapsed: f32) {
        self.controls.update(elapsed, &mut self.camera);
    }

    fn render_frame(&mut self) -> Result<(), RenderError> {
        let Some(scene) = &self.scene else {
            return Err(RenderError::Frame("no scene".into()));
        };
        self.renderer.render(scene, &self.camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::path::PathBuf;
    use std::rc::Rc;
    use std::time::{Duration, Instant};

    use diorama_assets::{AssetDescriptor, AssetError};
    use diorama_core::Vec3;
    use diorama_game::{FramePacer, PoseSample, RenderLoopScheduler, SharedPose};
    use diorama_render::HeadlessRenderer;

    use crate::manifest::{CameraPlacement, LightEntry};

    fn demos_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos")
    }

    fn cube_manifest() -> SceneManifest {
        SceneManifest {
            camera: CameraPlacement {
                position: Vec3::ZERO,
                target: Vec3::new(0.0, 0.0, -1.0),
            },
            geometries: vec![
                AssetDescriptor::new("Cube", "procedural:box").with_position(Vec3::new(0.0, 0.0, -5.5)),
                AssetDescriptor::new("Skybox", "procedural:sphere")
                    .with_scale(Vec3::splat(100.0))
                    .unpickable(),
            ],
            lights: vec![LightEntry {
                descriptor: AssetDescriptor::new("Sun", "directional").with_position(Vec3::Y),
                color: None,
                intensity: Some(0.8),
                ground_color: None,
                range: None,
            }],
            ..Default::default()
        }
    }

    fn session() -> Session {
        Session::new(&DioramaSettings::default(), Box::new(HeadlessRenderer::new()))
    }

    #[tokio::test]
    async fn startup_composes_and_binds() {
        let mut session = session();
        session
            .start(&cube_manifest(), &demos_dir(), Box::new(SharedPose::new()))
            .await
            .unwrap();

        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.scene().unwrap().len(), 3);
        assert!(session.camera().has_position());
        assert!(session.controls().is_bound());
        assert!(session.readiness().is_ok());
    }

    #[tokio::test]
    async fn center_pick_returns_cube() {
        let mut session = session();
        session
            .start(&cube_manifest(), &demos_dir(), Box::new(SharedPose::new()))
            .await
            .unwrap();

        let (w, h) = session.camera().viewport();
        assert_eq!(session.pick(w as f32 / 2.0, h as f32 / 2.0).as_deref(), Some("Cube"));
        assert_eq!(session.pick(0.0, 0.0), None);
    }

    #[tokio::test]
    async fn loads_models_from_disk() {
        let mut manifest = cube_manifest();
        manifest.models.push(AssetDescriptor::new("Beacon", "models/beacon.gltf"));

        let mut session = session();
        session
            .start(&manifest, &demos_dir(), Box::new(SharedPose::new()))
            .await
            .unwrap();

        let beacon = session.scene().unwrap().get("Beacon").unwrap();
        assert_eq!(beacon.kind(), diorama_render::NodeKind::Model);
        assert_eq!(session.models().len(), 1);
    }

    #[tokio::test]
    async fn failed_load_leaves_session_stopped() {
        let mut manifest = cube_manifest();
        manifest.models.push(AssetDescriptor::new("Fox", "models/missing-fox.glb"));

        let mut session = session();
        let err = session
            .start(&manifest, &demos_dir(), Box::new(SharedPose::new()))
            .await
            .unwrap_err();

        match err {
            SessionError::AssetLoad { class, source } => {
                assert_eq!(class, "model");
                assert_eq!(source.identifier, "Fox");
                assert!(matches!(source.cause, AssetError::NotFound(_)));
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(session.state(), SessionState::Stopped);
        assert!(session.scene().is_none());
        assert!(!session.camera().has_position());
        assert!(!session.controls().is_bound());
        // Geometry loaded concurrently and stays with its manager.
        assert!(session.geometries().get("Cube").is_some());
        assert!(matches!(session.readiness(), Err(SchedulerError::NotReady(_))));
    }

    #[tokio::test]
    async fn first_failing_class_is_reported() {
        let mut manifest = cube_manifest();
        manifest.geometries.push(AssetDescriptor::new("Rock", "rock.glb"));
        manifest.lights[0].descriptor.source = "laser".into();

        let err = session()
            .start(&manifest, &demos_dir(), Box::new(SharedPose::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::AssetLoad { class: "geometry", .. }));
    }

    #[tokio::test]
    async fn duplicate_identifier_aborts_startup() {
        let mut manifest = cube_manifest();
        manifest.lights[0].descriptor.identifier = "Cube".into();

        let mut session = session();
        let err = session
            .start(&manifest, &demos_dir(), Box::new(SharedPose::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Compose(ref e) if e.identifier == "Cube"));
        assert_eq!(session.state(), SessionState::Stopped);
    }

    #[tokio::test]
    async fn empty_scene_is_not_renderable() {
        let manifest = SceneManifest::default();
        let mut session = session();
        session
            .start(&manifest, &demos_dir(), Box::new(SharedPose::new()))
            .await
            .unwrap();
        assert!(matches!(session.readiness(), Err(SchedulerError::NotReady(_))));
    }

    /// Counts frames and fails every other one
    struct FlakyRenderer {
        frames: Rc<Cell<u32>>,
    }

    impl Renderer for FlakyRenderer {
        fn render(&mut self, _scene: &SceneGraph, _camera: &CameraRig) -> Result<(), RenderError> {
            self.frames.set(self.frames.get() + 1);
            if self.frames.get() % 2 == 0 {
                return Err(RenderError::SurfaceLost);
            }
            Ok(())
        }
    }

    struct StepPacer(Instant);

    impl FramePacer for StepPacer {
        async fn next_frame(&mut self) -> Instant {
            tokio::task::yield_now().await;
            self.0 += Duration::from_millis(16);
            self.0
        }
    }

    #[tokio::test]
    async fn render_loop_drives_session() {
        let frames = Rc::new(Cell::new(0));
        let mut settings = DioramaSettings::default();
        settings.controls.smoothing = 1.0;
        let mut session = Session::new(
            &settings,
            Box::new(FlakyRenderer {
                frames: Rc::clone(&frames),
            }),
        );
        let pose = SharedPose::new();
        session
            .start(&cube_manifest(), &demos_dir(), Box::new(pose.clone()))
            .await
            .unwrap();
        pose.publish(PoseSample::YawPitch {
            yaw: std::f32::consts::FRAC_PI_2,
            pitch: 0.0,
        });

        let session = Rc::new(RefCell::new(session));
        let mut scheduler = RenderLoopScheduler::default().with_max_frames(Some(4));
        let report = scheduler
            .run(&mut StepPacer(Instant::now()), &*session)
            .await
            .unwrap();

        assert_eq!(report.ticks, 4);
        assert_eq!(report.render_failures, 2);
        assert_eq!(frames.get(), 4);
        let forward = session.borrow().camera().forward();
        assert!((forward - Vec3::X).length() < 1e-4, "{forward:?}");
    }
}
