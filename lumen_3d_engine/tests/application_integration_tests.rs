//! Integration tests for the application loop on the headless surface
//!
//! Runs a lit model scene end to end: load through the content cache,
//! several frames with scripted input, unload.
//!
//! Run with: cargo test --test application_integration_tests


use lumen_3d_engine::glam::{Mat3, Mat4, Vec3};
use lumen_3d_engine::lumen3d::content::ContentManager;
use lumen_3d_engine::lumen3d::device::{Gpu, HeadlessGraphicsDevice};
use lumen_3d_engine::lumen3d::input::{InputEvent, Key};
use lumen_3d_engine::lumen3d::log::{self, LogSeverity};
use lumen_3d_engine::lumen3d::platform::HeadlessSurface;
use lumen_3d_engine::lumen3d::resource::{Model, ShaderProgram};
use lumen_3d_engine::lumen3d::{
    Application, ApplicationConfig, ApplicationState, FrameContext, Result, Scene,
};
use serial_test::serial;
use std::rc::Rc;
use test_utils::{content_dir, TestLogger};

// ============================================================================
// TEST SCENE
// ============================================================================

#[derive(Default)]
struct CrateScene {
    shader: Option<Rc<ShaderProgram>>,
    model: Option<Rc<Model>>,
    views: Vec<Mat4>,
    set_unknown_uniform: bool,
}

impl Scene for CrateScene {
    fn load_content(&mut self, _gpu: &Gpu, content: &mut ContentManager) -> Result<()> {
        self.shader = Some(content.get_shader("Shaders/lit.vert", "Shaders/lit.frag")?);
        self.model = Some(content.get_model("Models/crate/crate.obj")?);

        // A second request from another call site hits the cache
        let again = content.get_model("Models/crate/crate.obj")?;
        assert!(Rc::ptr_eq(self.model.as_ref().unwrap(), &again));
        Ok(())
    }

    fn unload_content(&mut self) {
        self.model = None;
        self.shader = None;
    }

    fn render(&mut self, frame: &FrameContext<'_>) -> Result<()> {
        let (Some(shader), Some(model)) = (&self.shader, &self.model) else {
            return Ok(());
        };
        self.views.push(frame.view);

        let world = Mat4::from_rotation_y(frame.time.elapsed as f32);
        let scope = shader.use_program()?;
        scope.set_mat4("model", world);
        scope.set_mat4("view", frame.view);
        scope.set_mat4("projection", frame.projection);
        scope.set_mat3("normal", Mat3::from_mat4(world).inverse().transpose());
        scope.set_vec3("lightPos", Vec3::new(1.2, 1.0, 2.0));
        scope.set_float("material.shininess", 32.0);
        if self.set_unknown_uniform {
            scope.set_vec3("viewPos", frame.camera.position());
        }
        model.draw(&scope)
    }

    fn clear_color(&self) -> [f32; 4] {
        [0.1, 0.1, 0.1, 1.0]
    }
}

fn crate_app(name: &str, surface: impl FnOnce(Gpu) -> HeadlessSurface, scene: CrateScene) -> (Application<CrateScene>, Gpu) {
    let gpu = Gpu::new(HeadlessGraphicsDevice::new());
    let config = ApplicationConfig::default().with_content_root(content_dir(name));
    let app = Application::new(config, Box::new(surface(gpu.clone())), scene);
    (app, gpu)
}

// ============================================================================
// LOOP TESTS
// ============================================================================

#[test]
fn test_integration_run_model_scene() {
    let (mut app, gpu) = crate_app(
        "app_run",
        |gpu| HeadlessSurface::new(gpu, 800, 600).with_frame_limit(5),
        CrateScene::default(),
    );

    app.run().unwrap();

    assert_eq!(app.state(), ApplicationState::Terminated);
    assert_eq!(app.frames_rendered(), 5);
    assert_eq!(gpu.stats().draw_calls, 5);
    assert_eq!(gpu.stats().shader_compiles, 2);
    assert_eq!(gpu.stats().live_objects(), 0);
    assert!(!gpu.has_bindings());
}

#[test]
fn test_integration_view_follows_camera() {
    let (mut app, _gpu) = crate_app(
        "app_view",
        |gpu| {
            HeadlessSurface::new(gpu, 800, 600)
                .with_timestep(0.1)
                .with_frame_limit(4)
                .with_event(0, InputEvent::Key { key: Key::W, pressed: true })
                .with_event(1, InputEvent::Key { key: Key::W, pressed: false })
        },
        CrateScene::default(),
    );

    app.run().unwrap();

    let views = &app.scene().views;
    assert_eq!(views.len(), 4);
    // W held for exactly one update (frame 1), which runs before its render
    assert_ne!(views[0], views[1]);
    assert_eq!(views[1], views[2]);
    assert_eq!(views[2], views[3]);
    assert_eq!(views[3], app.camera().view_matrix());
    assert!(app.camera().position().abs_diff_eq(Vec3::new(0.0, 0.0, 2.75), 1e-5));
}

#[test]
fn test_integration_escape_stops_loop() {
    let (mut app, _gpu) = crate_app(
        "app_escape",
        |gpu| {
            HeadlessSurface::new(gpu, 800, 600)
                .with_frame_limit(1000)
                .with_event(0, InputEvent::Key { key: Key::Escape, pressed: true })
        },
        CrateScene::default(),
    );

    app.run().unwrap();
    assert_eq!(app.frames_rendered(), 2);
}

#[test]
fn test_integration_missing_content_fails_startup() {
    let gpu = Gpu::new(HeadlessGraphicsDevice::new());
    let config = ApplicationConfig::default().with_content_root(std::env::temp_dir().join("lumen3d_it_nowhere"));
    let surface = HeadlessSurface::new(gpu.clone(), 800, 600).with_frame_limit(5);
    let mut app = Application::new(config, Box::new(surface), CrateScene::default());

    let err = app.run().unwrap_err();

    assert!(err.is_load_error());
    assert_eq!(app.frames_rendered(), 0);
    assert_eq!(gpu.stats().live_objects(), 0);
}

// ============================================================================
// LOGGING TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_unknown_uniform_warns_once() {
    let logger = TestLogger::new();
    log::set_logger(logger.clone());

    let (mut app, gpu) = crate_app(
        "app_uniform_warning",
        |gpu| HeadlessSurface::new(gpu, 800, 600).with_frame_limit(3),
        CrateScene { set_unknown_uniform: true, ..Default::default() },
    );
    let result = app.run();
    log::reset_logger();

    // The frame still renders
    result.unwrap();
    assert_eq!(gpu.stats().draw_calls, 3);

    let warnings: Vec<String> = logger
        .messages(LogSeverity::Warn)
        .into_iter()
        .filter(|m| m.contains("viewPos"))
        .collect();
    assert_eq!(warnings.len(), 1);
}
