//! Demo scenes

pub mod cube;
pub mod getting_started;
pub mod lighting;
pub mod model_viewer;

pub use getting_started::GettingStartedScene;
pub use lighting::LightingScene;
pub use model_viewer::ModelScene;

use lumen_3d_engine::glam::{Mat3, Mat4, Vec3};
use lumen_3d_engine::lumen3d::resource::ShaderProgram;

/// Scale of the cube marking the light
const LIGHT_BOX_SCALE: f32 = 0.2;

/// Phong light terms uploaded to the `light` struct of the lit shaders
#[derive(Debug, Clone, Copy)]
pub struct PhongLight {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl Default for PhongLight {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            ambient: Vec3::splat(0.2),
            diffuse: Vec3::splat(0.5),
            specular: Vec3::splat(1.0),
        }
    }
}

impl PhongLight {
    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Upload every term; `program` must be in use
    pub fn apply(&self, program: &ShaderProgram) {
        program.set_vec3("light.position", self.position);
        program.set_vec3("light.ambient", self.ambient);
        program.set_vec3("light.diffuse", self.diffuse);
        program.set_vec3("light.specular", self.specular);
    }
}

/// Inverse transpose of the model matrix's upper 3x3
pub fn normal_matrix(model: Mat4) -> Mat3 {
    Mat3::from_mat4(model).inverse().transpose()
}

/// Small cube drawn where the light is
pub fn light_box_matrix(position: Vec3) -> Mat4 {
    Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(LIGHT_BOX_SCALE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_3d_engine::lumen3d::device::{Gpu, HeadlessGraphicsDevice};
    use lumen_3d_engine::lumen3d::log::{self, LogEntry, Logger};
    use lumen_3d_engine::lumen3d::platform::HeadlessSurface;
    use lumen_3d_engine::lumen3d::{Application, ApplicationConfig, ApplicationState, Scene};
    use serial_test::serial;
    use std::sync::{Arc, Mutex};

    /// Logger keeping the messages of one source
    #[derive(Clone)]
    struct SourceLogger {
        source: &'static str,
        messages: Arc<Mutex<Vec<String>>>,
    }

    impl Logger for SourceLogger {
        fn log(&self, entry: &LogEntry) {
            if entry.source == self.source {
                self.messages.lock().unwrap().push(entry.message.clone());
            }
        }
    }

    /// Run `scene` for `frames` frames against the shipped content
    fn run_headless<S: Scene>(scene: S, frames: u64) -> (Application<S>, Gpu) {
        let gpu = Gpu::new(HeadlessGraphicsDevice::new());
        let surface = HeadlessSurface::new(gpu.clone(), 800, 600).with_frame_limit(frames);
        let config = ApplicationConfig::default()
            .with_content_root(concat!(env!("CARGO_MANIFEST_DIR"), "/Content"));
        let mut app = Application::new(config, Box::new(surface), scene);
        app.run().unwrap();
        (app, gpu)
    }

    #[test]
    fn test_getting_started_draws_ten_cubes_per_frame() {
        let (app, gpu) = run_headless(GettingStartedScene::new(), 3);

        assert_eq!(app.state(), ApplicationState::Terminated);
        assert_eq!(gpu.stats().draw_calls, 30);
        assert_eq!(gpu.stats().vertices_submitted, 30 * 36);
        assert_eq!(gpu.stats().live_objects(), 0);
    }

    #[test]
    fn test_lighting_scene_runs() {
        let (_app, gpu) = run_headless(LightingScene::new(true), 2);

        // Crate and light box
        assert_eq!(gpu.stats().draw_calls, 4);
        assert_eq!(gpu.stats().live_objects(), 0);
    }

    #[test]
    #[serial]
    fn test_model_scene_runs() {
        let (app, gpu) = run_headless(ModelScene::new(), 2);

        assert_eq!(gpu.stats().draw_calls, 4);
        // Six quads as triangles, plus the 36-vertex light box
        assert_eq!(gpu.stats().vertices_submitted, 2 * (36 + 36));
        assert_eq!(app.frames_rendered(), 2);
        assert_eq!(gpu.stats().live_objects(), 0);
    }

    #[test]
    #[serial]
    fn test_model_scene_releases_in_reverse_load_order() {
        let logger = SourceLogger { source: model_viewer::SOURCE, messages: Arc::default() };
        log::set_logger(logger.clone());
        run_headless(ModelScene::new(), 1);
        log::reset_logger();

        let released: Vec<String> = logger.messages.lock().unwrap().clone();
        assert_eq!(
            released,
            vec!["Released light shader", "Released model shader", "Released light box", "Released model"]
        );
    }

    #[test]
    fn test_normal_matrix_undoes_non_uniform_scale() {
        let model = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let normal = normal_matrix(model);
        assert!(normal.x_axis.abs_diff_eq(Vec3::new(0.5, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn test_light_box_matrix() {
        let m = light_box_matrix(Vec3::new(1.0, 2.0, 3.0));
        assert!(m.transform_point3(Vec3::ONE).abs_diff_eq(Vec3::new(1.2, 2.2, 3.2), 1e-6));
    }
}
