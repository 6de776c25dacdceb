//! Model viewer - an OBJ model lit by a light circling it

use lumen_3d_engine::glam::{Mat4, Vec3};
use lumen_3d_engine::lumen3d::content::ContentManager;
use lumen_3d_engine::lumen3d::device::{Gpu, PrimitiveTopology};
use lumen_3d_engine::lumen3d::resource::{Model, ShaderProgram, VertexArray};
use lumen_3d_engine::lumen3d::{FrameContext, Result, Scene};
use lumen_3d_engine::engine_debug;
use std::rc::Rc;

use super::cube::{cube_vertex_array, CubeAttributes};
use super::{light_box_matrix, normal_matrix, PhongLight};

pub(crate) const SOURCE: &str = "lumen3d_demo::ModelScene";
const MODEL_PATH: &str = "Models/crate/crate.obj";
const ORBIT_RADIUS: f32 = 4.0;
const INITIAL_LIGHT: Vec3 = Vec3::new(1.2, 1.0, 2.0);
const SHININESS: f32 = 128.0;

/// Light position after `elapsed` seconds; the height stays fixed
pub fn orbit_light(elapsed: f64) -> Vec3 {
    let t = elapsed as f32;
    Vec3::new(t.sin() * ORBIT_RADIUS, INITIAL_LIGHT.y, t.cos() * ORBIT_RADIUS)
}

pub struct ModelScene {
    model_path: String,
    model: Option<Rc<Model>>,
    model_shader: Option<Rc<ShaderProgram>>,
    light_shader: Option<Rc<ShaderProgram>>,
    light_box: Option<VertexArray>,
    light_position: Vec3,
}

impl ModelScene {
    pub fn new() -> Self {
        Self::with_model(MODEL_PATH)
    }

    /// Show another OBJ file under the content root
    pub fn with_model(path: impl Into<String>) -> Self {
        Self {
            model_path: path.into(),
            model: None,
            model_shader: None,
            light_shader: None,
            light_box: None,
            light_position: INITIAL_LIGHT,
        }
    }
}

impl Default for ModelScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for ModelScene {
    fn load_content(&mut self, gpu: &Gpu, content: &mut ContentManager) -> Result<()> {
        self.model = Some(content.get_model(&self.model_path)?);
        self.light_box = Some(cube_vertex_array(gpu, CubeAttributes::Positions)?);

        let model_shader = content.get_shader("Shaders/model_loading.vert", "Shaders/model_loading.frag")?;
        {
            let scope = model_shader.use_program()?;
            scope.set_float("material.shininess", SHININESS);
            PhongLight::default().at(self.light_position).apply(&scope);
        }
        self.model_shader = Some(model_shader);
        self.light_shader = Some(content.get_shader("Shaders/light_box.vert", "Shaders/light_box.frag")?);
        Ok(())
    }

    fn unload_content(&mut self) {
        // Reverse of load order
        release(&mut self.light_shader, "light shader");
        release(&mut self.model_shader, "model shader");
        release(&mut self.light_box, "light box");
        release(&mut self.model, "model");
    }

    fn render(&mut self, frame: &FrameContext<'_>) -> Result<()> {
        self.light_position = orbit_light(frame.time.elapsed);

        let (Some(model), Some(model_shader), Some(light_shader), Some(light_box)) =
            (&self.model, &self.model_shader, &self.light_shader, &self.light_box)
        else {
            return Ok(());
        };

        {
            let world = Mat4::IDENTITY;
            let scope = model_shader.use_program()?;
            scope.set_mat4("model", world);
            scope.set_mat4("view", frame.view);
            scope.set_mat4("projection", frame.projection);
            scope.set_mat3("normal", normal_matrix(world));
            scope.set_vec3("viewPos", frame.camera.position());
            scope.set_vec3("light.position", self.light_position);
            model.draw(&scope)?;
        }

        let scope = light_shader.use_program()?;
        scope.set_mat4("model", light_box_matrix(self.light_position));
        scope.set_mat4("view", frame.view);
        scope.set_mat4("projection", frame.projection);
        let bound = light_box.bind()?;
        bound.draw(PrimitiveTopology::Triangles)
    }
}

fn release<T>(slot: &mut Option<T>, what: &str) {
    if slot.take().is_some() {
        engine_debug!(SOURCE, "Released {}", what);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_orbit_starts_in_front() {
        assert!(orbit_light(0.0).abs_diff_eq(Vec3::new(0.0, 1.0, 4.0), 1e-6));
    }

    #[test]
    fn test_light_orbit_keeps_radius() {
        for step in 0..8 {
            let p = orbit_light(step as f64 * 0.7);
            assert!((p.x.hypot(p.z) - ORBIT_RADIUS).abs() < 1e-4);
        }
    }
}
