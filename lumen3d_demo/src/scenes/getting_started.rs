//! Getting started - ten textured cubes blending two textures

use lumen_3d_engine::glam::{Mat4, Vec3};
use lumen_3d_engine::lumen3d::content::ContentManager;
use lumen_3d_engine::lumen3d::device::{Gpu, PrimitiveTopology};
use lumen_3d_engine::lumen3d::resource::{ShaderProgram, Texture, VertexArray};
use lumen_3d_engine::lumen3d::{FrameContext, Result, Scene};
use std::rc::Rc;

use super::cube::{cube_vertex_array, CubeAttributes};

const CUBE_POSITIONS: [Vec3; 10] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(2.0, 5.0, -15.0),
    Vec3::new(-1.5, -2.2, -2.5),
    Vec3::new(-3.8, -2.0, -12.3),
    Vec3::new(2.4, -0.4, -3.5),
    Vec3::new(-1.7, 3.0, -7.5),
    Vec3::new(1.3, -2.0, -2.5),
    Vec3::new(1.5, 2.0, -2.5),
    Vec3::new(1.5, 0.2, -1.5),
    Vec3::new(-1.3, 1.0, -1.5),
];

/// Cornflower blue
const CLEAR_COLOR: [f32; 4] = [0.393, 0.585, 0.930, 1.0];

#[derive(Default)]
pub struct GettingStartedScene {
    box_texture: Option<Rc<Texture>>,
    face_texture: Option<Rc<Texture>>,
    cube: Option<VertexArray>,
    shader: Option<Rc<ShaderProgram>>,
}

impl GettingStartedScene {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Model matrix of the i-th cube: translated, then turned 20 degrees per index
pub fn cube_model_matrix(index: usize) -> Mat4 {
    let angle = (20.0 * index as f32).to_radians();
    Mat4::from_translation(CUBE_POSITIONS[index])
        * Mat4::from_axis_angle(Vec3::new(1.0, 0.3, 0.5).normalize(), angle)
}

impl Scene for GettingStartedScene {
    fn load_content(&mut self, gpu: &Gpu, content: &mut ContentManager) -> Result<()> {
        self.box_texture = Some(content.get_texture("Textures/container.png")?);
        self.face_texture = Some(content.get_texture("Textures/awesomeface.png")?);
        self.cube = Some(cube_vertex_array(gpu, CubeAttributes::Textured)?);

        let shader = content.get_shader(
            "Shaders/getting_started.vert",
            "Shaders/getting_started.frag",
        )?;
        {
            let scope = shader.use_program()?;
            scope.set_int("boxTexture", 0);
            scope.set_int("faceTexture", 1);
        }
        self.shader = Some(shader);
        Ok(())
    }

    fn unload_content(&mut self) {
        self.shader = None;
        self.cube = None;
        self.face_texture = None;
        self.box_texture = None;
    }

    fn render(&mut self, frame: &FrameContext<'_>) -> Result<()> {
        let (Some(box_texture), Some(face_texture), Some(cube), Some(shader)) =
            (&self.box_texture, &self.face_texture, &self.cube, &self.shader)
        else {
            return Ok(());
        };

        let _box_unit = box_texture.bind_to_unit(0)?;
        let _face_unit = face_texture.bind_to_unit(1)?;
        let bound = cube.bind()?;
        let scope = shader.use_program()?;

        scope.set_mat4("view", frame.view);
        scope.set_mat4("projection", frame.projection);

        for index in 0..CUBE_POSITIONS.len() {
            scope.set_mat4("model", cube_model_matrix(index));
            bound.draw(PrimitiveTopology::Triangles)?;
        }
        Ok(())
    }

    fn clear_color(&self) -> [f32; 4] {
        CLEAR_COLOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_cube_is_untransformed() {
        assert_eq!(cube_model_matrix(0), Mat4::IDENTITY);
    }

    #[test]
    fn test_cube_translation_is_kept() {
        let model = cube_model_matrix(3);
        assert!(model.w_axis.truncate().abs_diff_eq(Vec3::new(-3.8, -2.0, -12.3), 1e-6));
    }
}
