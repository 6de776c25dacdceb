//! Lighting - one crate lit by a point light, with diffuse and specular maps

use lumen_3d_engine::glam::{Mat4, Vec3};
use lumen_3d_engine::lumen3d::content::ContentManager;
use lumen_3d_engine::lumen3d::device::{Gpu, PrimitiveTopology};
use lumen_3d_engine::lumen3d::resource::{ImageFileDecoder, ShaderProgram, Texture, VertexArray};
use lumen_3d_engine::lumen3d::{FrameContext, Result, Scene};
use std::rc::Rc;

use super::cube::{cube_vertex_array, CubeAttributes};
use super::{light_box_matrix, normal_matrix, PhongLight};

const LIGHT_POSITION: Vec3 = Vec3::new(1.2, 1.0, 2.0);
const SHININESS: f32 = 128.0;

pub struct LightingScene {
    decoder: ImageFileDecoder,
    diffuse_map: Option<Texture>,
    specular_map: Option<Texture>,
    object: Option<VertexArray>,
    light_box: Option<VertexArray>,
    object_shader: Option<Rc<ShaderProgram>>,
    light_shader: Option<Rc<ShaderProgram>>,
}

impl LightingScene {
    /// `flip_textures` matches the content cache's decoder setting
    pub fn new(flip_textures: bool) -> Self {
        Self {
            decoder: ImageFileDecoder::new(flip_textures),
            diffuse_map: None,
            specular_map: None,
            object: None,
            light_box: None,
            object_shader: None,
            light_shader: None,
        }
    }
}

impl Scene for LightingScene {
    fn load_content(&mut self, gpu: &Gpu, content: &mut ContentManager) -> Result<()> {
        // Owned by the scene, outside the cache
        self.diffuse_map = Some(Texture::from_file(
            gpu,
            content.resolve("Textures/container2.png"),
            Default::default(),
            &self.decoder,
        )?);
        self.specular_map = Some(Texture::from_file(
            gpu,
            content.resolve("Textures/container2_specular.png"),
            Default::default(),
            &self.decoder,
        )?);

        self.object = Some(cube_vertex_array(gpu, CubeAttributes::Lit)?);
        self.light_box = Some(cube_vertex_array(gpu, CubeAttributes::Positions)?);

        let object_shader = content.get_shader("Shaders/lighting.vert", "Shaders/lighting.frag")?;
        {
            let scope = object_shader.use_program()?;
            scope.set_int("material.diffuse", 0);
            scope.set_int("material.specular", 1);
            scope.set_float("material.shininess", SHININESS);
            PhongLight::default().at(LIGHT_POSITION).apply(&scope);
        }
        self.object_shader = Some(object_shader);
        self.light_shader = Some(content.get_shader("Shaders/light_box.vert", "Shaders/light_box.frag")?);
        Ok(())
    }

    fn unload_content(&mut self) {
        self.light_shader = None;
        self.object_shader = None;
        self.light_box = None;
        self.object = None;
        self.specular_map = None;
        self.diffuse_map = None;
    }

    fn render(&mut self, frame: &FrameContext<'_>) -> Result<()> {
        let (Some(diffuse), Some(specular), Some(object), Some(light_box), Some(object_shader), Some(light_shader)) = (
            &self.diffuse_map,
            &self.specular_map,
            &self.object,
            &self.light_box,
            &self.object_shader,
            &self.light_shader,
        ) else {
            return Ok(());
        };

        {
            let model = Mat4::IDENTITY;
            let _diffuse_unit = diffuse.bind_to_unit(0)?;
            let _specular_unit = specular.bind_to_unit(1)?;
            let scope = object_shader.use_program()?;
            scope.set_mat4("model", model);
            scope.set_mat4("view", frame.view);
            scope.set_mat4("projection", frame.projection);
            scope.set_mat3("normal", normal_matrix(model));
            scope.set_vec3("viewPos", frame.camera.position());

            let bound = object.bind()?;
            bound.draw(PrimitiveTopology::Triangles)?;
        }

        let scope = light_shader.use_program()?;
        scope.set_mat4("model", light_box_matrix(LIGHT_POSITION));
        scope.set_mat4("view", frame.view);
        scope.set_mat4("projection", frame.projection);
        let bound = light_box.bind()?;
        bound.draw(PrimitiveTopology::Triangles)
    }
}

