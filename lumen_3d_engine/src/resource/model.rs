//! Models: ordered lists of textured meshes.
//!
//! # Hierarchy
//!
//! - **Model**: meshes loaded from one model file, shared through the cache
//! - **Mesh**: one vertex array plus the material textures it samples
//!
//! Material textures are bound to consecutive units and exposed to shaders
//! as `material.texture_diffuseN`, `material.texture_specularN` and
//! `material.texture_normalN`, numbered from 1 per kind.

use std::path::{Path, PathBuf};
use std::rc::Rc;
use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::engine_debug;
use crate::graphics_device::{Gpu, PrimitiveTopology, TextureParams};
use crate::resource::{
    AttributeDescriptor, ElementBuffer, ImageDecoder, ProgramScope, Texture, VertexArray,
    VertexBuffer,
};

const SOURCE: &str = "lumen3d::Model";

// ============================================================================
// PARSED DATA
// ============================================================================

/// Role of a material texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Diffuse,
    Specular,
    Normal,
}

impl TextureKind {
    /// Sampler name prefix inside the `material` struct
    pub fn sampler_prefix(&self) -> &'static str {
        match self {
            TextureKind::Diffuse => "texture_diffuse",
            TextureKind::Specular => "texture_specular",
            TextureKind::Normal => "texture_normal",
        }
    }

    fn slot(&self) -> usize {
        match self {
            TextureKind::Diffuse => 0,
            TextureKind::Specular => 1,
            TextureKind::Normal => 2,
        }
    }
}

/// Texture referenced by a mesh's material
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialTexture {
    pub kind: TextureKind,
    /// Image path, already resolved against the model file's directory
    pub path: PathBuf,
}

/// One mesh as produced by a model parser
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub name: String,
    /// Interleaved vertex data described by `attributes`
    pub vertices: Vec<f32>,
    /// Triangle list indices (empty for non-indexed meshes)
    pub indices: Vec<u32>,
    pub attributes: Vec<AttributeDescriptor>,
    pub textures: Vec<MaterialTexture>,
}

/// Model file parser
pub trait ModelParser {
    /// Parse the model at `path` into an ordered list of meshes
    fn parse(&self, path: &Path) -> Result<Vec<MeshData>>;
}

// ============================================================================
// MESH
// ============================================================================

/// Drawable mesh
pub struct Mesh {
    name: String,
    vertex_array: VertexArray,
    textures: Vec<(TextureKind, Rc<Texture>)>,
}

impl Mesh {
    /// Upload parsed mesh data; `textures` are the loaded material textures
    pub fn new(gpu: &Gpu, data: &MeshData, textures: Vec<(TextureKind, Rc<Texture>)>) -> Result<Self> {
        let mut vertex_buffer = VertexBuffer::from_slice(gpu, &data.vertices)?;
        vertex_buffer.set_attributes(data.attributes.clone())?;

        let mut vertex_array = VertexArray::new(gpu)?;
        vertex_array.set_vertex_buffer(vertex_buffer)?;
        if !data.indices.is_empty() {
            vertex_array.set_element_buffer(ElementBuffer::from_u32(gpu, &data.indices)?)?;
        }

        Ok(Self {
            name: data.name.clone(),
            vertex_array,
            textures,
        })
    }

    /// Bind the material textures, point the samplers at them and draw
    pub fn draw(&self, program: &ProgramScope<'_>) -> Result<()> {
        let mut numbers = [0u32; 3];
        let mut bindings = Vec::with_capacity(self.textures.len());
        for (unit, (kind, texture)) in self.textures.iter().enumerate() {
            let number = &mut numbers[kind.slot()];
            *number += 1;
            program.set_int(&format!("material.{}{}", kind.sampler_prefix(), number), unit as i32);
            bindings.push(texture.bind_to_unit(unit as u32)?);
        }

        let bound = self.vertex_array.bind()?;
        bound.draw(PrimitiveTopology::Triangles)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertex_array(&self) -> &VertexArray {
        &self.vertex_array
    }

    pub fn textures(&self) -> &[(TextureKind, Rc<Texture>)] {
        &self.textures
    }
}

// ============================================================================
// MODEL
// ============================================================================

/// Ordered collection of meshes loaded from one file
pub struct Model {
    path: String,
    meshes: Vec<Mesh>,
}

impl Model {
    /// Parse and upload a model, loading each distinct texture once
    pub fn load(
        gpu: &Gpu,
        path: impl AsRef<Path>,
        parser: &dyn ModelParser,
        decoder: &dyn ImageDecoder,
        params: TextureParams,
    ) -> Result<Self> {
        let path = path.as_ref();
        let meshes = parser.parse(path)?;

        let mut loaded: FxHashMap<PathBuf, Rc<Texture>> = FxHashMap::default();
        Self::from_meshes(gpu, &path.display().to_string(), &meshes, &mut |texture_path: &Path| {
            if let Some(texture) = loaded.get(texture_path) {
                return Ok(texture.clone());
            }
            let texture = Rc::new(Texture::from_file(gpu, texture_path, params, decoder)?);
            loaded.insert(texture_path.to_path_buf(), texture.clone());
            Ok(texture)
        })
    }

    /// Upload parsed meshes, resolving textures through `load_texture`
    pub fn from_meshes(
        gpu: &Gpu,
        path: &str,
        meshes: &[MeshData],
        load_texture: &mut dyn FnMut(&Path) -> Result<Rc<Texture>>,
    ) -> Result<Self> {
        let mut uploaded = Vec::with_capacity(meshes.len());
        for data in meshes {
            let textures = data.textures
                .iter()
                .map(|material| Ok((material.kind, load_texture(&material.path)?)))
                .collect::<Result<Vec<_>>>()?;
            uploaded.push(Mesh::new(gpu, data, textures)?);
        }

        engine_debug!(SOURCE, "Loaded model '{}' ({} meshes)", path, uploaded.len());
        Ok(Self {
            path: path.to_string(),
            meshes: uploaded,
        })
    }

    /// Draw every mesh with `program`
    pub fn draw(&self, program: &ProgramScope<'_>) -> Result<()> {
        for mesh in &self.meshes {
            mesh.draw(program)?;
        }
        Ok(())
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Total vertices across meshes
    pub fn vertex_count(&self) -> u32 {
        self.meshes.iter().map(|m| m.vertex_array.vertex_count()).sum()
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("path", &self.path)
            .field("meshes", &self.meshes.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
