/// ContentManager - memoizing loader for shaders, models and textures
///
/// Each resource is loaded at most once per key and then shared (`Rc`) with
/// every caller. Keys are the raw path strings given by the caller, relative
/// to the content root; they are not canonicalized, so two different strings
/// naming the same file produce two independent entries.
///
/// The cache owns its entries until [`ContentManager::clear`]. Resources
/// still referenced elsewhere at that point survive until their last owner
/// drops them; `clear` reports them as warnings.

use std::path::{Path, PathBuf};
use std::rc::Rc;
use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::{engine_debug, engine_err, engine_info, engine_trace, engine_warn};
use crate::graphics_device::{Gpu, TextureParams};
use crate::resource::{
    ImageDecoder, ImageFileDecoder, Model, ModelParser, ObjParser, ShaderProgram, Texture,
};

const SOURCE: &str = "lumen3d::ContentManager";

/// Number of cached entries per resource kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentStats {
    pub shaders: usize,
    pub models: usize,
    pub textures: usize,
}

impl ContentStats {
    pub fn total(&self) -> usize {
        self.shaders + self.models + self.textures
    }
}

/// Content cache
pub struct ContentManager {
    gpu: Gpu,
    root: PathBuf,
    decoder: Box<dyn ImageDecoder>,
    parser: Box<dyn ModelParser>,
    texture_params: TextureParams,

    shaders: FxHashMap<(String, String), Rc<ShaderProgram>>,
    models: FxHashMap<String, Rc<Model>>,
    textures: FxHashMap<String, Rc<Texture>>,
}

impl ContentManager {
    /// Create an empty cache loading from `root`
    ///
    /// Uses [`ImageFileDecoder`] (vertical flip on) and [`ObjParser`].
    pub fn new(gpu: &Gpu, root: impl Into<PathBuf>) -> Self {
        Self {
            gpu: gpu.clone(),
            root: root.into(),
            decoder: Box::new(ImageFileDecoder::default()),
            parser: Box::new(ObjParser::new()),
            texture_params: TextureParams::default(),
            shaders: FxHashMap::default(),
            models: FxHashMap::default(),
            textures: FxHashMap::default(),
        }
    }

    /// Replace the image decoder
    pub fn with_decoder<D: ImageDecoder + 'static>(mut self, decoder: D) -> Self {
        self.decoder = Box::new(decoder);
        self
    }

    /// Replace the model parser
    pub fn with_parser<P: ModelParser + 'static>(mut self, parser: P) -> Self {
        self.parser = Box::new(parser);
        self
    }

    /// Sampling parameters for textures loaded by the cache
    pub fn with_texture_params(mut self, params: TextureParams) -> Self {
        self.texture_params = params;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn gpu(&self) -> &Gpu {
        &self.gpu
    }

    /// Path of a content file on disk
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    // ===== SHADERS =====

    /// Shader program built from a vertex and a fragment stage file
    pub fn get_shader(&mut self, vertex_path: &str, fragment_path: &str) -> Result<Rc<ShaderProgram>> {
        let key = (vertex_path.to_string(), fragment_path.to_string());
        if let Some(shader) = self.shaders.get(&key) {
            engine_trace!(SOURCE, "Shader cache hit: '{}' + '{}'", vertex_path, fragment_path);
            return Ok(shader.clone());
        }

        let shader = Rc::new(ShaderProgram::from_files(
            &self.gpu,
            self.resolve(vertex_path),
            self.resolve(fragment_path),
        )?);
        engine_info!(SOURCE, "Loaded shader '{}' + '{}'", vertex_path, fragment_path);
        self.shaders.insert(key, shader.clone());
        Ok(shader)
    }

    // ===== MODELS =====

    /// Model parsed from `path`; its textures go through [`Self::get_texture`]
    pub fn get_model(&mut self, path: &str) -> Result<Rc<Model>> {
        if let Some(model) = self.models.get(path) {
            engine_trace!(SOURCE, "Model cache hit: '{}'", path);
            return Ok(model.clone());
        }

        let meshes = self.parser
            .parse(&self.resolve(path))
            .map_err(|e| engine_err!(SOURCE, e))?;

        let gpu = self.gpu.clone();
        let model = Model::from_meshes(&gpu, path, &meshes, &mut |texture_path: &Path| {
            let key = texture_path
                .strip_prefix(&self.root)
                .unwrap_or(texture_path)
                .to_string_lossy()
                .into_owned();
            self.get_texture(&key)
        })?;

        let model = Rc::new(model);
        engine_info!(SOURCE, "Loaded model '{}' ({} meshes)", path, model.meshes().len());
        self.models.insert(path.to_string(), model.clone());
        Ok(model)
    }

    // ===== TEXTURES =====

    /// Texture decoded from `path`
    pub fn get_texture(&mut self, path: &str) -> Result<Rc<Texture>> {
        if let Some(texture) = self.textures.get(path) {
            engine_trace!(SOURCE, "Texture cache hit: '{}'", path);
            return Ok(texture.clone());
        }

        let texture = Rc::new(Texture::from_file(
            &self.gpu,
            self.resolve(path),
            self.texture_params,
            self.decoder.as_ref(),
        )?);
        engine_info!(SOURCE, "Loaded texture '{}'", path);
        self.textures.insert(path.to_string(), texture.clone());
        Ok(texture)
    }

    // ===== MAINTENANCE =====

    /// Cached entry counts
    pub fn stats(&self) -> ContentStats {
        ContentStats {
            shaders: self.shaders.len(),
            models: self.models.len(),
            textures: self.textures.len(),
        }
    }

    /// Release every cached resource and empty the cache
    ///
    /// Models go first since they hold references to cached textures.
    pub fn clear(&mut self) {
        let stats = self.stats();

        for (path, model) in self.models.drain() {
            if Rc::strong_count(&model) > 1 {
                engine_warn!(SOURCE, "Model '{}' is still referenced after clear", path);
            }
        }
        for (path, texture) in self.textures.drain() {
            if Rc::strong_count(&texture) > 1 {
                engine_warn!(SOURCE, "Texture '{}' is still referenced after clear", path);
            }
        }
        for ((vertex_path, fragment_path), shader) in self.shaders.drain() {
            if Rc::strong_count(&shader) > 1 {
                engine_warn!(SOURCE, "Shader '{}' + '{}' is still referenced after clear",
                    vertex_path, fragment_path);
            }
        }

        engine_debug!(SOURCE, "Cleared {} cached resources", stats.total());
    }
}

impl std::fmt::Debug for ContentManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentManager")
            .field("root", &self.root)
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
#[path = "content_manager_tests.rs"]
mod tests;
